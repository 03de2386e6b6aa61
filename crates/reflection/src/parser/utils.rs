use tree_sitter::Node;

pub const CLASS_LIKE_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

/// Nodes that own their own frame.
pub const SCOPE_KINDS: &[&str] = &[
    "method_declaration",
    "function_definition",
    "anonymous_function",
    "anonymous_function_creation_expression",
    "arrow_function",
];

pub const PARAMETER_KINDS: &[&str] = &[
    "simple_parameter",
    "variadic_parameter",
    "property_promotion_parameter",
];

pub fn is_class_like(kind: &str) -> bool {
    CLASS_LIKE_KINDS.contains(&kind)
}

pub fn is_scope(kind: &str) -> bool {
    SCOPE_KINDS.contains(&kind)
}

pub fn is_closure(kind: &str) -> bool {
    matches!(
        kind,
        "anonymous_function" | "anonymous_function_creation_expression"
    )
}

pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub fn has_child_of_kind(node: &Node, kind: &str) -> bool {
    children(node).iter().any(|child| child.kind() == kind)
}

pub fn first_child_of_kind<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).into_iter().find(|child| child.kind() == kind)
}

/// Closest strict ancestor whose kind is in `kinds`.
pub fn ancestor_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Closest class-like declaration around `node`; anonymous classes stop the
/// search.
pub fn enclosing_class_like<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if is_class_like(parent.kind()) {
            return Some(parent);
        }
        if parent.kind() == "anonymous_class" || parent.kind() == "anonymous_class_creation_expression" {
            return None;
        }
        current = parent.parent();
    }
    None
}

/// Nearest enclosing scope node, or the program root.
pub fn enclosing_scope<'t>(node: &Node<'t>) -> Node<'t> {
    if is_scope(node.kind()) || node.parent().is_none() {
        return *node;
    }
    let mut current = *node;
    while let Some(parent) = current.parent() {
        if is_scope(parent.kind()) {
            return parent;
        }
        current = parent;
    }
    current
}

/// The `/** ... */` comment directly preceding `node`, if any.
pub fn doc_comment<'s>(node: &Node, source: &'s str) -> Option<&'s str> {
    let previous = node.prev_named_sibling()?;
    if previous.kind() != "comment" {
        return None;
    }
    let text = previous.utf8_text(source.as_bytes()).ok()?;
    text.starts_with("/**").then_some(text)
}

/// Variable name without the sigil.
pub fn strip_sigil(name: &str) -> &str {
    name.trim().trim_start_matches('&').trim_start_matches("...").trim_start_matches('$')
}

/// Literal contents of a quoted string token.
pub fn string_contents(text: &str) -> Option<String> {
    let text = text
        .strip_prefix('b')
        .or_else(|| text.strip_prefix('B'))
        .filter(|rest| rest.starts_with('\'') || rest.starts_with('"'))
        .unwrap_or(text);

    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        let inner = &text[1..text.len() - 1];
        return Some(inner.replace("\\'", "'").replace("\\\\", "\\"));
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Some(unescape_double_quoted(&text[1..text.len() - 1]));
    }

    None
}

fn unescape_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('$') => out.push('$'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_contents() {
        assert_eq!(string_contents("'foobar'").as_deref(), Some("foobar"));
        assert_eq!(string_contents("'it\\'s'").as_deref(), Some("it's"));
        assert_eq!(string_contents("\"a\\tb\"").as_deref(), Some("a\tb"));
        assert_eq!(string_contents("foo"), None);
    }

    #[test]
    fn test_strip_sigil() {
        assert_eq!(strip_sigil("$foo"), "foo");
        assert_eq!(strip_sigil("&$foo"), "foo");
        assert_eq!(strip_sigil("...$args"), "args");
    }
}
