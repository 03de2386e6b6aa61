//! Namespace and import handling.

use super::utils::{enclosing_class_like, first_child_of_kind, named_children};
use phpscope_api::{ClassName, RelativeKind, ScalarKind, Type, TypeSource, Types};
use std::collections::HashMap;
use tree_sitter::Node;

/// The namespace in effect for a region of a file and its class imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceScope {
    pub namespace: String,
    pub start: usize,
    /// Lower-cased alias to fully qualified name.
    pub imports: HashMap<String, ClassName>,
}

impl NamespaceScope {
    pub fn import(&self, alias: &str) -> Option<&ClassName> {
        self.imports.get(&alias.to_ascii_lowercase())
    }
}

/// Namespaces and `use` imports of one file, ordered by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    scopes: Vec<NamespaceScope>,
    global: NamespaceScope,
}

impl FileContext {
    pub fn from_tree(root: Node, source: &str) -> Self {
        let mut context = FileContext::default();
        let mut current = NamespaceScope::default();
        let mut has_namespace = false;

        for child in named_children(&root) {
            match child.kind() {
                "namespace_definition" => {
                    if has_namespace || !current.imports.is_empty() {
                        context.scopes.push(std::mem::take(&mut current));
                    }
                    has_namespace = true;
                    current.namespace = child
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                        .unwrap_or("")
                        .trim_matches('\\')
                        .to_string();
                    current.start = child.start_byte();

                    // Braced form: imports live inside the body.
                    if let Some(body) = child.child_by_field_name("body") {
                        for statement in named_children(&body) {
                            if statement.kind() == "namespace_use_declaration" {
                                collect_imports(&statement, source, &mut current);
                            }
                        }
                    }
                }
                "namespace_use_declaration" => collect_imports(&child, source, &mut current),
                _ => {}
            }
        }

        context.scopes.push(current);
        context
    }

    /// Scope in effect at a byte offset.
    pub fn scope_at(&self, offset: usize) -> &NamespaceScope {
        self.scopes
            .iter()
            .rev()
            .find(|scope| scope.start <= offset)
            .unwrap_or(&self.global)
    }

    pub fn scopes(&self) -> &[NamespaceScope] {
        &self.scopes
    }
}

fn collect_imports(node: &Node, source: &str, scope: &mut NamespaceScope) {
    let Ok(text) = node.utf8_text(source.as_bytes()) else {
        return;
    };
    for (alias, name) in parse_use_statement(text) {
        scope.imports.insert(alias.to_ascii_lowercase(), name);
    }
}

/// Parse the class imports out of a `use` statement, returning
/// `(alias, fully qualified name)` pairs. Function and constant imports are
/// skipped.
pub fn parse_use_statement(text: &str) -> Vec<(String, ClassName)> {
    let body = text
        .trim()
        .trim_end_matches(';')
        .trim_start_matches("use")
        .trim();

    if starts_with_keyword(body, "function") || starts_with_keyword(body, "const") {
        return Vec::new();
    }

    let mut imports = Vec::new();

    if let Some(open) = body.find('{') {
        let prefix = body[..open].trim().trim_end_matches('\\');
        let close = body.rfind('}').unwrap_or(body.len());
        for item in body[open + 1..close].split(',') {
            let item = item.trim();
            if item.is_empty()
                || starts_with_keyword(item, "function")
                || starts_with_keyword(item, "const")
            {
                continue;
            }
            let (name, alias) = split_alias(item);
            let full = format!("{}\\{}", prefix, name);
            imports.push((alias, ClassName::new(full)));
        }
        return imports;
    }

    for item in body.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (name, alias) = split_alias(item);
        imports.push((alias, ClassName::new(name)));
    }

    imports
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.len() > keyword.len()
        && text[..keyword.len()].eq_ignore_ascii_case(keyword)
        && text[keyword.len()..].starts_with(char::is_whitespace)
}

fn split_alias(item: &str) -> (String, String) {
    let parts: Vec<&str> = item.split_whitespace().collect();
    let name = parts.first().copied().unwrap_or("").trim_start_matches('\\');
    let alias = match parts.as_slice() {
        [_, keyword, alias] if keyword.eq_ignore_ascii_case("as") => (*alias).to_string(),
        _ => name.rsplit('\\').next().unwrap_or(name).to_string(),
    };
    (name.to_string(), alias)
}

/// Resolves name tokens found at one place in a file to types.
#[derive(Debug, Clone)]
pub struct NameResolver<'a> {
    scope: &'a NamespaceScope,
    class: Option<ClassName>,
    parent: Option<ClassName>,
}

impl<'a> NameResolver<'a> {
    pub fn new(scope: &'a NamespaceScope) -> Self {
        Self {
            scope,
            class: None,
            parent: None,
        }
    }

    /// Resolver for the position of `node`, aware of its enclosing class.
    pub fn for_node(context: &'a FileContext, node: &Node, source: &str) -> Self {
        let scope = context.scope_at(node.start_byte());
        let mut resolver = Self::new(scope);

        if let Some(class_node) = enclosing_class_like(node) {
            resolver = resolver.with_class_node(&class_node, source);
        }

        resolver
    }

    /// Bind `self` (and `parent`) to the given class-like declaration.
    pub fn with_class_node(mut self, class_node: &Node, source: &str) -> Self {
        let short = class_node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source.as_bytes()).ok())
            .unwrap_or("");
        self.class = Some(ClassName::new(short).prepend(&self.scope.namespace));
        self.parent = parent_name_token(class_node, source).map(|token| self.resolve_class_name(token));
        self
    }

    pub fn class(&self) -> Option<&ClassName> {
        self.class.as_ref()
    }

    pub fn parent(&self) -> Option<&ClassName> {
        self.parent.as_ref()
    }

    pub fn namespace(&self) -> &str {
        &self.scope.namespace
    }

    /// Apply the import table and current namespace to a class token.
    pub fn resolve_class_name(&self, token: &str) -> ClassName {
        let token = token.trim();

        if let Some(absolute) = token.strip_prefix('\\') {
            return ClassName::new(absolute);
        }

        if let Some(relative) = token
            .strip_prefix("namespace\\")
            .or_else(|| token.strip_prefix("Namespace\\"))
        {
            return ClassName::new(relative).prepend(&self.scope.namespace);
        }

        let (first, rest) = match token.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (token, None),
        };

        if let Some(imported) = self.scope.import(first) {
            return match rest {
                Some(rest) => ClassName::new(format!("{}\\{}", imported, rest)),
                None => imported.clone(),
            };
        }

        ClassName::new(token).prepend(&self.scope.namespace)
    }

    /// Resolve a single class-like token, handling `self`, `static`,
    /// `$this`, `parent` and built-in names.
    pub fn resolve_type(&self, token: &str) -> Type {
        let token = token.trim();
        let lower = token.to_ascii_lowercase();

        match lower.as_str() {
            "self" => {
                return match &self.class {
                    Some(class) => Type::Class(class.clone()),
                    None => Type::Relative(RelativeKind::SelfType),
                };
            }
            "parent" => {
                return match &self.parent {
                    Some(parent) => Type::Class(parent.clone()),
                    None => Type::Unknown,
                };
            }
            _ => {}
        }

        if let Some(kind) = RelativeKind::from_name(&lower) {
            return Type::Relative(kind);
        }

        if lower == "array" {
            return Type::array();
        }

        if let Some(kind) = ScalarKind::from_name(&lower) {
            return Type::Scalar(kind);
        }

        Type::Class(self.resolve_class_name(token))
    }

    /// Parse a full type token (nullable, arrays, generics, unions).
    pub fn resolve_types(&self, token: &str, source: TypeSource) -> Types {
        Types::from_token_with(token, source, &mut |name: &str| self.resolve_type(name))
    }

    /// First member of a type token.
    pub fn resolve_type_token(&self, token: &str) -> Type {
        Type::from_token_with(token, &mut |name: &str| self.resolve_type(name))
    }
}

/// The `extends` clause of a class declaration.
fn parent_name_token<'s>(class_node: &Node, source: &'s str) -> Option<&'s str> {
    if class_node.kind() != "class_declaration" {
        return None;
    }
    let clause = first_child_of_kind(class_node, "base_clause")?;
    named_children(&clause)
        .into_iter()
        .find(|child| matches!(child.kind(), "name" | "qualified_name"))
        .and_then(|name| name.utf8_text(source.as_bytes()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(namespace: &str, imports: &[(&str, &str)]) -> NamespaceScope {
        NamespaceScope {
            namespace: namespace.to_string(),
            start: 0,
            imports: imports
                .iter()
                .map(|(alias, name)| (alias.to_ascii_lowercase(), ClassName::new(*name)))
                .collect(),
        }
    }

    #[test]
    fn test_parse_use_statements() {
        assert_eq!(
            parse_use_statement("use Acme\\Post;"),
            vec![("Post".to_string(), ClassName::new("Acme\\Post"))]
        );
        assert_eq!(
            parse_use_statement("use Acme\\Post as Article, Foo\\Bar;"),
            vec![
                ("Article".to_string(), ClassName::new("Acme\\Post")),
                ("Bar".to_string(), ClassName::new("Foo\\Bar")),
            ]
        );
        assert_eq!(
            parse_use_statement("use Acme\\{Post, Blog\\Comment as Reply};"),
            vec![
                ("Post".to_string(), ClassName::new("Acme\\Post")),
                ("Reply".to_string(), ClassName::new("Acme\\Blog\\Comment")),
            ]
        );
        assert!(parse_use_statement("use function Acme\\helper;").is_empty());
    }

    #[test]
    fn test_resolve_class_names() {
        let scope = scope("Foobar\\Barfoo", &[("Factory", "Acme\\Factory")]);
        let resolver = NameResolver::new(&scope);

        assert_eq!(resolver.resolve_class_name("World"), "Foobar\\Barfoo\\World");
        assert_eq!(resolver.resolve_class_name("\\stdClass"), "stdClass");
        assert_eq!(resolver.resolve_class_name("Factory"), "Acme\\Factory");
        assert_eq!(resolver.resolve_class_name("factory\\Sub"), "Acme\\Factory\\Sub");
        assert_eq!(
            resolver.resolve_class_name("namespace\\Local"),
            "Foobar\\Barfoo\\Local"
        );
    }

    #[test]
    fn test_resolve_builtin_and_relative_types() {
        let scope = scope("", &[]);
        let resolver = NameResolver::new(&scope);

        assert_eq!(resolver.resolve_type("int"), Type::int());
        assert_eq!(resolver.resolve_type("static"), Type::Relative(RelativeKind::Static));
        assert_eq!(resolver.resolve_type("self"), Type::Relative(RelativeKind::SelfType));
        assert_eq!(resolver.resolve_type("parent"), Type::Unknown);
        assert_eq!(
            resolver.resolve_types("Post[]|null", TypeSource::DocComment).to_string(),
            "Post[]|null"
        );
    }
}
