//! Doc-comment annotations.
//!
//! The parser only splits tags and captures raw type tokens; turning those
//! tokens into [`phpscope_api::Type`]s needs the file's imports and is left to
//! the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static TAG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@([A-Za-z][\w-]*)\s*(.*)$").expect("tag pattern is valid")
});

static INHERITDOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{?@inheritdoc\}?").expect("inheritdoc pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarTag {
    pub ty: String,
    /// Variable name without `$`, when given.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamTag {
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTag {
    pub name: String,
    pub return_type: Option<String>,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyAccess {
    ReadWrite,
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyTag {
    pub name: String,
    pub ty: Option<String>,
    pub access: PropertyAccess,
}

/// Structured view of one `/** ... */` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocBlock {
    raw: String,
    formatted: String,
    return_type: Option<String>,
    vars: Vec<VarTag>,
    params: Vec<ParamTag>,
    methods: Vec<MethodTag>,
    properties: Vec<PropertyTag>,
    inherits: bool,
}

impl DocBlock {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Prose of the block with comment markers and tags removed.
    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn vars(&self) -> &[VarTag] {
        &self.vars
    }

    /// `@var` type for the named variable, falling back to an unnamed tag.
    pub fn var_type_for(&self, name: Option<&str>) -> Option<&str> {
        if let Some(name) = name {
            if let Some(tag) = self.vars.iter().find(|tag| tag.name.as_deref() == Some(name)) {
                return Some(&tag.ty);
            }
        }
        self.vars
            .iter()
            .find(|tag| tag.name.is_none())
            .map(|tag| tag.ty.as_str())
    }

    pub fn param_type(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.ty.as_str())
    }

    pub fn methods(&self) -> &[MethodTag] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodTag> {
        self.methods.iter().find(|tag| tag.name == name)
    }

    pub fn properties(&self) -> &[PropertyTag] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyTag> {
        self.properties.iter().find(|tag| tag.name == name)
    }

    /// Whether the block defers to the parent's documentation.
    pub fn inherits(&self) -> bool {
        self.inherits
    }
}

pub trait DocBlockParser: Send + Sync {
    fn parse(&self, raw: &str) -> DocBlock;
}

/// Line based parser for the common phpDocumentor tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDocBlockParser;

impl DocBlockParser for DefaultDocBlockParser {
    fn parse(&self, raw: &str) -> DocBlock {
        let mut block = DocBlock {
            raw: raw.to_string(),
            inherits: INHERITDOC.is_match(raw),
            ..DocBlock::default()
        };

        let mut prose = Vec::new();
        let mut in_tags = false;

        for line in comment_lines(raw) {
            let Some(captures) = TAG_LINE.captures(line) else {
                if !in_tags {
                    prose.push(line);
                }
                continue;
            };
            in_tags = true;

            let tag = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            let rest = captures.get(2).map(|m| m.as_str()).unwrap_or("");

            match tag.to_ascii_lowercase().as_str() {
                "return" => {
                    if let Some((ty, _)) = take_type(rest) {
                        block.return_type = Some(ty.to_string());
                    }
                }
                "var" => {
                    if let Some(tag) = parse_var(rest) {
                        block.vars.push(tag);
                    }
                }
                "param" => {
                    if let Some(tag) = parse_param(rest) {
                        block.params.push(tag);
                    }
                }
                "method" => {
                    if let Some(tag) = parse_method(rest) {
                        block.methods.push(tag);
                    }
                }
                "property" => push_property(&mut block, rest, PropertyAccess::ReadWrite),
                "property-read" => push_property(&mut block, rest, PropertyAccess::Read),
                "property-write" => push_property(&mut block, rest, PropertyAccess::Write),
                _ => {}
            }
        }

        block.formatted = format_prose(&prose);
        block
    }
}

/// Body lines with the comment markers and leading `*` removed.
fn comment_lines(raw: &str) -> Vec<&str> {
    let body = raw
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    body.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect()
}

fn format_prose(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end]
            .iter()
            .filter(|line| !is_inheritdoc_line(line))
            .copied()
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn is_inheritdoc_line(line: &str) -> bool {
    INHERITDOC
        .find(line.trim())
        .is_some_and(|m| m.as_str().len() == line.trim().len())
}

/// Split a leading type token off `text`, honouring `<>`, `()` and `{}`
/// nesting so `array<int, Post>` stays in one piece.
fn take_type(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() || text.starts_with('$') {
        return None;
    }

    let mut depth = 0usize;
    let mut end = text.len();
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }

    Some((&text[..end], text[end..].trim_start()))
}

fn take_variable(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let text = text.strip_prefix('&').unwrap_or(text);
    let text = text.strip_prefix("...").unwrap_or(text);
    let rest = text.strip_prefix('$')?;
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some((&rest[..end], &rest[end..]))
}

fn parse_var(rest: &str) -> Option<VarTag> {
    // `@var $name Type`
    if let Some((name, after)) = take_variable(rest) {
        let (ty, _) = take_type(after)?;
        return Some(VarTag {
            ty: ty.to_string(),
            name: Some(name.to_string()),
        });
    }

    // `@var Type [$name]`
    let (ty, after) = take_type(rest)?;
    Some(VarTag {
        ty: ty.to_string(),
        name: take_variable(after).map(|(name, _)| name.to_string()),
    })
}

fn parse_param(rest: &str) -> Option<ParamTag> {
    let (ty, after) = take_type(rest)?;
    let (name, _) = take_variable(after)?;
    Some(ParamTag {
        ty: ty.to_string(),
        name: name.to_string(),
    })
}

fn parse_method(rest: &str) -> Option<MethodTag> {
    let rest = rest.trim();
    let mut is_static = false;
    let mut body = rest;

    if let Some(after) = rest.strip_prefix("static") {
        if after.starts_with(char::is_whitespace) {
            let (next, _) = take_type(after)?;
            // `@method static foo()` reads as a method returning `static`.
            if !next.contains('(') {
                is_static = true;
                body = after.trim_start();
            }
        }
    }

    let (first, after) = take_type(body)?;
    let (return_type, signature) = if first.contains('(') {
        (None, first)
    } else {
        let (signature, _) = take_type(after)?;
        (Some(first.to_string()), signature)
    };

    let name = signature.split('(').next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }

    Some(MethodTag {
        name: name.to_string(),
        return_type,
        is_static,
    })
}

fn push_property(block: &mut DocBlock, rest: &str, access: PropertyAccess) {
    let (ty, after) = match take_variable(rest) {
        Some(_) => (None, rest),
        None => match take_type(rest) {
            Some((ty, after)) => (Some(ty.to_string()), after),
            None => return,
        },
    };

    if let Some((name, _)) = take_variable(after) {
        block.properties.push(PropertyTag {
            name: name.to_string(),
            ty,
            access,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> DocBlock {
        DefaultDocBlockParser.parse(raw)
    }

    #[test]
    fn test_return_and_var_tags() {
        let block = parse("/**\n * @return array<int, Post> the posts\n */");
        assert_eq!(block.return_type(), Some("array<int, Post>"));

        let block = parse("/** @var $foobar Foobar */");
        assert_eq!(block.var_type_for(Some("foobar")), Some("Foobar"));

        let block = parse("/** @var Foobar $foobar */");
        assert_eq!(block.var_type_for(Some("foobar")), Some("Foobar"));
        assert_eq!(block.var_type_for(Some("other")), None);

        let block = parse("/** @var Foobar[] */");
        assert_eq!(block.var_type_for(Some("anything")), Some("Foobar[]"));
    }

    #[test]
    fn test_param_tags() {
        let block = parse("/**\n * @param string $name\n * @param Post[] ...$posts\n */");
        assert_eq!(block.param_type("name"), Some("string"));
        assert_eq!(block.param_type("posts"), Some("Post[]"));
    }

    #[test]
    fn test_method_tags() {
        let block = parse(
            "/**\n * @method Post method1()\n * @method static Builder query(array $args)\n * @method static make()\n * @method reset()\n */",
        );
        let method1 = block.method("method1").unwrap();
        assert_eq!(method1.return_type.as_deref(), Some("Post"));
        assert!(!method1.is_static);

        let query = block.method("query").unwrap();
        assert_eq!(query.return_type.as_deref(), Some("Builder"));
        assert!(query.is_static);

        let make = block.method("make").unwrap();
        assert_eq!(make.return_type.as_deref(), Some("static"));
        assert!(!make.is_static);

        assert_eq!(block.method("reset").unwrap().return_type, None);
    }

    #[test]
    fn test_property_tags() {
        let block = parse("/**\n * @property string $title\n * @property-read int $id\n */");
        assert_eq!(block.property("title").unwrap().ty.as_deref(), Some("string"));
        assert_eq!(block.property("id").unwrap().access, PropertyAccess::Read);
    }

    #[test]
    fn test_inheritdoc_marker() {
        assert!(parse("/**\n * {@inheritdoc}\n */").inherits());
        assert!(parse("/** @inheritDoc */").inherits());
        assert!(!parse("/** Plain */").inherits());
    }

    #[test]
    fn test_formatted_prose() {
        let block = parse("/**\n     * Hello this is a docblock.\n     *\n     * Yes?\n     */");
        assert_eq!(block.formatted(), "Hello this is a docblock.\n\nYes?");
        assert!(block.raw().contains("Hello this is a docblock."));

        let block = parse("/**\n * Summary.\n *\n * @return int\n */");
        assert_eq!(block.formatted(), "Summary.");
    }
}
