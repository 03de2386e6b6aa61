//! Type model.
//!
//! A [`Type`] is a single candidate; [`Types`] is the ordered evidence set a
//! symbol accumulates from native declarations, doc-comments, inherited
//! doc-comments and literal values.

use super::fqn::ClassName;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Built-in scalar (and pseudo) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
    Null,
    Mixed,
    Void,
    Callable,
    Iterable,
    Object,
    Resource,
}

impl ScalarKind {
    /// Map a built-in type name (case insensitive, aliases included).
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "string" => ScalarKind::String,
            "int" | "integer" => ScalarKind::Int,
            "float" | "double" => ScalarKind::Float,
            "bool" | "boolean" | "true" | "false" => ScalarKind::Bool,
            "null" => ScalarKind::Null,
            "mixed" => ScalarKind::Mixed,
            "void" | "never" => ScalarKind::Void,
            "callable" => ScalarKind::Callable,
            "iterable" => ScalarKind::Iterable,
            "object" => ScalarKind::Object,
            "resource" => ScalarKind::Resource,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Null => "null",
            ScalarKind::Mixed => "mixed",
            ScalarKind::Void => "void",
            ScalarKind::Callable => "callable",
            ScalarKind::Iterable => "iterable",
            ScalarKind::Object => "object",
            ScalarKind::Resource => "resource",
        }
    }
}

/// `self`, `static` and `$this` before a class context is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeKind {
    SelfType,
    Static,
    This,
}

impl RelativeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "self" => Some(RelativeKind::SelfType),
            "static" => Some(RelativeKind::Static),
            "$this" => Some(RelativeKind::This),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeKind::SelfType => "self",
            RelativeKind::Static => "static",
            RelativeKind::This => "$this",
        }
    }
}

/// A single candidate type.
///
/// `Unknown` means there is no evidence; `Undefined` means the evidence says
/// the name or member does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Type {
    #[default]
    Unknown,
    Undefined,
    Scalar(ScalarKind),
    Class(ClassName),
    /// `array`, optionally with a known element type (`Foo[]`).
    Array(Option<Box<Type>>),
    Nullable(Box<Type>),
    /// Generic class annotation, e.g. `Lister<Collection>`.
    Collection { class: ClassName, of: Box<Type> },
    Relative(RelativeKind),
}

impl Type {
    pub fn unknown() -> Self {
        Type::Unknown
    }

    pub fn undefined() -> Self {
        Type::Undefined
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Type::Scalar(kind)
    }

    pub fn string() -> Self {
        Type::Scalar(ScalarKind::String)
    }

    pub fn int() -> Self {
        Type::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        Type::Scalar(ScalarKind::Float)
    }

    pub fn bool() -> Self {
        Type::Scalar(ScalarKind::Bool)
    }

    pub fn null() -> Self {
        Type::Scalar(ScalarKind::Null)
    }

    pub fn mixed() -> Self {
        Type::Scalar(ScalarKind::Mixed)
    }

    pub fn array() -> Self {
        Type::Array(None)
    }

    pub fn array_of(element: Type) -> Self {
        Type::Array(Some(Box::new(element)))
    }

    pub fn class(name: impl Into<ClassName>) -> Self {
        Type::Class(name.into())
    }

    pub fn nullable(inner: Type) -> Self {
        match inner {
            Type::Nullable(_) => inner,
            other => Type::Nullable(Box::new(other)),
        }
    }

    pub fn collection(class: impl Into<ClassName>, of: Type) -> Self {
        Type::Collection {
            class: class.into(),
            of: Box::new(of),
        }
    }

    /// Parse a textual type token using the default class resolution:
    /// class-like segments are taken as fully qualified names and
    /// `self`/`static`/`$this` stay relative.
    pub fn from_token(token: &str) -> Self {
        Self::from_token_with(token, &mut default_class_resolution)
    }

    /// Parse a textual type token, handing every class-like segment
    /// (including `self`, `static`, `$this` and `parent`) to `resolve_class`.
    ///
    /// Union tokens keep only their first member; use
    /// [`Types::from_token_with`] to keep all of them.
    pub fn from_token_with(token: &str, resolve_class: &mut dyn FnMut(&str) -> Type) -> Self {
        split_top_level(token, &['|', '&'])
            .into_iter()
            .next()
            .map(|part| parse_single(part, resolve_class))
            .unwrap_or_default()
    }

    /// `false` for `Unknown` and `Undefined`.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Type::Unknown | Type::Undefined)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Type::Undefined)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.strip_nullable(), Type::Array(_))
    }

    pub fn is_class(&self) -> bool {
        self.class_name().is_some()
    }

    /// The class behind this type, looking through nullability and
    /// generic collections.
    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            Type::Class(name) => Some(name),
            Type::Collection { class, .. } => Some(class),
            Type::Nullable(inner) => inner.class_name(),
            _ => None,
        }
    }

    /// The element type of an array or collection.
    pub fn array_type(&self) -> Option<&Type> {
        match self {
            Type::Array(Some(element)) => Some(element),
            Type::Collection { of, .. } => Some(of),
            Type::Nullable(inner) => inner.array_type(),
            _ => None,
        }
    }

    pub fn strip_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Whether `other` (typically from a doc-comment) is a specialisation of
    /// this native declaration, e.g. `array` refined by `Post[]`.
    pub fn is_refined_by(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Array(None), Type::Array(Some(_)) | Type::Collection { .. }) => true,
            (Type::Scalar(ScalarKind::Iterable), Type::Array(_) | Type::Collection { .. }) => true,
            (Type::Scalar(ScalarKind::Object), Type::Class(_) | Type::Collection { .. }) => true,
            (Type::Scalar(ScalarKind::Mixed), other) => other.is_defined() && !other.is_mixed(),
            (Type::Class(native), Type::Collection { class, .. }) => native.matches(class),
            (Type::Nullable(native), Type::Nullable(doc)) => native.is_refined_by(doc),
            (Type::Nullable(native), doc) => native.is_refined_by(doc),
            _ => false,
        }
    }

    fn is_mixed(&self) -> bool {
        matches!(self, Type::Scalar(ScalarKind::Mixed))
    }

    /// Replace `self`/`static`/`$this` with the given class.
    pub fn resolve_relative(&self, class: &ClassName) -> Type {
        match self {
            Type::Relative(_) => Type::Class(class.clone()),
            Type::Array(Some(element)) => Type::array_of(element.resolve_relative(class)),
            Type::Nullable(inner) => Type::nullable(inner.resolve_relative(class)),
            Type::Collection { class: base, of } => {
                Type::collection(base.clone(), of.resolve_relative(class))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => f.write_str("<unknown>"),
            Type::Undefined => f.write_str("<undefined>"),
            Type::Scalar(kind) => f.write_str(kind.as_str()),
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(None) => f.write_str("array"),
            Type::Array(Some(element)) => write!(f, "{}[]", element),
            Type::Nullable(inner) => write!(f, "?{}", inner),
            Type::Collection { class, of } => write!(f, "{}<{}>", class, of),
            Type::Relative(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn default_class_resolution(name: &str) -> Type {
    match RelativeKind::from_name(name) {
        Some(kind) => Type::Relative(kind),
        None => Type::Class(ClassName::new(name)),
    }
}

fn parse_single(token: &str, resolve_class: &mut dyn FnMut(&str) -> Type) -> Type {
    let token = token.trim();
    if token.is_empty() {
        return Type::Unknown;
    }

    if let Some(inner) = token.strip_prefix('?') {
        return Type::nullable(parse_single(inner, resolve_class));
    }

    if let Some(element) = token.strip_suffix("[]") {
        return Type::array_of(parse_single(element, resolve_class));
    }

    if token.ends_with('>') {
        if let Some(open) = token.find('<') {
            let base = token[..open].trim();
            let args = split_top_level(&token[open + 1..token.len() - 1], &[',']);
            let element = args
                .last()
                .map(|arg| parse_single(arg, resolve_class))
                .unwrap_or_default();

            return match base.to_ascii_lowercase().as_str() {
                "array" | "iterable" | "list" | "non-empty-array" | "non-empty-list" => {
                    Type::array_of(element)
                }
                _ => match parse_single(base, resolve_class) {
                    Type::Class(class) => Type::collection(class, element),
                    other => other,
                },
            };
        }
    }

    if token.eq_ignore_ascii_case("array") {
        return Type::Array(None);
    }

    if let Some(kind) = ScalarKind::from_name(token) {
        return Type::Scalar(kind);
    }

    if !is_class_like_token(token) {
        return Type::Unknown;
    }

    resolve_class(token)
}

fn is_class_like_token(token: &str) -> bool {
    let token = token.strip_prefix('$').unwrap_or(token);
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '\\' || !c.is_ascii())
}

/// Split on any of `separators`, ignoring separators nested in `<>` or `()`.
fn split_top_level<'a>(token: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in token.char_indices() {
        match c {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && separators.contains(&c) => {
                parts.push(&token[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&token[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Where a piece of type evidence came from, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSource {
    /// Native declaration in the signature.
    Declared,
    /// The member's own doc-comment.
    DocComment,
    /// A doc-comment reached through an inheritance marker or override.
    InheritedDocComment,
    /// Inferred from a literal value.
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeEntry {
    #[serde(rename = "type")]
    pub ty: Type,
    pub source: TypeSource,
}

static UNKNOWN: Type = Type::Unknown;

/// Ordered, non-unique candidate types for one symbol.
///
/// An empty set is legal and behaves like a single `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Types(Vec<TypeEntry>);

impl Types {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(ty: Type, source: TypeSource) -> Self {
        Self(vec![TypeEntry { ty, source }])
    }

    pub fn from_types(types: impl IntoIterator<Item = Type>, source: TypeSource) -> Self {
        Self(
            types
                .into_iter()
                .map(|ty| TypeEntry { ty, source })
                .collect(),
        )
    }

    /// Parse a (possibly union) type token into one entry per member.
    pub fn from_token_with(
        token: &str,
        source: TypeSource,
        resolve_class: &mut dyn FnMut(&str) -> Type,
    ) -> Self {
        Self::from_types(
            split_top_level(token, &['|', '&'])
                .into_iter()
                .map(|part| parse_single(part, resolve_class))
                .filter(Type::is_defined),
            source,
        )
    }

    pub fn push(&mut self, ty: Type, source: TypeSource) {
        self.0.push(TypeEntry { ty, source });
    }

    /// Value-style append.
    pub fn with(mut self, ty: Type, source: TypeSource) -> Self {
        self.push(ty, source);
        self
    }

    pub fn merge(mut self, other: Types) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Re-tag every entry, e.g. when doc-comment types are inherited.
    pub fn with_source(self, source: TypeSource) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|entry| TypeEntry { source, ..entry })
                .collect(),
        )
    }

    /// The highest-priority entry that is not `Unknown`; insertion order
    /// breaks ties.
    pub fn best(&self) -> &Type {
        self.0
            .iter()
            .filter(|entry| !entry.ty.is_unknown())
            .min_by_key(|entry| entry.source)
            .map(|entry| &entry.ty)
            .unwrap_or(&UNKNOWN)
    }

    /// Add doc-comment evidence. A doc type that specialises a declared
    /// entry replaces it in place and keeps the `Declared` tag; anything
    /// else is appended with `source`.
    pub fn refine_with(mut self, doc: Types, source: TypeSource) -> Self {
        for doc_entry in doc.0 {
            let refined = self.0.iter_mut().find(|entry| {
                entry.source == TypeSource::Declared && entry.ty.is_refined_by(&doc_entry.ty)
            });
            match refined {
                Some(entry) => entry.ty = doc_entry.ty,
                None => self.push(doc_entry.ty, source),
            }
        }
        self
    }

    pub fn first(&self) -> Option<&Type> {
        self.0.first().map(|entry| &entry.ty)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.0.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.0.iter().map(|entry| &entry.ty)
    }

    pub fn has_source(&self, source: TypeSource) -> bool {
        self.0.iter().any(|entry| entry.source == source)
    }

    pub fn map(self, mut f: impl FnMut(Type) -> Type) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|entry| TypeEntry {
                    ty: f(entry.ty),
                    source: entry.source,
                })
                .collect(),
        )
    }
}

impl fmt::Display for Types {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.iter().map(|t| t.to_string()).collect();
        f.write_str(&rendered.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_tokens() {
        assert_eq!(Type::from_token("int"), Type::int());
        assert_eq!(Type::from_token("integer"), Type::int());
        assert_eq!(Type::from_token("Boolean"), Type::bool());
        assert_eq!(Type::from_token("double"), Type::float());
        assert_eq!(Type::from_token("array"), Type::array());
    }

    #[test]
    fn test_class_and_array_tokens() {
        assert_eq!(Type::from_token("\\Acme\\Post"), Type::class("Acme\\Post"));
        assert_eq!(
            Type::from_token("Post[]"),
            Type::array_of(Type::class("Post"))
        );
        assert_eq!(
            Type::from_token("array<int, Post>"),
            Type::array_of(Type::class("Post"))
        );
        assert_eq!(Type::from_token("?int"), Type::nullable(Type::int()));
    }

    #[test]
    fn test_generic_class_token() {
        let ty = Type::from_token("Foo\\Lister<Foo\\Collection>");
        assert_eq!(ty.to_string(), "Foo\\Lister<Foo\\Collection>");
        assert_eq!(ty.array_type(), Some(&Type::class("Foo\\Collection")));
        assert_eq!(ty.class_name(), Some(&ClassName::new("Foo\\Lister")));
    }

    #[test]
    fn test_relative_tokens_resolve_to_class() {
        let ty = Type::from_token("static");
        assert_eq!(ty, Type::Relative(RelativeKind::Static));
        assert_eq!(
            ty.resolve_relative(&ClassName::new("Foobar")),
            Type::class("Foobar")
        );
        assert_eq!(
            Type::from_token("$this[]").resolve_relative(&ClassName::new("Foobar")),
            Type::array_of(Type::class("Foobar"))
        );
    }

    #[test]
    fn test_custom_class_resolution() {
        let ty = Type::from_token_with("Post[]", &mut |name: &str| Type::class(format!("Acme\\{}", name)));
        assert_eq!(ty, Type::array_of(Type::class("Acme\\Post")));
    }

    #[test]
    fn test_canonical_rendering() {
        assert_eq!(Type::unknown().to_string(), "<unknown>");
        assert_eq!(Type::undefined().to_string(), "<undefined>");
        assert_eq!(Type::array_of(Type::string()).to_string(), "string[]");
        assert_eq!(Type::nullable(Type::class("Foo")).to_string(), "?Foo");
    }

    #[test]
    fn test_definedness() {
        assert!(!Type::unknown().is_defined());
        assert!(!Type::undefined().is_defined());
        assert!(Type::null().is_defined());
    }

    #[test]
    fn test_garbage_token_is_unknown() {
        assert_eq!(Type::from_token("callable(int): string"), Type::Unknown);
        assert_eq!(Type::from_token(""), Type::Unknown);
    }

    #[test]
    fn test_best_prefers_priority_over_insertion_order() {
        let types = Types::empty()
            .with(Type::string(), TypeSource::Inferred)
            .with(Type::class("Doc"), TypeSource::DocComment)
            .with(Type::class("Native"), TypeSource::Declared)
            .with(Type::class("Parent"), TypeSource::InheritedDocComment);
        assert_eq!(types.best(), &Type::class("Native"));

        let types = Types::empty()
            .with(Type::string(), TypeSource::Inferred)
            .with(Type::class("Parent"), TypeSource::InheritedDocComment)
            .with(Type::class("Doc"), TypeSource::DocComment);
        assert_eq!(types.best(), &Type::class("Doc"));
    }

    #[test]
    fn test_best_skips_unknown_and_defaults_to_unknown() {
        let types = Types::single(Type::unknown(), TypeSource::Declared)
            .with(Type::int(), TypeSource::Inferred);
        assert_eq!(types.best(), &Type::int());
        assert_eq!(Types::empty().best(), &Type::unknown());
        assert_eq!(
            Types::single(Type::undefined(), TypeSource::Inferred).best(),
            &Type::undefined()
        );
    }

    #[test]
    fn test_doc_type_refines_native_array() {
        let native = Types::single(Type::array(), TypeSource::Declared);
        let doc = Types::single(Type::array_of(Type::class("Acme\\Post")), TypeSource::DocComment);
        let merged = native.refine_with(doc, TypeSource::DocComment);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.best(), &Type::array_of(Type::class("Acme\\Post")));
        assert!(merged.has_source(TypeSource::Declared));
    }

    #[test]
    fn test_unrelated_doc_type_is_appended() {
        let native = Types::single(Type::int(), TypeSource::Declared);
        let doc = Types::single(Type::class("Foo"), TypeSource::DocComment);
        let merged = native.refine_with(doc, TypeSource::DocComment);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.best(), &Type::int());
    }

    #[test]
    fn test_union_token_keeps_all_members() {
        let types = Types::from_token_with("Foo|null", TypeSource::DocComment, &mut |name: &str| {
            Type::class(name)
        });
        assert_eq!(types.len(), 2);
        assert_eq!(types.best(), &Type::class("Foo"));
        assert_eq!(types.to_string(), "Foo|null");
    }
}
