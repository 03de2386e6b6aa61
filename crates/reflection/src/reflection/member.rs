use super::collection::{ClassMember, CollectionItem, ReflectionCollection};
use crate::docblock::DocBlock;
use crate::parser::ParsedSource;
use phpscope_api::{ClassName, Position, SymbolContext, Type, TypeSource, Types, Value};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "public" | "var" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReflectionParameter {
    pub(crate) name: String,
    pub(crate) index: usize,
    pub(crate) ty: Type,
    pub(crate) types: Types,
    pub(crate) default: Option<SymbolContext>,
    pub(crate) by_reference: bool,
    pub(crate) variadic: bool,
    pub(crate) position: Position,
}

impl ReflectionParameter {
    /// Name without `$`; empty when the source omitted the variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Native type declaration.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn inferred_types(&self) -> &Types {
        &self.types
    }

    /// Resolution of the default expression, if there is one.
    pub fn default(&self) -> Option<&SymbolContext> {
        self.default.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref().and_then(SymbolContext::value)
    }

    pub fn by_reference(&self) -> bool {
        self.by_reference
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl CollectionItem for ReflectionParameter {
    fn key(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct ReflectionMethod {
    pub(crate) name: String,
    pub(crate) class: ClassName,
    pub(crate) declaring_class: ClassName,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_abstract: bool,
    pub(crate) docblock: DocBlock,
    pub(crate) return_type: Type,
    pub(crate) return_types: Types,
    pub(crate) parameters: ReflectionCollection<ReflectionParameter>,
    pub(crate) body: String,
    pub(crate) position: Position,
    /// `None` for members that only exist as `@method` annotations.
    pub(crate) source: Option<Arc<ParsedSource>>,
}

impl ReflectionMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn docblock(&self) -> &DocBlock {
        &self.docblock
    }

    /// Native return type with `static`/`$this` bound to the lookup class.
    pub fn return_type(&self) -> Type {
        self.return_type.resolve_relative(&self.class)
    }

    /// Every piece of return type evidence, relative types bound to the
    /// lookup class.
    pub fn inferred_return_types(&self) -> Types {
        self.return_types
            .clone()
            .map(|ty| ty.resolve_relative(&self.class))
    }

    pub fn parameters(&self) -> &ReflectionCollection<ReflectionParameter> {
        &self.parameters
    }

    /// Statements between the braces, trimmed.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn source(&self) -> Option<&Arc<ParsedSource>> {
        self.source.as_ref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.source.is_none()
    }

    pub(crate) fn with_class(mut self, class: &ClassName) -> Self {
        self.class = class.clone();
        self
    }

    pub(crate) fn with_return_types(mut self, types: Types) -> Self {
        self.return_types = types;
        self
    }

    /// Own native types plus the ancestor's documented ones.
    pub(crate) fn inheriting_docs_from(mut self, ancestor: &ReflectionMethod) -> Self {
        let own = self
            .return_types
            .entries()
            .filter(|entry| entry.source == TypeSource::Declared)
            .map(|entry| entry.ty.clone());
        let inherited = ancestor
            .return_types
            .clone()
            .with_source(TypeSource::InheritedDocComment);
        self.return_types = Types::from_types(own, TypeSource::Declared).merge(inherited);
        self.declaring_class = ancestor.declaring_class.clone();
        self
    }
}

impl CollectionItem for ReflectionMethod {
    const CASE_INSENSITIVE: bool = true;

    fn key(&self) -> &str {
        &self.name
    }
}

impl ClassMember for ReflectionMethod {
    fn class(&self) -> &ClassName {
        &self.class
    }

    fn declaring_class(&self) -> &ClassName {
        &self.declaring_class
    }
}

#[derive(Debug, Clone)]
pub struct ReflectionProperty {
    pub(crate) name: String,
    pub(crate) class: ClassName,
    pub(crate) declaring_class: ClassName,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) docblock: DocBlock,
    pub(crate) ty: Type,
    pub(crate) types: Types,
    pub(crate) default: Option<SymbolContext>,
    pub(crate) position: Position,
}

impl ReflectionProperty {
    /// Name without `$`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn docblock(&self) -> &DocBlock {
        &self.docblock
    }

    pub fn ty(&self) -> Type {
        self.ty.resolve_relative(&self.class)
    }

    pub fn inferred_types(&self) -> Types {
        self.types.clone().map(|ty| ty.resolve_relative(&self.class))
    }

    pub fn default(&self) -> Option<&SymbolContext> {
        self.default.as_ref()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn with_class(mut self, class: &ClassName) -> Self {
        self.class = class.clone();
        self
    }

    pub(crate) fn with_types(mut self, types: Types) -> Self {
        self.types = types;
        self
    }

    pub(crate) fn inheriting_docs_from(mut self, ancestor: &ReflectionProperty) -> Self {
        let own = self
            .types
            .entries()
            .filter(|entry| entry.source == TypeSource::Declared)
            .map(|entry| entry.ty.clone());
        let inherited = ancestor
            .types
            .clone()
            .with_source(TypeSource::InheritedDocComment);
        self.types = Types::from_types(own, TypeSource::Declared).merge(inherited);
        self.declaring_class = ancestor.declaring_class.clone();
        self
    }
}

impl CollectionItem for ReflectionProperty {
    fn key(&self) -> &str {
        &self.name
    }
}

impl ClassMember for ReflectionProperty {
    fn class(&self) -> &ClassName {
        &self.class
    }

    fn declaring_class(&self) -> &ClassName {
        &self.declaring_class
    }
}

#[derive(Debug, Clone)]
pub struct ReflectionConstant {
    pub(crate) name: String,
    pub(crate) class: ClassName,
    pub(crate) declaring_class: ClassName,
    pub(crate) visibility: Visibility,
    pub(crate) docblock: DocBlock,
    pub(crate) value: Option<Value>,
    pub(crate) types: Types,
    pub(crate) position: Position,
}

impl ReflectionConstant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn docblock(&self) -> &DocBlock {
        &self.docblock
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn ty(&self) -> Type {
        self.types.best().resolve_relative(&self.class)
    }

    pub fn inferred_types(&self) -> Types {
        self.types.clone().map(|ty| ty.resolve_relative(&self.class))
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn with_class(mut self, class: &ClassName) -> Self {
        self.class = class.clone();
        self
    }
}

impl CollectionItem for ReflectionConstant {
    fn key(&self) -> &str {
        &self.name
    }
}

impl ClassMember for ReflectionConstant {
    fn class(&self) -> &ClassName {
        &self.class
    }

    fn declaring_class(&self) -> &ClassName {
        &self.declaring_class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phpscope_api::RelativeKind;

    fn method(return_types: Types) -> ReflectionMethod {
        ReflectionMethod {
            name: "make".to_string(),
            class: ClassName::new("Child"),
            declaring_class: ClassName::new("Base"),
            visibility: Visibility::Public,
            is_static: true,
            is_abstract: false,
            docblock: DocBlock::empty(),
            return_type: Type::Relative(RelativeKind::Static),
            return_types,
            parameters: ReflectionCollection::new(),
            body: String::new(),
            position: Position::default(),
            source: None,
        }
    }

    #[test]
    fn test_relative_return_types_bind_to_lookup_class() {
        let method = method(Types::single(
            Type::Relative(RelativeKind::Static),
            TypeSource::Declared,
        ));
        assert_eq!(method.return_type(), Type::class("Child"));
        assert_eq!(method.inferred_return_types().best(), &Type::class("Child"));
        assert!(method.is_synthetic());
    }

    #[test]
    fn test_inheriting_docs_keeps_native_and_retags_ancestor() {
        let own = method(Types::single(Type::class("Native"), TypeSource::Declared));
        let mut ancestor = method(Types::single(Type::class("Doc"), TypeSource::DocComment));
        ancestor.declaring_class = ClassName::new("Ancestor");

        let merged = own.inheriting_docs_from(&ancestor);
        assert_eq!(merged.return_types.len(), 2);
        assert!(merged.return_types.has_source(TypeSource::InheritedDocComment));
        assert_eq!(merged.declaring_class(), &ClassName::new("Ancestor"));
    }

    #[test]
    fn test_visibility_keywords() {
        assert_eq!(Visibility::from_keyword("Private"), Some(Visibility::Private));
        assert_eq!(Visibility::from_keyword("var"), Some(Visibility::Public));
        assert_eq!(Visibility::from_keyword("static"), None);
    }
}
