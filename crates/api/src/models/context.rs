use super::symbol::{Position, Symbol};
use super::types::{Type, TypeSource, Types};
use super::value::Value;
use serde::Serialize;

/// Resolution result for one node.
///
/// Every `with_*` call returns a new context; nothing is changed in place, so
/// a context handed to a recursive resolution step stays valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SymbolContext {
    symbol: Symbol,
    types: Types,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_type: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Position>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
}

impl SymbolContext {
    pub fn for_symbol(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Self::default()
        }
    }

    /// Unknown symbol, no type evidence.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn types(&self) -> &Types {
        &self.types
    }

    /// Best guess among the collected types.
    pub fn ty(&self) -> &Type {
        self.types.best()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn container_type(&self) -> Option<&Type> {
        self.container_type.as_ref()
    }

    pub fn scope(&self) -> Option<Position> {
        self.scope
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn with_symbol(self, symbol: Symbol) -> Self {
        Self { symbol, ..self }
    }

    pub fn with_types(self, types: Types) -> Self {
        Self { types, ..self }
    }

    /// Replace all evidence with a single inferred type.
    pub fn with_type(self, ty: Type) -> Self {
        self.with_types(Types::single(ty, TypeSource::Inferred))
    }

    pub fn with_value(self, value: Value) -> Self {
        Self {
            value: Some(value),
            ..self
        }
    }

    pub fn with_container_type(self, container_type: Type) -> Self {
        Self {
            container_type: Some(container_type),
            ..self
        }
    }

    pub fn with_scope(self, scope: Position) -> Self {
        Self {
            scope: Some(scope),
            ..self
        }
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn with_issues(mut self, issues: impl IntoIterator<Item = String>) -> Self {
        self.issues.extend(issues);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::symbol::SymbolKind;

    #[test]
    fn test_none_is_unknown() {
        let context = SymbolContext::none();
        assert!(context.symbol().is_unknown());
        assert_eq!(context.ty(), &Type::unknown());
        assert!(context.types().is_empty());
        assert!(!context.has_issues());
    }

    #[test]
    fn test_transformations_leave_original_untouched() {
        let original = SymbolContext::for_symbol(Symbol::new(
            SymbolKind::Variable,
            "foo",
            Position::new(0, 4),
        ));
        let derived = original
            .clone()
            .with_type(Type::string())
            .with_value(Value::string("bar"))
            .with_issue("something");

        assert_eq!(original.ty(), &Type::unknown());
        assert!(original.value().is_none());
        assert_eq!(derived.ty(), &Type::string());
        assert_eq!(derived.value(), Some(&Value::string("bar")));
        assert_eq!(derived.issues(), ["something".to_string()]);
        assert_eq!(derived.symbol().name, "foo");
    }

    #[test]
    fn test_serialises_best_effort_shape() {
        let context = SymbolContext::none()
            .with_type(Type::class("Acme\\Post"))
            .with_scope(Position::new(3, 7));
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["types"][0]["type"], "Acme\\Post");
        assert_eq!(json["types"][0]["source"], "inferred");
        assert_eq!(json["scope"]["start"], 3);
        assert!(json.get("value").is_none());
    }
}
