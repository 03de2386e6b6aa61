use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range of a node in its source text.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Property,
    Method,
    Class,
    Constant,
    String,
    Number,
    Boolean,
    #[default]
    Unknown,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Property => "property",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Constant => "constant",
            SymbolKind::String => "string",
            SymbolKind::Number => "number",
            SymbolKind::Boolean => "boolean",
            SymbolKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, positioned thing in source. Identity is by value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    pub position: Position,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == SymbolKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_contains_is_inclusive() {
        let position = Position::new(10, 20);
        assert!(position.contains(10));
        assert!(position.contains(20));
        assert!(!position.contains(21));
        assert_eq!(position.len(), 10);
    }

    #[test]
    fn test_symbol_value_identity() {
        let a = Symbol::new(SymbolKind::Variable, "foo", Position::new(1, 4));
        let b = Symbol::new(SymbolKind::Variable, "foo", Position::new(1, 4));
        assert_eq!(a, b);
        assert!(Symbol::unknown().is_unknown());
    }
}
