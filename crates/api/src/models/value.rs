use super::context::SymbolContext;
use super::types::Type;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Array literal contents: each element keeps its resolved context so a
/// later subscript can hand it back unchanged.
pub type ArrayValue = IndexMap<ArrayKey, SymbolContext>;

/// Key of an array literal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    String(String),
}

impl ArrayKey {
    /// Decimal integer strings become integer keys, as the runtime does.
    pub fn from_string(key: impl Into<String>) -> Self {
        let key = key.into();
        if is_canonical_int(&key) {
            if let Ok(n) = key.parse::<i64>() {
                return ArrayKey::Int(n);
            }
        }
        ArrayKey::String(key)
    }
}

fn is_canonical_int(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && key != "-0"
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(n) => write!(f, "{}", n),
            ArrayKey::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ArrayKey {
    fn from(value: i64) -> Self {
        ArrayKey::Int(value)
    }
}

impl From<&str> for ArrayKey {
    fn from(value: &str) -> Self {
        ArrayKey::from_string(value)
    }
}

/// A literal value known at analysis time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(ArrayValue),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// The type a value of this shape has.
    pub fn infer_type(&self) -> Type {
        match self {
            Value::Null => Type::null(),
            Value::Bool(_) => Type::bool(),
            Value::Int(_) => Type::int(),
            Value::Float(_) => Type::float(),
            Value::String(_) => Type::string(),
            Value::Array(_) => Type::array(),
        }
    }

    /// Coerce a scalar into an array key; arrays cannot be keys.
    pub fn to_array_key(&self) -> Option<ArrayKey> {
        match self {
            Value::Null => Some(ArrayKey::String(String::new())),
            Value::Bool(b) => Some(ArrayKey::Int(i64::from(*b))),
            Value::Int(n) => Some(ArrayKey::Int(*n)),
            Value::Float(f) => Some(ArrayKey::Int(f.trunc() as i64)),
            Value::String(s) => Some(ArrayKey::from_string(s.clone())),
            Value::Array(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(entries) => Some(entries),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(entries) => {
                f.write_str("[")?;
                for (i, (key, context)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match context.value() {
                        Some(value) => write!(f, "{} => {}", key, value)?,
                        None => write!(f, "{} => {}", key, context.ty())?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, context) in entries {
                    map.serialize_entry(&key.to_string(), &context.value())?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_string_keys_are_normalised() {
        assert_eq!(ArrayKey::from_string("1"), ArrayKey::Int(1));
        assert_eq!(ArrayKey::from_string("-3"), ArrayKey::Int(-3));
        assert_eq!(ArrayKey::from_string("01"), ArrayKey::String("01".into()));
        assert_eq!(ArrayKey::from_string("foo"), ArrayKey::String("foo".into()));
    }

    #[test]
    fn test_scalar_key_coercion() {
        assert_eq!(Value::Bool(true).to_array_key(), Some(ArrayKey::Int(1)));
        assert_eq!(Value::Float(2.7).to_array_key(), Some(ArrayKey::Int(2)));
        assert_eq!(Value::Array(ArrayValue::new()).to_array_key(), None);
    }

    #[test]
    fn test_array_serialises_element_values() {
        let mut entries = ArrayValue::new();
        entries.insert(
            ArrayKey::from("foo"),
            SymbolContext::none().with_value(Value::string("bar")),
        );
        let json = serde_json::to_string(&Value::Array(entries)).unwrap();
        assert_eq!(json, r#"{"foo":"bar"}"#);
    }
}
