use super::SymbolContextResolver;
use crate::inference::frame::Frame;
use crate::parser::utils::string_contents;
use phpscope_api::{ScalarKind, SymbolContext, SymbolKind, Type, Value};
use tree_sitter::Node;

impl<'a> SymbolContextResolver<'a> {
    /// Literal results carry the enclosing class as their container.
    fn literal(&self, context: SymbolContext, node: &Node) -> SymbolContext {
        match self.class_type_of(node) {
            Some(class) => context.with_container_type(class),
            None => context,
        }
    }

    pub(super) fn resolve_string(&self, node: Node) -> SymbolContext {
        let text = self.text(&node);
        let contents = string_contents(text).unwrap_or_else(|| {
            text.trim_matches(|c| c == '"' || c == '\'').to_string()
        });
        let context = self
            .context(SymbolKind::String, contents.clone(), &node)
            .with_type(Type::string())
            .with_value(Value::String(contents));
        self.literal(context, &node)
    }

    pub(super) fn resolve_heredoc(&self, node: Node) -> SymbolContext {
        let context = self
            .context(SymbolKind::String, self.text(&node), &node)
            .with_type(Type::string());
        self.literal(context, &node)
    }

    pub(super) fn resolve_number(&self, node: Node) -> SymbolContext {
        let text = self.text(&node);
        let value = parse_number(text);
        let context = self
            .context(SymbolKind::Number, text, &node)
            .with_type(value.infer_type())
            .with_value(value);
        self.literal(context, &node)
    }

    pub(super) fn resolve_reserved_word(&self, node: Node) -> SymbolContext {
        let text = self.text(&node);
        let value = match text.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => {
                return self
                    .context(SymbolKind::Unknown, text, &node)
                    .with_issue(format!("Could not resolve reserved word \"{}\"", text));
            }
        };
        let context = self
            .context(SymbolKind::Boolean, text, &node)
            .with_type(value.infer_type())
            .with_value(value);
        self.literal(context, &node)
    }

    pub(super) fn resolve_cast(&self, frame: &Frame, node: Node) -> SymbolContext {
        let cast = node
            .child_by_field_name("type")
            .map(|ty| self.text(&ty))
            .unwrap_or("")
            .trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())
            .to_ascii_lowercase();

        let ty = match cast.as_str() {
            "array" => Type::array(),
            "unset" => Type::null(),
            "binary" => Type::string(),
            "real" => Type::float(),
            other => ScalarKind::from_name(other)
                .map(Type::Scalar)
                .unwrap_or_default(),
        };

        let inner = node
            .child_by_field_name("value")
            .map(|value| self.resolve(frame, value))
            .unwrap_or_default();

        SymbolContext::for_symbol(inner.symbol().clone()).with_type(ty)
    }
}

/// Integer literals in any base; anything with a fraction or exponent (or
/// too large for an integer) is a float.
pub(crate) fn parse_number(text: &str) -> Value {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    let radix = if lower.starts_with("0x") {
        Some((16, &digits[2..]))
    } else if lower.starts_with("0b") {
        Some((2, &digits[2..]))
    } else if lower.starts_with("0o") {
        Some((8, &digits[2..]))
    } else if lower.len() > 1 && lower.starts_with('0') && lower.chars().all(|c| c.is_ascii_digit()) {
        Some((8, &digits[1..]))
    } else {
        None
    };

    if let Some((radix, body)) = radix {
        return match i64::from_str_radix(body, radix) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(u64::from_str_radix(body, radix).map(|n| n as f64).unwrap_or(0.0)),
        };
    }

    if lower.contains(['.', 'e']) {
        return Value::Float(lower.parse().unwrap_or(0.0));
    }

    match lower.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::Float(lower.parse().unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Value::Int(42));
        assert_eq!(parse_number("1_000"), Value::Int(1000));
        assert_eq!(parse_number("0x1A"), Value::Int(26));
        assert_eq!(parse_number("0b101"), Value::Int(5));
        assert_eq!(parse_number("017"), Value::Int(15));
        assert_eq!(parse_number("0o17"), Value::Int(15));
        assert_eq!(parse_number("1.5"), Value::Float(1.5));
        assert_eq!(parse_number("1e3"), Value::Float(1000.0));
        assert_eq!(parse_number("0"), Value::Int(0));
    }
}
