use super::SymbolContextResolver;
use crate::inference::frame::Frame;
use crate::parser::utils::{has_child_of_kind, named_children};
use phpscope_api::{ArrayKey, ArrayValue, SymbolContext, SymbolKind, Type, Value};
use tree_sitter::Node;

impl<'a> SymbolContextResolver<'a> {
    pub(super) fn resolve_array(&self, frame: &Frame, node: Node) -> SymbolContext {
        let mut entries = ArrayValue::new();
        // None once a key hits i64::MAX; later positional entries are dropped.
        let mut next_index: Option<i64> = Some(0);

        for element in named_children(&node) {
            if element.kind() != "array_element_initializer" {
                continue;
            }
            let parts = named_children(&element);
            if parts.iter().any(|part| part.kind() == "variadic_unpacking") {
                continue;
            }

            if has_child_of_kind(&element, "=>") && parts.len() >= 2 {
                let key = self
                    .resolve(frame, parts[0])
                    .value()
                    .and_then(Value::to_array_key);
                let Some(key) = key else {
                    continue;
                };
                if let ArrayKey::Int(n) = key {
                    next_index = next_index.and_then(|next| {
                        if n < next { Some(next) } else { n.checked_add(1) }
                    });
                }
                entries.insert(key, self.resolve(frame, parts[1]));
            } else if let Some(value) = parts.last() {
                let Some(index) = next_index else {
                    continue;
                };
                entries.insert(ArrayKey::Int(index), self.resolve(frame, *value));
                next_index = index.checked_add(1);
            }
        }

        self.context(SymbolKind::Unknown, self.text(&node), &node)
            .with_type(Type::array())
            .with_value(Value::Array(entries))
    }

    /// Only literal keys into literal arrays are followed.
    pub(super) fn resolve_subscript(&self, frame: &Frame, node: Node) -> SymbolContext {
        let parts = named_children(&node);
        let Some(base) = parts.first() else {
            return self.unresolvable(node);
        };
        let info = self.resolve(frame, *base);

        let Some(index) = parts.get(1) else {
            return info.with_issue(format!(
                "Subscript expression \"{}\" is incomplete",
                self.text(&node)
            ));
        };

        if !info.ty().is_array() {
            let ty = info.ty().to_string();
            return info.with_issue(format!(
                "Not resolving subscript expression of type \"{}\"",
                ty
            ));
        }

        let Some(entries) = info.value().and_then(Value::as_array) else {
            let name = info.symbol().name.clone();
            return info.with_issue(format!(
                "Array value for symbol \"{}\" is not known",
                name
            ));
        };

        let Some(key) = self
            .resolve(frame, *index)
            .value()
            .and_then(Value::to_array_key)
        else {
            return info.clone().with_issue(format!(
                "Did not resolve access expression for node kind \"{}\"",
                index.kind()
            ));
        };

        match entries.get(&key) {
            Some(element) => element.clone(),
            None => SymbolContext::for_symbol(info.symbol().clone())
                .with_issue(format!("Array key \"{}\" is not defined", key)),
        }
    }

    /// `a ? b : c` assumes the condition holds; `a ?: c` yields `a`.
    pub(super) fn resolve_ternary(&self, frame: &Frame, node: Node) -> SymbolContext {
        for field in ["body", "condition"] {
            let Some(branch) = node.child_by_field_name(field) else {
                continue;
            };
            let context = self.resolve(frame, branch);
            if context.ty().is_defined() {
                return context;
            }
        }
        SymbolContext::none()
    }
}
