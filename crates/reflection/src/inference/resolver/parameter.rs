use super::SymbolContextResolver;
use crate::inference::frame::Frame;
use crate::parser::utils::{ancestor_of_kind, strip_sigil, SCOPE_KINDS};
use phpscope_api::{SymbolContext, SymbolKind, Type, TypeSource, Types};
use tracing::debug;
use tree_sitter::Node;

impl<'a> SymbolContextResolver<'a> {
    /// Method parameters come from the reflected method so inherited doc
    /// types apply; anything else is read off the syntax.
    pub(super) fn resolve_parameter(&self, frame: &Frame, node: Node) -> SymbolContext {
        let name_node = node.child_by_field_name("name");
        let name = name_node
            .map(|name| strip_sigil(self.text(&name)))
            .unwrap_or("");

        if let Some(method) = ancestor_of_kind(&node, SCOPE_KINDS)
            .filter(|scope| scope.kind() == "method_declaration")
        {
            if let Some(context) = self.reflected_parameter(method, name, &node) {
                return context;
            }
        }

        let mut types = node
            .child_by_field_name("type")
            .map(|ty| {
                self.names_at(&node)
                    .resolve_types(self.text(&ty), TypeSource::Declared)
                    .map(|ty| self.bind_relative(ty, &node))
            })
            .unwrap_or_default();
        if node.kind() == "variadic_parameter" {
            types = types.map(Type::array_of);
        }

        let context = self
            .context(SymbolKind::Variable, name, &name_node.unwrap_or(node))
            .with_types(types);
        match node
            .child_by_field_name("default_value")
            .and_then(|default| self.resolve(frame, default).value().cloned())
        {
            Some(value) => context.with_value(value),
            None => context,
        }
    }

    fn reflected_parameter(
        &self,
        method_node: Node,
        name: &str,
        node: &Node,
    ) -> Option<SymbolContext> {
        let class = self.enclosing_class(&method_node)?;
        let method_name = self.text(&method_node.child_by_field_name("name")?);

        let reflected = match self.reflector.reflect_class_like(&class) {
            Ok(reflected) => reflected,
            Err(e) => {
                debug!("Falling back to syntactic parameter for {}: {}", class, e);
                return None;
            }
        };
        let method = reflected.methods().get(method_name)?;

        let Some(parameter) = method.parameters().get(name) else {
            return Some(SymbolContext::none().with_issue(format!(
                "Cannot find parameter \"{}\" for method \"{}\" in class \"{}\"",
                name, method_name, class
            )));
        };

        let types: Types = parameter
            .inferred_types()
            .clone()
            .map(|ty| ty.resolve_relative(reflected.name()));
        let context = self
            .context(SymbolKind::Variable, name, node)
            .with_types(types);
        Some(match parameter.default_value() {
            Some(value) => context.with_value(value.clone()),
            None => context,
        })
    }
}
