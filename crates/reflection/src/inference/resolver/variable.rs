use super::SymbolContextResolver;
use crate::inference::frame::Frame;
use crate::parser::position_of;
use crate::parser::utils::{ancestor_of_kind, strip_sigil};
use phpscope_api::{Symbol, SymbolContext, SymbolKind};
use tree_sitter::Node;

impl<'a> SymbolContextResolver<'a> {
    pub(super) fn resolve_variable(&self, frame: &Frame, node: Node) -> SymbolContext {
        let name = strip_sigil(self.text(&node));

        if ancestor_of_kind(&node, &["property_declaration"]).is_some() {
            return self.resolve_declared_property(node, name);
        }

        match frame
            .locals()
            .by_name(name)
            .less_than_or_equal_to(node.start_byte())
            .last()
        {
            Some(assignment) => assignment.symbol_context().clone(),
            None => self
                .context(SymbolKind::Variable, name, &node)
                .with_issue(format!("Variable \"{}\" is undefined", name)),
        }
    }

    /// The variable in `private $foo;` names a property of the enclosing
    /// class rather than a local.
    fn resolve_declared_property(&self, node: Node, name: &str) -> SymbolContext {
        let info = SymbolContext::for_symbol(Symbol::new(
            SymbolKind::Property,
            name,
            position_of(&node),
        ));
        match self.class_type_of(&node) {
            Some(class) => self.members.property_type(&class, info, name),
            None => info.with_issue(format!(
                "Property \"{}\" is not declared inside a class",
                name
            )),
        }
    }
}
