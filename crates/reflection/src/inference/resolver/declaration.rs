use super::SymbolContextResolver;
use phpscope_api::{SymbolContext, SymbolKind, Type, TypeSource};
use tree_sitter::Node;

impl<'a> SymbolContextResolver<'a> {
    pub(super) fn resolve_name(&self, node: Node) -> SymbolContext {
        let text = self.text(&node);
        let ty = self.bind_relative(self.names_at(&node).resolve_type(text), &node);
        self.context(SymbolKind::Class, text, &node).with_type(ty)
    }

    /// `self`, `static` and `parent` used as a scope.
    pub(super) fn resolve_relative_scope(&self, node: Node) -> SymbolContext {
        self.resolve_name(node)
    }

    pub(super) fn resolve_type_node(&self, node: Node) -> SymbolContext {
        let text = self.text(&node);
        let types = self
            .names_at(&node)
            .resolve_types(text, TypeSource::Declared)
            .map(|ty| self.bind_relative(ty, &node));
        self.context(SymbolKind::Class, text, &node).with_types(types)
    }

    pub(super) fn resolve_class_declaration(&self, node: Node) -> SymbolContext {
        let Some(name) = node.child_by_field_name("name") else {
            return self.unresolvable(node);
        };
        let context = self.context(SymbolKind::Class, self.text(&name), &name);
        match self.source.declared_name(&node) {
            Some(class) => context.with_type(Type::Class(class)),
            None => context,
        }
    }

    pub(super) fn resolve_method_declaration(&self, node: Node) -> SymbolContext {
        let Some(name) = node.child_by_field_name("name") else {
            return self.unresolvable(node);
        };
        self.member_declaration(SymbolKind::Method, name, &node)
    }

    pub(super) fn resolve_const_element(&self, node: Node) -> SymbolContext {
        let Some(name) = node.named_child(0) else {
            return self.unresolvable(node);
        };
        self.member_declaration(SymbolKind::Constant, name, &node)
    }

    fn member_declaration(&self, kind: SymbolKind, name: Node, node: &Node) -> SymbolContext {
        let context = self.context(kind, self.text(&name), &name);
        match self.class_type_of(node) {
            Some(class) => context.with_container_type(class),
            None => context,
        }
    }

    pub(super) fn resolve_closure(&self, node: Node) -> SymbolContext {
        self.context(SymbolKind::Unknown, "Closure", &node)
            .with_type(Type::class("Closure"))
    }
}
