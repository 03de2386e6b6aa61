use super::SymbolContextResolver;
use crate::inference::frame::Frame;
use crate::parser::utils::{named_children, strip_sigil};
use phpscope_api::{SymbolContext, SymbolKind, Type, Value};
use tree_sitter::Node;

impl<'a> SymbolContextResolver<'a> {
    /// Type of the object or scope a member is accessed on, with relative
    /// types bound to the surrounding class.
    fn owner_type(&self, frame: &Frame, owner: Option<Node>, node: &Node) -> Type {
        let Some(owner) = owner else {
            return Type::Unknown;
        };
        let ty = self.resolve(frame, owner).ty().clone();
        self.bind_relative(ty, node)
    }

    /// Member name of an instance access. `$foo->$bar` uses the string
    /// value of `$bar` when it is known and the `$bar` token otherwise.
    fn instance_member_name(&self, frame: &Frame, name: Option<Node>) -> Option<String> {
        let name = name?;
        if name.kind() == "variable_name" {
            if let Some(value) = self.resolve(frame, name).value().and_then(Value::as_str) {
                return Some(value.to_string());
            }
        }
        Some(self.text(&name).to_string())
    }

    pub(super) fn resolve_member_access(&self, frame: &Frame, node: Node) -> SymbolContext {
        let owner = self.owner_type(frame, node.child_by_field_name("object"), &node);
        let Some(name) = self.instance_member_name(frame, node.child_by_field_name("name")) else {
            return self.dynamic_member(node);
        };
        let info = self.context(SymbolKind::Property, name.as_str(), &node);
        self.members.property_type(&owner, info, &name)
    }

    pub(super) fn resolve_member_call(&self, frame: &Frame, node: Node) -> SymbolContext {
        let owner = self.owner_type(frame, node.child_by_field_name("object"), &node);
        let Some(name) = self.instance_member_name(frame, node.child_by_field_name("name")) else {
            return self.dynamic_member(node);
        };
        let info = self.context(SymbolKind::Method, name.as_str(), &node);
        self.members.method_type(&owner, info, &name)
    }

    pub(super) fn resolve_scoped_call(&self, frame: &Frame, node: Node) -> SymbolContext {
        let owner = self.owner_type(frame, node.child_by_field_name("scope"), &node);
        let Some(name) = node.child_by_field_name("name").map(|name| self.text(&name)) else {
            return self.dynamic_member(node);
        };
        let info = self.context(SymbolKind::Method, name, &node);
        self.members.method_type(&owner, info, name)
    }

    pub(super) fn resolve_static_property(&self, frame: &Frame, node: Node) -> SymbolContext {
        let owner = self.owner_type(frame, node.child_by_field_name("scope"), &node);
        let Some(name) = node
            .child_by_field_name("name")
            .map(|name| strip_sigil(self.text(&name)))
        else {
            return self.dynamic_member(node);
        };
        let info = self.context(SymbolKind::Property, name, &node);
        self.members.property_type(&owner, info, name)
    }

    pub(super) fn resolve_class_constant(&self, frame: &Frame, node: Node) -> SymbolContext {
        let parts = named_children(&node);
        let (Some(scope), Some(name)) = (parts.first(), parts.last()) else {
            return self.unresolvable(node);
        };
        let owner = self.owner_type(frame, Some(*scope), &node);
        let name = self.text(name);

        if name.eq_ignore_ascii_case("class") {
            let context = self
                .context(SymbolKind::Constant, name, &node)
                .with_type(Type::string());
            return match owner.class_name() {
                Some(class) => context.with_value(Value::string(class.full())),
                None => context,
            };
        }

        let info = self.context(SymbolKind::Constant, name, &node);
        self.members.constant_type(&owner, info, name)
    }

    /// A bare call resolves to whatever its callee resolves to, so `foo()`
    /// yields the class-like named `foo`.
    pub(super) fn resolve_function_call(&self, frame: &Frame, node: Node) -> SymbolContext {
        match node.child_by_field_name("function") {
            Some(function) => self.resolve(frame, function),
            None => self.unresolvable(node),
        }
    }

    pub(super) fn resolve_object_creation(&self, frame: &Frame, node: Node) -> SymbolContext {
        let designator = named_children(&node)
            .into_iter()
            .find(|child| child.kind() != "arguments");
        match designator {
            Some(designator) => self.resolve(frame, designator),
            None => self.unresolvable(node),
        }
    }

    fn dynamic_member(&self, node: Node) -> SymbolContext {
        SymbolContext::none().with_issue(format!(
            "Could not resolve member name of \"{}\"",
            self.text(&node)
        ))
    }
}
