//! Node to [`SymbolContext`] resolution.
//!
//! Dispatch is a closed match on the tree-sitter node kind; each family of
//! kinds lives in its own file as an `impl` block on
//! [`SymbolContextResolver`]. Resolution never fails: anything it cannot
//! make sense of degrades to an unknown context carrying an issue.

mod array;
mod declaration;
mod literal;
mod member;
mod parameter;
mod variable;

use crate::inference::frame::Frame;
use crate::inference::member_type::MemberTypeResolver;
use crate::parser::naming::NameResolver;
use crate::parser::utils::enclosing_class_like;
use crate::parser::{ParsedSource, position_of};
use crate::reflector::ClassReflector;
use phpscope_api::{ClassName, Symbol, SymbolContext, SymbolKind, Type};
use tracing::debug;
use tree_sitter::Node;

pub struct SymbolContextResolver<'a> {
    reflector: &'a dyn ClassReflector,
    source: &'a ParsedSource,
    members: MemberTypeResolver<'a>,
}

impl<'a> SymbolContextResolver<'a> {
    pub fn new(reflector: &'a dyn ClassReflector, source: &'a ParsedSource) -> Self {
        Self {
            reflector,
            source,
            members: MemberTypeResolver::new(reflector),
        }
    }

    pub fn reflector(&self) -> &'a dyn ClassReflector {
        self.reflector
    }

    pub fn source(&self) -> &'a ParsedSource {
        self.source
    }

    /// Resolve `node` against `frame`. The result's scope is always the
    /// node's byte range.
    pub fn resolve(&self, frame: &Frame, node: Node) -> SymbolContext {
        debug!(kind = node.kind(), start = node.start_byte(), "Resolving node");
        self.resolve_kind(frame, node).with_scope(position_of(&node))
    }

    fn resolve_kind(&self, frame: &Frame, node: Node) -> SymbolContext {
        match node.kind() {
            "name" | "qualified_name" => self.resolve_name(node),
            "relative_scope" => self.resolve_relative_scope(node),
            "named_type" | "primitive_type" | "optional_type" | "union_type"
            | "intersection_type" | "type_list" => self.resolve_type_node(node),
            "variable_name" => self.resolve_variable(frame, node),
            "member_access_expression" | "nullsafe_member_access_expression" => {
                self.resolve_member_access(frame, node)
            }
            "member_call_expression" | "nullsafe_member_call_expression" => {
                self.resolve_member_call(frame, node)
            }
            "scoped_call_expression" => self.resolve_scoped_call(frame, node),
            "class_constant_access_expression" => self.resolve_class_constant(frame, node),
            "scoped_property_access_expression" => self.resolve_static_property(frame, node),
            "function_call_expression" => self.resolve_function_call(frame, node),
            "object_creation_expression" => self.resolve_object_creation(frame, node),
            "string" | "encapsed_string" => self.resolve_string(node),
            "heredoc" | "nowdoc" => self.resolve_heredoc(node),
            "integer" | "float" => self.resolve_number(node),
            "boolean" | "null" | "reserved_identifier" => self.resolve_reserved_word(node),
            "array_creation_expression" => self.resolve_array(frame, node),
            "subscript_expression" => self.resolve_subscript(frame, node),
            "conditional_expression" => self.resolve_ternary(frame, node),
            "simple_parameter" | "variadic_parameter" | "property_promotion_parameter" => {
                self.resolve_parameter(frame, node)
            }
            "class_declaration" | "interface_declaration" | "trait_declaration"
            | "enum_declaration" => self.resolve_class_declaration(node),
            "method_declaration" => self.resolve_method_declaration(node),
            "const_element" => self.resolve_const_element(node),
            "argument" | "parenthesized_expression" | "clone_expression" => {
                match node.named_child(node.named_child_count().saturating_sub(1) as u32) {
                    Some(inner) => self.resolve(frame, inner),
                    None => self.unresolvable(node),
                }
            }
            "assignment_expression" | "reference_assignment_expression" => {
                match node.child_by_field_name("right") {
                    Some(right) => self.resolve(frame, right),
                    None => self.unresolvable(node),
                }
            }
            "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function" => {
                self.resolve_closure(node)
            }
            "cast_expression" => self.resolve_cast(frame, node),
            _ => self.unresolvable(node),
        }
    }

    fn unresolvable(&self, node: Node) -> SymbolContext {
        SymbolContext::none().with_issue(format!(
            "Did not know how to resolve node of kind \"{}\" with text \"{}\"",
            node.kind(),
            self.text(&node)
        ))
    }

    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source.text().as_bytes()).unwrap_or("")
    }

    fn names_at(&self, node: &Node) -> NameResolver<'a> {
        NameResolver::for_node(self.source.file_context(), node, self.source.text())
    }

    fn context(&self, kind: SymbolKind, name: impl Into<String>, node: &Node) -> SymbolContext {
        SymbolContext::for_symbol(Symbol::new(kind, name, position_of(node)))
    }

    /// Name of the class-like declaration around `node`.
    fn enclosing_class(&self, node: &Node) -> Option<ClassName> {
        enclosing_class_like(node).and_then(|class| self.source.declared_name(&class))
    }

    fn class_type_of(&self, node: &Node) -> Option<Type> {
        self.enclosing_class(node).map(Type::Class)
    }

    /// Bind `self`/`static`/`$this` to the class around `node`, if any.
    fn bind_relative(&self, ty: Type, node: &Node) -> Type {
        match self.enclosing_class(node) {
            Some(class) => ty.resolve_relative(&class),
            None => ty,
        }
    }
}
