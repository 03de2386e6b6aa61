//! Builds the [`Frame`] of the scope around a node.
//!
//! Statements are walked in source order. Every assignment resolves its
//! right-hand side against the frame as built so far, so a later read of the
//! same variable sees the binding with the highest offset at or before it.

use super::frame::{Assignment, Frame};
use super::resolver::SymbolContextResolver;
use crate::docblock::{DefaultDocBlockParser, DocBlock, DocBlockParser};
use crate::parser::naming::NameResolver;
use crate::parser::utils::{
    PARAMETER_KINDS, children, doc_comment, enclosing_class_like, enclosing_scope,
    first_child_of_kind, has_child_of_kind, is_class_like, is_closure, is_scope,
    named_children, strip_sigil,
};
use crate::parser::{ParsedSource, position_of};
use crate::reflector::ClassReflector;
use phpscope_api::{
    ArrayKey, ClassName, Symbol, SymbolContext, SymbolKind, Type, TypeSource, Types, Value,
};
use tracing::debug;
use tree_sitter::Node;

static DEFAULT_DOCBLOCKS: DefaultDocBlockParser = DefaultDocBlockParser;

pub struct FrameBuilder<'a> {
    resolver: SymbolContextResolver<'a>,
    docblocks: &'a dyn DocBlockParser,
    this_class: Option<ClassName>,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(reflector: &'a dyn ClassReflector, source: &'a ParsedSource) -> Self {
        Self {
            resolver: SymbolContextResolver::new(reflector, source),
            docblocks: &DEFAULT_DOCBLOCKS,
            this_class: None,
        }
    }

    pub fn with_docblock_parser(mut self, docblocks: &'a dyn DocBlockParser) -> Self {
        self.docblocks = docblocks;
        self
    }

    /// Bind `$this` in method scopes to `class` instead of the declaring
    /// class, e.g. when a method is reached through a subclass.
    pub fn with_this_class(mut self, class: ClassName) -> Self {
        self.this_class = Some(class);
        self
    }

    pub fn resolver(&self) -> &SymbolContextResolver<'a> {
        &self.resolver
    }

    /// Frame of the innermost scope containing `node`.
    pub fn build(&self, node: Node) -> Frame {
        self.build_scope(enclosing_scope(&node))
    }

    fn build_scope(&self, scope: Node) -> Frame {
        debug!(kind = scope.kind(), start = scope.start_byte(), "Building frame");
        let mut frame = Frame::new();

        match scope.kind() {
            "method_declaration" => {
                self.bind_this(&mut frame, &scope);
                self.bind_parameters(&mut frame, &scope);
            }
            "function_definition" => self.bind_parameters(&mut frame, &scope),
            "arrow_function" => {
                self.inherit_locals(&mut frame, &scope);
                self.bind_parameters(&mut frame, &scope);
            }
            kind if is_closure(kind) => {
                self.capture(&mut frame, &scope);
                self.bind_parameters(&mut frame, &scope);
            }
            _ => {
                for statement in named_children(&scope) {
                    self.walk(&mut frame, statement);
                }
                return frame;
            }
        }

        if let Some(body) = scope.child_by_field_name("body") {
            self.walk(&mut frame, body);
        }
        frame
    }

    fn source(&self) -> &'a ParsedSource {
        self.resolver.source()
    }

    fn text(&self, node: &Node) -> &'a str {
        self.source().node_text(node)
    }

    fn variable(&self, name: &str, node: &Node) -> SymbolContext {
        SymbolContext::for_symbol(Symbol::new(SymbolKind::Variable, name, position_of(node)))
    }

    fn docblock_for(&self, node: &Node) -> DocBlock {
        doc_comment(node, self.source().text())
            .map(|raw| self.docblocks.parse(raw))
            .unwrap_or_default()
    }

    fn doc_types(&self, token: &str, node: &Node) -> Types {
        NameResolver::for_node(self.source().file_context(), node, self.source().text())
            .resolve_types(token, TypeSource::DocComment)
    }

    fn bind_this(&self, frame: &mut Frame, method: &Node) {
        let class = self
            .this_class
            .clone()
            .or_else(|| {
                enclosing_class_like(method).and_then(|class| self.source().declared_name(&class))
            });
        let Some(class) = class else {
            return;
        };
        let context = self.variable("this", method).with_types(Types::single(
            Type::Class(class),
            TypeSource::Inferred,
        ));
        frame
            .locals_mut()
            .add(Assignment::new("this", method.start_byte(), context));
    }

    fn bind_parameters(&self, frame: &mut Frame, scope: &Node) {
        let Some(parameters) = scope.child_by_field_name("parameters") else {
            return;
        };
        for parameter in named_children(&parameters) {
            if !PARAMETER_KINDS.contains(&parameter.kind()) {
                continue;
            }
            let Some(name) = parameter.child_by_field_name("name") else {
                continue;
            };
            let name = strip_sigil(self.text(&name));
            let context = self.resolver.resolve(frame, parameter);
            frame
                .locals_mut()
                .add(Assignment::new(name, parameter.start_byte(), context));
        }
    }

    /// Closures see `$this` (unless static) and their `use` variables as
    /// they were when the closure was created; nothing else leaks in.
    fn capture(&self, frame: &mut Frame, closure: &Node) {
        let Some(parent) = closure.parent() else {
            return;
        };
        let outer = self.build_scope(enclosing_scope(&parent));
        let offset = closure.start_byte();

        if !has_child_of_kind(closure, "static_modifier") {
            if let Some(this) = outer
                .locals()
                .by_name("this")
                .less_than_or_equal_to(offset)
                .last()
            {
                frame
                    .locals_mut()
                    .add(Assignment::new("this", offset, this.symbol_context().clone()));
            }
        }

        let Some(uses) = first_child_of_kind(closure, "anonymous_function_use_clause") else {
            return;
        };
        for used in named_children(&uses) {
            let variable = if used.kind() == "by_ref" {
                used.named_child(0).unwrap_or(used)
            } else {
                used
            };
            let name = strip_sigil(self.text(&variable));
            let context = outer
                .locals()
                .by_name(name)
                .less_than_or_equal_to(offset)
                .last()
                .map(|captured| captured.symbol_context().clone())
                .unwrap_or_else(|| self.variable(name, &variable));
            frame
                .locals_mut()
                .add(Assignment::new(name, offset, context));
        }
    }

    /// Arrow functions capture the whole enclosing scope by value.
    fn inherit_locals(&self, frame: &mut Frame, arrow: &Node) {
        let Some(parent) = arrow.parent() else {
            return;
        };
        let outer = self.build_scope(enclosing_scope(&parent));
        for assignment in outer.locals().less_than_or_equal_to(arrow.start_byte()).iter() {
            frame.locals_mut().add(assignment.clone());
        }
    }

    fn walk(&self, frame: &mut Frame, node: Node) {
        let kind = node.kind();
        if is_scope(kind) || is_class_like(kind) || kind == "anonymous_class" {
            return;
        }

        match kind {
            "assignment_expression" | "reference_assignment_expression" => {
                self.walk_assignment(frame, node);
                return;
            }
            "foreach_statement" => {
                self.walk_foreach(frame, node);
                return;
            }
            "catch_clause" => self.bind_catch(frame, &node),
            "expression_statement" => self.bind_inline_vars(frame, &node),
            _ => {}
        }

        for child in named_children(&node) {
            self.walk(frame, child);
        }
    }

    fn walk_assignment(&self, frame: &mut Frame, node: Node) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };

        self.walk(frame, right);
        let value = self.resolver.resolve(frame, right);
        let value = self.apply_inline_var(value, &left, &node);
        self.assign(frame, left, value, node.start_byte());
    }

    /// `/** @var Foo $foo */ $foo = ...;` adds doc evidence to the binding.
    fn apply_inline_var(&self, value: SymbolContext, target: &Node, assignment: &Node) -> SymbolContext {
        if target.kind() != "variable_name" {
            return value;
        }
        let Some(statement) = assignment
            .parent()
            .filter(|parent| parent.kind() == "expression_statement")
        else {
            return value;
        };
        let docblock = self.docblock_for(&statement);
        let name = strip_sigil(self.text(target));
        match docblock.var_type_for(Some(name)) {
            Some(token) => {
                let doc = self.doc_types(token, &statement);
                let types = value.types().clone().refine_with(doc, TypeSource::DocComment);
                value.with_types(types)
            }
            None => value,
        }
    }

    fn assign(&self, frame: &mut Frame, target: Node, value: SymbolContext, offset: usize) {
        match target.kind() {
            "variable_name" => {
                let name = strip_sigil(self.text(&target));
                let context = value.with_symbol(Symbol::new(
                    SymbolKind::Variable,
                    name,
                    position_of(&target),
                ));
                frame
                    .locals_mut()
                    .add(Assignment::new(name, offset, context));
            }
            "member_access_expression" => {
                let Some(name) = self.this_property(frame, &target) else {
                    return;
                };
                let context = value.with_symbol(Symbol::new(
                    SymbolKind::Property,
                    name.as_str(),
                    position_of(&target),
                ));
                frame
                    .properties_mut()
                    .add(Assignment::new(name, offset, context));
            }
            "subscript_expression" => {
                // `$this->items[] = $x` makes the property an array.
                let Some(base) = target.named_child(0) else {
                    return;
                };
                if base.kind() != "member_access_expression" {
                    return;
                }
                let Some(name) = self.this_property(frame, &base) else {
                    return;
                };
                let mut context = SymbolContext::for_symbol(Symbol::new(
                    SymbolKind::Property,
                    name.as_str(),
                    position_of(&base),
                ))
                .with_type(Type::array());
                if let Some(element) = value.value() {
                    context = context.with_value(element.clone());
                }
                frame
                    .properties_mut()
                    .add(Assignment::new(name, offset, context));
            }
            "list_literal" | "array_creation_expression" => {
                self.destructure(frame, target, value, offset)
            }
            _ => {}
        }
    }

    /// Property name of `$this->name` or `$this->$var`.
    fn this_property(&self, frame: &Frame, access: &Node) -> Option<String> {
        let object = access.child_by_field_name("object")?;
        if self.text(&object) != "$this" {
            return None;
        }
        let name = access.child_by_field_name("name")?;
        if name.kind() == "variable_name" {
            return self
                .resolver
                .resolve(frame, name)
                .value()
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        Some(self.text(&name).to_string())
    }

    /// `list($a, 'k' => $b) = ...` and `[$a, [$b]] = ...`.
    fn destructure(&self, frame: &mut Frame, pattern: Node, value: SymbolContext, offset: usize) {
        let entries = value.value().and_then(Value::as_array);

        for (index, slot) in self.destructuring_slots(&pattern).into_iter().enumerate() {
            let (key, target) = match slot.iter().position(|node| node.kind() == "=>") {
                Some(arrow) => {
                    let key = slot[..arrow].iter().find(|node| node.is_named());
                    let target = slot[arrow + 1..].iter().find(|node| node.is_named());
                    let key = key.and_then(|key| {
                        self.resolver
                            .resolve(frame, *key)
                            .value()
                            .and_then(Value::to_array_key)
                    });
                    (key, target.copied())
                }
                None => (
                    i64::try_from(index).ok().map(ArrayKey::Int),
                    slot.iter().rev().find(|node| node.is_named()).copied(),
                ),
            };
            let Some(target) = target else {
                continue;
            };
            let target = if target.kind() == "by_ref" {
                target.named_child(0).unwrap_or(target)
            } else {
                target
            };

            let element = key
                .and_then(|key| entries.and_then(|entries| entries.get(&key)))
                .cloned()
                .unwrap_or_default();
            self.assign(frame, target, element, offset);
        }
    }

    /// Children of a destructuring pattern split on commas; element
    /// wrappers are flattened so keyed and positional slots look alike.
    fn destructuring_slots<'t>(&self, pattern: &Node<'t>) -> Vec<Vec<Node<'t>>> {
        let mut slots = vec![Vec::new()];
        for child in children(pattern) {
            match child.kind() {
                "," => slots.push(Vec::new()),
                "list" | "(" | ")" | "[" | "]" => {}
                "array_element_initializer" => {
                    if let Some(slot) = slots.last_mut() {
                        slot.extend(children(&child));
                    }
                }
                _ => {
                    if let Some(slot) = slots.last_mut() {
                        slot.push(child);
                    }
                }
            }
        }
        if slots.last().is_some_and(Vec::is_empty) {
            slots.pop();
        }
        slots
    }

    fn walk_foreach(&self, frame: &mut Frame, node: Node) {
        let parts = named_children(&node);
        let (Some(iterable), Some(binding)) = (parts.first(), parts.get(1)) else {
            return;
        };

        self.walk(frame, *iterable);
        let collection = self.resolver.resolve(frame, *iterable);

        let (key, value) = if binding.kind() == "pair" {
            let pair = named_children(binding);
            (pair.first().copied(), pair.get(1).copied())
        } else {
            (None, Some(*binding))
        };

        if let Some(key) = key.filter(|key| key.kind() == "variable_name") {
            let name = strip_sigil(self.text(&key));
            frame
                .locals_mut()
                .add(Assignment::new(name, key.start_byte(), self.variable(name, &key)));
        }

        if let Some(value) = value {
            let value = if value.kind() == "by_ref" {
                value.named_child(0).unwrap_or(value)
            } else {
                value
            };
            self.bind_foreach_value(frame, &node, value, &collection);
        }

        for body in parts.iter().skip(2) {
            self.walk(frame, *body);
        }
    }

    fn bind_foreach_value(
        &self,
        frame: &mut Frame,
        foreach: &Node,
        value: Node,
        collection: &SymbolContext,
    ) {
        let element = collection.ty().array_type().cloned();

        if value.kind() != "variable_name" {
            let context = match element {
                Some(ty) => SymbolContext::none().with_type(ty),
                None => SymbolContext::none(),
            };
            self.assign(frame, value, context, value.start_byte());
            return;
        }

        let name = strip_sigil(self.text(&value));
        let docblock = self.docblock_for(foreach);
        let types = match docblock.var_type_for(Some(name)) {
            Some(token) => self.doc_types(token, foreach),
            None => element
                .map(|ty| Types::single(ty, TypeSource::Inferred))
                .unwrap_or_default(),
        };
        let context = self.variable(name, &value).with_types(types);
        frame
            .locals_mut()
            .add(Assignment::new(name, value.start_byte(), context));
    }

    fn bind_catch(&self, frame: &mut Frame, node: &Node) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let types = node
            .child_by_field_name("type")
            .map(|ty| {
                NameResolver::for_node(self.source().file_context(), node, self.source().text())
                    .resolve_types(self.text(&ty), TypeSource::Declared)
            })
            .unwrap_or_default();
        let variable = strip_sigil(self.text(&name));
        frame.locals_mut().add(Assignment::new(
            variable,
            name.start_byte(),
            self.variable(variable, &name).with_types(types),
        ));
    }

    /// Named `@var` tags on a statement that does not assign the variable
    /// itself, e.g. `/** @var Foo $foo */ $foo->bar();`.
    fn bind_inline_vars(&self, frame: &mut Frame, statement: &Node) {
        let docblock = self.docblock_for(statement);
        if docblock.vars().is_empty() {
            return;
        }

        let assigned = statement
            .named_child(0)
            .filter(|expression| {
                matches!(
                    expression.kind(),
                    "assignment_expression" | "reference_assignment_expression"
                )
            })
            .and_then(|expression| expression.child_by_field_name("left"))
            .filter(|left| left.kind() == "variable_name")
            .map(|left| strip_sigil(self.text(&left)));

        for tag in docblock.vars() {
            let Some(name) = tag.name.as_deref() else {
                continue;
            };
            if assigned == Some(name) {
                continue;
            }
            let context = self
                .variable(name, statement)
                .with_types(self.doc_types(&tag.ty, statement));
            frame
                .locals_mut()
                .add(Assignment::new(name, statement.start_byte(), context));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflector::NoOpReflector;

    fn frame_at(code: &str, marker: &str) -> Frame {
        let parsed = ParsedSource::from_text(code).unwrap();
        let offset = code.find(marker).unwrap();
        let node = parsed
            .root_node()
            .named_descendant_for_byte_range(offset, offset)
            .unwrap();
        FrameBuilder::new(&NoOpReflector, &parsed).build(node)
    }

    #[test]
    fn test_reassignments_are_kept_in_order() {
        let frame = frame_at("<?php\n$a = 1;\n$a = 'two';\necho $a;", "echo");
        let values: Vec<String> = frame
            .locals()
            .by_name("a")
            .iter()
            .map(|a| a.symbol_context().value().unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["1", "\"two\""]);
    }

    #[test]
    fn test_catch_binds_exception_variable() {
        let frame = frame_at(
            "<?php\nnamespace App;\ntry { run(); } catch (Failure $e) { echo 1; }",
            "echo",
        );
        let error = frame.locals().by_name("e").last().unwrap();
        assert_eq!(error.symbol_context().ty(), &Type::class("App\\Failure"));
    }

    #[test]
    fn test_keyed_destructuring() {
        let frame = frame_at(
            "<?php\n['a' => $x, 'b' => $y] = ['a' => 1, 'b' => 'two'];\necho 1;",
            "echo",
        );
        assert_eq!(
            frame.locals().by_name("y").last().unwrap().symbol_context().value(),
            Some(&Value::string("two"))
        );
        assert_eq!(
            frame.locals().by_name("x").last().unwrap().symbol_context().ty(),
            &Type::int()
        );
    }

    #[test]
    fn test_arrow_function_sees_enclosing_locals() {
        let frame = frame_at("<?php\n$a = 'x';\narray_map(fn($b) => $a . $b, []);", "$a . $b");
        let names: Vec<&str> = frame.locals().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
