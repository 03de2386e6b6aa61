//! Own members of one class-like declaration, before any inheritance.

use super::ClassKind;
use super::collection::ReflectionCollection;
use super::member::{
    ReflectionConstant, ReflectionMethod, ReflectionParameter, ReflectionProperty, Visibility,
};
use crate::docblock::{DocBlock, DocBlockParser};
use crate::inference::frame::Frame;
use crate::inference::resolver::SymbolContextResolver;
use crate::parser::naming::NameResolver;
use crate::parser::utils::{
    PARAMETER_KINDS, children, doc_comment, first_child_of_kind, has_child_of_kind,
    named_children, strip_sigil,
};
use crate::parser::{ParsedSource, position_of};
use crate::reflector::NoOpReflector;
use phpscope_api::{ClassName, Position, SymbolContext, Type, TypeSource, Types};
use std::sync::Arc;
use tracing::{debug, warn};
use tree_sitter::Node;

/// Everything a class-like declares itself, with types already resolved
/// against the file's namespace and imports.
#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub(crate) name: ClassName,
    pub(crate) kind: ClassKind,
    pub(crate) is_abstract: bool,
    pub(crate) is_final: bool,
    pub(crate) docblock: DocBlock,
    pub(crate) parent: Option<ClassName>,
    /// Implemented interfaces, or extended ones for an interface.
    pub(crate) interfaces: Vec<ClassName>,
    pub(crate) traits: Vec<ClassName>,
    pub(crate) methods: ReflectionCollection<ReflectionMethod>,
    pub(crate) properties: ReflectionCollection<ReflectionProperty>,
    pub(crate) constants: ReflectionCollection<ReflectionConstant>,
    /// Class level `@method` tags.
    pub(crate) method_annotations: ReflectionCollection<ReflectionMethod>,
    /// Class level `@property` tags.
    pub(crate) property_annotations: ReflectionCollection<ReflectionProperty>,
    pub(crate) position: Position,
}

impl ClassDeclaration {
    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&ClassName> {
        self.parent.as_ref()
    }

    pub fn interfaces(&self) -> &[ClassName] {
        &self.interfaces
    }

    pub fn traits(&self) -> &[ClassName] {
        &self.traits
    }

    /// Extract the declaration at `node`; `None` when it has no name.
    pub fn extract(
        source: &Arc<ParsedSource>,
        node: Node,
        docblocks: &dyn DocBlockParser,
    ) -> Option<Self> {
        let kind = ClassKind::from_node_kind(node.kind())?;
        let name = source.declared_name(&node)?;
        let text = source.text();
        let scope = source.file_context().scope_at(node.start_byte());
        let names = NameResolver::new(scope).with_class_node(&node, text);

        let extractor = Extractor {
            source,
            class: name.clone(),
            kind,
            names,
            docblocks,
        };
        Some(extractor.extract(node))
    }
}

struct Extractor<'a> {
    source: &'a Arc<ParsedSource>,
    class: ClassName,
    kind: ClassKind,
    names: NameResolver<'a>,
    docblocks: &'a dyn DocBlockParser,
}

impl<'a> Extractor<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source.text().as_bytes()).unwrap_or("")
    }

    fn docblock_for(&self, node: &Node) -> DocBlock {
        doc_comment(node, self.source.text())
            .map(|raw| self.docblocks.parse(raw))
            .unwrap_or_default()
    }

    fn extract(&self, node: Node) -> ClassDeclaration {
        debug!("Extracting declaration of {}", self.class);

        let docblock = self.docblock_for(&node);
        let mut declaration = ClassDeclaration {
            name: self.class.clone(),
            kind: self.kind,
            is_abstract: false,
            is_final: false,
            docblock: docblock.clone(),
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            methods: ReflectionCollection::new(),
            properties: ReflectionCollection::new(),
            constants: ReflectionCollection::new(),
            method_annotations: ReflectionCollection::new(),
            property_annotations: ReflectionCollection::new(),
            position: position_of(&node),
        };

        for child in children(&node) {
            match child.kind() {
                "abstract_modifier" => declaration.is_abstract = true,
                "final_modifier" => declaration.is_final = true,
                "class_modifier" => match self.text(&child) {
                    "abstract" => declaration.is_abstract = true,
                    "final" => declaration.is_final = true,
                    _ => {}
                },
                "base_clause" => {
                    let names = self.clause_names(&child);
                    if self.kind == ClassKind::Interface {
                        declaration.interfaces.extend(names);
                    } else {
                        declaration.parent = names.into_iter().next();
                    }
                }
                "class_interface_clause" => {
                    declaration.interfaces.extend(self.clause_names(&child));
                }
                _ => {}
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(&body) {
                match member.kind() {
                    "method_declaration" => {
                        let method = self.method(&member);
                        if method.name() == "__construct" {
                            for property in self.promoted_properties(&member, &method) {
                                declaration.properties.insert(property);
                            }
                        }
                        declaration.methods.insert(method);
                    }
                    "property_declaration" => {
                        for property in self.properties(&member) {
                            declaration.properties.insert(property);
                        }
                    }
                    "const_declaration" => {
                        for constant in self.constants(&member) {
                            declaration.constants.insert(constant);
                        }
                    }
                    "enum_case" => {
                        if let Some(case) = self.enum_case(&member) {
                            declaration.constants.insert(case);
                        }
                    }
                    "use_declaration" => {
                        declaration.traits.extend(self.clause_names(&member));
                    }
                    _ => {}
                }
            }
        }

        for tag in docblock.methods() {
            let return_types = tag
                .return_type
                .as_deref()
                .map(|token| self.names.resolve_types(token, TypeSource::DocComment))
                .unwrap_or_default();
            declaration.method_annotations.insert(ReflectionMethod {
                name: tag.name.clone(),
                class: self.class.clone(),
                declaring_class: self.class.clone(),
                visibility: Visibility::Public,
                is_static: tag.is_static,
                is_abstract: false,
                docblock: DocBlock::empty(),
                return_type: Type::Unknown,
                return_types,
                parameters: ReflectionCollection::new(),
                body: String::new(),
                position: declaration.position,
                source: None,
            });
        }

        for tag in docblock.properties() {
            let types = tag
                .ty
                .as_deref()
                .map(|token| self.names.resolve_types(token, TypeSource::DocComment))
                .unwrap_or_default();
            declaration.property_annotations.insert(ReflectionProperty {
                name: tag.name.clone(),
                class: self.class.clone(),
                declaring_class: self.class.clone(),
                visibility: Visibility::Public,
                is_static: false,
                docblock: DocBlock::empty(),
                ty: Type::Unknown,
                types,
                default: None,
                position: declaration.position,
            });
        }

        declaration
    }

    fn clause_names(&self, clause: &Node) -> Vec<ClassName> {
        named_children(clause)
            .into_iter()
            .filter(|child| matches!(child.kind(), "name" | "qualified_name"))
            .map(|child| self.names.resolve_class_name(self.text(&child)))
            .collect()
    }

    fn modifiers(&self, node: &Node) -> Modifiers {
        let mut modifiers = Modifiers::default();
        for child in children(node) {
            match child.kind() {
                "visibility_modifier" | "var_modifier" => {
                    modifiers.visibility = Visibility::from_keyword(self.text(&child));
                }
                "static_modifier" => modifiers.is_static = true,
                "abstract_modifier" => modifiers.is_abstract = true,
                _ => {}
            }
        }
        modifiers
    }

    /// Native (`Declared`) types of a type node, plus its first member.
    fn native_types(&self, type_node: Option<Node>) -> (Type, Types) {
        match type_node {
            Some(type_node) => {
                let token = self.text(&type_node);
                (
                    self.names.resolve_type_token(token),
                    self.names.resolve_types(token, TypeSource::Declared),
                )
            }
            None => (Type::Unknown, Types::empty()),
        }
    }

    fn doc_types(&self, token: Option<&str>) -> Types {
        token
            .map(|token| self.names.resolve_types(token, TypeSource::DocComment))
            .unwrap_or_default()
    }

    fn method(&self, node: &Node) -> ReflectionMethod {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n))
            .unwrap_or("")
            .to_string();
        let modifiers = self.modifiers(node);
        let docblock = self.docblock_for(node);

        let (return_type, native) = self.native_types(node.child_by_field_name("return_type"));
        let return_types =
            native.refine_with(self.doc_types(docblock.return_type()), TypeSource::DocComment);

        let parameters = node
            .child_by_field_name("parameters")
            .map(|list| self.parameters(&list, &docblock))
            .unwrap_or_default();

        let body = node
            .child_by_field_name("body")
            .map(|body| {
                let text = self.text(&body);
                text.strip_prefix('{')
                    .and_then(|inner| inner.strip_suffix('}'))
                    .unwrap_or(text)
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();

        ReflectionMethod {
            name,
            class: self.class.clone(),
            declaring_class: self.class.clone(),
            visibility: modifiers.visibility.unwrap_or(Visibility::Public),
            is_static: modifiers.is_static,
            is_abstract: modifiers.is_abstract || self.kind == ClassKind::Interface,
            docblock,
            return_type,
            return_types,
            parameters,
            body,
            position: position_of(node),
            source: Some(Arc::clone(self.source)),
        }
    }

    fn parameters(
        &self,
        list: &Node,
        docblock: &DocBlock,
    ) -> ReflectionCollection<ReflectionParameter> {
        named_children(list)
            .into_iter()
            .filter(|child| PARAMETER_KINDS.contains(&child.kind()))
            .enumerate()
            .map(|(index, node)| self.parameter(&node, index, docblock))
            .collect()
    }

    fn parameter(&self, node: &Node, index: usize, docblock: &DocBlock) -> ReflectionParameter {
        let name_node = node.child_by_field_name("name");
        let name = match name_node {
            Some(name_node) => strip_sigil(self.text(&name_node)).to_string(),
            None => {
                warn!(
                    "Parameter has no variable at offset {} in {}",
                    node.start_byte(),
                    self.class
                );
                String::new()
            }
        };

        let by_reference = node.child_by_field_name("reference_modifier").is_some()
            || has_child_of_kind(node, "reference_modifier")
            || name_node.is_some_and(|n| n.kind() == "by_ref");
        let variadic = node.kind() == "variadic_parameter";

        let (mut ty, native) = self.native_types(node.child_by_field_name("type"));
        let mut types =
            native.refine_with(self.doc_types(docblock.param_type(&name)), TypeSource::DocComment);

        if variadic {
            ty = match ty {
                Type::Unknown => Type::array(),
                other => Type::array_of(other),
            };
            types = types.map(Type::array_of);
        }

        let default = node
            .child_by_field_name("default_value")
            .map(|default| self.constant_expression(default));
        if let Some(default) = &default {
            if default.ty().is_defined() {
                types.push(default.ty().clone(), TypeSource::Inferred);
            }
        }

        ReflectionParameter {
            name,
            index,
            ty,
            types,
            default,
            by_reference,
            variadic,
            position: position_of(node),
        }
    }

    /// Resolve a default or initializer without touching other classes.
    fn constant_expression(&self, node: Node) -> SymbolContext {
        SymbolContextResolver::new(&NoOpReflector, self.source).resolve(&Frame::new(), node)
    }

    fn promoted_properties(
        &self,
        constructor: &Node,
        method: &ReflectionMethod,
    ) -> Vec<ReflectionProperty> {
        let Some(list) = constructor.child_by_field_name("parameters") else {
            return Vec::new();
        };

        named_children(&list)
            .into_iter()
            .filter(|child| child.kind() == "property_promotion_parameter")
            .filter_map(|node| {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| strip_sigil(self.text(&n)).to_string())?;
                let parameter = method.parameters().get(&name)?;
                let modifiers = self.modifiers(&node);
                Some(ReflectionProperty {
                    name: name.clone(),
                    class: self.class.clone(),
                    declaring_class: self.class.clone(),
                    visibility: modifiers.visibility.unwrap_or(Visibility::Public),
                    is_static: false,
                    docblock: DocBlock::empty(),
                    ty: parameter.ty().clone(),
                    types: parameter.inferred_types().clone(),
                    default: parameter.default().cloned(),
                    position: position_of(&node),
                })
            })
            .collect()
    }

    fn properties(&self, node: &Node) -> Vec<ReflectionProperty> {
        let modifiers = self.modifiers(node);
        let docblock = self.docblock_for(node);
        let (ty, native) = self.native_types(node.child_by_field_name("type"));

        named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "property_element")
            .filter_map(|element| {
                let name_node = element
                    .child_by_field_name("name")
                    .or_else(|| first_child_of_kind(&element, "variable_name"))?;
                let name = strip_sigil(self.text(&name_node)).to_string();

                let mut types = native.clone().refine_with(
                    self.doc_types(docblock.var_type_for(Some(&name))),
                    TypeSource::DocComment,
                );

                let default = element
                    .child_by_field_name("default_value")
                    .or_else(|| {
                        first_child_of_kind(&element, "property_initializer")
                            .and_then(|init| named_children(&init).into_iter().next())
                    })
                    .map(|default| self.constant_expression(default));
                if let Some(default) = &default {
                    if default.ty().is_defined() {
                        types.push(default.ty().clone(), TypeSource::Inferred);
                    }
                }

                Some(ReflectionProperty {
                    name,
                    class: self.class.clone(),
                    declaring_class: self.class.clone(),
                    visibility: modifiers.visibility.unwrap_or(Visibility::Public),
                    is_static: modifiers.is_static,
                    docblock: docblock.clone(),
                    ty: ty.clone(),
                    types,
                    default,
                    position: position_of(&element),
                })
            })
            .collect()
    }

    fn constants(&self, node: &Node) -> Vec<ReflectionConstant> {
        let modifiers = self.modifiers(node);
        let docblock = self.docblock_for(node);

        named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "const_element")
            .filter_map(|element| {
                let parts = named_children(&element);
                let name_node = parts.first()?;
                let name = self.text(name_node).to_string();

                let resolved = parts
                    .get(1)
                    .map(|value| self.constant_expression(*value))
                    .unwrap_or_default();

                let mut types = Types::empty();
                if resolved.ty().is_defined() {
                    types.push(resolved.ty().clone(), TypeSource::Inferred);
                }
                let types = types.merge(self.doc_types(docblock.var_type_for(Some(&name))));

                Some(ReflectionConstant {
                    name,
                    class: self.class.clone(),
                    declaring_class: self.class.clone(),
                    visibility: modifiers.visibility.unwrap_or(Visibility::Public),
                    docblock: docblock.clone(),
                    value: resolved.value().cloned(),
                    types,
                    position: position_of(&element),
                })
            })
            .collect()
    }

    fn enum_case(&self, node: &Node) -> Option<ReflectionConstant> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| first_child_of_kind(node, "name"))?;
        let value = node
            .child_by_field_name("value")
            .map(|value| self.constant_expression(value))
            .and_then(|resolved| resolved.value().cloned());

        Some(ReflectionConstant {
            name: self.text(&name_node).to_string(),
            class: self.class.clone(),
            declaring_class: self.class.clone(),
            visibility: Visibility::Public,
            docblock: self.docblock_for(node),
            value,
            types: Types::single(Type::Class(self.class.clone()), TypeSource::Declared),
            position: position_of(node),
        })
    }
}

#[derive(Debug, Default)]
struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_abstract: bool,
}
