//! Reflection model: class-likes and their merged members.

pub mod argument;
pub mod collection;
pub mod declaration;
mod hierarchy;
pub mod member;

pub use argument::{ReflectionArgument, ReflectionArgumentCollection};
pub use collection::{ClassMember, CollectionItem, ReflectionCollection};
pub use declaration::ClassDeclaration;
pub use member::{
    ReflectionConstant, ReflectionMethod, ReflectionParameter, ReflectionProperty, Visibility,
};

use crate::docblock::DocBlock;
use crate::parser::ParsedSource;
use phpscope_api::{ClassName, Position};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(ClassKind::Class),
            "interface_declaration" => Some(ClassKind::Interface),
            "trait_declaration" => Some(ClassKind::Trait),
            "enum_declaration" => Some(ClassKind::Enum),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Enum => "enum",
        }
    }
}

/// A class, interface, trait or enum with its inherited members merged in.
///
/// Ancestors are shared through `Arc` so a cached parent is reflected once
/// no matter how many children point at it.
#[derive(Debug)]
pub struct ReflectionClassLike {
    pub(crate) declaration: ClassDeclaration,
    pub(crate) parent: Option<Arc<ReflectionClassLike>>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    pub(crate) interfaces: Vec<Arc<ReflectionClassLike>>,
    pub(crate) traits: Vec<Arc<ReflectionClassLike>>,
    /// Linearised ancestors, most derived first, without `self`.
    pub(crate) ancestors: Vec<Arc<ReflectionClassLike>>,
    pub(crate) all_interfaces: Vec<Arc<ReflectionClassLike>>,
    pub(crate) methods: ReflectionCollection<ReflectionMethod>,
    pub(crate) properties: ReflectionCollection<ReflectionProperty>,
    pub(crate) constants: ReflectionCollection<ReflectionConstant>,
    pub(crate) source: Arc<ParsedSource>,
}

impl ReflectionClassLike {
    /// Merge `declaration` with its already reflected ancestors.
    pub(crate) fn new(
        declaration: ClassDeclaration,
        parent: Option<Arc<ReflectionClassLike>>,
        interfaces: Vec<Arc<ReflectionClassLike>>,
        traits: Vec<Arc<ReflectionClassLike>>,
        source: Arc<ParsedSource>,
    ) -> Self {
        let hierarchy::Lineage {
            layers,
            ancestors,
            interfaces: all_interfaces,
        } = hierarchy::linearize(&declaration, parent.as_ref(), &interfaces, &traits);
        let methods = hierarchy::merge_methods(&declaration.name, &layers);
        let properties = hierarchy::merge_properties(&declaration.name, &layers);
        let constants = hierarchy::merge_constants(&declaration.name, &layers);
        drop(layers);

        Self {
            declaration,
            parent,
            interfaces,
            traits,
            ancestors,
            all_interfaces,
            methods,
            properties,
            constants,
            source,
        }
    }

    pub fn name(&self) -> &ClassName {
        &self.declaration.name
    }

    pub fn kind(&self) -> ClassKind {
        self.declaration.kind
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind(), ClassKind::Class | ClassKind::Enum)
    }

    pub fn is_interface(&self) -> bool {
        self.kind() == ClassKind::Interface
    }

    pub fn is_trait(&self) -> bool {
        self.kind() == ClassKind::Trait
    }

    pub fn is_abstract(&self) -> bool {
        self.declaration.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.declaration.is_final
    }

    pub fn docblock(&self) -> &DocBlock {
        &self.declaration.docblock
    }

    pub fn position(&self) -> Position {
        self.declaration.position
    }

    pub fn declaration(&self) -> &ClassDeclaration {
        &self.declaration
    }

    pub fn source(&self) -> &Arc<ParsedSource> {
        &self.source
    }

    pub fn parent(&self) -> Option<&Arc<ReflectionClassLike>> {
        self.parent.as_ref()
    }

    /// Parent chain for a class; extended interfaces for an interface.
    pub fn parents(&self) -> ReflectionCollection<Arc<ReflectionClassLike>> {
        if self.is_interface() {
            return self.interfaces.iter().cloned().collect();
        }

        let mut parents = ReflectionCollection::new();
        let mut current = self.parent.as_ref();
        while let Some(parent) = current {
            if parents.has(parent.name().full()) {
                break;
            }
            parents.insert(Arc::clone(parent));
            current = parent.parent.as_ref();
        }
        parents
    }

    /// Every interface this class-like is an instance of, inherited ones
    /// included.
    pub fn interfaces(&self) -> ReflectionCollection<Arc<ReflectionClassLike>> {
        self.all_interfaces.iter().cloned().collect()
    }

    pub fn traits(&self) -> ReflectionCollection<Arc<ReflectionClassLike>> {
        self.traits.iter().cloned().collect()
    }

    pub fn ancestors(&self) -> &[Arc<ReflectionClassLike>] {
        &self.ancestors
    }

    pub fn is_instance_of(&self, class: &ClassName) -> bool {
        self.name().matches(class)
            || self
                .ancestors
                .iter()
                .any(|ancestor| ancestor.name().matches(class))
    }

    pub fn methods(&self) -> &ReflectionCollection<ReflectionMethod> {
        &self.methods
    }

    pub fn properties(&self) -> &ReflectionCollection<ReflectionProperty> {
        &self.properties
    }

    pub fn constants(&self) -> &ReflectionCollection<ReflectionConstant> {
        &self.constants
    }
}

impl CollectionItem for ReflectionClassLike {
    const CASE_INSENSITIVE: bool = true;

    fn key(&self) -> &str {
        self.name().full()
    }
}
