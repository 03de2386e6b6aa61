//! The reflection facade: locate, parse, merge and cache class-likes, and
//! resolve what sits at an offset.

pub mod builder;
pub mod cache;
pub mod noop;
pub mod offset;

pub use builder::{ReflectorBuilder, ReflectorConfig};
pub use cache::ReflectionCache;
pub use noop::NoOpReflector;
pub use offset::ReflectionOffset;

use crate::docblock::DocBlockParser;
use crate::error::{ReflectionError, Result};
use crate::inference::builder::FrameBuilder;
use crate::inference::frame::Frame;
use crate::locator::{SourceCodeLocator, TemporarySourceLocator};
use crate::parser::utils::{ancestor_of_kind, first_child_of_kind};
use crate::parser::{ParsedSource, SourceCode};
use crate::reflection::{ClassMember, ReflectionArgumentCollection, ReflectionClassLike};
use crate::reflection::declaration::ClassDeclaration;
use crate::reflection::member::ReflectionMethod;
use phpscope_api::ClassName;
use std::sync::Arc;
use tracing::{debug, warn};
use tree_sitter::Node;

const CALL_KINDS: &[&str] = &[
    "function_call_expression",
    "member_call_expression",
    "nullsafe_member_call_expression",
    "scoped_call_expression",
    "object_creation_expression",
];

/// Anything that can turn a class name into a merged reflection.
pub trait ClassReflector: Send + Sync {
    fn reflect_class_like(&self, name: &ClassName) -> Result<Arc<ReflectionClassLike>>;
}

pub struct Reflector {
    locator: Box<dyn SourceCodeLocator>,
    temporary: Option<Arc<TemporarySourceLocator>>,
    cache: Option<ReflectionCache>,
    docblocks: Arc<dyn DocBlockParser>,
}

impl Reflector {
    pub(crate) fn new(
        locator: Box<dyn SourceCodeLocator>,
        temporary: Option<Arc<TemporarySourceLocator>>,
        cache: Option<ReflectionCache>,
        docblocks: Arc<dyn DocBlockParser>,
    ) -> Self {
        Self {
            locator,
            temporary,
            cache,
            docblocks,
        }
    }

    pub fn builder() -> ReflectorBuilder {
        ReflectorBuilder::new()
    }

    pub fn cache(&self) -> Option<&ReflectionCache> {
        self.cache.as_ref()
    }

    /// Reflect a class or enum; interfaces and traits are rejected.
    pub fn reflect_class(&self, name: &ClassName) -> Result<Arc<ReflectionClassLike>> {
        let class = self.reflect_class_like(name)?;
        if !class.is_class() {
            return Err(ReflectionError::NotAClass(name.clone()));
        }
        Ok(class)
    }

    pub fn reflect_interface(&self, name: &ClassName) -> Result<Arc<ReflectionClassLike>> {
        let interface = self.reflect_class_like(name)?;
        if !interface.is_interface() {
            return Err(ReflectionError::NotAnInterface(name.clone()));
        }
        Ok(interface)
    }

    /// Every class-like declared in `source`. Failures are logged and the
    /// class skipped.
    pub fn reflect_classes_in(
        &self,
        source: impl Into<SourceCode>,
    ) -> Result<Vec<Arc<ReflectionClassLike>>> {
        let parsed = ParsedSource::parse(source.into())?;
        let mut classes = Vec::new();
        for name in parsed.declared_class_names() {
            match self.reflect_in(Some(&parsed), &name, &mut Vec::new()) {
                Ok(class) => classes.push(class),
                Err(e) => warn!("Skipping {}: {}", name, e),
            }
        }
        Ok(classes)
    }

    /// Resolve the node at `offset` together with the frame of its scope.
    pub fn reflect_offset(
        &self,
        source: impl Into<SourceCode>,
        offset: usize,
    ) -> Result<ReflectionOffset> {
        let source = source.into();
        if let Some(temporary) = &self.temporary {
            temporary.insert(source.clone());
        }

        let parsed = ParsedSource::parse(source)?;
        let offset = offset.min(parsed.text().len());
        let node = node_at_offset(parsed.root_node(), offset);
        debug!(kind = node.kind(), offset, "Reflecting offset");

        let builder = FrameBuilder::new(self, &parsed).with_docblock_parser(&*self.docblocks);
        let frame = builder.build(node);
        let symbol_context = builder.resolver().resolve(&frame, node);

        Ok(ReflectionOffset::new(symbol_context, frame))
    }

    /// Arguments of the innermost call around `offset`, each resolved in
    /// the frame of the call. Empty when the offset is not inside a call.
    pub fn reflect_arguments(
        &self,
        source: impl Into<SourceCode>,
        offset: usize,
    ) -> Result<ReflectionArgumentCollection> {
        let source = source.into();
        if let Some(temporary) = &self.temporary {
            temporary.insert(source.clone());
        }

        let parsed = ParsedSource::parse(source)?;
        let offset = offset.min(parsed.text().len());
        let node = node_at_offset(parsed.root_node(), offset);

        let call = if CALL_KINDS.contains(&node.kind()) {
            Some(node)
        } else {
            ancestor_of_kind(&node, CALL_KINDS)
        };
        let Some(arguments) = call.and_then(|call| first_child_of_kind(&call, "arguments")) else {
            debug!(offset, "No call around offset");
            return Ok(ReflectionArgumentCollection::new());
        };

        let builder = FrameBuilder::new(self, &parsed).with_docblock_parser(&*self.docblocks);
        let frame = builder.build(arguments);
        Ok(ReflectionArgumentCollection::from_argument_list(
            builder.resolver(),
            arguments,
            &frame,
        ))
    }

    pub fn reflect_method_frame(&self, class: &ClassName, method: &str) -> Result<Frame> {
        let reflected = self.reflect_class_like(class)?;
        let method = reflected
            .methods()
            .get(method)
            .ok_or_else(|| ReflectionError::MethodNotFound {
                class: class.clone(),
                method: method.to_string(),
            })?;
        self.method_frame(method)
    }

    /// Frame of a method body with `$this` bound to the class the method was
    /// looked up through. Annotation-only methods have an empty frame.
    pub fn method_frame(&self, method: &ReflectionMethod) -> Result<Frame> {
        let Some(source) = method.source() else {
            return Ok(Frame::new());
        };
        let Some(node) = source.node_at(method.position(), "method_declaration") else {
            warn!(
                "Method {}::{} is no longer at its recorded position",
                method.class(),
                method.name()
            );
            return Ok(Frame::new());
        };

        Ok(FrameBuilder::new(self, source)
            .with_docblock_parser(&*self.docblocks)
            .with_this_class(method.class().clone())
            .build(node))
    }

    /// Reflect `name`, preferring a declaration in `same_source` over the
    /// locator. `visiting` holds the classes currently being merged further
    /// up the stack.
    fn reflect_in(
        &self,
        same_source: Option<&Arc<ParsedSource>>,
        name: &ClassName,
        visiting: &mut Vec<ClassName>,
    ) -> Result<Arc<ReflectionClassLike>> {
        if visiting.iter().any(|class| class.matches(name)) {
            warn!("Cyclic hierarchy through {}", name);
            return Err(ReflectionError::CyclicHierarchy(name.clone()));
        }

        let mut load = || {
            let local = same_source.filter(|source| source.find_class_like(name).is_some());
            match local {
                Some(source) => self.build(source, name, visiting),
                None => {
                    let code = self.locator.locate(name)?;
                    let source = ParsedSource::parse(code)?;
                    self.build(&source, name, visiting)
                }
            }
        };

        match &self.cache {
            Some(cache) => cache.get_or_try_insert(name, load),
            None => load(),
        }
    }

    fn build(
        &self,
        source: &Arc<ParsedSource>,
        name: &ClassName,
        visiting: &mut Vec<ClassName>,
    ) -> Result<Arc<ReflectionClassLike>> {
        let node = source
            .find_class_like(name)
            .ok_or_else(|| ReflectionError::ClassNotFound(name.clone()))?;
        let declaration = ClassDeclaration::extract(source, node, &*self.docblocks)
            .ok_or_else(|| ReflectionError::ClassNotFound(name.clone()))?;
        debug!("Reflecting {}", declaration.name());

        visiting.push(declaration.name().clone());
        let parent = declaration
            .parent()
            .and_then(|parent| self.ancestor(source, parent, name, visiting));
        let interfaces = declaration
            .interfaces()
            .iter()
            .filter_map(|interface| self.ancestor(source, interface, name, visiting))
            .collect();
        let traits = declaration
            .traits()
            .iter()
            .filter_map(|used| self.ancestor(source, used, name, visiting))
            .collect();
        visiting.pop();

        Ok(Arc::new(ReflectionClassLike::new(
            declaration,
            parent,
            interfaces,
            traits,
            Arc::clone(source),
        )))
    }

    /// Missing or cyclic ancestors are dropped from the hierarchy.
    fn ancestor(
        &self,
        source: &Arc<ParsedSource>,
        ancestor: &ClassName,
        child: &ClassName,
        visiting: &mut Vec<ClassName>,
    ) -> Option<Arc<ReflectionClassLike>> {
        match self.reflect_in(Some(source), ancestor, visiting) {
            Ok(reflected) => Some(reflected),
            Err(e) => {
                warn!("Could not reflect {} (ancestor of {}): {}", ancestor, child, e);
                None
            }
        }
    }
}

impl ClassReflector for Reflector {
    fn reflect_class_like(&self, name: &ClassName) -> Result<Arc<ReflectionClassLike>> {
        self.reflect_in(None, name, &mut Vec::new())
    }
}

/// Smallest named node at `offset`, widened so that a member or variable
/// name stands for the whole access expression.
fn node_at_offset(root: Node<'_>, offset: usize) -> Node<'_> {
    let mut node = root
        .named_descendant_for_byte_range(offset, offset)
        .unwrap_or(root);

    while let Some(parent) = node.parent() {
        let widen = match parent.kind() {
            "variable_name" | "qualified_name" | "namespace_name" | "relative_scope" => true,
            "member_access_expression"
            | "nullsafe_member_access_expression"
            | "member_call_expression"
            | "nullsafe_member_call_expression"
            | "scoped_call_expression"
            | "scoped_property_access_expression" => parent
                .child_by_field_name("name")
                .is_some_and(|name| name.id() == node.id()),
            "class_constant_access_expression" => parent
                .named_child(parent.named_child_count().saturating_sub(1) as u32)
                .is_some_and(|name| name.id() == node.id()),
            _ => false,
        };
        if !widen {
            break;
        }
        node = parent;
    }
    node
}
