//! Ancestor linearisation and member merging.
//!
//! Layers are ordered most derived first: the class, its traits, then each
//! parent with its traits, then every interface reached along the way
//! (depth first, each visited once). Member names are folded in from the
//! least derived layer up, so an override keeps the position its ancestor
//! gave it; the member itself comes from the first layer, walking down from
//! the class, that declares or annotates it.

use super::ReflectionClassLike;
use super::collection::ReflectionCollection;
use super::declaration::ClassDeclaration;
use super::member::{ReflectionConstant, ReflectionMethod, ReflectionProperty, Visibility};
use indexmap::IndexSet;
use phpscope_api::ClassName;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Layer<'a> {
    pub declaration: &'a ClassDeclaration,
    /// Reached through `extends`; private members do not cross this edge.
    pub inherited: bool,
}

impl Layer<'_> {
    fn sees(&self, visibility: Visibility) -> bool {
        !(self.inherited && visibility == Visibility::Private)
    }

    fn method(&self, name: &str) -> Option<&ReflectionMethod> {
        self.declaration
            .methods
            .get(name)
            .filter(|method| self.sees(method.visibility()))
    }

    fn property(&self, name: &str) -> Option<&ReflectionProperty> {
        self.declaration
            .properties
            .get(name)
            .filter(|property| self.sees(property.visibility()))
    }

    fn constant(&self, name: &str) -> Option<&ReflectionConstant> {
        self.declaration
            .constants
            .get(name)
            .filter(|constant| self.sees(constant.visibility()))
    }
}

pub(crate) struct Lineage<'a> {
    pub layers: Vec<Layer<'a>>,
    pub ancestors: Vec<Arc<ReflectionClassLike>>,
    pub interfaces: Vec<Arc<ReflectionClassLike>>,
}

struct Linearizer<'a> {
    seen: Vec<ClassName>,
    lineage: Lineage<'a>,
}

impl<'a> Linearizer<'a> {
    fn visit(&mut self, name: &ClassName) -> bool {
        if self.seen.iter().any(|seen| seen.matches(name)) {
            return false;
        }
        self.seen.push(name.clone());
        true
    }

    fn push_ancestor(&mut self, ancestor: &'a Arc<ReflectionClassLike>, inherited: bool) {
        self.lineage.layers.push(Layer {
            declaration: &ancestor.declaration,
            inherited,
        });
        self.lineage.ancestors.push(Arc::clone(ancestor));
    }

    fn push_traits(&mut self, traits: &'a [Arc<ReflectionClassLike>], inherited: bool) {
        for used in traits {
            if self.visit(used.name()) {
                self.push_ancestor(used, inherited);
                self.push_traits(&used.traits, inherited);
            }
        }
    }

    fn push_interface(&mut self, interface: &'a Arc<ReflectionClassLike>) {
        if !self.visit(interface.name()) {
            return;
        }
        self.push_ancestor(interface, true);
        self.lineage.interfaces.push(Arc::clone(interface));
        for extended in &interface.interfaces {
            self.push_interface(extended);
        }
    }
}

pub(crate) fn linearize<'a>(
    declaration: &'a ClassDeclaration,
    parent: Option<&'a Arc<ReflectionClassLike>>,
    interfaces: &'a [Arc<ReflectionClassLike>],
    traits: &'a [Arc<ReflectionClassLike>],
) -> Lineage<'a> {
    let mut linearizer = Linearizer {
        seen: vec![declaration.name.clone()],
        lineage: Lineage {
            layers: vec![Layer {
                declaration,
                inherited: false,
            }],
            ancestors: Vec::new(),
            interfaces: Vec::new(),
        },
    };

    linearizer.push_traits(traits, false);

    let mut pending: Vec<&'a Arc<ReflectionClassLike>> = interfaces.iter().collect();
    let mut current = parent;
    while let Some(class) = current {
        if !linearizer.visit(class.name()) {
            break;
        }
        linearizer.push_ancestor(class, true);
        linearizer.push_traits(&class.traits, true);
        pending.extend(class.interfaces.iter());
        current = class.parent.as_ref();
    }

    for interface in pending {
        linearizer.push_interface(interface);
    }

    linearizer.lineage
}

/// Names in fold order: least derived layer first, declarations before
/// annotations.
fn fold_names<'a, F>(layers: &[Layer<'a>], names_of: F) -> IndexSet<String>
where
    F: Fn(&Layer<'a>) -> Vec<String>,
{
    let mut names = IndexSet::new();
    for layer in layers.iter().rev() {
        for name in names_of(layer) {
            names.insert(name);
        }
    }
    names
}

pub(crate) fn merge_methods(
    class: &ClassName,
    layers: &[Layer<'_>],
) -> ReflectionCollection<ReflectionMethod> {
    let names = fold_names(layers, |layer| {
        let declared = layer
            .declaration
            .methods
            .iter()
            .filter(|method| layer.sees(method.visibility()))
            .map(|method| method.name().to_ascii_lowercase());
        let annotated = layer
            .declaration
            .method_annotations
            .iter()
            .map(|method| method.name().to_ascii_lowercase());
        declared.chain(annotated).collect()
    });

    names
        .iter()
        .filter_map(|name| resolve_method(name, layers))
        .map(|method| method.with_class(class))
        .collect()
}

fn resolve_method(name: &str, layers: &[Layer<'_>]) -> Option<ReflectionMethod> {
    for (index, layer) in layers.iter().enumerate() {
        let declared = layer.method(name);

        if let Some(method) = declared {
            if method.docblock().inherits() {
                let documented = layers[index + 1..]
                    .iter()
                    .filter_map(|ancestor| ancestor.method(name))
                    .find(|ancestor| !ancestor.docblock().inherits());
                return Some(match documented {
                    Some(ancestor) => method.clone().inheriting_docs_from(ancestor),
                    None => method.clone(),
                });
            }
        }

        if let Some(annotation) = layer.declaration.method_annotations.get(name) {
            let base = layers[index..].iter().find_map(|layer| layer.method(name));
            return Some(match base {
                Some(base) => base
                    .clone()
                    .with_return_types(annotation.return_types.clone()),
                None => annotation.clone(),
            });
        }

        if let Some(method) = declared {
            return Some(method.clone());
        }
    }
    None
}

pub(crate) fn merge_properties(
    class: &ClassName,
    layers: &[Layer<'_>],
) -> ReflectionCollection<ReflectionProperty> {
    let names = fold_names(layers, |layer| {
        let declared = layer
            .declaration
            .properties
            .iter()
            .filter(|property| layer.sees(property.visibility()))
            .map(|property| property.name().to_string());
        let annotated = layer
            .declaration
            .property_annotations
            .iter()
            .map(|property| property.name().to_string());
        declared.chain(annotated).collect()
    });

    names
        .iter()
        .filter_map(|name| resolve_property(name, layers))
        .map(|property| property.with_class(class))
        .collect()
}

fn resolve_property(name: &str, layers: &[Layer<'_>]) -> Option<ReflectionProperty> {
    for (index, layer) in layers.iter().enumerate() {
        let declared = layer.property(name);

        if let Some(property) = declared {
            if property.docblock().inherits() {
                let documented = layers[index + 1..]
                    .iter()
                    .filter_map(|ancestor| ancestor.property(name))
                    .find(|ancestor| !ancestor.docblock().inherits());
                return Some(match documented {
                    Some(ancestor) => property.clone().inheriting_docs_from(ancestor),
                    None => property.clone(),
                });
            }
        }

        if let Some(annotation) = layer.declaration.property_annotations.get(name) {
            let base = layers[index..].iter().find_map(|layer| layer.property(name));
            return Some(match base {
                Some(base) => base.clone().with_types(annotation.types.clone()),
                None => annotation.clone(),
            });
        }

        if let Some(property) = declared {
            return Some(property.clone());
        }
    }
    None
}

pub(crate) fn merge_constants(
    class: &ClassName,
    layers: &[Layer<'_>],
) -> ReflectionCollection<ReflectionConstant> {
    let names = fold_names(layers, |layer| {
        layer
            .declaration
            .constants
            .iter()
            .filter(|constant| layer.sees(constant.visibility()))
            .map(|constant| constant.name().to_string())
            .collect()
    });

    names
        .iter()
        .filter_map(|name| layers.iter().find_map(|layer| layer.constant(name)))
        .map(|constant| constant.clone().with_class(class))
        .collect()
}
