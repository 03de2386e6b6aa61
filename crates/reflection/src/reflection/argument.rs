//! Arguments of a call site, resolved in the frame they appear in.

use super::collection::{CollectionItem, ReflectionCollection};
use crate::inference::frame::Frame;
use crate::inference::resolver::SymbolContextResolver;
use crate::parser::position_of;
use crate::parser::utils::{named_children, strip_sigil};
use phpscope_api::{Position, SymbolContext, Type, Types, Value};
use serde::Serialize;
use tree_sitter::Node;

pub type ReflectionArgumentCollection = ReflectionCollection<ReflectionArgument>;

#[derive(Debug, Clone, Serialize)]
pub struct ReflectionArgument {
    name: String,
    index: usize,
    named: bool,
    symbol_context: SymbolContext,
    position: Position,
}

impl ReflectionArgument {
    /// The `name:` of a named argument, else the variable passed, else
    /// `argument<index>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn symbol_context(&self) -> &SymbolContext {
        &self.symbol_context
    }

    pub fn ty(&self) -> &Type {
        self.symbol_context.ty()
    }

    pub fn types(&self) -> &Types {
        self.symbol_context.types()
    }

    pub fn value(&self) -> Option<&Value> {
        self.symbol_context.value()
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl CollectionItem for ReflectionArgument {
    fn key(&self) -> &str {
        &self.name
    }
}

impl ReflectionCollection<ReflectionArgument> {
    /// Resolve each entry of an `arguments` node against `frame`.
    pub fn from_argument_list(
        resolver: &SymbolContextResolver<'_>,
        arguments: Node,
        frame: &Frame,
    ) -> Self {
        let mut collection = Self::new();
        let elements = named_children(&arguments)
            .into_iter()
            .filter(|node| node.kind() == "argument");

        for (index, element) in elements.enumerate() {
            let label = element.child_by_field_name("name");
            let expression = named_children(&element)
                .into_iter()
                .rev()
                .find(|child| label.is_none_or(|label| label.id() != child.id()));

            let symbol_context = match expression {
                Some(expression) => resolver.resolve(frame, expression),
                None => SymbolContext::none(),
            };

            let mut name = match (label, expression) {
                (Some(label), _) => resolver.source().node_text(&label).to_string(),
                (None, Some(expression)) if expression.kind() == "variable_name" => {
                    strip_sigil(resolver.source().node_text(&expression)).to_string()
                }
                _ => String::new(),
            };
            if name.is_empty() || collection.has(&name) {
                name = format!("argument{}", index);
            }

            collection.insert(ReflectionArgument {
                name,
                index,
                named: label.is_some(),
                symbol_context,
                position: position_of(&element),
            });
        }

        collection
    }
}
