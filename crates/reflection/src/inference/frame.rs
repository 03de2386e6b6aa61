//! Variable and property bindings for one lexical scope.

use phpscope_api::SymbolContext;
use serde::Serialize;

/// One binding: `name` took `symbol_context` at byte `offset`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Name without the `$` sigil.
    pub name: String,
    pub offset: usize,
    pub symbol_context: SymbolContext,
}

impl Assignment {
    pub fn new(name: impl Into<String>, offset: usize, symbol_context: SymbolContext) -> Self {
        Self {
            name: strip_sigil(&name.into()).to_string(),
            offset,
            symbol_context,
        }
    }

    pub fn symbol_context(&self) -> &SymbolContext {
        &self.symbol_context
    }
}

fn strip_sigil(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

/// Offset-ordered binding history. Reassignments are kept, never replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Assignments(Vec<Assignment>);

impl Assignments {
    /// Insert keeping offset order; equal offsets stay in insertion order.
    pub fn add(&mut self, assignment: Assignment) {
        let at = self.0.partition_point(|a| a.offset <= assignment.offset);
        self.0.insert(at, assignment);
    }

    pub fn by_name(&self, name: &str) -> AssignmentQuery<'_> {
        AssignmentQuery(self.0.iter().collect()).by_name(name)
    }

    pub fn less_than_or_equal_to(&self, offset: usize) -> AssignmentQuery<'_> {
        AssignmentQuery(self.0.iter().collect()).less_than_or_equal_to(offset)
    }

    pub fn all(&self) -> AssignmentQuery<'_> {
        AssignmentQuery(self.0.iter().collect())
    }

    pub fn first(&self) -> Option<&Assignment> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Assignment> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.0.iter()
    }
}

/// Read-only, chainable view over [`Assignments`].
#[derive(Debug, Clone, Default)]
pub struct AssignmentQuery<'a>(Vec<&'a Assignment>);

impl<'a> AssignmentQuery<'a> {
    /// Accepts names with or without `$`.
    pub fn by_name(self, name: &str) -> Self {
        let name = strip_sigil(name);
        Self(self.0.into_iter().filter(|a| a.name == name).collect())
    }

    pub fn less_than_or_equal_to(self, offset: usize) -> Self {
        Self(self.0.into_iter().filter(|a| a.offset <= offset).collect())
    }

    pub fn first(&self) -> Option<&'a Assignment> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<&'a Assignment> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Assignment> + '_ {
        self.0.iter().copied()
    }
}

/// State of one function, method, closure, arrow function or file body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    locals: Assignments,
    properties: Assignments,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locals(&self) -> &Assignments {
        &self.locals
    }

    pub fn properties(&self) -> &Assignments {
        &self.properties
    }

    pub fn locals_mut(&mut self) -> &mut Assignments {
        &mut self.locals
    }

    pub fn properties_mut(&mut self) -> &mut Assignments {
        &mut self.properties
    }
}
