//! tree-sitter front end: parsed sources, name resolution and node helpers.

pub mod naming;
pub mod utils;

use crate::error::{ReflectionError, Result};
use naming::FileContext;
use phpscope_api::{ClassName, Position};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tree_sitter::{Node, Parser, Tree};

pub fn php_language() -> tree_sitter::Language {
    tree_sitter_php::LANGUAGE_PHP.into()
}

/// Source text handed out by locators, optionally tied to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCode {
    text: String,
    path: Option<PathBuf>,
}

impl SourceCode {
    pub fn from_string(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            path: None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Ok(Self {
            text,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn empty() -> Self {
        Self::from_string("")
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl From<&str> for SourceCode {
    fn from(value: &str) -> Self {
        SourceCode::from_string(value)
    }
}

impl From<String> for SourceCode {
    fn from(value: String) -> Self {
        SourceCode::from_string(value)
    }
}

/// A syntax tree together with the text it was parsed from.
///
/// Reflections keep an `Arc` to this so method bodies can be walked again
/// later without re-reading the file.
pub struct ParsedSource {
    code: SourceCode,
    tree: Tree,
    context: FileContext,
}

impl ParsedSource {
    pub fn parse(code: SourceCode) -> Result<Arc<Self>> {
        let mut parser = Parser::new();
        parser
            .set_language(&php_language())
            .map_err(|e| ReflectionError::Parser(e.to_string()))?;

        let tree = parser
            .parse(code.text(), None)
            .ok_or_else(|| ReflectionError::Parser("Failed to parse source".to_string()))?;

        let context = FileContext::from_tree(tree.root_node(), code.text());

        Ok(Arc::new(Self {
            code,
            tree,
            context,
        }))
    }

    pub fn from_text(text: impl Into<String>) -> Result<Arc<Self>> {
        Self::parse(SourceCode::from_string(text))
    }

    pub fn code(&self) -> &SourceCode {
        &self.code
    }

    pub fn text(&self) -> &str {
        self.code.text()
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn file_context(&self) -> &FileContext {
        &self.context
    }

    pub fn node_text<'s>(&'s self, node: &Node) -> &'s str {
        node.utf8_text(self.text().as_bytes()).unwrap_or("")
    }

    /// Fully qualified names of every class-like declared in the file, in
    /// source order.
    pub fn declared_class_names(&self) -> Vec<ClassName> {
        self.class_like_nodes()
            .into_iter()
            .filter_map(|node| self.declared_name(&node))
            .collect()
    }

    /// Class-like declaration for `name`, matched case-insensitively.
    pub fn find_class_like(&self, name: &ClassName) -> Option<Node<'_>> {
        self.class_like_nodes().into_iter().find(|node| {
            self.declared_name(node)
                .is_some_and(|declared| declared.matches(name))
        })
    }

    pub fn declared_name(&self, node: &Node) -> Option<ClassName> {
        let short = node.child_by_field_name("name")?;
        let scope = self.context.scope_at(node.start_byte());
        Some(ClassName::new(self.node_text(&short)).prepend(&scope.namespace))
    }

    fn class_like_nodes(&self) -> Vec<Node<'_>> {
        let mut found = Vec::new();
        let mut stack = vec![self.root_node()];
        while let Some(node) = stack.pop() {
            if utils::is_class_like(node.kind()) {
                found.push(node);
            }
            let mut children = utils::named_children(&node);
            children.reverse();
            stack.extend(children);
        }
        found
    }

    /// Find the node occupying exactly `position`, if the tree still has one.
    pub fn node_at(&self, position: Position, kind: &str) -> Option<Node<'_>> {
        let mut node = self
            .root_node()
            .descendant_for_byte_range(position.start, position.end)?;
        loop {
            if node.kind() == kind && node.start_byte() == position.start {
                return Some(node);
            }
            node = node.parent()?;
        }
    }
}

impl fmt::Debug for ParsedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedSource")
            .field("path", &self.code.path())
            .field("len", &self.code.text().len())
            .finish()
    }
}

pub fn position_of(node: &Node) -> Position {
    Position::new(node.start_byte(), node.end_byte())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_class_names_follow_namespaces() {
        let parsed = ParsedSource::from_text(
            "<?php\nnamespace Acme;\nclass Post {}\ninterface Postable {}\nnamespace Other;\ntrait Loggable {}",
        )
        .unwrap();
        let names: Vec<String> = parsed
            .declared_class_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec!["Acme\\Post", "Acme\\Postable", "Other\\Loggable"]);
    }

    #[test]
    fn test_find_class_like_is_case_insensitive() {
        let parsed = ParsedSource::from_text("<?php class Foobar {}").unwrap();
        let node = parsed.find_class_like(&ClassName::new("foobar")).unwrap();
        assert_eq!(node.kind(), "class_declaration");
        assert!(parsed.find_class_like(&ClassName::new("Barfoo")).is_none());
    }
}
