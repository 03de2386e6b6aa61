use super::SourceCodeLocator;
use crate::error::{ReflectionError, Result};
use crate::parser::{ParsedSource, SourceCode};
use phpscope_api::ClassName;
use tracing::warn;

/// Serves one in-memory source for the classes it declares.
#[derive(Debug, Clone)]
pub struct StringSourceLocator {
    source: SourceCode,
    declared: Vec<ClassName>,
}

impl StringSourceLocator {
    pub fn new(source: impl Into<SourceCode>) -> Self {
        let source = source.into();
        let declared = match ParsedSource::parse(source.clone()) {
            Ok(parsed) => parsed.declared_class_names(),
            Err(e) => {
                warn!("Could not index source for locator: {}", e);
                Vec::new()
            }
        };
        Self { source, declared }
    }

    pub fn declares(&self, class: &ClassName) -> bool {
        self.declared.iter().any(|name| name.matches(class))
    }

    pub fn declared(&self) -> &[ClassName] {
        &self.declared
    }

    pub fn source(&self) -> &SourceCode {
        &self.source
    }
}

impl SourceCodeLocator for StringSourceLocator {
    fn locate(&self, class: &ClassName) -> Result<SourceCode> {
        if self.declares(class) {
            return Ok(self.source.clone());
        }
        Err(ReflectionError::SourceNotFound {
            class: class.clone(),
            reason: "class is not declared in the given source".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locates_declared_class() {
        let locator = StringSourceLocator::new("<?php namespace Acme; class Post {}");
        let source = locator.locate(&ClassName::new("Acme\\Post")).unwrap();
        assert!(source.text().contains("class Post"));
    }

    #[test]
    fn test_unknown_class_is_not_found() {
        let locator = StringSourceLocator::new("<?php class Post {}");
        let err = locator.locate(&ClassName::new("Comment")).unwrap_err();
        assert!(err.is_not_found());
    }
}
