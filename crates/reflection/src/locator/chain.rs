use super::SourceCodeLocator;
use crate::error::{ReflectionError, Result};
use crate::parser::SourceCode;
use phpscope_api::ClassName;
use tracing::debug;

/// Tries each locator in turn; the first hit wins.
#[derive(Default)]
pub struct ChainSourceLocator {
    locators: Vec<Box<dyn SourceCodeLocator>>,
}

impl ChainSourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locators(locators: Vec<Box<dyn SourceCodeLocator>>) -> Self {
        Self { locators }
    }

    pub fn add(&mut self, locator: Box<dyn SourceCodeLocator>) {
        self.locators.push(locator);
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

impl SourceCodeLocator for ChainSourceLocator {
    fn locate(&self, class: &ClassName) -> Result<SourceCode> {
        let mut last_error = ReflectionError::SourceNotFound {
            class: class.clone(),
            reason: "no source locators registered with chain".to_string(),
        };

        for locator in &self.locators {
            match locator.locate(class) {
                Ok(source) => return Ok(source),
                Err(e) if e.is_not_found() => {
                    debug!("Locator miss for {}: {}", class, e);
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::StringSourceLocator;

    #[test]
    fn test_first_matching_locator_wins() {
        let chain = ChainSourceLocator::with_locators(vec![
            Box::new(StringSourceLocator::new("<?php class Post {}")),
            Box::new(StringSourceLocator::new("<?php class Comment {} // second")),
        ]);
        let source = chain.locate(&ClassName::new("Comment")).unwrap();
        assert!(source.text().contains("second"));
    }

    #[test]
    fn test_surfaces_last_failure() {
        let chain = ChainSourceLocator::with_locators(vec![Box::new(StringSourceLocator::new(
            "<?php class Post {}",
        ))]);
        match chain.locate(&ClassName::new("Missing")) {
            Err(ReflectionError::SourceNotFound { reason, .. }) => {
                assert!(reason.contains("not declared"));
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.text().to_string())),
        }
    }

    #[test]
    fn test_empty_chain_is_not_found() {
        let err = ChainSourceLocator::new()
            .locate(&ClassName::new("Post"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
