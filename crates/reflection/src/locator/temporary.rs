use super::{SourceCodeLocator, StringSourceLocator};
use crate::error::{ReflectionError, Result};
use crate::parser::SourceCode;
use phpscope_api::ClassName;
use std::sync::RwLock;

/// Sources retained from offset reflection so the classes they declare can
/// be reflected afterwards. Newest source wins.
#[derive(Debug, Default)]
pub struct TemporarySourceLocator {
    sources: RwLock<Vec<StringSourceLocator>>,
}

impl TemporarySourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source: SourceCode) {
        let locator = StringSourceLocator::new(source);
        if locator.declared().is_empty() {
            return;
        }
        if let Ok(mut sources) = self.sources.write() {
            sources.push(locator);
        }
    }

    pub fn len(&self) -> usize {
        self.sources.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SourceCodeLocator for TemporarySourceLocator {
    fn locate(&self, class: &ClassName) -> Result<SourceCode> {
        let sources = self.sources.read().map_err(|_| ReflectionError::SourceNotFound {
            class: class.clone(),
            reason: "temporary source lock poisoned".to_string(),
        })?;

        sources
            .iter()
            .rev()
            .find_map(|locator| locator.locate(class).ok())
            .ok_or_else(|| ReflectionError::SourceNotFound {
                class: class.clone(),
                reason: "class not found in temporary sources".to_string(),
            })
    }
}
