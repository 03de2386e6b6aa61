use super::{ReflectionCache, Reflector};
use crate::docblock::{DefaultDocBlockParser, DocBlockParser};
use crate::error::Result;
use crate::locator::{
    ChainSourceLocator, FileSourceLocator, SourceCodeLocator, StringSourceLocator,
    TemporarySourceLocator,
};
use crate::parser::SourceCode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Reflector settings, usually read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectorConfig {
    #[serde(default)]
    pub enable_cache: bool,
    #[serde(default)]
    pub enable_contextual_source_location: bool,
    /// Directories searched for `<ShortName>.php`.
    #[serde(default)]
    pub source_paths: Vec<PathBuf>,
}

impl ReflectorConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Default)]
pub struct ReflectorBuilder {
    locators: Vec<Box<dyn SourceCodeLocator>>,
    enable_cache: bool,
    enable_contextual_source_location: bool,
    docblocks: Option<Arc<dyn DocBlockParser>>,
}

impl ReflectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_locator(mut self, locator: impl SourceCodeLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }

    /// Shorthand for a [`StringSourceLocator`] over `source`.
    pub fn add_source(self, source: impl Into<SourceCode>) -> Self {
        self.add_locator(StringSourceLocator::new(source))
    }

    pub fn enable_cache(mut self) -> Self {
        self.enable_cache = true;
        self
    }

    /// Remember sources passed to offset reflection so their classes can be
    /// found later.
    pub fn enable_contextual_source_location(mut self) -> Self {
        self.enable_contextual_source_location = true;
        self
    }

    pub fn with_docblock_parser(mut self, parser: impl DocBlockParser + 'static) -> Self {
        self.docblocks = Some(Arc::new(parser));
        self
    }

    pub fn with_config(mut self, config: &ReflectorConfig) -> Self {
        self.enable_cache |= config.enable_cache;
        self.enable_contextual_source_location |= config.enable_contextual_source_location;
        if !config.source_paths.is_empty() {
            self = self.add_locator(FileSourceLocator::new(config.source_paths.iter().cloned()));
        }
        self
    }

    pub fn build(self) -> Reflector {
        let mut chain = ChainSourceLocator::new();

        // Contextual sources are consulted first.
        let temporary = self
            .enable_contextual_source_location
            .then(|| Arc::new(TemporarySourceLocator::new()));
        if let Some(temporary) = &temporary {
            chain.add(Box::new(Arc::clone(temporary)));
        }
        for locator in self.locators {
            chain.add(locator);
        }

        info!(
            locators = chain.len(),
            cache = self.enable_cache,
            contextual = temporary.is_some(),
            "Building reflector"
        );

        let docblocks: Arc<dyn DocBlockParser> = match self.docblocks {
            Some(parser) => parser,
            None => Arc::new(DefaultDocBlockParser),
        };

        Reflector::new(
            Box::new(chain),
            temporary,
            self.enable_cache.then(ReflectionCache::new),
            docblocks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_missing_fields() {
        let config: ReflectorConfig = serde_json::from_str(r#"{"enable_cache": true}"#).unwrap();
        assert!(config.enable_cache);
        assert!(!config.enable_contextual_source_location);
        assert!(config.source_paths.is_empty());
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phpscope.json");
        std::fs::write(
            &path,
            r#"{"enable_contextual_source_location": true, "source_paths": ["src"]}"#,
        )
        .unwrap();

        let config = ReflectorConfig::from_json_file(&path).unwrap();
        assert!(config.enable_contextual_source_location);
        assert_eq!(config.source_paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_invalid_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phpscope.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = ReflectorConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, crate::error::ReflectionError::Config(_)));
    }
}
