use super::SourceCodeLocator;
use crate::error::{ReflectionError, Result};
use crate::parser::{ParsedSource, SourceCode};
use phpscope_api::ClassName;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Finds `<ShortName>.php` files below a set of directories and returns the
/// first one that actually declares the class.
#[derive(Debug, Clone, Default)]
pub struct FileSourceLocator {
    roots: Vec<PathBuf>,
}

impl FileSourceLocator {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn candidates(&self, file_name: &str) -> Vec<PathBuf> {
        self.roots
            .iter()
            .flat_map(|root| {
                WalkDir::new(root)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            warn!("Skipping unreadable entry: {}", e);
                            None
                        }
                    })
                    .filter(|entry| entry.file_type().is_file())
                    .filter(|entry| entry.file_name().to_string_lossy() == file_name)
                    .map(|entry| entry.into_path())
            })
            .collect()
    }
}

fn declares(path: &Path, class: &ClassName) -> Result<Option<SourceCode>> {
    let source = SourceCode::from_path(path)?;
    let parsed = ParsedSource::parse(source.clone())?;
    if parsed.find_class_like(class).is_some() {
        return Ok(Some(source));
    }
    Ok(None)
}

impl SourceCodeLocator for FileSourceLocator {
    fn locate(&self, class: &ClassName) -> Result<SourceCode> {
        let file_name = format!("{}.php", class.short());

        for path in self.candidates(&file_name) {
            debug!("Checking {} for {}", path.display(), class);
            match declares(&path, class) {
                Ok(Some(source)) => return Ok(source),
                Ok(None) => {}
                Err(e) => warn!("Could not read {}: {}", path.display(), e),
            }
        }

        Err(ReflectionError::SourceNotFound {
            class: class.clone(),
            reason: format!("no file named {} declares it", file_name),
        })
    }
}
