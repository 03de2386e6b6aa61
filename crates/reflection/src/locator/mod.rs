//! Where class source code comes from.

pub mod chain;
pub mod file;
pub mod string;
pub mod temporary;

pub use chain::ChainSourceLocator;
pub use file::FileSourceLocator;
pub use string::StringSourceLocator;
pub use temporary::TemporarySourceLocator;

use crate::error::Result;
use crate::parser::SourceCode;
use phpscope_api::ClassName;
use std::sync::Arc;

/// Maps a class name to the source that declares it.
///
/// Implementations return [`crate::ReflectionError::SourceNotFound`] when
/// they have nothing for the name so chains can move on.
pub trait SourceCodeLocator: Send + Sync {
    fn locate(&self, class: &ClassName) -> Result<SourceCode>;
}

impl<T: SourceCodeLocator + ?Sized> SourceCodeLocator for Arc<T> {
    fn locate(&self, class: &ClassName) -> Result<SourceCode> {
        (**self).locate(class)
    }
}

impl<T: SourceCodeLocator + ?Sized> SourceCodeLocator for Box<T> {
    fn locate(&self, class: &ClassName) -> Result<SourceCode> {
        (**self).locate(class)
    }
}
