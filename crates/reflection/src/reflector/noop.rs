use super::ClassReflector;
use crate::error::{ReflectionError, Result};
use crate::reflection::ReflectionClassLike;
use phpscope_api::ClassName;
use std::sync::Arc;

/// Knows no classes. Used where only syntax is available, e.g. when
/// evaluating constant expressions inside a declaration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpReflector;

impl ClassReflector for NoOpReflector {
    fn reflect_class_like(&self, name: &ClassName) -> Result<Arc<ReflectionClassLike>> {
        Err(ReflectionError::ClassNotFound(name.clone()))
    }
}
