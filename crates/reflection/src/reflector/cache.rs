use crate::error::Result;
use crate::reflection::ReflectionClassLike;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use phpscope_api::ClassName;
use std::sync::Arc;

/// Reflected class-likes keyed by lower-cased name.
///
/// Each entry is a cell initialised at most once, so two threads asking for
/// the same class share one reflection. A failed initialisation leaves the
/// cell empty and the next lookup tries again.
#[derive(Debug, Default)]
pub struct ReflectionCache {
    entries: DashMap<String, Arc<OnceCell<Arc<ReflectionClassLike>>>>,
}

impl ReflectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &ClassName) -> Option<Arc<ReflectionClassLike>> {
        self.entries
            .get(&key(name))
            .and_then(|cell| cell.get().cloned())
    }

    pub fn get_or_try_insert<F>(&self, name: &ClassName, init: F) -> Result<Arc<ReflectionClassLike>>
    where
        F: FnOnce() -> Result<Arc<ReflectionClassLike>>,
    {
        // The shard lock must be released before `init` runs: reflecting a
        // class reflects its ancestors through this same cache.
        let key = key(name);
        let cell = Arc::clone(&*self.entries.entry(key.clone()).or_default());
        let reflected = cell.get_or_try_init(init).cloned();
        if reflected.is_err() {
            self.entries.remove_if(&key, |_, existing| {
                Arc::ptr_eq(existing, &cell) && existing.get().is_none()
            });
        }
        reflected
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

fn key(name: &ClassName) -> String {
    name.full().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReflectionError;

    #[test]
    fn test_failed_lookups_leave_no_entry() {
        let cache = ReflectionCache::new();
        for name in ["Missing", "Other\\Missing", "missing"] {
            let name = ClassName::new(name);
            let result = cache.get_or_try_insert(&name, || {
                Err(ReflectionError::ClassNotFound(name.clone()))
            });
            assert!(result.is_err());
        }
        assert!(cache.entries.is_empty());
        assert!(cache.get(&ClassName::new("Missing")).is_none());
    }
}
