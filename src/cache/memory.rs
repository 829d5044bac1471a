use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Cache, CacheError};

/// Process-lifetime cache backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    name: String,
    entries: DashMap<String, String>,
    disabled: AtomicBool,
}

impl MemoryCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        if self.is_disabled() {
            return None;
        }
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if !self.is_disabled() {
            self.entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = MemoryCache::new("test");
        assert_eq!(cache.get("k"), None);
        cache.put("k", "v").unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_is_pass_through() {
        let cache = MemoryCache::new("test");
        cache.put("k", "v").unwrap();
        cache.disable();

        assert!(cache.is_disabled());
        assert_eq!(cache.get("k"), None);
        cache.put("other", "v").unwrap();
        assert_eq!(cache.len(), 1);
    }
}
