//! Explanation cache keyed on a fingerprint of the sanitized prompt.
//!
//! A disabled cache behaves as a pass-through: `get` always misses and `put`
//! silently drops the value.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use std::sync::Arc;

use crate::config::types::{CacheConfig, CacheKind};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache directory unavailable")]
    NoCacheDir,
}

pub trait Cache: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError>;

    fn disable(&self);

    fn is_disabled(&self) -> bool;
}

/// Cache key for an explanation request.
pub fn fingerprint(provider: &str, language: &str, sanitized_text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(provider.as_bytes());
    hasher.update(b"-");
    hasher.update(language.as_bytes());
    hasher.update(b"-");
    hasher.update(sanitized_text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Build the cache described by the configuration.
pub fn new_cache(config: &CacheConfig) -> Result<Arc<dyn Cache>, CacheError> {
    let cache: Arc<dyn Cache> = match config.kind {
        CacheKind::Memory => Arc::new(MemoryCache::new("memory")),
        CacheKind::File => {
            let dir = match &config.path {
                Some(path) => path.clone(),
                None => FileCache::default_dir().ok_or(CacheError::NoCacheDir)?,
            };
            Arc::new(FileCache::new(dir)?)
        }
    };
    if config.disabled {
        cache.disable();
    }
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("openai", "english", "Pod is pending");
        let b = fingerprint("openai", "english", "Pod is pending");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_separates_inputs() {
        let base = fingerprint("openai", "english", "text");
        assert_ne!(base, fingerprint("anthropic", "english", "text"));
        assert_ne!(base, fingerprint("openai", "german", "text"));
        assert_ne!(base, fingerprint("openai", "english", "other"));
    }

    #[test]
    fn test_new_cache_honours_disabled_flag() {
        let config = CacheConfig {
            kind: CacheKind::Memory,
            path: None,
            disabled: true,
        };
        let cache = new_cache(&config).unwrap();
        assert!(cache.is_disabled());
        cache.put("k", "v").unwrap();
        assert_eq!(cache.get("k"), None);
    }
}
