use log::trace;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Cache, CacheError};

/// Cache that keeps one file per key, so explanations survive across runs.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
    disabled: AtomicBool,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            disabled: AtomicBool::new(false),
        })
    }

    /// `<user cache dir>/kubesage`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("kubesage"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Cache for FileCache {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Option<String> {
        if self.is_disabled() {
            return None;
        }
        match fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Some(value),
            Err(e) => {
                trace!("Cache miss for {}: {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if self.is_disabled() {
            return Ok(());
        }
        fs::write(self.entry_path(key), value)?;
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
    use tempfile::TempDir;

    #[test]
    fn test_entries_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        FileCache::new(dir.path()).unwrap().put("abc", "value").unwrap();

        let reopened = FileCache::new(dir.path()).unwrap();
        assert_eq!(reopened.get("abc").as_deref(), Some("value"));
        assert_eq!(reopened.get("missing"), None);
    }

    #[test]
    fn test_disabled_file_cache_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        cache.disable();
        cache.put("abc", "value").unwrap();

        assert!(!dir.path().join("abc").exists());
        assert_eq!(cache.get("abc"), None);
    }
}
