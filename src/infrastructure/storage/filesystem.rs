//! Filesystem storage adapter, one file per entry

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::storage::{Capabilities, StorageAdapter};
use crate::domain::{BoxError, CacheError};

use super::options::AdapterOptions;

const ENTRY_EXTENSION: &str = "entry";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stores entries as files below a cache directory
///
/// File names are the SHA-256 of the key, so any key is a valid path
/// component. Writes go through a temporary file and a rename.
#[derive(Debug, Clone)]
pub struct FilesystemAdapter {
    root: PathBuf,
}

impl FilesystemAdapter {
    /// Opens the adapter, creating `root` when it does not exist yet
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }

        Ok(Self { root })
    }

    /// Builds the adapter from the `cache_dir` option
    pub fn from_options(options: &AdapterOptions) -> Result<Self, BoxError> {
        let dir = options
            .get_str("cache_dir")?
            .ok_or_else(|| CacheError::configuration("Option 'cache_dir' is required"))?;

        Ok(Self::new(dir)?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let name = hex::encode(Sha256::digest(key.as_bytes()));
        self.root.join(format!("{}.{}", name, ENTRY_EXTENSION))
    }

    fn write_atomically(&self, path: &Path, value: &str) -> io::Result<()> {
        let tmp = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&tmp, path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }
}

fn storage_error(action: &str, key: &str, e: io::Error) -> CacheError {
    CacheError::storage(format!("Failed to {} '{}': {}", action, key, e))
}

impl StorageAdapter for FilesystemAdapter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new().persistent()
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<bool, CacheError> {
        let path = self.entry_path(key);
        self.write_atomically(&path, value)
            .map_err(|e| storage_error("write", key, e))?;

        debug!(key = %key, path = %path.display(), "Wrote cache file");
        Ok(true)
    }

    fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entry_path(key).is_file())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("remove", key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn adapter() -> (TempDir, FilesystemAdapter) {
        let dir = TempDir::new().unwrap();
        let adapter = FilesystemAdapter::new(dir.path()).unwrap();
        (dir, adapter)
    }

    #[test]
    fn test_set_and_get() {
        let (_dir, adapter) = adapter();

        assert!(adapter.set("key1", r#"{"value":1}"#).unwrap());
        assert_eq!(
            adapter.get("key1").unwrap(),
            Some(r#"{"value":1}"#.to_string())
        );
        assert!(adapter.has("key1").unwrap());
    }

    #[test]
    fn test_get_missing() {
        let (_dir, adapter) = adapter();
        assert!(adapter.get("missing").unwrap().is_none());
        assert!(!adapter.remove("missing").unwrap());
    }

    #[test]
    fn test_overwrite_and_remove() {
        let (_dir, adapter) = adapter();
        adapter.set("key1", "first").unwrap();
        adapter.set("key1", "second").unwrap();

        assert_eq!(adapter.get("key1").unwrap(), Some("second".to_string()));
        assert!(adapter.remove("key1").unwrap());
        assert!(!adapter.has("key1").unwrap());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let (dir, adapter) = adapter();
        adapter.set("key1", "kept").unwrap();
        drop(adapter);

        let reopened = FilesystemAdapter::new(dir.path()).unwrap();
        assert_eq!(reopened.get("key1").unwrap(), Some("kept".to_string()));
        assert!(reopened.capabilities().persistent);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let adapter = FilesystemAdapter::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(adapter.root(), nested.as_path());
    }

    #[test]
    fn test_from_options_requires_cache_dir() {
        let error = FilesystemAdapter::from_options(&AdapterOptions::new()).unwrap_err();
        assert!(error.to_string().contains("cache_dir"));

        let dir = TempDir::new().unwrap();
        let options = AdapterOptions::new().with("cache_dir", dir.path().to_string_lossy().to_string());
        assert!(FilesystemAdapter::from_options(&options).is_ok());
    }

    #[test]
    fn test_file_as_root_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "x").unwrap();

        assert!(FilesystemAdapter::new(&file).is_err());
    }
}
