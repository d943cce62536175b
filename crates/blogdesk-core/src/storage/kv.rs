//! Key-value persistence
//!
//! The store mirrors each collection to durable storage under its own key.
//! `KeyValueStore` is the seam: `FileStore` keeps one JSON file per key in
//! the data directory, `MemoryStore` keeps everything in a map.
//!
//! Writes are last-writer-wins. There is no locking between processes that
//! share a data directory.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageResult};

/// Durable storage for serialized collections
pub trait KeyValueStore {
    /// Load the value stored under `key`
    ///
    /// Returns `None` if nothing has been stored yet.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn save(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// File-backed store: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Check if a value exists for `key`
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| StorageError::from_read(e, path))?;
        Ok(Some(content))
    }

    fn save(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        atomic_write(&path, value.as_bytes())?;
        debug!("Saved record '{}' ({} bytes)", key, value.len());
        Ok(())
    }
}

/// In-memory store, for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if a previous session had saved it
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Raw stored value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        // Initially nothing stored
        assert!(!store.exists("posts"));
        assert!(store.load("posts").unwrap().is_none());

        store.save("posts", "[]").unwrap();
        assert!(store.exists("posts"));
        assert_eq!(store.load("posts").unwrap().as_deref(), Some("[]"));

        // Overwrite
        store.save("posts", "[1]").unwrap();
        assert_eq!(store.load("posts").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_store_keys_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        store.save("blog-admin-blogs", "[\"a\"]").unwrap();
        store.save("blog-admin-trash", "[]").unwrap();

        assert_eq!(
            store.path_for("blog-admin-blogs"),
            temp_dir.path().join("blog-admin-blogs.json")
        );
        assert_eq!(
            store.load("blog-admin-blogs").unwrap().as_deref(),
            Some("[\"a\"]")
        );
        assert_eq!(store.load("blog-admin-trash").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let mut store = FileStore::new(&nested);

        store.save("posts", "[]").unwrap();
        assert!(nested.join("posts.json").exists());
        // No temp file left behind
        assert!(!nested.join("posts.tmp").exists());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new().with_entry("trash", "[]");
        assert_eq!(store.load("trash").unwrap().as_deref(), Some("[]"));
        assert!(store.load("posts").unwrap().is_none());

        store.save("posts", "[{}]").unwrap();
        assert_eq!(store.get("posts"), Some("[{}]"));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }
}
