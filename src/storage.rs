//! Key/value local storage.
//!
//! Mirrors the browser `localStorage` contract: string keys, string values, and
//! a size quota that makes oversized writes fail. [`FileStorage`] keeps the
//! whole key space in one JSON document; each write takes an exclusive lock,
//! writes a temporary sibling and renames it over the original.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::errors::StorageError;

/// Browser-like default quota.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub trait LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

fn check_quota(entries: &BTreeMap<String, String>, quota: usize) -> Result<(), StorageError> {
    let needed: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
    if needed > quota {
        return Err(StorageError::QuotaExceeded { needed, quota });
    }
    Ok(())
}

/// In-memory storage, used by tests and as a scratch substrate.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }
}

impl MemoryStorage {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota,
        }
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());
        check_quota(&next, self.quota)?;
        self.entries = next;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    quota: usize,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, quota: usize) -> Self {
        Self {
            path: path.into(),
            quota,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(StorageError::Corrupt)
    }

    fn lock(&self) -> Result<File, StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.io_err(e))?;
        lock.lock_exclusive().map_err(|e| self.io_err(e))?;
        Ok(lock)
    }

    /// Read-modify-write the whole document under the lock.
    fn update<F>(&self, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let lock = self.lock()?;
        let result = (|| {
            // An unreadable document is replaced rather than blocking every write.
            let mut entries = match self.read_entries() {
                Ok(entries) => entries,
                Err(StorageError::Corrupt(e)) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "discarding corrupt storage file"
                    );
                    BTreeMap::new()
                }
                Err(e) => return Err(e),
            };
            apply(&mut entries);
            check_quota(&entries, self.quota)?;

            let body = serde_json::to_string_pretty(&entries).map_err(StorageError::Encode)?;
            let tmp = self.path.with_extension("json.tmp");
            std::fs::write(&tmp, body).map_err(|e| self.io_err(e))?;
            std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
        })();
        if let Err(e) = FileExt::unlock(&lock) {
            tracing::debug!(error = %e, "failed to release storage lock");
        }
        result
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
