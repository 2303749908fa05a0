//! Key-value persistence for item collections.
//!
//! Each key holds one text blob. The repository writes the whole collection
//! under a single key after every mutation, so a store only needs whole-value
//! get and set.
//!
//! # Directory Layout
//!
//! ```text
//! <data_dir>/
//!   dropToolItems_v3.json   # current generation
//!   dropToolItems_v2.json   # legacy generation, read once for migration
//!   dropToolUi.json         # caller-owned UI state (sort toggles)
//!   lock                    # advisory lock held by the CLI
//! ```
//!
//! # Invariants
//!
//! - `FileStore::set` writes a sibling temp file and renames it over the
//!   target, so a reader never observes a half-written blob.
//! - A missing key is `Ok(None)`, never an error.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ErrorCode;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("value for '{key}' is {len} bytes, over the {limit} byte limit")]
    CapacityExceeded { key: String, len: usize, limit: usize },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StoreReadFailed,
            Self::Write { .. } | Self::CapacityExceeded { .. } => ErrorCode::StoreWriteFailed,
        }
    }
}

/// Whole-value text storage addressed by key.
pub trait KeyValueStore {
    /// Read the blob stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{key}.json.tmp"))
    }

    fn write_atomic(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let tmp = self.temp_path_for(key);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.path_for(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_atomic(key, value)
            .map_err(|source| StoreError::Write {
                key: key.to_string(),
                source,
            })?;
        debug!(key, bytes = value.len(), root = %self.root.display(), "wrote blob");
        Ok(())
    }
}

/// In-memory store, optionally refusing values above a byte limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    limit: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `set` fails for values longer than `limit` bytes.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            limit: Some(limit),
        }
    }

    /// Seed a key directly, bypassing the limit.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.limit {
            if value.len() > limit {
                return Err(StoreError::CapacityExceeded {
                    key: key.to_string(),
                    len: value.len(),
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("dropToolItems_v3").unwrap().is_none());
    }

    #[test]
    fn file_store_set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        store.set("k", "[1,2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));
        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
        assert!(store.path_for("k").exists());
        assert!(!store.temp_path_for("k").exists());
    }

    #[test]
    fn file_store_write_failure_is_classified() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();
        let mut store = FileStore::new(&blocker);
        let err = store.set("k", "v").unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(err.code(), ErrorCode::StoreWriteFailed);
    }

    #[test]
    fn memory_store_enforces_limit() {
        let mut store = MemoryStore::with_limit(4);
        store.set("k", "1234").unwrap();
        let err = store.set("k", "12345").unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { len: 5, limit: 4, .. }));
        assert_eq!(store.raw("k"), Some("1234"));
    }

    #[test]
    fn memory_store_seeding_bypasses_limit() {
        let store = MemoryStore::with_limit(1).with_entry("k", "long value");
        assert_eq!(store.get("k").unwrap().as_deref(), Some("long value"));
    }
}
