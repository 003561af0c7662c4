//! File-backed key/value store
//!
//! Reads are served from memory; each mutation rewrites the whole file
//! (temp file + rename). Read-then-write is not atomic across processes.

use crate::error::{AppResult, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Shared handle; clones see the same entries
#[derive(Clone, Debug)]
pub struct LocalStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    entries: Map<String, Value>,
}

impl LocalStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// A corrupt file is logged and treated as empty.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("⚠️ Storage file {} is corrupt, starting empty: {}", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: path.display().to_string(),
                    source: e,
                }
                .into())
            }
        };
        debug!("Opened storage {} with {} keys", path.display(), entries.len());

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path: Some(path),
                entries,
            })),
        })
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                path: None,
                entries: Map::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Typed read; `Ok(None)` when the key is absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let value = match self.lock().entries.get(key) {
            Some(v) => v.clone(),
            None => return Ok(None),
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| {
                StorageError::Malformed {
                    key: key.to_string(),
                    source: e,
                }
                .into()
            })
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let value = serde_json::to_value(value).map_err(|e| StorageError::Malformed {
            key: key.to_string(),
            source: e,
        })?;
        let mut inner = self.lock();
        inner.entries.insert(key.to_string(), value);
        inner.flush()
    }

    pub fn remove(&self, key: &str) -> AppResult<()> {
        let mut inner = self.lock();
        if inner.entries.remove(key).is_some() {
            inner.flush()?;
        }
        Ok(())
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }
}

impl Inner {
    fn flush(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write_err = |e: std::io::Error| StorageError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        };

        let content = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            StorageError::Malformed {
                key: "*".to_string(),
                source: e,
            }
        })?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = LocalStore::open(&path).unwrap();
        store.set("darkMode", &true).unwrap();
        store.set("authToken", &"abc").unwrap();
        store.remove("authToken").unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.get::<bool>("darkMode").unwrap(), Some(true));
        assert!(!reopened.contains("authToken"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = LocalStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn wrong_type_is_reported_as_malformed() {
        let store = LocalStore::in_memory();
        store.set("darkMode", &"yes").unwrap();
        assert!(store.get::<bool>("darkMode").is_err());
    }
}
