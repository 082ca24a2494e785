//! Persisted session storage.
//!
//! The session lives in two string slots, mirroring browser local storage:
//! the serialized principal and the encoded credential token. Both slots are
//! always written or removed together through [`SessionStorage::set_pair`] and
//! [`SessionStorage::remove_pair`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

/// Slot holding the serialized principal.
pub const PRINCIPAL_SLOT: &str = "user";

/// Slot holding the encoded credential token.
pub const TOKEN_SLOT: &str = "authCredentials";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("failed to serialize storage: {0}")]
    Serialize(String),
}

/// String key/value storage that survives process restarts.
pub trait SessionStorage: Send + Sync + core::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Write several slots as one update.
    ///
    /// The default writes slot by slot; backends that can do better override it.
    fn set_pair(&self, first: (&str, &str), second: (&str, &str)) -> Result<(), StorageError> {
        self.set(first.0, first.1)?;
        self.set(second.0, second.1)
    }

    /// Remove several slots as one update.
    fn remove_pair(&self, first: &str, second: &str) -> Result<(), StorageError> {
        let a = self.remove(first);
        let b = self.remove(second);
        a.and(b)
    }
}

/// Process-local storage. Used by tests and when no session file is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
        Ok(())
    }

    fn set_pair(&self, first: (&str, &str), second: (&str, &str)) -> Result<(), StorageError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(first.0.to_string(), first.1.to_string());
        slots.insert(second.0.to_string(), second.1.to_string());
        Ok(())
    }

    fn remove_pair(&self, first: &str, second: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.remove(first);
        slots.remove(second);
        Ok(())
    }
}

/// JSON file of slots, rewritten whole through a temp file + rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: RwLock<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Load for modification; a corrupt file is replaced rather than blocking writes.
    fn load_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Corrupt { path, message }) => {
                tracing::warn!(path = %path.display(), %message, "discarding corrupt session file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(slots)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load_for_update()?;
        mutate(&mut slots);
        self.save(&slots)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|slots| {
            slots.remove(key);
        })
    }

    fn set_pair(&self, first: (&str, &str), second: (&str, &str)) -> Result<(), StorageError> {
        self.update(|slots| {
            slots.insert(first.0.to_string(), first.1.to_string());
            slots.insert(second.0.to_string(), second.1.to_string());
        })
    }

    fn remove_pair(&self, first: &str, second: &str) -> Result<(), StorageError> {
        self.update(|slots| {
            slots.remove(first);
            slots.remove(second);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_pairs() {
        let storage = MemoryStorage::new();
        storage
            .set_pair((PRINCIPAL_SLOT, "{}"), (TOKEN_SLOT, "YTpi"))
            .unwrap();
        assert_eq!(storage.get(TOKEN_SLOT).unwrap().as_deref(), Some("YTpi"));

        storage.remove_pair(PRINCIPAL_SLOT, TOKEN_SLOT).unwrap();
        assert!(storage.get(PRINCIPAL_SLOT).unwrap().is_none());
        assert!(storage.get(TOKEN_SLOT).unwrap().is_none());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::new(&path);
        assert!(storage.get(PRINCIPAL_SLOT).unwrap().is_none());
        storage
            .set_pair((PRINCIPAL_SLOT, "{\"a\":1}"), (TOKEN_SLOT, "YTpi"))
            .unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(PRINCIPAL_SLOT).unwrap().as_deref(), Some("{\"a\":1}"));

        reopened.remove(PRINCIPAL_SLOT).unwrap();
        assert!(storage.get(PRINCIPAL_SLOT).unwrap().is_none());
        assert_eq!(storage.get(TOKEN_SLOT).unwrap().as_deref(), Some("YTpi"));
    }

    #[test]
    fn corrupt_file_is_reported_on_read_and_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get(TOKEN_SLOT),
            Err(StorageError::Corrupt { .. })
        ));

        storage.remove_pair(PRINCIPAL_SLOT, TOKEN_SLOT).unwrap();
        assert!(storage.get(TOKEN_SLOT).unwrap().is_none());
    }
}
