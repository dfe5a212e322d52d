//! Durable client-side key/value storage, modelled on the browser's
//! `localStorage`: string keys, string values, synchronous access.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("failed to replace storage file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON object on disk mapping keys to values. Every write replaces the
/// file atomically through a sibling temp file.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(items)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!("Wrote local storage to {}", self.path.display());
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::{LocalStorage, StorageError};

    #[derive(Default)]
    pub struct MemoryStorage {
        items: Mutex<HashMap<String, String>>,
        read_only: AtomicBool,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every write fails, like a browser with storage quota exhausted.
        pub fn read_only() -> Self {
            let storage = Self::default();
            storage.read_only.store(true, Ordering::SeqCst);
            storage
        }
    }

    impl LocalStorage for MemoryStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.items.lock().unwrap().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.read_only.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "quota exceeded",
                )));
            }
            self.items
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}
