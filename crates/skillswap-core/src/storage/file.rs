use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Store file name in cache directory
pub const STORE_FILE: &str = "session.json";

/// On-disk layout shared by the plain and encrypted file stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    pub entries: BTreeMap<String, String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

impl StoreDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_vec(&mut self) -> Result<Vec<u8>, StorageError> {
        self.updated_at = Utc::now();
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Write via a sibling temp file and rename so a crash never leaves a
/// half-written store.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Plain JSON file store. The file is created on first write and removed
/// once the last key is deleted.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at `<cache_dir>/session.json`.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            path: cache_dir.join(STORE_FILE),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => StoreDocument::from_slice(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, mut doc: StoreDocument) -> Result<(), StorageError> {
        if doc.entries.is_empty() {
            debug!(path = %self.path.display(), "Store empty, removing file");
            return remove_if_exists(&self.path);
        }
        write_atomic(&self.path, &doc.to_vec()?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.entries.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut doc = self.load()?;
        doc.entries.insert(key.to_string(), value.to_string());
        self.save(doc)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let mut doc = self.load()?;
        if doc.entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(doc)
    }
}
