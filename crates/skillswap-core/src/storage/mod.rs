//! Durable key-value persistence for session state.
//!
//! The session store only needs synchronous get/set/delete on string keys.
//! Backends:
//! - `MemoryStore`: in-process map, nothing survives the process
//! - `FileStore`: JSON document in the cache directory
//! - `EncryptedFileStore`: the same document sealed with a passphrase
//! - `KeyringStore`: one OS keychain entry per key

pub mod encrypted;
pub mod file;
pub mod keyring;

use std::collections::HashMap;

use thiserror::Error;

pub use self::encrypted::EncryptedFileStore;
pub use self::file::FileStore;
pub use self::keyring::KeyringStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] ::keyring::Error),

    #[error("Failed to encrypt store: {0}")]
    Encrypt(String),

    #[error("Failed to decrypt store - wrong passphrase or corrupted file: {0}")]
    Decrypt(String),
}

/// Synchronous string key-value store. Deleting a missing key succeeds.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip_and_delete() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("authToken").expect("get"), None);

        store.set("authToken", "t1").expect("set");
        assert_eq!(store.get("authToken").expect("get").as_deref(), Some("t1"));

        store.delete("authToken").expect("delete");
        store.delete("authToken").expect("second delete is fine");
        assert!(store.is_empty());
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
    }
}
