//! Passphrase-protected variant of the file store.
//!
//! File layout: `MAGIC | salt (16) | nonce (12) | ciphertext`. The key is
//! derived once per open with Argon2id from the passphrase and the file's
//! salt; every write uses a fresh nonce.

use std::path::{Path, PathBuf};

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use tracing::debug;

use super::file::{remove_if_exists, write_atomic, StoreDocument};
use super::{KeyValueStore, StorageError};

/// Encrypted store file name in cache directory
pub const ENCRYPTED_STORE_FILE: &str = "session.enc";

const MAGIC: &[u8; 4] = b"SSE1";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + SALT_LEN + NONCE_LEN;

pub struct EncryptedFileStore {
    path: PathBuf,
    salt: [u8; SALT_LEN],
    cipher: ChaCha20Poly1305,
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EncryptedFileStore {
    /// Open `<cache_dir>/session.enc` with default Argon2 parameters.
    pub fn open(cache_dir: PathBuf, passphrase: &str) -> Result<Self, StorageError> {
        Self::open_with_params(cache_dir.join(ENCRYPTED_STORE_FILE), passphrase, Params::default())
    }

    /// Open the store at `path`. An existing file is decrypted up front so a
    /// wrong passphrase fails here rather than on first read.
    pub fn open_with_params(
        path: PathBuf,
        passphrase: &str,
        params: Params,
    ) -> Result<Self, StorageError> {
        let existing = match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let salt = match existing.as_deref() {
            Some(bytes) => read_salt(bytes)?,
            None => {
                let mut salt = [0u8; SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                salt
            }
        };

        let cipher = derive_cipher(passphrase, &salt, params)?;
        let store = Self { path, salt, cipher };

        if let Some(bytes) = existing {
            store.decrypt(&bytes)?;
        }
        debug!(path = %store.path.display(), "Encrypted store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decrypt(&self, bytes: &[u8]) -> Result<StoreDocument, StorageError> {
        if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(StorageError::Decrypt("unrecognized file header".to_string()));
        }
        let nonce = Nonce::from_slice(&bytes[MAGIC.len() + SALT_LEN..HEADER_LEN]);
        let plaintext = self
            .cipher
            .decrypt(nonce, &bytes[HEADER_LEN..])
            .map_err(|e| StorageError::Decrypt(e.to_string()))?;
        StoreDocument::from_slice(&plaintext)
    }

    fn encrypt(&self, doc: &mut StoreDocument) -> Result<Vec<u8>, StorageError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), doc.to_vec()?.as_slice())
            .map_err(|e| StorageError::Encrypt(e.to_string()))?;

        let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn load(&self) -> Result<StoreDocument, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => self.decrypt(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, mut doc: StoreDocument) -> Result<(), StorageError> {
        if doc.entries.is_empty() {
            return remove_if_exists(&self.path);
        }
        let bytes = self.encrypt(&mut doc)?;
        write_atomic(&self.path, &bytes)
    }
}

fn read_salt(bytes: &[u8]) -> Result<[u8; SALT_LEN], StorageError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(StorageError::Decrypt("unrecognized file header".to_string()));
    }
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&bytes[MAGIC.len()..MAGIC.len() + SALT_LEN]);
    Ok(salt)
}

fn derive_cipher(
    passphrase: &str,
    salt: &[u8; SALT_LEN],
    params: Params,
) -> Result<ChaCha20Poly1305, StorageError> {
    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| StorageError::Encrypt(e.to_string()))?;
    Ok(ChaCha20Poly1305::new(Key::from_slice(&key)))
}

impl KeyValueStore for EncryptedFileStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so debug-build tests stay fast.
    fn cheap_params() -> Params {
        Params::new(1024, 1, 1, Some(KEY_LEN)).expect("valid argon2 params")
    }

    fn open(path: &Path, passphrase: &str) -> Result<EncryptedFileStore, StorageError> {
        EncryptedFileStore::open_with_params(path.to_path_buf(), passphrase, cheap_params())
    }

    #[test]
    fn test_roundtrip_across_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(ENCRYPTED_STORE_FILE);

        let mut store = open(&path, "hunter2").expect("open");
        store.set("authToken", "t1").expect("set");

        let reopened = open(&path, "hunter2").expect("reopen");
        assert_eq!(reopened.get("authToken").expect("get").as_deref(), Some("t1"));
    }

    #[test]
    fn test_file_does_not_contain_plaintext() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(ENCRYPTED_STORE_FILE);

        let mut store = open(&path, "hunter2").expect("open");
        store.set("authToken", "very-secret-token").expect("set");

        let raw = std::fs::read(&path).expect("read");
        assert!(raw.starts_with(MAGIC));
        let needle = b"very-secret-token";
        assert!(!raw.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_salt_kept_and_nonce_fresh_per_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(ENCRYPTED_STORE_FILE);
        let salt_range = MAGIC.len()..MAGIC.len() + SALT_LEN;
        let nonce_range = MAGIC.len() + SALT_LEN..HEADER_LEN;

        let mut store = open(&path, "pw").expect("open");
        store.set("authToken", "t1").expect("set");
        let first = std::fs::read(&path).expect("read");
        store.set("authToken", "t1").expect("set again");
        let second = std::fs::read(&path).expect("read");

        assert_eq!(first[salt_range.clone()], second[salt_range]);
        assert_ne!(first[nonce_range.clone()], second[nonce_range]);
    }

    #[test]
    fn test_wrong_passphrase_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(ENCRYPTED_STORE_FILE);

        let mut store = open(&path, "right").expect("open");
        store.set("authToken", "t1").expect("set");

        assert!(matches!(open(&path, "wrong"), Err(StorageError::Decrypt(_))));
    }

    #[test]
    fn test_delete_last_key_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(ENCRYPTED_STORE_FILE);

        let mut store = open(&path, "pw").expect("open");
        store.set("authToken", "t1").expect("set");
        store.delete("authToken").expect("delete");
        assert!(!path.exists());
    }
}
