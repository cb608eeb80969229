//! Durable local storage for client snapshots.
//!
//! One JSON file per key under the configured storage directory. The key
//! set mirrors the browser-profile storage the backend contract assumes:
//! `user`, `access`, `refresh`, `cart`, and `orders`.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Keys of the durable snapshots.
pub mod keys {
    /// Persisted identity of the signed-in user.
    pub const USER: &str = "user";
    /// Bearer access token.
    pub const ACCESS: &str = "access";
    /// Refresh token used to mint new access tokens.
    pub const REFRESH: &str = "refresh";
    /// Cart line snapshot.
    pub const CART: &str = "cart";
    /// Locally recorded order history.
    pub const ORDERS: &str = "orders";
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not create storage directory {0}: {1}")]
    CreateDir(PathBuf, #[source] io::Error),
    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed snapshot for key '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed key/value store of JSON snapshots.
///
/// Cloning is cheap; clones share the same directory.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open the storage directory, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CreateDir` if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::CreateDir(root.clone(), e))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Read the snapshot stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` on filesystem failure and
    /// `StorageError::Malformed` when the file exists but does not decode.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Io {
                    key: key.to_owned(),
                    source: e,
                });
            }
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| StorageError::Malformed {
            key: key.to_owned(),
            source: e,
        })?;
        Ok(Some(value))
    }

    /// Read the snapshot under `key`, treating a malformed file as absent.
    ///
    /// A snapshot that no longer decodes (corrupt file, incompatible older
    /// format) is logged and discarded rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` on filesystem failure.
    pub fn read_or_discard<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        match self.read(key) {
            Ok(value) => Ok(value),
            Err(StorageError::Malformed { key, source }) => {
                warn!(key = %key, error = %source, "Discarding malformed snapshot");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Write `value` as the snapshot for `key`.
    ///
    /// The bytes are staged to a sibling temporary file and renamed into
    /// place, so an interrupted write never leaves a truncated snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` on filesystem failure.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_vec(value).map_err(|e| StorageError::Malformed {
            key: key.to_owned(),
            source: e,
        })?;
        let staging = self.root.join(format!("{key}.json.tmp"));
        fs::write(&staging, &json).map_err(|source| StorageError::Io {
            key: key.to_owned(),
            source,
        })?;
        fs::rename(&staging, self.path_for(key)).map_err(|source| StorageError::Io {
            key: key.to_owned(),
            source,
        })
    }

    /// Remove the snapshot for `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` on filesystem failure.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io {
                key: key.to_owned(),
                source: e,
            }),
        }
    }

    /// Whether a snapshot exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let (_dir, storage) = open_temp();
        storage.write(keys::CART, &vec![1u32, 2, 3]).unwrap();

        let restored: Option<Vec<u32>> = storage.read(keys::CART).unwrap();
        assert_eq!(restored, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_read_missing_key_is_none() {
        let (_dir, storage) = open_temp();
        let value: Option<String> = storage.read(keys::USER).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_read_or_discard_swallows_corrupt_snapshot() {
        let (dir, storage) = open_temp();
        fs::write(dir.path().join("cart.json"), b"{not json").unwrap();

        let value: Option<Vec<u32>> = storage.read_or_discard(keys::CART).unwrap();
        assert!(value.is_none());

        // Strict read still surfaces the problem.
        let strict: Result<Option<Vec<u32>>, _> = storage.read(keys::CART);
        assert!(matches!(strict, Err(StorageError::Malformed { .. })));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, storage) = open_temp();
        storage.write(keys::ACCESS, &"token").unwrap();

        storage.remove(keys::ACCESS).unwrap();
        storage.remove(keys::ACCESS).unwrap();
        assert!(!storage.contains(keys::ACCESS));
    }
}
