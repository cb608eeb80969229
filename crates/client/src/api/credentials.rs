//! Bearer credential storage for the request pipeline.
//!
//! The access/refresh pair is owned by the request client alone; domain
//! slices never see raw tokens. Reads go straight to durable storage so
//! every handle observes a single source of truth.

use secrecy::{ExposeSecret, SecretString};

use crate::storage::{Storage, StorageError, keys};

/// Access + refresh token pair as returned by the auth endpoints.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone)]
pub struct CredentialPair {
    /// Short-lived token sent as the `Authorization: Bearer` value.
    pub access: SecretString,
    /// Long-lived token exchanged for fresh access tokens.
    pub refresh: SecretString,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Durable store for the bearer credential pair.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    storage: Storage,
}

impl CredentialStore {
    pub(crate) const fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Current access token, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure.
    pub fn access(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .read::<String>(keys::ACCESS)?
            .map(SecretString::from))
    }

    /// Current refresh token, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure.
    pub fn refresh(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .read::<String>(keys::REFRESH)?
            .map(SecretString::from))
    }

    /// Persist a full credential pair (after login or signup).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure.
    pub fn store_pair(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        self.storage
            .write(keys::ACCESS, &pair.access.expose_secret())?;
        self.storage
            .write(keys::REFRESH, &pair.refresh.expose_secret())
    }

    /// Replace only the access token (after a refresh exchange).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure.
    pub fn set_access(&self, access: &SecretString) -> Result<(), StorageError> {
        self.storage.write(keys::ACCESS, &access.expose_secret())
    }

    /// Drop both tokens.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::ACCESS)?;
        self.storage.remove(keys::REFRESH)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, CredentialStore::new(storage))
    }

    #[test]
    fn test_store_pair_then_read_back() {
        let (_dir, store) = open_store();
        store
            .store_pair(&CredentialPair {
                access: SecretString::from("access-1"),
                refresh: SecretString::from("refresh-1"),
            })
            .unwrap();

        let access = store.access().unwrap().unwrap();
        let refresh = store.refresh().unwrap().unwrap();
        assert_eq!(access.expose_secret(), "access-1");
        assert_eq!(refresh.expose_secret(), "refresh-1");
    }

    #[test]
    fn test_set_access_leaves_refresh_untouched() {
        let (_dir, store) = open_store();
        store
            .store_pair(&CredentialPair {
                access: SecretString::from("access-1"),
                refresh: SecretString::from("refresh-1"),
            })
            .unwrap();

        store.set_access(&SecretString::from("access-2")).unwrap();

        assert_eq!(store.access().unwrap().unwrap().expose_secret(), "access-2");
        assert_eq!(
            store.refresh().unwrap().unwrap().expose_secret(),
            "refresh-1"
        );
    }

    #[test]
    fn test_clear_removes_both_tokens() {
        let (_dir, store) = open_store();
        store
            .store_pair(&CredentialPair {
                access: SecretString::from("access-1"),
                refresh: SecretString::from("refresh-1"),
            })
            .unwrap();

        store.clear().unwrap();

        assert!(store.access().unwrap().is_none());
        assert!(store.refresh().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = CredentialPair {
            access: SecretString::from("super-secret-access"),
            refresh: SecretString::from("super-secret-refresh"),
        };

        let debug_output = format!("{pair:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-access"));
        assert!(!debug_output.contains("super-secret-refresh"));
    }
}
