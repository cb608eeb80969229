//! Session state: the signed-in identity and its lifecycle.
//!
//! The session starts empty, becomes authenticated through login, signup,
//! or restoring the persisted `user` snapshot, and is cleared by logout or
//! by a failed credential refresh. Mutations take a short write lock and
//! never hold it across an await point.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use shopfront_core::User;

use crate::error::SliceError;
use crate::storage::{Storage, StorageError, keys};

/// Point-in-time view of the session, consumed by the access guard and
/// by views.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// Whether the session is authenticated.
    pub authenticated: bool,
    /// Whether an auth operation is in flight.
    pub loading: bool,
    /// The most recent auth failure, until the next operation starts.
    pub error: Option<SliceError>,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    authenticated: bool,
    loading: bool,
    error: Option<SliceError>,
}

/// Shared handle to the session state.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    state: RwLock<SessionState>,
    storage: Storage,
}

impl SessionHandle {
    pub(crate) fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(SessionState::default()),
                storage,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().expect("session lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().expect("session lock poisoned")
    }

    /// Current snapshot of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read();
        SessionSnapshot {
            user: state.user.clone(),
            authenticated: state.authenticated,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Whether a user is currently signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().authenticated
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Mark an auth operation as started: loading set, error cleared.
    pub(crate) fn begin(&self) {
        let mut state = self.write();
        state.loading = true;
        state.error = None;
    }

    /// Record an auth failure and stop loading. Returns the error for
    /// direct propagation.
    pub(crate) fn reject(&self, error: SliceError) -> SliceError {
        let mut state = self.write();
        state.loading = false;
        state.error = Some(error.clone());
        error
    }

    /// Install `user` as the signed-in identity and persist the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the snapshot cannot be persisted; the
    /// in-memory session is not modified in that case.
    pub(crate) fn sign_in(&self, user: User) -> Result<(), StorageError> {
        self.inner.storage.write(keys::USER, &user)?;
        let mut state = self.write();
        state.user = Some(user);
        state.authenticated = true;
        state.loading = false;
        state.error = None;
        Ok(())
    }

    /// Restore the identity from the persisted snapshot, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure. A malformed snapshot
    /// is discarded and treated as absent.
    pub(crate) fn restore(&self) -> Result<Option<User>, StorageError> {
        let user = self.inner.storage.read_or_discard::<User>(keys::USER)?;
        if let Some(user) = &user {
            let mut state = self.write();
            state.user = Some(user.clone());
            state.authenticated = true;
            state.loading = false;
        }
        Ok(user)
    }

    /// Clear the identity and remove the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the snapshot cannot be removed; the
    /// in-memory session is cleared regardless.
    pub(crate) fn clear(&self) -> Result<(), StorageError> {
        {
            let mut state = self.write();
            state.user = None;
            state.authenticated = false;
            state.loading = false;
        }
        self.inner.storage.remove(keys::USER)
    }

    /// Expire the session after a failed credential refresh. Storage
    /// failures are logged and swallowed; the caller is already unwinding
    /// an auth failure.
    pub(crate) fn expire(&self) {
        if let Err(err) = self.clear() {
            warn!(error = %err, "Could not remove persisted user during session expiry");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::UserId;

    fn test_user(name: &str) -> User {
        User {
            id: UserId::new(format!("u-{name}")),
            username: name.to_owned(),
            email: format!("{name}@example.com"),
            is_admin: false,
            is_customer: true,
        }
    }

    fn open_session() -> (tempfile::TempDir, SessionHandle) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, SessionHandle::new(storage))
    }

    #[test]
    fn test_sign_in_authenticates_and_persists() {
        let (dir, session) = open_session();
        session.sign_in(test_user("sam")).unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().username, "sam");
        assert!(dir.path().join("user.json").exists());
    }

    #[test]
    fn test_restore_picks_up_persisted_identity() {
        let (dir, session) = open_session();
        session.sign_in(test_user("sam")).unwrap();

        // A fresh handle over the same directory sees the same identity.
        let storage = Storage::open(dir.path()).unwrap();
        let fresh = SessionHandle::new(storage);
        assert!(!fresh.is_authenticated());

        let restored = fresh.restore().unwrap();
        assert_eq!(restored.unwrap().username, "sam");
        assert!(fresh.is_authenticated());
    }

    #[test]
    fn test_restore_without_snapshot_stays_signed_out() {
        let (_dir, session) = open_session();
        assert!(session.restore().unwrap().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clear_removes_identity_and_snapshot() {
        let (dir, session) = open_session();
        session.sign_in(test_user("sam")).unwrap();

        session.clear().unwrap();

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(!dir.path().join("user.json").exists());
    }

    #[test]
    fn test_reject_records_error_and_stops_loading() {
        let (_dir, session) = open_session();
        session.begin();
        assert!(session.snapshot().loading);

        session.reject(SliceError::Api("bad credentials".to_owned()));

        let snapshot = session.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_some());
        assert!(!snapshot.authenticated);
    }
}
