//! Authentication slice: login, signup, restore, logout.
//!
//! The slice owns no state of its own; loading and error flags live on
//! the shared session so views observe one source of truth. A failed
//! login or signup is a rejection: the session stays signed out and
//! nothing is persisted.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use shopfront_core::{SignupRequest, User};

use crate::api::{ApiClient, CredentialPair};
use crate::error::SliceError;
use crate::session::SessionHandle;

/// Payload returned by the login and register endpoints.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: User,
    access: String,
    refresh: String,
}

/// Shared handle to the auth operations.
#[derive(Clone)]
pub struct AuthSlice {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    api: ApiClient,
    session: SessionHandle,
}

impl AuthSlice {
    pub(crate) fn new(api: ApiClient, session: SessionHandle) -> Self {
        Self {
            inner: Arc::new(AuthInner { api, session }),
        }
    }

    /// Sign in with username and password.
    ///
    /// On success the identity and the credential pair are persisted and
    /// the session becomes authenticated.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the backend rejects the credentials or
    /// persistence fails; the session stays signed out.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SliceError> {
        self.inner.session.begin();
        let result = self
            .inner
            .api
            .post_json::<AuthResponse>(
                "users/login/",
                json!({ "username": username, "password": password }),
            )
            .await;

        match result {
            Ok(payload) => self.install(payload),
            Err(err) => Err(self.inner.session.reject(err.into())),
        }
    }

    /// Register a new account. A successful signup signs the user in.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the backend rejects the registration or
    /// persistence fails; the session stays signed out.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, SliceError> {
        let body = serde_json::to_value(request)
            .map_err(|e| SliceError::Api(format!("could not encode signup request: {e}")))?;

        self.inner.session.begin();
        let result = self
            .inner
            .api
            .post_json::<AuthResponse>("users/register/", body)
            .await;

        match result {
            Ok(payload) => self.install(payload),
            Err(err) => Err(self.inner.session.reject(err.into())),
        }
    }

    /// Restore the session from the persisted identity snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::NotAuthenticated` when no snapshot exists.
    #[instrument(skip(self))]
    pub fn restore(&self) -> Result<User, SliceError> {
        self.inner.session.begin();
        match self.inner.session.restore() {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(self.inner.session.reject(SliceError::NotAuthenticated)),
            Err(err) => Err(self.inner.session.reject(err.into())),
        }
    }

    /// Sign out: clears the identity, both tokens, and their snapshots.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::Storage` when a snapshot cannot be removed.
    pub fn logout(&self) -> Result<(), SliceError> {
        self.inner.api.credentials().clear()?;
        self.inner.session.clear()?;
        Ok(())
    }

    fn install(&self, payload: AuthResponse) -> Result<User, SliceError> {
        let pair = CredentialPair {
            access: SecretString::from(payload.access),
            refresh: SecretString::from(payload.refresh),
        };
        if let Err(err) = self.inner.api.credentials().store_pair(&pair) {
            return Err(self.inner.session.reject(err.into()));
        }
        if let Err(err) = self.inner.session.sign_in(payload.user.clone()) {
            return Err(self.inner.session.reject(err.into()));
        }
        Ok(payload.user)
    }
}
