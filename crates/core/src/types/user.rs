//! User identity and registration types.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// The signed-in user as returned by the auth endpoints and persisted
/// in the local `user` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Grants access to the merchant dashboard and product management.
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_customer: bool,
}

/// Registration payload for the signup endpoint.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_customer: Option<bool>,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .field("is_customer", &self.is_customer)
            .finish()
    }
}
