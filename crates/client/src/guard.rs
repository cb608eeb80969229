//! Access guard for protected views and actions.
//!
//! The decision is a pure function of the session snapshot and the
//! declared policy, so callers can evaluate it anywhere without touching
//! shared state. A denial says where to send the user instead of the
//! protected content.

use thiserror::Error;

use crate::session::SessionSnapshot;

/// Access requirement of a protected view or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any signed-in user.
    Authenticated,
    /// Signed-in user carrying the administrator flag.
    AdminOnly,
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    /// No authenticated session; send the user to the login entry point.
    #[error("Sign in required")]
    LoginRequired,
    /// The session is authenticated but lacks the administrator role.
    #[error("Administrator access required")]
    AdminRequired,
}

/// Decide whether `session` may pass a gate requiring `policy`.
///
/// # Errors
///
/// Returns the [`Denial`] naming the missing requirement. An
/// unauthenticated session is always `LoginRequired`, even for
/// admin-gated content.
pub fn check(session: &SessionSnapshot, policy: AccessPolicy) -> Result<(), Denial> {
    if !session.authenticated {
        return Err(Denial::LoginRequired);
    }
    match policy {
        AccessPolicy::Authenticated => Ok(()),
        AccessPolicy::AdminOnly => {
            if session.user.as_ref().is_some_and(|user| user.is_admin) {
                Ok(())
            } else {
                Err(Denial::AdminRequired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::{User, UserId};

    fn session_with(user: Option<User>) -> SessionSnapshot {
        SessionSnapshot {
            authenticated: user.is_some(),
            user,
            loading: false,
            error: None,
        }
    }

    fn user(is_admin: bool) -> User {
        User {
            id: UserId::new("u-1"),
            username: "sam".to_owned(),
            email: "sam@example.com".to_owned(),
            is_admin,
            is_customer: !is_admin,
        }
    }

    #[test]
    fn test_signed_out_session_is_sent_to_login() {
        let session = session_with(None);
        assert_eq!(
            check(&session, AccessPolicy::Authenticated),
            Err(Denial::LoginRequired)
        );
        assert_eq!(
            check(&session, AccessPolicy::AdminOnly),
            Err(Denial::LoginRequired)
        );
    }

    #[test]
    fn test_signed_in_user_passes_authenticated_gate() {
        let session = session_with(Some(user(false)));
        assert_eq!(check(&session, AccessPolicy::Authenticated), Ok(()));
    }

    #[test]
    fn test_non_admin_is_denied_admin_content() {
        let session = session_with(Some(user(false)));
        assert_eq!(
            check(&session, AccessPolicy::AdminOnly),
            Err(Denial::AdminRequired)
        );
    }

    #[test]
    fn test_admin_passes_both_gates() {
        let session = session_with(Some(user(true)));
        assert_eq!(check(&session, AccessPolicy::Authenticated), Ok(()));
        assert_eq!(check(&session, AccessPolicy::AdminOnly), Ok(()));
    }
}
