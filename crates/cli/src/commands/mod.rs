//! Command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use shopfront_client::Store;
use shopfront_client::guard::{self, AccessPolicy};

/// Check the restored session against `policy` before a protected command.
///
/// # Errors
///
/// Returns the denial as an error; the command does not run.
pub fn ensure_access(
    store: &Store,
    policy: AccessPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    guard::check(&store.session().snapshot(), policy)?;
    Ok(())
}
