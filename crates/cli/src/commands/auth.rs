//! Session commands: login, signup, logout, whoami.

use shopfront_client::Store;
use shopfront_core::SignupRequest;

/// Sign in and persist the session for later runs.
///
/// # Errors
///
/// Returns an error when the backend rejects the credentials.
pub async fn login(
    store: &Store,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = store.auth().login(username, password).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Signed in as {} <{}>", user.username, user.email);
        if user.is_admin {
            println!("Merchant tools available: shopfront admin --help");
        }
    }
    Ok(())
}

/// Register a new account. A successful signup signs in immediately.
///
/// # Errors
///
/// Returns an error when the backend rejects the registration.
pub async fn signup(
    store: &Store,
    username: &str,
    email: &str,
    password: &str,
    merchant: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = SignupRequest {
        username: username.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
        is_admin: Some(merchant),
        is_customer: Some(!merchant),
    };
    let user = store.auth().signup(&request).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Account created: {} <{}>", user.username, user.email);
    }
    Ok(())
}

/// Sign out and remove the persisted session and tokens.
///
/// # Errors
///
/// Returns an error when a persisted snapshot cannot be removed.
pub fn logout(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    store.auth().logout()?;

    #[allow(clippy::print_stdout)]
    {
        println!("Signed out");
    }
    Ok(())
}

/// Show the signed-in user, if any.
#[allow(clippy::print_stdout)]
pub fn whoami(store: &Store) {
    match store.session().user() {
        Some(user) => {
            let role = if user.is_admin { "merchant" } else { "customer" };
            println!("{} <{}> ({role})", user.username, user.email);
        }
        None => println!("Not signed in"),
    }
}
