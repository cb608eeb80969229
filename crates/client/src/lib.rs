//! Shopfront Client - API client and application state.
//!
//! This crate is the engine behind the Shopfront frontends: it talks to the
//! storefront REST API, keeps the signed-in session and cart on disk, and
//! exposes the application state as a set of slices.
//!
//! # Architecture
//!
//! Everything hangs off a [`Store`], built explicitly from a
//! [`ClientConfig`]. The store owns the request client (bearer injection and
//! one-shot token refresh), the session, the persisted cart, and one slice
//! per domain concern. Slices expose async operations that resolve into
//! state; reads are synchronous snapshots.
//!
//! ```ignore
//! let store = Store::open(ClientConfig::from_env()?)?;
//! store.auth().restore();
//! store.products().fetch_all().await?;
//! for product in store.products().items() {
//!     println!("{} - {}", product.title, product.price);
//! }
//! ```
//!
//! # Modules
//!
//! - [`api`] - Authenticated request client and credential storage
//! - [`config`] - Environment-driven configuration
//! - [`guard`] - Session and admin access checks
//! - [`session`] - Signed-in user state shared across slices
//! - [`storage`] - JSON-file-per-key persistence
//! - [`store`] - State container and domain slices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod storage;
pub mod store;

pub use config::ClientConfig;
pub use error::SliceError;
pub use store::Store;
