//! Application state container and domain slices.
//!
//! [`Store`] is constructed explicitly from a [`ClientConfig`] and owns
//! every slice, the cart, the session, and the request client. There is
//! no global instance; tests and embedders build as many independent
//! stores as they need.

mod admin;
mod auth;
mod cart;
mod dashboard;
mod orders;
mod products;

pub use admin::{AdminProductsSlice, NewProduct, ProductUpdate};
pub use auth::AuthSlice;
pub use cart::CartStore;
pub use dashboard::DashboardSlice;
pub use orders::OrdersSlice;
pub use products::ProductsSlice;

use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiClient, CredentialStore};
use crate::config::ClientConfig;
use crate::error::SliceError;
use crate::session::SessionHandle;
use crate::storage::{Storage, StorageError};

/// Loading/error pair every slice carries through its operations.
///
/// An operation begins by setting the loading flag and clearing the
/// previous error, then resolves exactly once: fulfilled (flag cleared)
/// or rejected (flag cleared, error recorded).
#[derive(Debug, Default, Clone)]
pub struct OpState {
    loading: bool,
    error: Option<SliceError>,
}

impl OpState {
    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fulfill(&mut self) {
        self.loading = false;
    }

    fn reject(&mut self, error: SliceError) {
        self.loading = false;
        self.error = Some(error);
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The most recent failure, until the next operation starts.
    #[must_use]
    pub const fn error(&self) -> Option<&SliceError> {
        self.error.as_ref()
    }
}

/// Error constructing a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage directory could not be opened or read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Application state container.
///
/// This struct is cheaply cloneable via `Arc`; all clones share the same
/// slices, cart, session, and request client.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionHandle,
    cart: CartStore,
    auth: AuthSlice,
    products: ProductsSlice,
    orders: OrdersSlice,
    admin_products: AdminProductsSlice,
    dashboard: DashboardSlice,
}

impl Store {
    /// Open the store: create the storage directory, restore the cart
    /// snapshot, and wire the request client to the credential store and
    /// session.
    ///
    /// The session starts signed out even when a `user` snapshot exists;
    /// call [`AuthSlice::restore`] to pick it up.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` when the storage directory cannot be
    /// opened or the cart snapshot cannot be read.
    pub fn open(config: ClientConfig) -> Result<Self, StoreError> {
        let storage = Storage::open(config.storage_dir.clone())?;
        let session = SessionHandle::new(storage.clone());
        let credentials = CredentialStore::new(storage.clone());
        let api = ApiClient::new(&config, credentials, session.clone());
        let cart = CartStore::open(storage.clone())?;

        let auth = AuthSlice::new(api.clone(), session.clone());
        let products = ProductsSlice::new(api.clone());
        let orders = OrdersSlice::new(storage, session.clone());
        let admin_products = AdminProductsSlice::new(api.clone());
        let dashboard = DashboardSlice::new(api.clone());

        Ok(Self {
            inner: Arc::new(StoreInner {
                config,
                api,
                session,
                cart,
                auth,
                products,
                orders,
                admin_products,
                dashboard,
            }),
        })
    }

    /// Get a reference to the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the request client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the auth slice.
    #[must_use]
    pub fn auth(&self) -> &AuthSlice {
        &self.inner.auth
    }

    /// Get a reference to the catalog slice.
    #[must_use]
    pub fn products(&self) -> &ProductsSlice {
        &self.inner.products
    }

    /// Get a reference to the orders slice.
    #[must_use]
    pub fn orders(&self) -> &OrdersSlice {
        &self.inner.orders
    }

    /// Get a reference to the merchant product slice.
    #[must_use]
    pub fn admin_products(&self) -> &AdminProductsSlice {
        &self.inner.admin_products
    }

    /// Get a reference to the dashboard slice.
    #[must_use]
    pub fn dashboard(&self) -> &DashboardSlice {
        &self.inner.dashboard
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stores_are_independent() {
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let config_for = |dir: &tempfile::TempDir| ClientConfig {
            api_base: url::Url::parse("http://127.0.0.1:8000/api/").unwrap(),
            storage_dir: dir.path().to_path_buf(),
            http_timeout: std::time::Duration::from_secs(5),
        };

        let first = Store::open(config_for(&first_dir)).unwrap();
        let second = Store::open(config_for(&second_dir)).unwrap();

        first.cart().toggle_visible();
        assert!(first.cart().is_visible());
        assert!(!second.cart().is_visible());
    }

    #[test]
    fn test_clones_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(ClientConfig {
            api_base: url::Url::parse("http://127.0.0.1:8000/api/").unwrap(),
            storage_dir: dir.path().to_path_buf(),
            http_timeout: std::time::Duration::from_secs(5),
        })
        .unwrap();

        let clone = store.clone();
        store.cart().toggle_visible();
        assert!(clone.cart().is_visible());
    }

    #[test]
    fn test_op_state_lifecycle() {
        let mut op = OpState::default();
        assert!(!op.is_loading());

        op.begin();
        assert!(op.is_loading());
        assert!(op.error().is_none());

        op.reject(SliceError::Api("boom".to_owned()));
        assert!(!op.is_loading());
        assert!(op.error().is_some());

        // The next operation clears the previous error.
        op.begin();
        assert!(op.error().is_none());
        op.fulfill();
        assert!(!op.is_loading());
    }
}
