//! Product catalog slice.
//!
//! Holds the fetched catalog, the currently selected product, and the
//! view filters (search term, category). Fetches replace the held
//! collection wholesale; filters are local state and never trigger a
//! request.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::instrument;

use shopfront_core::{Product, ProductId};

use crate::api::{ApiClient, ApiError};
use crate::error::SliceError;
use crate::store::OpState;

#[derive(Debug, Default)]
struct ProductsState {
    items: Vec<Product>,
    selected: Option<Product>,
    search_term: String,
    selected_category: Option<String>,
    op: OpState,
}

/// Shared handle to the catalog state.
#[derive(Clone)]
pub struct ProductsSlice {
    inner: Arc<ProductsInner>,
}

struct ProductsInner {
    state: RwLock<ProductsState>,
    api: ApiClient,
}

impl ProductsSlice {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(ProductsInner {
                state: RwLock::new(ProductsState::default()),
                api,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProductsState> {
        self.inner.state.read().expect("products lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProductsState> {
        self.inner.state.write().expect("products lock poisoned")
    }

    fn begin(&self) {
        self.write().op.begin();
    }

    fn reject(&self, error: SliceError) -> SliceError {
        self.write().op.reject(error.clone());
        error
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Fetch the full catalog, replacing the held collection.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails; the previously held
    /// collection is left untouched.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<Product>, SliceError> {
        self.begin();
        match self.inner.api.get_json::<Vec<Product>>("products/").await {
            Ok(items) => {
                let mut state = self.write();
                state.op.fulfill();
                state.items.clone_from(&items);
                Ok(items)
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    /// Fetch one product into the selected slot.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::NotFound` for an unknown id; the selected slot
    /// is cleared on any failure.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_by_id(&self, id: &ProductId) -> Result<Product, SliceError> {
        self.begin();
        match self
            .inner
            .api
            .get_json::<Product>(&format!("products/{id}"))
            .await
        {
            Ok(product) => {
                let mut state = self.write();
                state.op.fulfill();
                state.selected = Some(product.clone());
                Ok(product)
            }
            Err(err) => {
                self.write().selected = None;
                let err = match err {
                    ApiError::NotFound(_) => SliceError::NotFound(format!("product {id}")),
                    other => other.into(),
                };
                Err(self.reject(err))
            }
        }
    }

    // =========================================================================
    // Local view state
    // =========================================================================

    /// Set the search term applied by [`Self::visible_items`].
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.write().search_term = term.into();
    }

    /// Filter the catalog to one category name, or `None` for all.
    pub fn set_selected_category(&self, category: Option<String>) {
        self.write().selected_category = category;
    }

    /// Clear the selected product.
    pub fn clear_selected(&self) {
        self.write().selected = None;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the full held collection.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.read().items.clone()
    }

    /// The held collection filtered by the current search term and
    /// category. The search term matches title or description,
    /// case-insensitively.
    #[must_use]
    pub fn visible_items(&self) -> Vec<Product> {
        let state = self.read();
        let term = state.search_term.to_lowercase();
        state
            .items
            .iter()
            .filter(|product| {
                let matches_term = term.is_empty()
                    || product.title.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term);
                let matches_category = state
                    .selected_category
                    .as_ref()
                    .is_none_or(|category| &product.category.name == category);
                matches_term && matches_category
            })
            .cloned()
            .collect()
    }

    /// The currently selected product, if any.
    #[must_use]
    pub fn selected(&self) -> Option<Product> {
        self.read().selected.clone()
    }

    /// Whether a catalog operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().op.is_loading()
    }

    /// The most recent catalog failure, until the next operation starts.
    #[must_use]
    pub fn error(&self) -> Option<SliceError> {
        self.read().op.error().cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionHandle;
    use crate::storage::Storage;
    use shopfront_core::{Category, CategoryId};

    fn offline_slice() -> (tempfile::TempDir, ProductsSlice) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let config = ClientConfig {
            api_base: url::Url::parse("http://127.0.0.1:9/api/").unwrap(),
            storage_dir: dir.path().to_path_buf(),
            http_timeout: std::time::Duration::from_secs(1),
        };
        let api = ApiClient::new(
            &config,
            crate::api::CredentialStore::new(storage.clone()),
            SessionHandle::new(storage),
        );
        (dir, ProductsSlice::new(api))
    }

    fn product(id: &str, title: &str, description: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            description: description.to_owned(),
            price: rust_decimal::Decimal::ONE,
            image: String::new(),
            category: Category {
                id: CategoryId::new(1),
                name: category.to_owned(),
            },
            stock: 1,
            rating: 0.0,
            reviews: 0,
        }
    }

    fn seed(slice: &ProductsSlice, items: Vec<Product>) {
        slice.write().items = items;
    }

    #[test]
    fn test_visible_items_matches_title_and_description() {
        let (_dir, slice) = offline_slice();
        seed(
            &slice,
            vec![
                product("p-1", "Desk Lamp", "warm light", "Lighting"),
                product("p-2", "Office Chair", "a LAMP-free product", "Furniture"),
                product("p-3", "Bookshelf", "oak", "Furniture"),
            ],
        );

        slice.set_search_term("lamp");
        let titles: Vec<String> = slice
            .visible_items()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Desk Lamp", "Office Chair"]);
    }

    #[test]
    fn test_visible_items_filters_by_category_name() {
        let (_dir, slice) = offline_slice();
        seed(
            &slice,
            vec![
                product("p-1", "Desk Lamp", "", "Lighting"),
                product("p-2", "Office Chair", "", "Furniture"),
            ],
        );

        slice.set_selected_category(Some("Furniture".to_owned()));
        let visible = slice.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible.first().map(|p| p.title.clone()), Some("Office Chair".to_owned()));

        slice.set_selected_category(None);
        assert_eq!(slice.visible_items().len(), 2);
    }

    #[test]
    fn test_empty_search_term_matches_everything() {
        let (_dir, slice) = offline_slice();
        seed(
            &slice,
            vec![
                product("p-1", "Desk Lamp", "", "Lighting"),
                product("p-2", "Office Chair", "", "Furniture"),
            ],
        );

        slice.set_search_term("lamp");
        slice.set_search_term("");
        assert_eq!(slice.visible_items().len(), 2);
    }

    #[test]
    fn test_clear_selected_drops_the_slot() {
        let (_dir, slice) = offline_slice();
        slice.write().selected = Some(product("p-1", "Desk Lamp", "", "Lighting"));

        slice.clear_selected();
        assert!(slice.selected().is_none());
    }
}
