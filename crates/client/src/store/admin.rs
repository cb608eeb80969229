//! Merchant product management slice.
//!
//! Products are submitted as multipart forms: scalar fields as text
//! parts, the category always normalized to its numeric id, and the
//! image only when a local file is being uploaded. An already-hosted
//! image URL is never re-transmitted.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::instrument;

use shopfront_core::{Category, CategoryRef, ImageSource, MerchantProduct, ProductId};

use crate::api::{ApiClient, FormPart};
use crate::error::SliceError;
use crate::store::OpState;

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: CategoryRef,
    pub image: ImageSource,
    pub stock: Option<u32>,
}

/// Input for updating a product. Carries the full field set; the backend
/// replaces the listed fields wholesale.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: CategoryRef,
    pub image: ImageSource,
    pub stock: Option<u32>,
}

#[derive(Debug, Default)]
struct AdminProductsState {
    items: Vec<MerchantProduct>,
    categories: Vec<Category>,
    op: OpState,
}

/// Shared handle to the merchant product state.
#[derive(Clone)]
pub struct AdminProductsSlice {
    inner: Arc<AdminProductsInner>,
}

struct AdminProductsInner {
    state: RwLock<AdminProductsState>,
    api: ApiClient,
}

impl AdminProductsSlice {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(AdminProductsInner {
                state: RwLock::new(AdminProductsState::default()),
                api,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, AdminProductsState> {
        self.inner.state.read().expect("admin products lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, AdminProductsState> {
        self.inner
            .state
            .write()
            .expect("admin products lock poisoned")
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

    /// Fetch the merchant's own products, replacing the held collection.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<MerchantProduct>, SliceError> {
        self.begin();
        match self
            .inner
            .api
            .get_json::<Vec<MerchantProduct>>("products/my-products/")
            .await
        {
            Ok(items) => {
                let mut state = self.write();
                state.op.fulfill();
                state.items.clone_from(&items);
                Ok(items)
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    /// Create a product. The created entry is appended to the held
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails or the image file
    /// cannot be read.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create(&self, product: &NewProduct) -> Result<MerchantProduct, SliceError> {
        self.begin();
        let parts = form_parts(
            &product.title,
            &product.description,
            product.price,
            &product.category,
            &product.image,
            product.stock,
        );
        match self
            .inner
            .api
            .post_multipart::<MerchantProduct>("products/", parts)
            .await
        {
            Ok(created) => {
                let mut state = self.write();
                state.op.fulfill();
                state.items.push(created.clone());
                Ok(created)
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    /// Update a product in place, preserving its position in the held
    /// collection. An entry the collection does not hold is not inserted.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails or the image file
    /// cannot be read.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub async fn update(&self, product: &ProductUpdate) -> Result<MerchantProduct, SliceError> {
        self.begin();
        let parts = form_parts(
            &product.title,
            &product.description,
            product.price,
            &product.category,
            &product.image,
            product.stock,
        );
        match self
            .inner
            .api
            .put_multipart::<MerchantProduct>(&format!("products/{}/", product.id), parts)
            .await
        {
            Ok(updated) => {
                let mut state = self.write();
                state.op.fulfill();
                if let Some(slot) = state.items.iter_mut().find(|item| item.id == updated.id) {
                    *slot = updated.clone();
                }
                Ok(updated)
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    /// Delete a product by id, removing exactly the matching entry.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails; the held collection
    /// is left untouched in that case.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), SliceError> {
        self.begin();
        match self.inner.api.delete(&format!("products/{id}/")).await {
            Ok(()) => {
                let mut state = self.write();
                state.op.fulfill();
                state.items.retain(|item| &item.id != id);
                Ok(())
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    /// Fetch the category list used by product forms.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, SliceError> {
        self.begin();
        match self
            .inner
            .api
            .get_json::<Vec<Category>>("products/categories/")
            .await
        {
            Ok(categories) => {
                let mut state = self.write();
                state.op.fulfill();
                state.categories.clone_from(&categories);
                Ok(categories)
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the merchant's held products.
    #[must_use]
    pub fn items(&self) -> Vec<MerchantProduct> {
        self.read().items.clone()
    }

    /// Snapshot of the held category list.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.read().categories.clone()
    }

    /// Whether a merchant product operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().op.is_loading()
    }

    /// The most recent failure, until the next operation starts.
    #[must_use]
    pub fn error(&self) -> Option<SliceError> {
        self.read().op.error().cloned()
    }
}

/// Build the multipart parts for a product form.
///
/// The category travels as its numeric id in a text part regardless of
/// which wire shape it was resolved from. A hosted image URL produces no
/// part at all; only a local upload adds a file part.
fn form_parts(
    title: &str,
    description: &str,
    price: Decimal,
    category: &CategoryRef,
    image: &ImageSource,
    stock: Option<u32>,
) -> Vec<FormPart> {
    let mut parts = vec![
        FormPart::text("title", title),
        FormPart::text("description", description),
        FormPart::text("price", price.to_string()),
        FormPart::text("category", category.id().to_string()),
    ];
    if let ImageSource::Upload(path) = image {
        parts.push(FormPart::file("image", path.clone()));
    }
    if let Some(stock) = stock {
        parts.push(FormPart::text("stock", stock.to_string()));
    }
    parts
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::CategoryId;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_form_parts_normalize_category_to_numeric_id() {
        let from_object = form_parts(
            "Desk Lamp",
            "warm light",
            decimal("49.50"),
            &CategoryRef::Full(Category {
                id: CategoryId::new(7),
                name: "Lighting".to_owned(),
            }),
            &ImageSource::None,
            None,
        );
        let from_scalar = form_parts(
            "Desk Lamp",
            "warm light",
            decimal("49.50"),
            &CategoryRef::Id(CategoryId::new(7)),
            &ImageSource::None,
            None,
        );

        let category_part = FormPart::text("category", "7");
        assert!(from_object.contains(&category_part));
        assert!(from_scalar.contains(&category_part));
    }

    #[test]
    fn test_form_parts_skip_hosted_image() {
        let parts = form_parts(
            "Desk Lamp",
            "",
            decimal("49.50"),
            &CategoryRef::Id(CategoryId::new(7)),
            &ImageSource::Hosted("https://cdn.example.com/lamp.jpg".to_owned()),
            None,
        );

        assert!(
            !parts
                .iter()
                .any(|part| matches!(part, FormPart::File { .. }))
        );
        assert!(!parts.iter().any(|part| matches!(
            part,
            FormPart::Text { name, .. } if name == "image"
        )));
    }

    #[test]
    fn test_form_parts_include_local_upload() {
        let parts = form_parts(
            "Desk Lamp",
            "",
            decimal("49.50"),
            &CategoryRef::Id(CategoryId::new(7)),
            &ImageSource::Upload("/tmp/lamp.jpg".into()),
            Some(12),
        );

        assert!(parts.contains(&FormPart::file("image", "/tmp/lamp.jpg")));
        assert!(parts.contains(&FormPart::text("stock", "12")));
    }

    #[test]
    fn test_form_parts_render_price_as_plain_decimal() {
        let parts = form_parts(
            "Desk Lamp",
            "",
            decimal("49.50"),
            &CategoryRef::Id(CategoryId::new(7)),
            &ImageSource::None,
            None,
        );

        assert!(parts.contains(&FormPart::text("price", "49.50")));
    }
}
