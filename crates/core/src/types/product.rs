//! Product and category types.
//!
//! Prices are decimal throughout; the backend transports them as strings
//! and `rust_decimal`'s serde support accepts either a string or a bare
//! number, so loosely typed payloads decode without losing precision.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A category reference as it appears on the wire.
///
/// The backend is inconsistent here: catalog payloads embed the full
/// `{id, name}` object while merchant payloads may carry just the numeric
/// id. Both shapes decode into this enum and [`CategoryRef::id`] resolves
/// the identity either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// Full `{id, name}` object.
    Full(Category),
    /// Bare numeric id.
    Id(CategoryId),
}

impl CategoryRef {
    /// The category identity, regardless of wire shape.
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        match self {
            Self::Full(category) => category.id,
            Self::Id(id) => *id,
        }
    }

    /// The category name, when the wire shape carried one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Full(category) => Some(category.name.as_str()),
            Self::Id(_) => None,
        }
    }
}

impl From<Category> for CategoryRef {
    fn from(category: Category) -> Self {
        Self::Full(category)
    }
}

impl From<CategoryId> for CategoryRef {
    fn from(id: CategoryId) -> Self {
        Self::Id(id)
    }
}

/// A product as served by the public catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// URL of the hosted product image.
    pub image: String,
    pub category: Category,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: u32,
}

/// A product as served by the merchant-scoped endpoints.
///
/// Merchant payloads are sparser than catalog ones: the image and stock
/// fields may be absent on drafts, and the category may arrive as a bare
/// id (see [`CategoryRef`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantProduct {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    pub category: CategoryRef,
}

/// Where a product image comes from when submitting a product form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSource {
    /// No image submitted; any existing hosted image stays untouched.
    #[default]
    None,
    /// Local file, uploaded as a multipart file part.
    Upload(PathBuf),
    /// Already-hosted image URL; not re-transmitted.
    Hosted(String),
}
