//! Cart line types and total arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// One entry in the cart: a product snapshot plus a quantity.
///
/// The line id always equals the product id; a cart never holds two lines
/// for the same product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Create a line holding one unit of `product`.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            id: product.id.clone(),
            product,
            quantity: 1,
        }
    }

    /// Price times quantity for this line.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Sum of price times quantity over all lines.
///
/// This is the single definition of a cart's total; callers recompute it
/// from the lines rather than patching a running figure.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::subtotal).sum()
}
