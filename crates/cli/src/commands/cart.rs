//! Cart commands.
//!
//! The cart lives on disk and survives restarts. `add` fetches the product
//! first so the line carries a full snapshot for offline display.

use shopfront_client::Store;
use shopfront_core::ProductId;

/// Fetch `id` and add one unit to the cart.
///
/// # Errors
///
/// Returns an error for an unknown id, a failed request, or a failed
/// snapshot write.
pub async fn add(store: &Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let product = store.products().fetch_by_id(&ProductId::from(id)).await?;
    store.cart().add_line(product)?;
    show(store);
    Ok(())
}

/// Remove the line for `id`.
///
/// # Errors
///
/// Returns an error when the snapshot cannot be persisted.
pub fn remove(store: &Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    store.cart().remove_line(&ProductId::from(id))?;
    show(store);
    Ok(())
}

/// Set the quantity for `id` exactly; zero removes the line.
///
/// # Errors
///
/// Returns an error when the snapshot cannot be persisted.
pub fn set(store: &Store, id: &str, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    store.cart().set_quantity(&ProductId::from(id), quantity)?;
    show(store);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error when the snapshot cannot be persisted.
pub fn clear(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    store.cart().clear()?;
    show(store);
    Ok(())
}

/// Print the cart lines and total.
#[allow(clippy::print_stdout)]
pub fn show(store: &Store) {
    let lines = store.cart().lines();
    if lines.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in &lines {
        println!(
            "{:<12} x{:<4} {:>10}  {}",
            line.id.as_str(),
            line.quantity,
            line.subtotal(),
            line.product.title,
        );
    }
    println!("Total: {}", store.cart().total());
}
