//! Checkout and order history commands.

use shopfront_client::Store;
use shopfront_core::{Order, OrderId, OrderStatus, ShippingAddress};

/// Shipping and payment details collected at checkout.
#[derive(clap::Args)]
pub struct CheckoutArgs {
    /// Recipient full name
    #[arg(long)]
    pub full_name: String,

    /// Street address
    #[arg(long)]
    pub address: String,

    /// City
    #[arg(long)]
    pub city: String,

    /// State or province
    #[arg(long)]
    pub state: String,

    /// Postal code
    #[arg(long)]
    pub zip_code: String,

    /// Country
    #[arg(long)]
    pub country: String,

    /// Payment method recorded on the order
    #[arg(long, default_value = "cash_on_delivery")]
    pub payment: String,
}

/// Place an order from the current cart, then empty the cart.
///
/// # Errors
///
/// Returns an error when the cart is empty or the order cannot be
/// persisted; the cart is kept in that case.
pub fn checkout(store: &Store, args: CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let lines = store.cart().lines();
    if lines.is_empty() {
        return Err("Cart is empty; add products before checking out".into());
    }

    let shipping = ShippingAddress {
        full_name: args.full_name,
        address: args.address,
        city: args.city,
        state: args.state,
        zip_code: args.zip_code,
        country: args.country,
    };
    let order = store
        .orders()
        .create(lines, store.cart().total(), shipping, &args.payment)?;
    store.cart().clear()?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Order {} placed: {} line(s), total {}",
            order.id.as_str(),
            order.items.len(),
            order.total,
        );
    }
    Ok(())
}

/// Print the order history.
///
/// # Errors
///
/// Returns an error when the history cannot be read.
pub fn list(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let orders = store.orders().fetch_all()?;
    if orders.is_empty() {
        #[allow(clippy::print_stdout)]
        {
            println!("No orders yet");
        }
        return Ok(());
    }
    print_orders(&orders);
    Ok(())
}

/// Update an order's status in the held collection and print the result.
///
/// The change is view state: it is not written back to the history
/// snapshot and does not survive a restart.
///
/// # Errors
///
/// Returns an error when the history cannot be read.
pub fn set_status(
    store: &Store,
    id: &str,
    status: OrderStatus,
) -> Result<(), Box<dyn std::error::Error>> {
    store.orders().fetch_all()?;
    store.orders().update_status(&OrderId::from(id), status);
    print_orders(&store.orders().orders());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_orders(orders: &[Order]) {
    for order in orders {
        println!(
            "{}  {}  {:>10}  {} line(s)  {}",
            order.id.as_str(),
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.total,
            order.items.len(),
            order.status,
        );
    }
}
