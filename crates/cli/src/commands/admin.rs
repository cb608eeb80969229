//! Merchant commands: product management and the dashboard.
//!
//! Every command here runs behind the admin guard; a customer session is
//! turned away before any request is made.

use std::path::PathBuf;

use rust_decimal::Decimal;

use shopfront_client::Store;
use shopfront_client::store::{NewProduct, ProductUpdate};
use shopfront_core::{CategoryId, CategoryRef, ImageSource, ProductId};

/// Product fields shared by `add-product` and `update-product`.
#[derive(clap::Args)]
pub struct ProductArgs {
    /// Product title
    #[arg(long)]
    pub title: String,

    /// Product description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Price, e.g. 49.50
    #[arg(long)]
    pub price: Decimal,

    /// Category id
    #[arg(long)]
    pub category: i64,

    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Units in stock
    #[arg(long)]
    pub stock: Option<u32>,
}

/// List the merchant's own products.
///
/// # Errors
///
/// Returns an error when the listing cannot be fetched.
pub async fn products(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let items = store.admin_products().fetch_all().await?;

    #[allow(clippy::print_stdout)]
    {
        if items.is_empty() {
            println!("No products yet");
            return Ok(());
        }
        for product in &items {
            println!(
                "{:<12} {:>10}  {}  (category {})",
                product.id.as_str(),
                product.price,
                product.title,
                product.category.id().as_i64(),
            );
        }
    }
    Ok(())
}

/// Create a product.
///
/// # Errors
///
/// Returns an error when the backend rejects the product or the image
/// file cannot be read.
pub async fn add_product(
    store: &Store,
    args: ProductArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = args.image.map_or(ImageSource::None, ImageSource::Upload);
    let product = store
        .admin_products()
        .create(&NewProduct {
            title: args.title,
            description: args.description,
            price: args.price,
            category: CategoryRef::Id(CategoryId::new(args.category)),
            image,
            stock: args.stock,
        })
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Created {}: {}", product.id.as_str(), product.title);
    }
    Ok(())
}

/// Update a product. Every field is sent; an omitted image leaves the
/// upload out of the form entirely.
///
/// # Errors
///
/// Returns an error when the backend rejects the update or the image
/// file cannot be read.
pub async fn update_product(
    store: &Store,
    id: &str,
    args: ProductArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = args.image.map_or(ImageSource::None, ImageSource::Upload);
    let product = store
        .admin_products()
        .update(&ProductUpdate {
            id: ProductId::from(id),
            title: args.title,
            description: args.description,
            price: args.price,
            category: CategoryRef::Id(CategoryId::new(args.category)),
            image,
            stock: args.stock,
        })
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Updated {}: {}", product.id.as_str(), product.title);
    }
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error when the backend rejects the deletion.
pub async fn delete_product(store: &Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    store.admin_products().delete(&ProductId::from(id)).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Deleted {id}");
    }
    Ok(())
}

/// List the product categories.
///
/// # Errors
///
/// Returns an error when the categories cannot be fetched.
pub async fn categories(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let categories = store.admin_products().fetch_categories().await?;

    #[allow(clippy::print_stdout)]
    {
        for category in &categories {
            println!("{:>6}  {}", category.id.as_i64(), category.name);
        }
    }
    Ok(())
}

/// Show the merchant dashboard.
///
/// # Errors
///
/// Returns an error when the stats cannot be fetched.
pub async fn stats(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let stats = store.dashboard().fetch().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Revenue:         {}", stats.total_revenue);
        println!("Orders:          {}", stats.total_orders);
        println!("Products:        {}", stats.total_products);
        println!("Pending orders:  {}", stats.pending_orders);
    }
    Ok(())
}
