//! Catalog browsing commands.

use shopfront_client::Store;
use shopfront_core::ProductId;

/// Fetch the catalog and print it, optionally filtered.
///
/// # Errors
///
/// Returns an error when the catalog cannot be fetched.
pub async fn list(
    store: &Store,
    search: Option<String>,
    category: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    store.products().fetch_all().await?;
    if let Some(term) = search {
        store.products().set_search_term(term);
    }
    store.products().set_selected_category(category);

    let items = store.products().visible_items();

    #[allow(clippy::print_stdout)]
    {
        if items.is_empty() {
            println!("No products matched");
            return Ok(());
        }
        for product in &items {
            println!(
                "{:<12} {:>10}  {}  [{}]",
                product.id.as_str(),
                product.price,
                product.title,
                product.category.name,
            );
        }
        println!("{} product(s)", items.len());
    }
    Ok(())
}

/// Fetch one product and print its details.
///
/// # Errors
///
/// Returns an error for an unknown id or a failed request.
pub async fn show(store: &Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let product = store.products().fetch_by_id(&ProductId::from(id)).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", product.title);
        println!("  id:       {}", product.id);
        println!("  price:    {}", product.price);
        println!("  category: {}", product.category.name);
        println!("  stock:    {}", product.stock);
        println!("  rating:   {} ({} reviews)", product.rating, product.reviews);
        if !product.description.is_empty() {
            println!();
            println!("{}", product.description);
        }
    }
    Ok(())
}
