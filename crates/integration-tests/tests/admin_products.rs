//! Integration tests for merchant product management and the dashboard.
//!
//! These drive the real multipart submission path against the mock
//! backend, which records the parts it received, so the tests can assert
//! both the echoed entity and the exact wire shape.

use std::fs;

use rust_decimal::Decimal;
use serde_json::json;
use shopfront_client::SliceError;
use shopfront_client::store::{NewProduct, ProductUpdate};
use shopfront_core::{Category, CategoryId, CategoryRef, ImageSource, ProductId};
use shopfront_integration_tests::{ReceivedPart, TestContext};

async fn merchant_context() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.store
        .auth()
        .login("meg", "secret")
        .await
        .expect("Failed to log in");
    ctx
}

fn new_product(title: &str, image: ImageSource) -> NewProduct {
    NewProduct {
        title: title.to_owned(),
        description: "warm light".to_owned(),
        price: Decimal::new(49_50, 2),
        category: CategoryRef::Full(Category {
            id: CategoryId::new(7),
            name: "Lighting".to_owned(),
        }),
        image,
        stock: Some(3),
    }
}

// =============================================================================
// Create & the multipart wire shape
// =============================================================================

#[tokio::test]
async fn test_create_normalizes_category_and_uploads_image() {
    let ctx = merchant_context().await;
    let image_path = ctx.storage_path().join("lamp.png");
    fs::write(&image_path, b"PNGDATA").expect("Failed to write image fixture");

    let created = ctx
        .store
        .admin_products()
        .create(&new_product(
            "Desk Lamp",
            ImageSource::Upload(image_path),
        ))
        .await
        .expect("Failed to create product");

    // The backend echoes the category as a bare id and the image as a
    // hosted media path; both decode cleanly.
    assert_eq!(created.category, CategoryRef::Id(CategoryId::new(7)));
    assert_eq!(created.image.as_deref(), Some("/media/lamp.png"));
    assert_eq!(created.stock, Some(3));
    assert_eq!(ctx.store.admin_products().items().len(), 1);

    let parts = ctx.backend.last_parts();
    assert!(parts.contains(&ReceivedPart::Text {
        name: "category".to_owned(),
        value: "7".to_owned(),
    }));
    assert!(parts.contains(&ReceivedPart::File {
        name: "image".to_owned(),
        file_name: "lamp.png".to_owned(),
        len: 7,
    }));
}

#[tokio::test]
async fn test_hosted_image_is_not_resent() {
    let ctx = merchant_context().await;

    let created = ctx
        .store
        .admin_products()
        .create(&new_product(
            "Desk Lamp",
            ImageSource::Hosted("https://cdn.example.com/lamp.jpg".to_owned()),
        ))
        .await
        .expect("Failed to create product");

    assert_eq!(created.image, None);
    let parts = ctx.backend.last_parts();
    assert!(
        !parts
            .iter()
            .any(|part| matches!(part, ReceivedPart::File { .. }))
    );
    assert!(!parts.iter().any(|part| matches!(
        part,
        ReceivedPart::Text { name, .. } if name == "image"
    )));
}

// =============================================================================
// Update & delete
// =============================================================================

#[tokio::test]
async fn test_update_replaces_the_entry_in_place() {
    let ctx = merchant_context().await;
    let first = ctx
        .store
        .admin_products()
        .create(&new_product("Desk Lamp", ImageSource::None))
        .await
        .expect("Failed to create product");
    ctx.store
        .admin_products()
        .create(&new_product("Floor Lamp", ImageSource::None))
        .await
        .expect("Failed to create product");

    let update = ProductUpdate {
        id: first.id.clone(),
        title: "Desk Lamp v2".to_owned(),
        description: "warmer light".to_owned(),
        price: Decimal::new(5_900, 2),
        category: CategoryRef::Id(CategoryId::new(7)),
        image: ImageSource::None,
        stock: Some(5),
    };
    let updated = ctx
        .store
        .admin_products()
        .update(&update)
        .await
        .expect("Failed to update product");

    assert_eq!(updated.title, "Desk Lamp v2");
    let items = ctx.store.admin_products().items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, first.id);
    assert_eq!(items[0].title, "Desk Lamp v2");
    assert_eq!(items[0].price, Decimal::new(5_900, 2));
    assert_eq!(items[1].title, "Floor Lamp");
}

#[tokio::test]
async fn test_update_unknown_id_is_not_inserted() {
    let ctx = merchant_context().await;
    ctx.store
        .admin_products()
        .create(&new_product("Desk Lamp", ImageSource::None))
        .await
        .expect("Failed to create product");

    let update = ProductUpdate {
        id: ProductId::new("mp-404"),
        title: "Ghost".to_owned(),
        description: String::new(),
        price: Decimal::ONE,
        category: CategoryRef::Id(CategoryId::new(7)),
        image: ImageSource::None,
        stock: None,
    };
    let err = ctx
        .store
        .admin_products()
        .update(&update)
        .await
        .expect_err("Updating an unknown id should fail");

    assert!(matches!(err, SliceError::NotFound(_)));
    let items = ctx.store.admin_products().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Desk Lamp");
}

#[tokio::test]
async fn test_delete_removes_exactly_the_matching_entry() {
    let ctx = merchant_context().await;
    let first = ctx
        .store
        .admin_products()
        .create(&new_product("Desk Lamp", ImageSource::None))
        .await
        .expect("Failed to create product");
    let second = ctx
        .store
        .admin_products()
        .create(&new_product("Floor Lamp", ImageSource::None))
        .await
        .expect("Failed to create product");

    ctx.store
        .admin_products()
        .delete(&first.id)
        .await
        .expect("Failed to delete product");

    let items = ctx.store.admin_products().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, second.id);
    assert_eq!(ctx.backend.merchant_products().len(), 1);
}

// =============================================================================
// Categories & dashboard
// =============================================================================

#[tokio::test]
async fn test_fetch_categories_populates_the_held_list() {
    let ctx = merchant_context().await;
    ctx.backend.seed_categories(vec![
        json!({ "id": 7, "name": "Lighting" }),
        json!({ "id": 8, "name": "Furniture" }),
    ]);

    let categories = ctx
        .store
        .admin_products()
        .fetch_categories()
        .await
        .expect("Failed to fetch categories");

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].id, CategoryId::new(7));
    assert_eq!(ctx.store.admin_products().categories().len(), 2);
}

#[tokio::test]
async fn test_dashboard_stats_decode_numeric_revenue() {
    let ctx = merchant_context().await;
    ctx.backend.set_stats(json!({
        "total_revenue": 1280.5,
        "total_orders": 42,
        "total_products": 7,
        "pending_orders": 3,
    }));

    let stats = ctx
        .store
        .dashboard()
        .fetch()
        .await
        .expect("Failed to fetch dashboard stats");

    assert_eq!(stats.total_revenue, Decimal::new(12_805, 1));
    assert_eq!(stats.total_orders, 42);
    assert_eq!(stats.pending_orders, 3);
    let held = ctx
        .store
        .dashboard()
        .stats()
        .expect("Fetch should retain the stats");
    assert_eq!(held, stats);
}
