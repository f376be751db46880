//! Product listing, categories and pagination against the fake backend.

#![allow(clippy::unwrap_used)]

use bazaar_core::{CategoryId, ProductId};
use bazaar_integration_tests::FakeBackend;
use bazaar_storefront::models::CategoryFilter;
use bazaar_storefront::services::{ProductQuery, SortOrder};
use bazaar_storefront::session::MemoryStorage;
use serde_json::{Value, json};

fn products(count: i64) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| {
                json!({
                    "id": i,
                    "name": format!("Batik Sarong {i}"),
                    "description": "Hand-dyed cotton",
                    "price": "24.50",
                    "Quantity": i % 3,
                    "categoryId": 3,
                    "categoryName": "Clothing"
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn test_filtered_listing_is_paginated() {
    let backend = FakeBackend::start().await;
    backend.reply_json("GET", "products", &products(10));
    let shop = backend.storefront(MemoryStorage::new());
    let mut catalog = shop.catalog();

    let total = catalog
        .load_products(ProductQuery {
            category: CategoryFilter::Only(CategoryId::new(3)),
            search: "  blue sarong ".to_string(),
            sort: SortOrder::PriceLow,
        })
        .await
        .unwrap();

    assert_eq!(total, 10);
    assert_eq!(catalog.page(), 1);
    assert_eq!(catalog.page_count(), 2);
    assert_eq!(catalog.visible_products().len(), 8);

    assert!(catalog.go_to_page(2));
    assert_eq!(catalog.visible_products().len(), 2);
    assert_eq!(catalog.visible_products()[0].id, ProductId::new(9));
    assert!(!catalog.go_to_page(3));
    assert_eq!(catalog.page(), 2);

    let sent = backend.requests_to("GET", "products");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query["format"], "json");
    assert_eq!(sent[0].query["sort"], "price_low");
    assert_eq!(sent[0].query["category"], "3");
    assert_eq!(sent[0].query["search"], "  blue sarong ");

    let html = catalog.render_products().unwrap();
    assert!(html.contains("Batik Sarong 9"));
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_listing() {
    let backend = FakeBackend::start().await;
    backend.reply_json("GET", "products", &products(10));
    let shop = backend.storefront(MemoryStorage::new());
    let mut catalog = shop.catalog();
    catalog.load_products(ProductQuery::default()).await.unwrap();
    assert!(catalog.go_to_page(2));

    backend.reply_raw(
        "GET",
        "products",
        500,
        "application/json",
        r#"{"success":false,"error":"Database unavailable"}"#,
    );
    let err = catalog
        .load_products(ProductQuery {
            search: "mask".to_string(),
            ..ProductQuery::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Database unavailable");
    assert_eq!(catalog.products().len(), 10);
    assert_eq!(catalog.page(), 2);
    assert!(catalog.query().search.is_empty());
}

#[tokio::test]
async fn test_categories_are_cached_until_refreshed() {
    let backend = FakeBackend::start().await;
    backend.reply_json(
        "GET",
        "categories",
        &json!([{"id": 1, "name": "Kitchen"}, {"id": 3, "name": "Clothing"}]),
    );
    let shop = backend.storefront(MemoryStorage::new());
    let catalog = shop.catalog();

    let first = catalog.load_categories().await;
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].filter, CategoryFilter::All);
    assert_eq!(first[2].name, "Clothing");

    backend.reply_json("GET", "categories", &json!([{"id": 1, "name": "Kitchen"}]));
    assert_eq!(catalog.load_categories().await.len(), 3);
    assert_eq!(backend.requests_to("GET", "categories").len(), 1);

    assert_eq!(catalog.refresh_categories().await.len(), 2);
    assert_eq!(backend.requests_to("GET", "categories").len(), 2);
}

#[tokio::test]
async fn test_category_failure_leaves_catch_all_entry() {
    let backend = FakeBackend::start().await;
    let shop = backend.storefront(MemoryStorage::new());

    let options = shop.catalog().load_categories().await;

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].filter, CategoryFilter::All);
}

#[tokio::test]
async fn test_product_detail() {
    let backend = FakeBackend::start().await;
    backend.reply_json(
        "GET",
        "product-details",
        &json!({"id": 4, "name": "Brass Lamp", "price": 80, "Quantity": 0}),
    );
    let shop = backend.storefront(MemoryStorage::new());

    let product = shop.catalog().load_product(ProductId::new(4)).await.unwrap();

    assert_eq!(product.name, "Brass Lamp");
    assert_eq!(product.price.display(), "$80.00");
    assert!(!product.in_stock());
    let sent = backend.requests_to("GET", "product-details");
    assert_eq!(sent[0].query["id"], "4");
}

#[tokio::test]
async fn test_wishlist_only_notifies() {
    let backend = FakeBackend::start().await;
    let shop = backend.storefront(MemoryStorage::new());

    let shown = shop.catalog().add_to_wishlist(ProductId::new(4));

    assert_eq!(shown.message, "Added to wishlist!");
    assert_eq!(shop.notifier().active().len(), 1);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_rendered_pagination_and_categories_follow_state() {
    let backend = FakeBackend::start().await;
    backend.reply_json("GET", "products", &products(20));
    backend.reply_json(
        "GET",
        "categories",
        &json!([{"id": 1, "name": "Kitchen"}, {"id": 3, "name": "Clothing"}]),
    );
    let shop = backend.storefront(MemoryStorage::new());
    let mut catalog = shop.catalog();
    catalog
        .load_products(ProductQuery {
            category: CategoryFilter::Only(CategoryId::new(3)),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert!(catalog.go_to_page(2));

    let pagination = catalog.render_pagination().unwrap();
    assert!(pagination.contains(r#"id="pagination""#));
    assert!(pagination.contains(r#"data-page="3">3</a>"#));
    assert!(!pagination.contains(r#"data-page="4">4</a>"#));
    let first = pagination.find(r#"data-page="1">1<"#).unwrap();
    let active = pagination.find("page-item active").unwrap();
    let second = pagination.find(r#"data-page="2">2<"#).unwrap();
    assert!(first < active && active < second);

    let options = catalog.load_categories().await;
    let sidebar = catalog.render_categories(&options).unwrap();
    assert!(sidebar.contains(r#"<div class="category-item active" data-category="3">"#));
    assert!(sidebar.contains(r#"<div class="category-item" data-category="all">"#));
    assert!(sidebar.contains("Kitchen"));
}
