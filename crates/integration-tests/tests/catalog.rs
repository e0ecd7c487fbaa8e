//! Catalog contents and seeding.

#![allow(clippy::unwrap_used)]

use cafego_core::ProductId;
use cafego_integration_tests::test_pool;
use cafego_storefront::services::{Catalog, seed_defaults};

#[tokio::test]
async fn test_products_listed_in_seed_order() {
    let pool = test_pool().await;
    let products = Catalog::new(&pool).list_products().await.unwrap();

    let summary: Vec<(i64, &str, i64)> = products
        .iter()
        .map(|p| (p.id.as_i64(), p.name.as_str(), p.price.cents()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Americano", 100),
            (2, "Cappuccino", 110),
            (3, "Espresso", 90),
            (4, "Macchiato", 120),
        ]
    );
}

#[tokio::test]
async fn test_get_product() {
    let pool = test_pool().await;
    let catalog = Catalog::new(&pool);

    let espresso = catalog.get_product(ProductId::new(3)).await.unwrap().unwrap();
    assert_eq!(espresso.name, "Espresso");
    assert_eq!(espresso.description, "A strong shot of coffee");
    assert_eq!(espresso.price.to_string(), "$0.90");

    assert!(catalog.get_product(ProductId::new(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let pool = test_pool().await;

    let report = seed_defaults(&pool).await.unwrap();
    assert!(report.is_empty());

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((products, users), (4, 2));
}

#[tokio::test]
async fn test_seeding_fills_an_empty_database() {
    let pool = cafego_storefront::db::connect_in_memory().await.unwrap();
    cafego_storefront::db::migrate(&pool).await.unwrap();

    let report = seed_defaults(&pool).await.unwrap();
    assert_eq!(report.users, 2);
    assert_eq!(report.products, 4);
}
