//! Cart and shipping store behavior.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use farmgate_core::{Price, ProductId};
use farmgate_integration_tests::{add_to_cart, create_user, sample_shipping, seed_product, test_pool};
use farmgate_storefront::db::RepositoryError;
use farmgate_storefront::db::cart::CartRepository;
use farmgate_storefront::db::shipping::ShippingRepository;

#[tokio::test]
async fn test_adding_existing_line_merges_quantities() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Organic Tomatoes", "2.50", 100).await;

    let cart = CartRepository::new(&pool);
    assert_eq!(cart.add_or_merge(user.id, product.id, 2).await.unwrap(), 2);
    assert_eq!(cart.add_or_merge(user.id, product.id, 3).await.unwrap(), 5);

    let lines = cart.list_for_user(user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 5);
    assert_eq!(lines[0].unit_price, Price::parse("2.50").unwrap());
}

#[tokio::test]
async fn test_non_positive_quantity_rejected() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Organic Tomatoes", "2.50", 100).await;

    let cart = CartRepository::new(&pool);
    assert!(matches!(
        cart.add_or_merge(user.id, product.id, 0).await,
        Err(RepositoryError::Conflict(_))
    ));
    assert!(matches!(
        cart.add_or_merge(user.id, product.id, -3).await,
        Err(RepositoryError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_adjust_floors_at_zero_and_deletes_line() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Farm Fresh Eggs", "3.00", 50).await;

    let cart = CartRepository::new(&pool);
    cart.add_or_merge(user.id, product.id, 1).await.unwrap();

    assert_eq!(cart.adjust(user.id, product.id, 1).await.unwrap(), Some(2));
    assert_eq!(cart.adjust(user.id, product.id, -1).await.unwrap(), Some(1));
    // Reaching zero deletes the line and reports zero, never negative
    assert_eq!(cart.adjust(user.id, product.id, -1).await.unwrap(), Some(0));
    assert!(cart.list_for_user(user.id).await.unwrap().is_empty());

    // The line is gone now
    assert_eq!(cart.adjust(user.id, product.id, -1).await.unwrap(), None);
}

#[tokio::test]
async fn test_remove_reports_missing_lines() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Organic Apples", "3.00", 90).await;

    let cart = CartRepository::new(&pool);
    cart.add_or_merge(user.id, product.id, 2).await.unwrap();

    assert!(cart.remove(user.id, product.id).await.unwrap());
    assert!(!cart.remove(user.id, product.id).await.unwrap());
    assert!(!cart.remove(user.id, ProductId::new(9999)).await.unwrap());
}

#[tokio::test]
async fn test_count_and_clear() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let a = seed_product(&pool, "Spinach Bunch", "1.20", 150).await;
    let b = seed_product(&pool, "Brown Rice (1kg)", "2.80", 110).await;

    let cart = CartRepository::new(&pool);
    assert_eq!(cart.count_for_user(user.id).await.unwrap(), 0);

    add_to_cart(&pool, user.id, a.id, 2).await;
    add_to_cart(&pool, user.id, b.id, 3).await;
    assert_eq!(cart.count_for_user(user.id).await.unwrap(), 5);

    cart.clear_for_user(user.id).await.unwrap();
    assert_eq!(cart.count_for_user(user.id).await.unwrap(), 0);
    assert!(cart.list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let pool = test_pool().await;
    let asha = create_user(&pool, "asha", "asha@example.com").await;
    let ravi = create_user(&pool, "ravi", "ravi@example.com").await;
    let product = seed_product(&pool, "Fresh Milk (1L)", "1.50", 80).await;

    add_to_cart(&pool, asha.id, product.id, 2).await;

    let cart = CartRepository::new(&pool);
    assert_eq!(cart.count_for_user(asha.id).await.unwrap(), 2);
    assert_eq!(cart.count_for_user(ravi.id).await.unwrap(), 0);

    cart.clear_for_user(ravi.id).await.unwrap();
    assert_eq!(cart.count_for_user(asha.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_shipping_upsert_overwrites_in_place() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;

    let shipping = ShippingRepository::new(&pool);
    assert!(shipping.get(user.id).await.unwrap().is_none());

    let profile = sample_shipping();
    // First save inserts
    assert!(!shipping.upsert(user.id, &profile).await.unwrap());

    // Second save overwrites; no history kept
    let mut moved = profile.clone();
    moved.address_line1 = "99 New Lane".to_owned();
    assert!(shipping.upsert(user.id, &moved).await.unwrap());

    let stored = shipping.get(user.id).await.unwrap().unwrap();
    assert_eq!(stored.address_line1, "99 New Lane");
}

#[tokio::test]
async fn test_shipping_mandatory_fields_enforced() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;

    let mut profile = sample_shipping();
    profile.phone = String::new();

    let shipping = ShippingRepository::new(&pool);
    assert!(matches!(
        shipping.upsert(user.id, &profile).await,
        Err(RepositoryError::Conflict(_))
    ));
    // Nothing was written
    assert!(shipping.get(user.id).await.unwrap().is_none());
}
