//! End-to-end tests for the order placement workflow.
//!
//! These cover the workflow's contract: totals from live prices, precondition
//! short-circuits, all-or-nothing persistence, mirror failure isolation, and
//! deliberate non-idempotence.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use farmgate_core::{OrderStatus, Price};
use farmgate_integration_tests::{
    add_to_cart, create_user, sample_shipping, save_shipping, seed_product, test_pool,
    unreachable_mirror,
};
use farmgate_storefront::db::cart::CartRepository;
use farmgate_storefront::db::orders::OrderRepository;
use farmgate_storefront::db::products::ProductRepository;
use farmgate_storefront::models::product::ProductFields;
use farmgate_storefront::services::checkout::{CheckoutError, CheckoutService};

#[tokio::test]
async fn test_concrete_checkout_scenario() {
    // Cart = [{A, 2.50, qty 2}, {B, 3.00, qty 1}] -> total 8.00
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let a = seed_product(&pool, "Organic Tomatoes", "2.50", 100).await;
    let b = seed_product(&pool, "Farm Fresh Eggs", "3.00", 50).await;
    add_to_cart(&pool, user.id, a.id, 2).await;
    add_to_cart(&pool, user.id, b.id, 1).await;
    save_shipping(&pool, user.id).await;

    let checkout = CheckoutService::new(&pool, None);
    let order_id = checkout
        .place_order(user.id, "cod")
        .await
        .expect("order placed");

    let orders = OrderRepository::new(&pool);
    let order = orders
        .get_for_user(order_id, user.id)
        .await
        .expect("query")
        .expect("order exists");

    assert_eq!(order.order.total_amount, Price::parse("8.00").unwrap());
    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.order.payment_method, "cod");
    assert_eq!(order.items.len(), 2);
    // Shipping snapshot copied verbatim
    assert_eq!(order.order.shipping, sample_shipping());

    // Stock reduced by exactly the ordered quantities
    let products = ProductRepository::new(&pool);
    assert_eq!(products.get(a.id).await.unwrap().unwrap().stock, 98);
    assert_eq!(products.get(b.id).await.unwrap().unwrap().stock, 49);

    // Cart emptied
    let cart = CartRepository::new(&pool);
    assert!(cart.list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_total_uses_live_prices_not_cart_insertion_prices() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Whole Wheat Bread", "4.20", 75).await;
    add_to_cart(&pool, user.id, product.id, 2).await;
    save_shipping(&pool, user.id).await;

    // Price changes after the item was added to the cart
    let products = ProductRepository::new(&pool);
    products
        .upsert_by_name(&ProductFields {
            name: "Whole Wheat Bread".to_owned(),
            description: None,
            price: Price::parse("5.00").unwrap(),
            image_url: None,
            stock: 75,
        })
        .await
        .unwrap();

    let checkout = CheckoutService::new(&pool, None);
    let order_id = checkout.place_order(user.id, "card").await.unwrap();

    let order = OrderRepository::new(&pool)
        .get_for_user(order_id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.order.total_amount, Price::parse("10.00").unwrap());
    assert_eq!(order.items[0].unit_price, Price::parse("5.00").unwrap());
}

#[tokio::test]
async fn test_empty_cart_creates_nothing() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    save_shipping(&pool, user.id).await;

    let checkout = CheckoutService::new(&pool, None);
    let result = checkout.place_order(user.id, "cod").await;
    assert!(matches!(result, Err(CheckoutError::EmptyCart)));

    let orders = OrderRepository::new(&pool);
    assert!(orders.list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_shipping_creates_nothing() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Organic Apples", "3.00", 90).await;
    add_to_cart(&pool, user.id, product.id, 1).await;

    let checkout = CheckoutService::new(&pool, None);
    let result = checkout.place_order(user.id, "cod").await;
    assert!(matches!(result, Err(CheckoutError::MissingShippingInfo)));

    let orders = OrderRepository::new(&pool);
    assert!(orders.list_for_user(user.id).await.unwrap().is_empty());
    // Cart untouched by the failed attempt
    let cart = CartRepository::new(&pool);
    assert_eq!(cart.count_for_user(user.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back_everything() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let plenty = seed_product(&pool, "Spinach Bunch", "1.20", 150).await;
    let scarce = seed_product(&pool, "Chicken Breast (1kg)", "8.50", 1).await;
    add_to_cart(&pool, user.id, plenty.id, 3).await;
    add_to_cart(&pool, user.id, scarce.id, 2).await; // more than stocked
    save_shipping(&pool, user.id).await;

    let checkout = CheckoutService::new(&pool, None);
    let result = checkout.place_order(user.id, "cod").await;
    assert!(matches!(
        result,
        Err(CheckoutError::InsufficientStock { product_id }) if product_id == scarce.id
    ));

    // Full rollback: no order rows, no stock mutation, cart intact.
    let orders = OrderRepository::new(&pool);
    assert!(orders.list_for_user(user.id).await.unwrap().is_empty());

    let products = ProductRepository::new(&pool);
    assert_eq!(products.get(plenty.id).await.unwrap().unwrap().stock, 150);
    assert_eq!(products.get(scarce.id).await.unwrap().unwrap().stock, 1);

    let cart = CartRepository::new(&pool);
    assert_eq!(cart.count_for_user(user.id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_mirror_failure_keeps_local_order() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Brown Rice (1kg)", "2.80", 110).await;
    add_to_cart(&pool, user.id, product.id, 4).await;
    save_shipping(&pool, user.id).await;

    // Mirror points at a dead endpoint; the append fails after commit.
    let mirror = unreachable_mirror();
    let checkout = CheckoutService::new(&pool, Some(&mirror));
    let order_id = checkout
        .place_order(user.id, "upi")
        .await
        .expect("mirror failure must not fail checkout");

    // The committed order is retrievable via history, still pending.
    let orders = OrderRepository::new(&pool);
    let history = orders.list_for_user(user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order.id, order_id);
    assert_eq!(history[0].order.status, OrderStatus::Pending);

    // Side effects still applied
    let products = ProductRepository::new(&pool);
    assert_eq!(products.get(product.id).await.unwrap().unwrap().stock, 106);
    let cart = CartRepository::new(&pool);
    assert!(cart.list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_place_order_is_not_idempotent() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Fresh Milk (1L)", "1.50", 80).await;
    save_shipping(&pool, user.id).await;

    let checkout = CheckoutService::new(&pool, None);

    add_to_cart(&pool, user.id, product.id, 1).await;
    let first = checkout.place_order(user.id, "cod").await.unwrap();

    add_to_cart(&pool, user.id, product.id, 1).await;
    let second = checkout.place_order(user.id, "cod").await.unwrap();

    assert_ne!(first, second);
    let orders = OrderRepository::new(&pool);
    assert_eq!(orders.list_for_user(user.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_order_lines_snapshot_catalog_at_purchase_time() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Green Bell Peppers", "1.80", 120).await;
    add_to_cart(&pool, user.id, product.id, 2).await;
    save_shipping(&pool, user.id).await;

    let checkout = CheckoutService::new(&pool, None);
    let order_id = checkout.place_order(user.id, "cod").await.unwrap();

    // Catalog changes after purchase
    ProductRepository::new(&pool)
        .upsert_by_name(&ProductFields {
            name: "Green Bell Peppers".to_owned(),
            description: None,
            price: Price::parse("9.99").unwrap(),
            image_url: None,
            stock: 5,
        })
        .await
        .unwrap();

    // Historical order is unchanged
    let order = OrderRepository::new(&pool)
        .get_for_user(order_id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.items[0].unit_price, Price::parse("1.80").unwrap());
    assert_eq!(order.items[0].product_name, "Green Bell Peppers");
    assert_eq!(order.order.total_amount, Price::parse("3.60").unwrap());
}

#[tokio::test]
async fn test_shipping_edits_do_not_rewrite_past_orders() {
    let pool = test_pool().await;
    let user = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Potatoes (5kg)", "5.00", 60).await;
    add_to_cart(&pool, user.id, product.id, 1).await;
    save_shipping(&pool, user.id).await;

    let checkout = CheckoutService::new(&pool, None);
    let order_id = checkout.place_order(user.id, "cod").await.unwrap();

    // Move house
    let mut moved = sample_shipping();
    moved.address_line1 = "99 New Lane".to_owned();
    moved.city = "Mumbai".to_owned();
    farmgate_storefront::db::shipping::ShippingRepository::new(&pool)
        .upsert(user.id, &moved)
        .await
        .unwrap();

    let order = OrderRepository::new(&pool)
        .get_for_user(order_id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.order.shipping, sample_shipping());
}
