//! Order ledger reads and the admin status flow.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use farmgate_core::{OrderId, OrderStatus};
use farmgate_integration_tests::{
    add_to_cart, create_user, save_shipping, seed_product, test_pool,
};
use farmgate_storefront::db::RepositoryError;
use farmgate_storefront::db::orders::OrderRepository;
use farmgate_storefront::services::checkout::CheckoutService;

#[tokio::test]
async fn test_orders_are_scoped_to_their_owner() {
    let pool = test_pool().await;
    let asha = create_user(&pool, "asha", "asha@example.com").await;
    let ravi = create_user(&pool, "ravi", "ravi@example.com").await;
    let product = seed_product(&pool, "Organic Tomatoes", "2.50", 100).await;
    add_to_cart(&pool, asha.id, product.id, 1).await;
    save_shipping(&pool, asha.id).await;

    let order_id = CheckoutService::new(&pool, None)
        .place_order(asha.id, "cod")
        .await
        .unwrap();

    let orders = OrderRepository::new(&pool);
    assert!(orders.get_for_user(order_id, asha.id).await.unwrap().is_some());
    // Another user cannot see it
    assert!(orders.get_for_user(order_id, ravi.id).await.unwrap().is_none());
    assert!(orders.list_for_user(ravi.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_listing_includes_customer_identity() {
    let pool = test_pool().await;
    let asha = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Farm Fresh Eggs", "3.00", 50).await;
    add_to_cart(&pool, asha.id, product.id, 2).await;
    save_shipping(&pool, asha.id).await;

    CheckoutService::new(&pool, None)
        .place_order(asha.id, "card")
        .await
        .unwrap();

    let orders = OrderRepository::new(&pool);
    let all = orders.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].customer_username, "asha");
    assert_eq!(all[0].customer_email, "asha@example.com");
    assert_eq!(all[0].items.len(), 1);
}

#[tokio::test]
async fn test_status_updates() {
    let pool = test_pool().await;
    let asha = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Organic Apples", "3.00", 90).await;
    add_to_cart(&pool, asha.id, product.id, 1).await;
    save_shipping(&pool, asha.id).await;

    let order_id = CheckoutService::new(&pool, None)
        .place_order(asha.id, "cod")
        .await
        .unwrap();

    let orders = OrderRepository::new(&pool);
    assert_eq!(
        orders.get(order_id).await.unwrap().unwrap().status,
        OrderStatus::Pending
    );

    orders
        .update_status(order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(
        orders.get(order_id).await.unwrap().unwrap().status,
        OrderStatus::Shipped
    );

    // Unknown order id is reported, not silently ignored
    assert!(matches!(
        orders.update_status(OrderId::new(9999), OrderStatus::Shipped).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let pool = test_pool().await;
    let asha = create_user(&pool, "asha", "asha@example.com").await;
    let product = seed_product(&pool, "Brown Rice (1kg)", "2.80", 110).await;
    save_shipping(&pool, asha.id).await;

    let checkout = CheckoutService::new(&pool, None);
    add_to_cart(&pool, asha.id, product.id, 1).await;
    let first = checkout.place_order(asha.id, "cod").await.unwrap();
    add_to_cart(&pool, asha.id, product.id, 1).await;
    let second = checkout.place_order(asha.id, "cod").await.unwrap();

    let history = OrderRepository::new(&pool)
        .list_for_user(asha.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].order.id, second);
    assert_eq!(history[1].order.id, first);
}
