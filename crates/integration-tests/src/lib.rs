//! Shared fixtures for Farmgate integration tests.
//!
//! Every test runs against its own in-memory SQLite database with the real
//! migrations applied, exercising the same repositories and services the
//! server uses.

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::SecretString;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use farmgate_core::{Price, ProductId, UserId};
use farmgate_storefront::db::cart::CartRepository;
use farmgate_storefront::db::products::ProductRepository;
use farmgate_storefront::db::shipping::ShippingRepository;
use farmgate_storefront::db::users::UserRepository;
use farmgate_storefront::models::product::{Product, ProductFields};
use farmgate_storefront::models::shipping::ShippingProfile;
use farmgate_storefront::models::user::User;
use farmgate_storefront::services::auth::hash_password;
use farmgate_storefront::sheets::{SheetRef, SheetsClient};

/// Fresh in-memory database with migrations applied.
///
/// A single connection keeps the `:memory:` database alive for the whole
/// test.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    farmgate_storefront::db::run_migrations(&pool)
        .await
        .expect("migrations apply");

    pool
}

/// Create a customer account.
pub async fn create_user(pool: &SqlitePool, username: &str, email: &str) -> User {
    let hash = hash_password("integration-pass-1").expect("hash");
    let email = email.parse().expect("valid email");
    UserRepository::new(pool)
        .create(username, &email, &hash, false)
        .await
        .expect("create user")
}

/// Insert a catalog product.
pub async fn seed_product(pool: &SqlitePool, name: &str, price: &str, stock: i64) -> Product {
    let fields = ProductFields {
        name: name.to_owned(),
        description: Some(format!("{name} for integration tests")),
        price: Price::parse(price).expect("valid price"),
        image_url: None,
        stock,
    };
    ProductRepository::new(pool)
        .create(&fields)
        .await
        .expect("create product")
}

/// Add a line to a user's cart.
pub async fn add_to_cart(pool: &SqlitePool, user: UserId, product: ProductId, quantity: i64) {
    CartRepository::new(pool)
        .add_or_merge(user, product, quantity)
        .await
        .expect("add to cart");
}

/// A valid shipping profile.
#[must_use]
pub fn sample_shipping() -> ShippingProfile {
    ShippingProfile {
        full_name: "Asha Patel".to_owned(),
        address_line1: "14 Orchard Row".to_owned(),
        address_line2: "Flat 2".to_owned(),
        address_line3: None,
        city: "Pune".to_owned(),
        state: "MH".to_owned(),
        zip_code: "411001".to_owned(),
        phone: "+91 98000 00000".to_owned(),
    }
}

/// Save the sample shipping profile for a user.
pub async fn save_shipping(pool: &SqlitePool, user: UserId) {
    ShippingRepository::new(pool)
        .upsert(user, &sample_shipping())
        .await
        .expect("save shipping");
}

/// A mirror client aimed at a dead endpoint, for exercising mirror-failure
/// paths without network access.
#[must_use]
pub fn unreachable_mirror() -> SheetsClient {
    let tab = |title: &str| SheetRef {
        spreadsheet_id: "integration-test-sheet".to_owned(),
        title: title.to_owned(),
        grid_id: 0,
    };
    SheetsClient::new(
        // Port 9 (discard) refuses connections immediately on loopback.
        "http://127.0.0.1:9".to_owned(),
        SecretString::from("integration-test-token"),
        tab("Products"),
        tab("Orders"),
    )
}
