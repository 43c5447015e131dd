//! Seed the database with demo products and a default admin account.
//!
//! Mirrors a fresh deployment of the original store: a small farm-produce
//! catalog plus one admin whose credentials come from `ADMIN_USERNAME`,
//! `ADMIN_EMAIL` and `ADMIN_PASSWORD`.

use tracing::{info, warn};

use farmgate_core::{Email, Price};
use farmgate_storefront::db::products::ProductRepository;
use farmgate_storefront::db::users::UserRepository;
use farmgate_storefront::models::product::ProductFields;
use farmgate_storefront::services::auth::hash_password;

const DEMO_PRODUCTS: [(&str, &str, &str, &str, i64); 10] = [
    (
        "Organic Tomatoes",
        "Fresh, ripe organic tomatoes from local farms.",
        "2.50",
        "/static/images/product1.jpg",
        100,
    ),
    (
        "Farm Fresh Eggs",
        "Free-range eggs, rich in protein and flavor.",
        "3.00",
        "/static/images/product2.jpg",
        50,
    ),
    (
        "Whole Wheat Bread",
        "Artisan whole wheat bread, baked fresh daily.",
        "4.20",
        "/static/images/product3.jpg",
        75,
    ),
    (
        "Green Bell Peppers",
        "Crisp and sweet green bell peppers.",
        "1.80",
        "/static/images/product4.jpg",
        120,
    ),
    (
        "Fresh Milk (1L)",
        "Locally sourced, pasteurized fresh milk.",
        "1.50",
        "/static/images/product5.jpg",
        80,
    ),
    (
        "Organic Apples",
        "Sweet and crunchy organic apples.",
        "3.00",
        "/static/images/product6.jpg",
        90,
    ),
    (
        "Spinach Bunch",
        "Fresh, leafy spinach, perfect for healthy meals.",
        "1.20",
        "/static/images/product7.jpg",
        150,
    ),
    (
        "Potatoes (5kg)",
        "Versatile and essential for every kitchen.",
        "5.00",
        "/static/images/product8.jpg",
        60,
    ),
    (
        "Chicken Breast (1kg)",
        "Boneless, skinless chicken breast.",
        "8.50",
        "/static/images/product9.jpg",
        40,
    ),
    (
        "Brown Rice (1kg)",
        "Nutritious whole grain brown rice.",
        "2.80",
        "/static/images/product10.jpg",
        110,
    ),
];

/// Seed demo products and the default admin account.
///
/// Idempotent: products upsert by name, and the admin is skipped when the
/// email is already registered.
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let products = ProductRepository::new(&pool);
    for (name, description, price, image_url, stock) in DEMO_PRODUCTS {
        let fields = ProductFields {
            name: name.to_owned(),
            description: Some(description.to_owned()),
            price: Price::parse(price)?,
            image_url: Some(image_url.to_owned()),
            stock,
        };
        products.upsert_by_name(&fields).await?;
    }
    info!(count = DEMO_PRODUCTS.len(), "demo products seeded");

    seed_admin(&pool).await?;

    Ok(())
}

async fn seed_admin(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_owned());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@farmgate.test".to_owned());
    let Ok(password) = std::env::var("ADMIN_PASSWORD") else {
        warn!("ADMIN_PASSWORD not set; skipping admin account");
        return Ok(());
    };

    let email = Email::parse(&email)?;
    let users = UserRepository::new(pool);
    if users.get_by_email(&email).await?.is_some() {
        info!(%email, "admin account already exists");
        return Ok(());
    }

    let password_hash = hash_password(&password).map_err(|e| e.to_string())?;
    let user = users.create(&username, &email, &password_hash, true).await?;
    info!(user_id = %user.id, %email, "admin account created");

    Ok(())
}
