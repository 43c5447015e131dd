//! Database operations for the storefront SQLite store.
//!
//! # Tables
//!
//! - `users` - Customer and admin accounts (admins carry an `is_admin` flag)
//! - `password_reset_tokens`
//! - `products` - Local catalog; source of truth for stock
//! - `cart_items` - Per-user cart lines, keyed (user, product)
//! - `shipping_info` - At most one shipping profile per user
//! - `orders` / `order_items` - The authoritative order ledger
//!
//! The session table is owned by tower-sessions and created by its store.
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p farmgate-cli -- migrate
//! ```

pub mod cart;
pub mod orders;
pub mod products;
pub mod shipping;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use shipping::ShippingRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// Foreign keys are enforced and the database file is created on first run.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run the embedded migrations against a pool.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
