//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::SqlitePool;

use farmgate_storefront::db;

/// Connect to the storefront database from the environment.
///
/// Honors `STOREFRONT_DATABASE_URL` with a `DATABASE_URL` fallback, matching
/// the server's configuration loading.
pub(crate) async fn connect() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "STOREFRONT_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    Ok(pool)
}
