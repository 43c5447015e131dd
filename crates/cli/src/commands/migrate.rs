//! Run database migrations.

use tracing::info;

use farmgate_storefront::db;

/// Apply all pending migrations to the storefront database.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    info!("Connected to database");

    db::run_migrations(&pool).await?;
    info!("Migrations applied");

    Ok(())
}
