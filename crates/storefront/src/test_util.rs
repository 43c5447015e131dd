//! Shared helpers for in-crate tests.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database with migrations applied.
///
/// A single connection keeps the `:memory:` database alive and shared for
/// the whole test.
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    crate::db::run_migrations(&pool)
        .await
        .expect("migrations apply");

    pool
}
