//! Cart repository.
//!
//! Cart lines are keyed by (user, product); inserting an existing pair merges
//! quantities. A line whose quantity reaches zero is deleted, never stored.

use sqlx::{FromRow, SqlitePool};

use farmgate_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartLineView;

#[derive(FromRow)]
struct CartLineViewRow {
    product_id: i64,
    name: String,
    price_cents: i64,
    quantity: i64,
    image_url: Option<String>,
}

impl From<CartLineViewRow> for CartLineView {
    fn from(row: CartLineViewRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            unit_price: Price::from_cents(row.price_cents),
            quantity: row.quantity,
            image_url: row.image_url,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product to the cart, merging into an existing line by summing
    /// quantities. Returns the resulting line quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `quantity` is not positive.
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_or_merge(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<i64, RepositoryError> {
        if quantity <= 0 {
            return Err(RepositoryError::Conflict(
                "quantity must be a positive integer".to_owned(),
            ));
        }

        let (new_quantity,): (i64,) = sqlx::query_as(
            "INSERT INTO cart_items (user_id, product_id, quantity) VALUES (?1, ?2, ?3) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = quantity + excluded.quantity \
             RETURNING quantity",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(new_quantity)
    }

    /// Adjust a line by `delta` units (+1/-1 from the quantity buttons).
    ///
    /// Returns `None` if the line does not exist. Reaching zero or below
    /// deletes the line and reports `Some(0)`; the quantity never goes
    /// negative.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn adjust(
        &self,
        user_id: UserId,
        product_id: ProductId,
        delta: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        let current: Option<(i64,)> = sqlx::query_as(
            "SELECT quantity FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        let Some((current,)) = current else {
            return Ok(None);
        };

        let new_quantity = current + delta;
        if new_quantity <= 0 {
            self.remove(user_id, product_id).await?;
            return Ok(Some(0));
        }

        sqlx::query(
            "UPDATE cart_items SET quantity = ?3 WHERE user_id = ?1 AND product_id = ?2",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(new_quantity)
        .execute(self.pool)
        .await?;

        Ok(Some(new_quantity))
    }

    /// Remove a line from the cart.
    ///
    /// Returns `true` if a line was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2")
                .bind(user_id.as_i64())
                .bind(product_id.as_i64())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the user's cart joined with catalog display fields.
    ///
    /// Prices are the live catalog prices at read time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartLineView>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineViewRow>(
            "SELECT ci.product_id, p.name, p.price_cents, ci.quantity, p.image_url \
             FROM cart_items ci \
             JOIN products p ON ci.product_id = p.id \
             WHERE ci.user_id = ?1",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLineView::from).collect())
    }

    /// Total quantity across the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE user_id = ?1",
        )
        .bind(user_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Delete every cart line for the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_for_user(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
