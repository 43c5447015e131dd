//! Catalog repository.
//!
//! Source of truth for product data and stock. Stock is only ever mutated by
//! the checkout workflow's conditional decrement.

use sqlx::{FromRow, SqliteConnection, SqlitePool};

use farmgate_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::product::{Product, ProductFields};

/// Outcome of an upsert-by-name merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price_cents: i64,
    image_url: Option<String>,
    stock: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::from_cents(row.price_cents),
            image_url: row.image_url,
            stock: row.stock,
        }
    }
}

const SELECT_PRODUCT: &str =
    "SELECT id, name, description, price_cents, image_url, stock FROM products";

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// List products ordered by name, optionally filtered by a
    /// case-insensitive substring match over name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows = match filter {
            Some(query) if !query.trim().is_empty() => {
                let pattern = format!("%{}%", query.trim().to_lowercase());
                sqlx::query_as::<_, ProductRow>(&format!(
                    "{SELECT_PRODUCT} \
                     WHERE LOWER(name) LIKE ?1 OR LOWER(COALESCE(description, '')) LIKE ?1 \
                     ORDER BY name"
                ))
                .bind(pattern)
                .fetch_all(self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} ORDER BY name"))
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, description, price_cents, image_url, stock) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id, name, description, price_cents, image_url, stock",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.as_cents())
        .bind(&fields.image_url)
        .bind(fields.stock)
        .fetch_one(self.pool)
        .await?;

        Ok(Product::from(row))
    }

    /// Insert a product, or overwrite the product of the same name.
    ///
    /// Name is the de-facto natural key used by the CSV import and
    /// spreadsheet sync. Two distinct products sharing a name will be merged
    /// by this call; the ambiguity is inherited from the data model.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn upsert_by_name(
        &self,
        fields: &ProductFields,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE name = ?1")
            .bind(&fields.name)
            .fetch_optional(self.pool)
            .await?;

        match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE products \
                     SET description = ?1, price_cents = ?2, image_url = ?3, stock = ?4 \
                     WHERE id = ?5",
                )
                .bind(&fields.description)
                .bind(fields.price.as_cents())
                .bind(&fields.image_url)
                .bind(fields.stock)
                .bind(id)
                .execute(self.pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.create(fields).await?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Conditionally decrement stock inside an open transaction.
    ///
    /// Returns `false` when the product has less stock than requested (or
    /// does not exist); the caller is expected to roll the transaction back.
    /// The `stock >= qty` guard makes concurrent decrements of the same
    /// product serialize correctly instead of silently under-counting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: ProductId,
        quantity: i64,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2")
                .bind(id.as_i64())
                .bind(quantity)
                .execute(conn)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
