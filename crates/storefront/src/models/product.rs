//! Product domain type.

use serde::Serialize;

use farmgate_core::{Price, ProductId};

/// A catalog product.
///
/// Products are created by admin CSV import or seeding and never hard-deleted
/// locally; only the spreadsheet mirror exposes deletion. Stock is mutated
/// exclusively by the checkout workflow's conditional decrement.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub stock: i64,
}

/// Fields for creating or updating a product (CSV import, seeding).
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub stock: i64,
}
