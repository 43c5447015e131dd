//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use farmgate_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// List or search the local catalog.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    let query = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let results = products.list(query).await?;

    let message = match query {
        None => "Showing all products.".to_owned(),
        Some(q) if results.is_empty() => format!("No products found matching '{q}'."),
        Some(q) => format!("Found {} results for '{q}'.", results.len()),
    };

    Ok(Json(json!({
        "success": query.is_none() || !results.is_empty(),
        "products": results,
        "message": message,
    })))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    Ok(Json(json!({ "success": true, "product": product })))
}
