//! Spreadsheet mirror management.
//!
//! Write paths require the mirror to be configured and surface its failures
//! (as 502s); read paths degrade to empty lists with the cause logged, so a
//! broken mirror never breaks browsing.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use farmgate_core::{OrderStatus, Price, SheetRowId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::sheets::{MirroredProductRow, SheetsClient, SheetsError};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Product fields for mirror create/update.
#[derive(Debug, Deserialize)]
pub struct SheetProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal string, e.g. `"2.50"`.
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    pub stock: i64,
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

fn require_mirror(state: &AppState) -> Result<&SheetsClient> {
    state
        .sheets()
        .ok_or(AppError::Mirror(SheetsError::Unconfigured))
}

fn parse_form(form: &SheetProductForm) -> Result<MirroredProductRow> {
    let price = Price::parse(&form.price)
        .map_err(|e| AppError::BadRequest(format!("Invalid price: {e}")))?;
    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required.".to_owned()));
    }
    if form.stock < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative.".to_owned()));
    }

    Ok(MirroredProductRow {
        // Allocated on append; ignored on update.
        id: SheetRowId::new(0),
        name: form.name.trim().to_owned(),
        description: form.description.trim().to_owned(),
        price,
        image_url: form.image_url.trim().to_owned(),
        stock: form.stock,
    })
}

/// Mirror product list (public; also serves the product page).
///
/// Degrades to an empty list when the mirror is unconfigured or failing.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let products = match state.sheets() {
        Some(client) => client
            .list_products(params.query.as_deref())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "mirror product read failed, serving empty list");
                Vec::new()
            }),
        None => Vec::new(),
    };

    Json(json!({ "success": true, "products": products }))
}

/// Append a product to the mirror.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn add_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<SheetProductForm>,
) -> Result<impl IntoResponse> {
    let client = require_mirror(&state)?;
    let row = parse_form(&form)?;

    let id = client.add_product(row).await?;

    info!(%id, "product added to mirror");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product added to sheet.",
            "id": id,
        })),
    ))
}

/// Overwrite a mirror product's fields.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(form): Json<SheetProductForm>,
) -> Result<impl IntoResponse> {
    let client = require_mirror(&state)?;
    let row = parse_form(&form)?;
    let id = SheetRowId::new(id);

    client.update_product(id, &row).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Product {id} updated in sheet."),
    })))
}

/// Delete a product row from the mirror.
///
/// The local catalog never deletes; this is the only deletion surface.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let client = require_mirror(&state)?;
    let id = SheetRowId::new(id);

    client.delete_product(id).await?;

    info!(%id, "product deleted from mirror");
    Ok(Json(json!({
        "success": true,
        "message": format!("Product {id} deleted from sheet."),
    })))
}

/// Mirror order list (degrades to empty on failure).
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    let orders = match state.sheets() {
        Some(client) => client.list_orders().await.unwrap_or_else(|e| {
            warn!(error = %e, "mirror order read failed, serving empty list");
            Vec::new()
        }),
        None => Vec::new(),
    };

    Json(json!({ "success": true, "orders": orders }))
}

/// Update an order's status cell in the mirror.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(form): Json<StatusForm>,
) -> Result<impl IntoResponse> {
    let status: OrderStatus = form
        .status
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status provided.".to_owned()))?;

    let client = require_mirror(&state)?;
    let id = SheetRowId::new(id);

    client.update_order_status(id, status.as_str()).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Order {id} status updated to {status} in sheet."),
    })))
}
