//! Admin order management against the local ledger.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use farmgate_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Every order, newest first, with customer identity and line items.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let orders = orders.list_all().await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Update an order's status in the ledger.
///
/// Setting the current status again is reported as a no-op, not an error.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(form): Json<StatusForm>,
) -> Result<impl IntoResponse> {
    let new_status: OrderStatus = form
        .status
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status provided.".to_owned()))?;

    let order_id = OrderId::new(id);
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;

    if order.status == new_status {
        return Ok(Json(json!({
            "success": true,
            "message": format!("Order was already {}. No change needed.", order.status),
        })));
    }

    orders.update_status(order_id, new_status).await?;

    info!(%order_id, %new_status, "order status updated");
    Ok(Json(json!({
        "success": true,
        "message": format!("Order status updated to {new_status}."),
    })))
}
