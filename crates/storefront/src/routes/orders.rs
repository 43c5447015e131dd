//! Order route handlers: checkout, history, details.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use farmgate_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub payment_method: Option<String>,
}

/// Place an order for everything currently in the cart.
///
/// This is the checkout endpoint; all the interesting work happens in
/// [`CheckoutService::place_order`].
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<PlaceOrderForm>,
) -> Result<impl IntoResponse> {
    let payment_method = form.payment_method.as_deref().unwrap_or("unknown");

    let checkout = CheckoutService::new(state.pool(), state.sheets());
    let order_id = checkout.place_order(user.id, payment_method).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order placed successfully!",
        "order_id": order_id,
    })))
}

/// The user's order history, newest first, with line items.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let orders = orders.list_for_user(user.id).await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// One order with its lines; owners only.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn details(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_for_user(OrderId::new(id), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;

    Ok(Json(json!({ "success": true, "order": order })))
}
