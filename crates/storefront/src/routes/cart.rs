//! Cart route handlers.
//!
//! All endpoints require a logged-in user; the cart is keyed by the session's
//! user id.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use farmgate_core::ProductId;

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    pub quantity: i64,
}

/// Quantity adjustment form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: i64,
    /// `increase` or `decrease`.
    pub change_type: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: i64,
}

/// List the cart joined with catalog display fields.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn items(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool());
    let items = cart.list_for_user(user.id).await?;

    Ok(Json(json!({ "success": true, "items": items })))
}

/// Add a product to the cart, merging quantities into an existing line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<AddToCartForm>,
) -> Result<impl IntoResponse> {
    if form.quantity <= 0 {
        return Err(AppError::BadRequest("Invalid product or quantity.".to_owned()));
    }

    let product_id = ProductId::new(form.product_id);
    let products = ProductRepository::new(state.pool());
    if products.get(product_id).await?.is_none() {
        return Err(AppError::NotFound("Product".to_owned()));
    }

    let cart = CartRepository::new(state.pool());
    let new_quantity = cart.add_or_merge(user.id, product_id, form.quantity).await?;

    info!(%product_id, new_quantity, "cart line updated");
    let message = if new_quantity == form.quantity {
        "Product added to cart successfully.".to_owned()
    } else {
        format!("Product quantity updated to {new_quantity} in cart.")
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "new_quantity": new_quantity,
    })))
}

/// Increase or decrease a line by exactly one unit.
///
/// Reaching zero removes the line; the reported quantity floors at zero.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn quantity(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<QuantityForm>,
) -> Result<impl IntoResponse> {
    let delta = match form.change_type.as_str() {
        "increase" => 1,
        "decrease" => -1,
        _ => {
            return Err(AppError::BadRequest(
                "Invalid product or change type.".to_owned(),
            ));
        }
    };

    let cart = CartRepository::new(state.pool());
    let new_quantity = cart
        .adjust(user.id, ProductId::new(form.product_id), delta)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    let message = match (new_quantity, delta) {
        (0, _) => "Product removed from cart.",
        (_, 1) => "Product quantity increased.",
        _ => "Product quantity decreased.",
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "new_quantity": new_quantity,
    })))
}

/// Remove a line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<RemoveForm>,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool());
    let removed = cart.remove(user.id, ProductId::new(form.product_id)).await?;

    if !removed {
        return Err(AppError::NotFound("Product".to_owned()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Product removed from cart.",
    })))
}

/// Total quantity across the cart, for the badge.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool());
    let count = cart.count_for_user(user.id).await?;

    Ok(Json(json!({ "success": true, "count": count })))
}
