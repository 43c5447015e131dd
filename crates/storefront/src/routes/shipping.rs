//! Shipping profile route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::db::{RepositoryError, ShippingRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::ShippingProfile;
use crate::state::AppState;

/// The saved shipping profile, if any.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let shipping = ShippingRepository::new(state.pool());
    let profile = shipping
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipping information".to_owned()))?;

    Ok(Json(json!({ "success": true, "shipping_info": profile })))
}

/// Save or overwrite the shipping profile.
///
/// All fields except address line 3 are mandatory.
#[instrument(skip(state, user, profile), fields(user_id = %user.id))]
pub async fn save(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(profile): Json<ShippingProfile>,
) -> Result<impl IntoResponse> {
    let shipping = ShippingRepository::new(state.pool());
    let existed = shipping.upsert(user.id, &profile).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => {
            AppError::BadRequest("All required shipping fields must be filled.".to_owned())
        }
        other => AppError::Database(other),
    })?;

    info!(updated = existed, "shipping profile saved");
    let message = if existed {
        "Shipping information updated successfully."
    } else {
        "Shipping information saved successfully."
    };

    Ok(Json(json!({ "success": true, "message": message })))
}
