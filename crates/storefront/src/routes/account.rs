//! Account route handlers: profile and password maintenance.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::db::ShippingRepository;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileForm {
    pub username: String,
    pub email: String,
}

/// Password change form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
}

/// The user's profile together with their shipping info.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let account = auth.get_user(user.id).await?;

    let shipping = ShippingRepository::new(state.pool());
    let shipping_info = shipping.get(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "profile": {
            "id": account.id,
            "username": account.username,
            "email": account.email,
            "shipping_info": shipping_info,
        },
    })))
}

/// Update username and email.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<UpdateProfileForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    auth.update_profile(user.id, &form.username, &form.email)
        .await?;

    info!("profile updated");
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully!",
    })))
}

/// Change the password after verifying the current one.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ChangePasswordForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    auth.change_password(user.id, &form.current_password, &form.new_password)
        .await?;

    info!("password changed");
    Ok(Json(json!({
        "success": true,
        "message": "Password changed successfully!",
    })))
}
