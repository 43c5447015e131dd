//! Authentication route handlers.
//!
//! Registration, customer/admin login, logout, and the password-reset flow.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
}

/// Create a customer account.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&form.username, &form.email, &form.password)
        .await?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful! Please log in.",
        })),
    ))
}

/// Customer login. Admin accounts are redirected to the admin portal.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&form.email, &form.password).await?;

    set_current_user(&session, &CurrentUser::from_user(&user))
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;

    info!(user_id = %user.id, "customer logged in");
    Ok(Json(json!({
        "success": true,
        "message": "Login successful!",
    })))
}

/// Admin login.
#[instrument(skip(state, session, form))]
pub async fn admin_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth.admin_login(&form.email, &form.password).await?;

    set_current_user(&session, &CurrentUser::from_user(&user))
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;

    info!(user_id = %user.id, "admin logged in");
    Ok(Json(json!({
        "success": true,
        "message": "Admin login successful!",
    })))
}

/// Log the current user out.
#[instrument(skip(session))]
pub async fn logout(RequireUser(user): RequireUser, session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    info!(user_id = %user.id, "user logged out");
    Ok(Json(json!({
        "success": true,
        "message": "You have been logged out.",
    })))
}

/// Report whether a user is logged in.
pub async fn status(OptionalUser(user): OptionalUser) -> impl IntoResponse {
    Json(json!({ "is_logged_in": user.is_some() }))
}

/// Issue a password reset token and email the link.
///
/// The response is the same generic message whether or not the email matches
/// an account, so the endpoint cannot be used to enumerate users.
#[instrument(skip(state, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<Response> {
    const GENERIC: &str =
        "If an account with that email exists, a password reset link has been sent.";

    let auth = AuthService::new(state.pool());
    let Some((user, token)) = auth.start_password_reset(&form.email).await? else {
        warn!("password reset requested for unknown email");
        return Ok(Json(json!({ "success": true, "message": GENERIC })).into_response());
    };

    let sent = match state.mailer() {
        Some(mailer) => mailer
            .send_password_reset(user.email.as_str(), &token)
            .await
            .map_err(|e| warn!(user_id = %user.id, error = %e, "reset email failed"))
            .is_ok(),
        None => {
            warn!("password reset requested but SMTP is not configured");
            false
        }
    };

    if sent {
        info!(user_id = %user.id, "password reset token issued and emailed");
        Ok(Json(json!({ "success": true, "message": GENERIC })).into_response())
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "Failed to send password reset email. Please try again later.",
            })),
        )
            .into_response())
    }
}

/// Consume a reset token and set the new password.
#[instrument(skip(state, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<impl IntoResponse> {
    if form.token.is_empty() || form.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Token and new password are required.".to_owned(),
        ));
    }

    let auth = AuthService::new(state.pool());
    auth.reset_password(&form.token, &form.new_password).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Your password has been reset successfully. You can now log in.",
    })))
}
