//! Authentication middleware and extractors.
//!
//! Handlers declare their auth requirement through extractors; the session is
//! the source of identity and routes trust it without re-validating
//! credentials.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user without rejecting guests.
pub struct OptionalUser(pub Option<CurrentUser>);

/// Error returned when a request lacks the required authentication.
pub enum AuthRejection {
    /// Not logged in at all.
    Unauthorized,
    /// Logged in, but not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Please log in first."),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required."),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

async fn current_user(parts: &mut Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;

        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "admin route refused for non-admin user");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Helper to set the current user in the session after login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
