//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Responses carry the original API's JSON envelope:
//! `{ "success": false, "message": "..." }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::import::ImportError;
use crate::sheets::SheetsError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout workflow failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Spreadsheet mirror operation failed (admin write paths only; read
    /// paths degrade to empty results instead of surfacing this).
    #[error("Mirror error: {0}")]
    Mirror(#[from] SheetsError),

    /// CSV import failed at the file level.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Mirror(SheetsError::RowNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Mirror(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::IncorrectPassword => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists
                | AuthError::UsernameTaken
                | AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::AdminLoginRequired => StatusCode::FORBIDDEN,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::MissingField(_)
                | AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::MissingShippingInfo => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::InsufficientStock { .. } => StatusCode::CONFLICT,
                CheckoutError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Import(err) => match err {
                ImportError::MissingColumns | ImportError::Csv(_) => StatusCode::BAD_REQUEST,
                ImportError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// User-displayable message; internal details never leak to clients.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Mirror(SheetsError::RowNotFound(id)) => {
                format!("Row with id {id} not found in sheet.")
            }
            Self::Mirror(_) => "Spreadsheet mirror unavailable".to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password.".to_owned(),
                AuthError::IncorrectPassword => "Incorrect current password.".to_owned(),
                AuthError::UserNotFound => "User not found.".to_owned(),
                AuthError::UserAlreadyExists => {
                    "User with that email or username already exists.".to_owned()
                }
                AuthError::UsernameTaken => "Username already taken.".to_owned(),
                AuthError::EmailTaken => "Email already registered.".to_owned(),
                AuthError::AdminLoginRequired => {
                    "Administrators must use the admin login portal.".to_owned()
                }
                AuthError::InvalidResetToken => "Invalid or expired reset token.".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address.".to_owned(),
                AuthError::MissingField(_) => "All fields are required.".to_owned(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => {
                    "Your cart is empty. Please add items before placing an order.".to_owned()
                }
                CheckoutError::MissingShippingInfo => {
                    "Please provide your shipping information before placing an order.".to_owned()
                }
                CheckoutError::InsufficientStock { .. } => {
                    "One of the items in your cart is out of stock.".to_owned()
                }
                CheckoutError::Persistence(_) => "Failed to place order.".to_owned(),
            },
            Self::Import(err) => match err {
                ImportError::MissingColumns => err.to_string(),
                ImportError::Csv(_) => "Error processing CSV file.".to_owned(),
                ImportError::Repository(_) => "Internal server error".to_owned(),
            },
            Self::NotFound(what) => format!("{what} not found."),
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Mirror(SheetsError::RowNotFound(_)) => false,
            Self::Database(_) | Self::Internal(_) | Self::Mirror(_) => true,
            Self::Auth(err) => matches!(err, AuthError::Repository(_) | AuthError::PasswordHash),
            Self::Checkout(err) => matches!(err, CheckoutError::Persistence(_)),
            Self::Import(err) => matches!(err, ImportError::Repository(_)),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(json!({
            "success": false,
            "message": self.message(),
        }));

        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_precondition_failures_are_client_errors() {
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::MissingShippingInfo)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::InsufficientStock {
                product_id: farmgate_core::ProductId::new(1)
            })),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::AdminLoginRequired)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("Order".to_owned());
        assert_eq!(err.message(), "Order not found.");
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
