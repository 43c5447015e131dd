//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] farmgate_core::EmailError),

    /// A required registration field was left empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Username or email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Username already taken by another account.
    #[error("username already taken")]
    UsernameTaken,

    /// Email already registered to another account.
    #[error("email already registered")]
    EmailTaken,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Admin account attempted the customer login.
    #[error("administrators must use the admin login portal")]
    AdminLoginRequired,

    /// Wrong current password on a password change.
    #[error("incorrect current password")]
    IncorrectPassword,

    /// Password reset token unknown or past its expiry.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
