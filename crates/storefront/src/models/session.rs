//! Session state types.

use serde::{Deserialize, Serialize};

use farmgate_core::UserId;

/// Session keys used with tower-sessions.
pub mod session_keys {
    /// Key for the authenticated user.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user stored in the session after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl CurrentUser {
    /// Build the session record from a full user.
    #[must_use]
    pub fn from_user(user: &super::user::User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.as_str().to_owned(),
            is_admin: user.is_admin,
        }
    }
}
