//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farmgate_core::{Email, UserId};

/// A storefront user.
///
/// The password hash never leaves the repository layer; handlers only ever
/// see this type.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name, unique across the store.
    pub username: String,
    /// User's email address.
    pub email: Email,
    /// Whether this user may access the admin panel.
    pub is_admin: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}
