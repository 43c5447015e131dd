//! Create admin users.

use tracing::info;

use farmgate_core::Email;
use farmgate_storefront::db::users::UserRepository;
use farmgate_storefront::services::auth::hash_password;

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the email is invalid, the account already exists, or
/// a database operation fails.
pub async fn create_user(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let email = Email::parse(email)?;
    let password_hash = hash_password(password).map_err(|e| e.to_string())?;

    let users = UserRepository::new(&pool);
    let user = users.create(username, &email, &password_hash, true).await?;

    info!(user_id = %user.id, %email, "admin user created");
    Ok(())
}
