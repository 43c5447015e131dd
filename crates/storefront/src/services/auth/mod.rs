//! Authentication service.
//!
//! Password registration and login for customers and admins, profile and
//! password maintenance, and the password-reset token lifecycle. The route
//! layer trusts the session after login; this service is the only place that
//! touches password hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::SqlitePool;

use farmgate_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of a password reset token.
const RESET_TOKEN_LENGTH: usize = 48;

/// Reset tokens are valid for one hour.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Registration and Login
    // =========================================================================

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if a field is empty,
    /// `AuthError::InvalidEmail` / `AuthError::WeakPassword` on validation
    /// failure, and `AuthError::UserAlreadyExists` if the username or email
    /// is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let email = Email::parse(email.trim())?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, &email, &password_hash, false)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Customer login with email and password.
    ///
    /// Admin accounts are refused here and directed to the admin portal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong
    /// and `AuthError::AdminLoginRequired` for admin accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.verify_login(email, password).await?;
        if user.is_admin {
            return Err(AuthError::AdminLoginRequired);
        }
        Ok(user)
    }

    /// Admin login with email and password.
    ///
    /// Non-admin accounts fail exactly like wrong credentials so the portal
    /// does not reveal which accounts are admins.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any failure.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.verify_login(email, password).await?;
        if !user.is_admin {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    async fn verify_login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email.trim()).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    // =========================================================================
    // Profile Maintenance
    // =========================================================================

    /// Update username and email, enforcing uniqueness with field-specific
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UsernameTaken` / `AuthError::EmailTaken` on
    /// conflicts and `AuthError::MissingField` on empty input.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        let email = Email::parse(email.trim())?;

        if self.users.username_taken(username, user_id).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.email_taken(&email, user_id).await? {
            return Err(AuthError::EmailTaken);
        }

        self.users.update_profile(user_id, username, &email).await?;
        Ok(())
    }

    /// Change a password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncorrectPassword` if the current password does
    /// not verify and `AuthError::WeakPassword` if the new one is too weak.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let hash = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current_password, &hash).map_err(|_| AuthError::IncorrectPassword)?;

        validate_password(new_password)?;
        let new_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &new_hash).await?;
        Ok(())
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Issue a reset token for the account behind `email`, replacing any
    /// prior token.
    ///
    /// Returns `None` for unknown emails so the route can answer with the
    /// same generic message either way (no account enumeration).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if a query fails.
    pub async fn start_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, AuthError> {
        let Ok(email) = Email::parse(email.trim()) else {
            return Ok(None);
        };
        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        self.users
            .create_reset_token(user.id, &token, expires_at)
            .await?;

        Ok(Some((user, token)))
    }

    /// Consume a reset token and set the new password.
    ///
    /// Expired tokens are deleted on sight.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` for unknown or expired tokens
    /// and `AuthError::WeakPassword` if the new password is too weak.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let entry = self
            .users
            .get_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if entry.is_expired(Utc::now()) {
            self.users.delete_reset_token(token).await?;
            return Err(AuthError::InvalidResetToken);
        }

        validate_password(new_password)?;
        let hash = hash_password(new_password)?;

        self.users.update_password(entry.user_id(), &hash).await?;
        self.users.delete_reset_token(token).await?;
        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate a candidate password.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// Public so the CLI can create admin accounts with the same parameters.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[tokio::test]
    async fn test_register_login_and_admin_gate() {
        let pool = crate::test_util::test_pool().await;
        let auth = AuthService::new(&pool);

        let user = auth
            .register("asha", "asha@example.com", "sunflower9")
            .await
            .unwrap();
        assert!(!user.is_admin);

        // Correct credentials
        let logged_in = auth.login("asha@example.com", "sunflower9").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        // Wrong password
        assert!(matches!(
            auth.login("asha@example.com", "nope-nope-nope").await,
            Err(AuthError::InvalidCredentials)
        ));

        // Customers cannot use the admin portal
        assert!(matches!(
            auth.admin_login("asha@example.com", "sunflower9").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_admin_rejected_from_customer_login() {
        let pool = crate::test_util::test_pool().await;
        let auth = AuthService::new(&pool);
        let users = UserRepository::new(&pool);

        let hash = hash_password("greenhouse7").unwrap();
        let email = Email::parse("root@example.com").unwrap();
        users.create("root", &email, &hash, true).await.unwrap();

        assert!(matches!(
            auth.login("root@example.com", "greenhouse7").await,
            Err(AuthError::AdminLoginRequired)
        ));
        assert!(
            auth.admin_login("root@example.com", "greenhouse7")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let pool = crate::test_util::test_pool().await;
        let auth = AuthService::new(&pool);

        auth.register("asha", "asha@example.com", "sunflower9")
            .await
            .unwrap();

        assert!(matches!(
            auth.register("asha", "other@example.com", "sunflower9")
                .await,
            Err(AuthError::UserAlreadyExists)
        ));
        assert!(matches!(
            auth.register("other", "asha@example.com", "sunflower9")
                .await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let pool = crate::test_util::test_pool().await;
        let auth = AuthService::new(&pool);

        auth.register("asha", "asha@example.com", "sunflower9")
            .await
            .unwrap();

        // Unknown email yields no token but no error either
        assert!(
            auth.start_password_reset("ghost@example.com")
                .await
                .unwrap()
                .is_none()
        );

        let (_, token) = auth
            .start_password_reset("asha@example.com")
            .await
            .unwrap()
            .expect("token for known email");

        auth.reset_password(&token, "newpassword1").await.unwrap();
        assert!(auth.login("asha@example.com", "newpassword1").await.is_ok());

        // Token is single-use
        assert!(matches!(
            auth.reset_password(&token, "anotherpass2").await,
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_reset_token_rejected() {
        let pool = crate::test_util::test_pool().await;
        let auth = AuthService::new(&pool);
        let users = UserRepository::new(&pool);

        let user = auth
            .register("asha", "asha@example.com", "sunflower9")
            .await
            .unwrap();

        users
            .create_reset_token(user.id, "stale-token", Utc::now() - Duration::minutes(5))
            .await
            .unwrap();

        assert!(matches!(
            auth.reset_password("stale-token", "newpassword1").await,
            Err(AuthError::InvalidResetToken)
        ));
        // And it was deleted on sight
        assert!(users.get_reset_token("stale-token").await.unwrap().is_none());
    }
}
