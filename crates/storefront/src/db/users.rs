//! User repository for database operations.
//!
//! Customers and admins share one table; admins carry the `is_admin` flag.
//! Password hashes are only handed to the auth service, never to handlers.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use farmgate_core::{Email, UserId};

use super::RepositoryError;
use crate::models::user::User;

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    is_admin: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            is_admin: row.is_admin != 0,
            created_at: row.created_at,
        })
    }
}

/// A password reset token row.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// The owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.user_id)
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

const SELECT_USER: &str = "SELECT id, username, email, is_admin, created_at FROM users";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, email, password_hash, is_admin) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, username, email, is_admin, created_at",
        )
        .bind(username)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(i64::from(is_admin))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "username or email already registered".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = ?1"))
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(FromRow)]
        struct WithHash {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, WithHash>(
            "SELECT id, username, email, is_admin, created_at, password_hash \
             FROM users WHERE email = ?1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Get a user's password hash by id (for password changes).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = ?1")
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(hash,)| hash))
    }

    /// Whether a username is taken by another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_taken(
        &self,
        username: &str,
        exclude: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ?1 AND id != ?2")
                .bind(username)
                .bind(exclude.as_i64())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.is_some())
    }

    /// Whether an email is registered to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_taken(&self, email: &Email, exclude: UserId) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = ?1 AND id != ?2")
                .bind(email.as_str())
                .bind(exclude.as_i64())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.is_some())
    }

    /// Update a user's username and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_profile(
        &self,
        id: UserId,
        username: &str,
        email: &Email,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET username = ?2, email = ?3 WHERE id = ?1")
            .bind(id.as_i64())
            .bind(username)
            .bind(email.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(id.as_i64())
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Store a fresh password reset token, replacing any prior token for the
    /// user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create_reset_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (user_id, token, expires_at) VALUES (?1, ?2, ?3)",
        )
        .bind(user_id.as_i64())
        .bind(token)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Look up a reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, RepositoryError> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token, expires_at FROM password_reset_tokens WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a reset token (after use or on expiry).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_reset_token(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE token = ?1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
