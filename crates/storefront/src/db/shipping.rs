//! Shipping profile repository.
//!
//! At most one profile per user; saving overwrites in place. History is not
//! kept, which is why orders snapshot the address at purchase time.

use sqlx::{FromRow, SqlitePool};

use farmgate_core::UserId;

use super::RepositoryError;
use crate::models::shipping::ShippingProfile;

#[derive(FromRow)]
struct ShippingRow {
    full_name: String,
    address_line1: String,
    address_line2: String,
    address_line3: Option<String>,
    city: String,
    state: String,
    zip_code: String,
    phone: String,
}

impl From<ShippingRow> for ShippingProfile {
    fn from(row: ShippingRow) -> Self {
        Self {
            full_name: row.full_name,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            address_line3: row.address_line3,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            phone: row.phone,
        }
    }
}

/// Repository for shipping profile database operations.
pub struct ShippingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ShippingRepository<'a> {
    /// Create a new shipping repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the user's shipping profile, if one has been saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<ShippingProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, ShippingRow>(
            "SELECT full_name, address_line1, address_line2, address_line3, \
                    city, state, zip_code, phone \
             FROM shipping_info WHERE user_id = ?1",
        )
        .bind(user_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ShippingProfile::from))
    }

    /// Insert the user's first profile or overwrite the existing one.
    ///
    /// Returns `true` when an existing profile was overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a mandatory field is empty.
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        profile: &ShippingProfile,
    ) -> Result<bool, RepositoryError> {
        profile
            .validate()
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;

        let existed = self.get(user_id).await?.is_some();

        sqlx::query(
            "INSERT INTO shipping_info \
                 (user_id, full_name, address_line1, address_line2, address_line3, \
                  city, state, zip_code, phone) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 full_name = excluded.full_name, \
                 address_line1 = excluded.address_line1, \
                 address_line2 = excluded.address_line2, \
                 address_line3 = excluded.address_line3, \
                 city = excluded.city, \
                 state = excluded.state, \
                 zip_code = excluded.zip_code, \
                 phone = excluded.phone",
        )
        .bind(user_id.as_i64())
        .bind(&profile.full_name)
        .bind(&profile.address_line1)
        .bind(&profile.address_line2)
        .bind(&profile.address_line3)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.zip_code)
        .bind(&profile.phone)
        .execute(self.pool)
        .await?;

        Ok(existed)
    }
}
