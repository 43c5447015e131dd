//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::warn;

use crate::config::StorefrontConfig;
use crate::services::Mailer;
use crate::sheets::SheetsClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; gives handlers the request-scoped view of the
/// database pool, the optional spreadsheet mirror, and the optional mailer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    sheets: Option<SheetsClient>,
    mailer: Option<Mailer>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The spreadsheet mirror and the mailer are both optional: missing
    /// configuration (or a mailer that fails to build) degrades that feature
    /// instead of stopping the store.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Self {
        let sheets = config.sheets.as_ref().map(|sheets| {
            SheetsClient::new(
                sheets.api_base.clone(),
                sheets.access_token.clone(),
                sheets.products.clone(),
                sheets.orders.clone(),
            )
        });
        if sheets.is_none() {
            warn!("spreadsheet mirror not configured; running unmirrored");
        }

        let mailer = config.smtp.as_ref().and_then(|smtp| {
            Mailer::new(smtp, &config.base_url)
                .map_err(|e| warn!(error = %e, "SMTP relay unavailable; password-reset mail disabled"))
                .ok()
        });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sheets,
                mailer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get the spreadsheet mirror client, if configured.
    #[must_use]
    pub fn sheets(&self) -> Option<&SheetsClient> {
        self.inner.sheets.as_ref()
    }

    /// Get the mailer, if configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&Mailer> {
        self.inner.mailer.as_ref()
    }
}
