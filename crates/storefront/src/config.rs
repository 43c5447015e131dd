//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - SQLite connection string (e.g. `sqlite://farmgate.db`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! ## Spreadsheet mirror (all-or-nothing; absent disables the mirror)
//! - `SHEETS_ACCESS_TOKEN` - OAuth bearer token for the Sheets API
//! - `SHEETS_PRODUCTS_SPREADSHEET_ID` / `SHEETS_ORDERS_SPREADSHEET_ID`
//! - `SHEETS_PRODUCTS_TAB` / `SHEETS_ORDERS_TAB` - Tab titles (defaults: Products, Orders)
//! - `SHEETS_PRODUCTS_GRID_ID` / `SHEETS_ORDERS_GRID_ID` - Numeric tab ids (default: 0)
//! - `SHEETS_API_BASE` - Endpoint root override, mainly for tests
//!
//! ## SMTP (absent disables password-reset mail)
//! - `SMTP_HOST`, `SMTP_PORT` (default: 465), `SMTP_USERNAME`, `SMTP_PASSWORD`,
//!   `SMTP_FROM_ADDRESS`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::sheets::SheetRef;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default Sheets API endpoint root.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-", "changeme", "replace", "placeholder", "example", "secret", "password", "xxx",
    "todo", "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// SQLite database URL.
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Spreadsheet mirror configuration; `None` runs the store unmirrored.
    pub sheets: Option<SheetsConfig>,
    /// SMTP configuration; `None` disables password-reset mail.
    pub smtp: Option<SmtpConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Spreadsheet mirror configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SheetsConfig {
    /// Sheets API endpoint root.
    pub api_base: String,
    /// OAuth bearer token (service-account derived).
    pub access_token: SecretString,
    /// The products tab.
    pub products: SheetRef,
    /// The orders tab.
    pub orders: SheetRef,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("api_base", &self.api_base)
            .field("access_token", &"[REDACTED]")
            .field("products", &self.products)
            .field("orders", &self.orders)
            .finish()
    }
}

/// SMTP configuration for outgoing mail.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let sheets = SheetsConfig::from_env()?;
        let smtp = SmtpConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            sheets,
            smtp,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SheetsConfig {
    /// The mirror is configured only when an access token is present; then
    /// both spreadsheet ids become required.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(access_token) = get_optional_env("SHEETS_ACCESS_TOKEN") else {
            return Ok(None);
        };

        let products = SheetRef {
            spreadsheet_id: get_required_env("SHEETS_PRODUCTS_SPREADSHEET_ID")?,
            title: get_env_or_default("SHEETS_PRODUCTS_TAB", "Products"),
            grid_id: parse_env_or_default("SHEETS_PRODUCTS_GRID_ID", 0)?,
        };
        let orders = SheetRef {
            spreadsheet_id: get_required_env("SHEETS_ORDERS_SPREADSHEET_ID")?,
            title: get_env_or_default("SHEETS_ORDERS_TAB", "Orders"),
            grid_id: parse_env_or_default("SHEETS_ORDERS_GRID_ID", 0)?,
        };

        Ok(Some(Self {
            api_base: get_env_or_default("SHEETS_API_BASE", SHEETS_API_BASE),
            access_token: SecretString::from(access_token),
            products,
            orders,
        }))
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: parse_env_or_default("SMTP_PORT", 465)?,
            username: get_required_env("SMTP_USERNAME")?,
            password: get_required_secret("SMTP_PASSWORD")?,
            from_address: get_required_env("SMTP_FROM_ADDRESS")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get and parse an environment variable, falling back to a default.
fn parse_env_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_degenerate_inputs() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_random_looking() {
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        assert!(validate_secret_strength("changeme-but-nobody-did", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from("x".repeat(32)),
            sheets: None,
            smtp: None,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_sheets_config_debug_redacts_token() {
        let config = SheetsConfig {
            api_base: SHEETS_API_BASE.to_owned(),
            access_token: SecretString::from("ya29.super-secret-token"),
            products: SheetRef {
                spreadsheet_id: "abc123".to_owned(),
                title: "Products".to_owned(),
                grid_id: 0,
            },
            orders: SheetRef {
                spreadsheet_id: "def456".to_owned(),
                title: "Orders".to_owned(),
                grid_id: 0,
            },
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abc123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-token"));
    }
}
