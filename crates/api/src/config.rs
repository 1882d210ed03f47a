//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `HEARTHSIDE_JWT_SECRET` - HS256 signing key (min 32 bytes)
//!
//! ## Optional
//! - `HEARTHSIDE_HOST` - Bind address (default: 127.0.0.1)
//! - `HEARTHSIDE_PORT` - Listen port (default: 3015)
//! - `HEARTHSIDE_TOKEN_TTL_DAYS` - Bearer token lifetime (default: 30)
//! - `HEARTHSIDE_ALLOWED_ORIGIN` - CORS allow-origin for the SPA
//! - `HEARTHSIDE_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `HEARTHSIDE_PAYMENT_URL` / `HEARTHSIDE_PAYMENT_API_KEY` - Hosted-checkout
//!   gateway; payment redirects are disabled unless both are set
//! - `HEARTHSIDE_EMAIL_URL` / `HEARTHSIDE_EMAIL_API_KEY` /
//!   `HEARTHSIDE_EMAIL_FROM` - Transactional mail provider; welcome mail is
//!   disabled unless all three are set
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Bearer tokens are signed with HS256; anything shorter than this is
/// brute-forceable.
const MIN_JWT_SECRET_LENGTH: usize = 32;

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

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// HS256 signing key for bearer tokens
    pub jwt_secret: SecretString,
    /// Bearer token lifetime in days
    pub token_ttl_days: i64,
    /// CORS allow-origin for the SPA; permissive when unset
    pub allowed_origin: Option<String>,
    /// Connection pool size
    pub db_max_connections: u32,
    /// Hosted-checkout gateway; redirects disabled when `None`
    pub payment: Option<PaymentConfig>,
    /// Transactional mail provider; welcome mail disabled when `None`
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Hosted-checkout payment gateway configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Gateway base URL
    pub base_url: String,
    /// Gateway API credential
    pub api_key: SecretString,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Transactional mail provider configuration.
#[derive(Clone)]
pub struct EmailConfig {
    /// Provider base URL
    pub base_url: String,
    /// Provider API credential
    pub api_key: SecretString,
    /// From address for outbound mail
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or malformed,
    /// or if the JWT secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = parse_env_or_default("HEARTHSIDE_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("HEARTHSIDE_PORT", "3015")?;
        let jwt_secret = get_required_secret("HEARTHSIDE_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "HEARTHSIDE_JWT_SECRET")?;
        let token_ttl_days = parse_env_or_default("HEARTHSIDE_TOKEN_TTL_DAYS", "30")?;
        let allowed_origin = get_optional_env("HEARTHSIDE_ALLOWED_ORIGIN");
        let db_max_connections = parse_env_or_default("HEARTHSIDE_DB_MAX_CONNECTIONS", "5")?;
        let payment = PaymentConfig::from_env();
        let email = EmailConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_days,
            allowed_origin,
            db_max_connections,
            payment,
            email,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PaymentConfig {
    fn from_env() -> Option<Self> {
        let base_url = get_optional_env("HEARTHSIDE_PAYMENT_URL")?;
        let api_key = get_optional_env("HEARTHSIDE_PAYMENT_API_KEY")?;
        Some(Self {
            base_url,
            api_key: SecretString::from(api_key),
        })
    }
}

impl EmailConfig {
    fn from_env() -> Option<Self> {
        let base_url = get_optional_env("HEARTHSIDE_EMAIL_URL")?;
        let api_key = get_optional_env("HEARTHSIDE_EMAIL_API_KEY")?;
        let from_address = get_optional_env("HEARTHSIDE_EMAIL_FROM")?;
        Some(Self {
            base_url,
            api_key: SecretString::from(api_key),
            from_address,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable with a default value.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that the JWT secret meets the minimum length requirement.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} bytes (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ApiConfig {
        ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3015,
            jwt_secret: SecretString::from("x".repeat(64)),
            token_ttl_days: 30,
            allowed_origin: None,
            db_max_connections: 5,
            payment: None,
            email: None,
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3015);
    }

    #[test]
    fn test_jwt_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_jwt_secret(&secret, "TEST_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_jwt_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_jwt_secret(&secret, "TEST_SECRET").is_ok());
    }

    #[test]
    fn test_payment_config_debug_redacts_key() {
        let config = PaymentConfig {
            base_url: "https://pay.example.com".to_string(),
            api_key: SecretString::from("super_secret_key"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://pay.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
    }

    #[test]
    fn test_email_config_debug_redacts_key() {
        let config = EmailConfig {
            base_url: "https://mail.example.com".to_string(),
            api_key: SecretString::from("super_secret_key"),
            from_address: "orders@hearthside.shop".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("orders@hearthside.shop"));
        assert!(!debug_output.contains("super_secret_key"));
    }
}
