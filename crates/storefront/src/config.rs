//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CAFEGO_DATABASE_URL` - `SQLite` URL (falls back to `DATABASE_URL`, then
//!   `sqlite://cafego.db`)
//! - `CAFEGO_HOST` - Bind address (default: 127.0.0.1)
//! - `CAFEGO_PORT` - Listen port (default: 5000)
//! - `CAFEGO_BASE_URL` - Public URL (default: `http://localhost:5000`); an
//!   `https` URL turns on `Secure` session cookies
//! - `CAFEGO_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `CAFEGO_DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 5)
//! - `CAFEGO_SESSION_TTL_SECS` - Session lifetime; unset means sessions never
//!   expire
//! - `CAFEGO_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::db::PoolSettings;

const DEFAULT_DATABASE_URL: &str = "sqlite://cafego.db";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
///
/// Every variable has a default, so only malformed values fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `SQLite` database URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Connection pool sizing and timeouts
    pub pool: PoolSettings,
    /// Session lifetime, `None` for sessions that never expire
    pub session_ttl: Option<Duration>,
    /// Emit JSON logs instead of human-readable text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = env
            .optional("CAFEGO_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let host = env.parse_or("CAFEGO_HOST", || Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)))?;
        let port = env.parse_or("CAFEGO_PORT", || Ok(DEFAULT_PORT))?;
        let base_url = env
            .optional("CAFEGO_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let max_connections =
            env.parse_or("CAFEGO_DB_MAX_CONNECTIONS", || Ok(DEFAULT_MAX_CONNECTIONS))?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CAFEGO_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let acquire_timeout_secs = env.parse_or("CAFEGO_DB_ACQUIRE_TIMEOUT_SECS", || {
            Ok(DEFAULT_ACQUIRE_TIMEOUT_SECS)
        })?;

        let session_ttl = env
            .optional("CAFEGO_SESSION_TTL_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "CAFEGO_SESSION_TTL_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            base_url,
            pool: PoolSettings {
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
            session_ttl,
            log_json: env
                .optional("CAFEGO_LOG_FORMAT")
                .is_some_and(|format| format.trim().eq_ignore_ascii_case("json")),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Session lifetime as a `chrono` duration, for timestamp arithmetic.
    #[must_use]
    pub fn session_ttl_chrono(&self) -> Option<chrono::Duration> {
        self.session_ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source; empty values count as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse_or<T, D>(&self, key: &str, default: D) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
        D: FnOnce() -> Result<T, ConfigError>,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "sqlite://cafego.db");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.pool.max_connections, 5);
        assert_eq!(config.pool.acquire_timeout, Duration::from_secs(5));
        assert!(config.session_ttl.is_none());
        assert!(config.sentry_dsn.is_none());
        assert!(!config.log_json);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "sqlite://fallback.db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "sqlite://fallback.db");

        let config = load(&[
            ("DATABASE_URL", "sqlite://fallback.db"),
            ("CAFEGO_DATABASE_URL", "sqlite://primary.db"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "sqlite://primary.db");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CAFEGO_HOST", "0.0.0.0"),
            ("CAFEGO_PORT", "8080"),
            ("CAFEGO_BASE_URL", "https://cafe.example.com"),
            ("CAFEGO_DB_MAX_CONNECTIONS", "12"),
            ("CAFEGO_SESSION_TTL_SECS", "3600"),
            ("CAFEGO_LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.pool.max_connections, 12);
        assert_eq!(config.session_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(
            config.session_ttl_chrono(),
            Some(chrono::Duration::hours(1))
        );
        assert!(config.secure_cookies());
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("CAFEGO_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CAFEGO_PORT"));
    }

    #[test]
    fn test_invalid_ttl() {
        let err = load(&[("CAFEGO_SESSION_TTL_SECS", "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CAFEGO_SESSION_TTL_SECS"));
    }

    #[test]
    fn test_zero_connections_rejected() {
        assert!(load(&[("CAFEGO_DB_MAX_CONNECTIONS", "0")]).is_err());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = load(&[("CAFEGO_PORT", ""), ("SENTRY_DSN", "  ")]).unwrap();
        assert_eq!(config.port, 5000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("CAFEGO_DATABASE_URL", "sqlite://hidden-name.db")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hidden-name"));
    }
}
