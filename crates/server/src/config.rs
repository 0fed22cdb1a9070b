//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESMAN_JWT_SECRET` - Session token signing key (min 32 chars, high entropy)
//!
//! ## Optional
//! - `RESMAN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the in-memory store is used)
//! - `RESMAN_HOST` - Bind address (default: 127.0.0.1)
//! - `RESMAN_PORT` - Listen port (default: 8080)
//! - `RESMAN_SESSION_MINUTES` - Session token lifetime (default: 120)
//! - `RESMAN_NEARBY_RADIUS_KM` - Radius of the near-by search (default: 10)
//! - `RESMAN_CORS_ORIGINS` - Comma separated list of allowed origins
//! - `RESMAN_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

const DEFAULT_SESSION_MINUTES: i64 = 120;
const DEFAULT_NEARBY_RADIUS_KM: f64 = 10.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL; `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// HMAC key for session tokens
    pub jwt_secret: SecretString,
    /// Session token lifetime in minutes
    pub session_minutes: i64,
    /// Radius of the public near-by search in kilometres
    pub nearby_radius_km: f64,
    /// Allowed CORS origins (empty disables the CORS layer)
    pub cors_origins: Vec<String>,
    /// Tracing output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("RESMAN_DATABASE_URL");
        let host = parse_env("RESMAN_HOST", "127.0.0.1")?;
        let port = parse_env("RESMAN_PORT", "8080")?;
        let jwt_secret = get_validated_secret("RESMAN_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "RESMAN_JWT_SECRET")?;

        let session_minutes: i64 =
            parse_env("RESMAN_SESSION_MINUTES", &DEFAULT_SESSION_MINUTES.to_string())?;
        if session_minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RESMAN_SESSION_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        let nearby_radius_km: f64 =
            parse_env("RESMAN_NEARBY_RADIUS_KM", &DEFAULT_NEARBY_RADIUS_KM.to_string())?;
        if !nearby_radius_km.is_finite() || nearby_radius_km <= 0.0 {
            return Err(ConfigError::InvalidEnvVar(
                "RESMAN_NEARBY_RADIUS_KM".to_string(),
                "must be a positive number".to_string(),
            ));
        }

        let cors_origins = get_optional_env("RESMAN_CORS_ORIGINS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        let log_format = parse_env("RESMAN_LOG_FORMAT", "text")?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            session_minutes,
            nearby_radius_km,
            cors_origins,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for an in-memory server on an ephemeral local port.
    ///
    /// Used by tests and local tooling; the signing key is taken as given.
    #[must_use]
    pub fn in_memory(jwt_secret: SecretString) -> Self {
        Self {
            database_url: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            jwt_secret,
            session_minutes: DEFAULT_SESSION_MINUTES,
            nearby_radius_km: DEFAULT_NEARBY_RADIUS_KM,
            cors_origins: Vec::new(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that a signing key meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
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

    #[allow(clippy::cast_precision_loss)] // Secret lengths are far below f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
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
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("zzzz") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_rejects_placeholders() {
        let err = validate_secret_strength("changeme-now-please-1234567890", "K").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("my-jwt-secret-value", "K").is_err());
    }

    #[test]
    fn test_validate_secret_strength_rejects_low_entropy() {
        assert!(validate_secret_strength(&"ab".repeat(20), "K").is_err());
    }

    #[test]
    fn test_validate_secret_strength_accepts_random_key() {
        assert!(validate_secret_strength("Qm7#vR2!pL9@zX4$kW8^nB3&tY6*hD1", "K").is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "K").is_err());
        assert!(validate_secret_length(&SecretString::from("k".repeat(32)), "K").is_ok());
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list(" http://a.test, ,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_in_memory_defaults() {
        let config = ServerConfig::in_memory(SecretString::from("x".repeat(32)));
        assert!(config.database_url.is_none());
        assert_eq!(config.session_minutes, 120);
        assert!((config.nearby_radius_km - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.socket_addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = ServerConfig::in_memory(SecretString::from("super-private-signing-key-0123456789"));
        config.database_url = Some(SecretString::from("postgres://user:hunter2@db/resman"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-private-signing-key"));
        assert!(!debug.contains("hunter2"));
    }
}
