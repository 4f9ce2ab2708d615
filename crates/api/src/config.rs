//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `PRODUCTS_API_URL` - Upstream catalog endpoint returning a JSON array of products
//! - Either `JWT_PRIVATE_KEY` + `JWT_PUBLIC_KEY` (base64-encoded PEM, RS256)
//!   or `JWT_SECRET` (HS256, min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 4200)
//! - `PRODUCTS_API_TIMEOUT_SECS` - Upstream request timeout (default: 10)
//! - `JWT_TTL_SECS` - Access token lifetime (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Upstream product catalog
    pub catalog: CatalogConfig,
    /// Access token signing
    pub jwt: JwtConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Upstream product catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub products_api_url: Url,
    pub timeout: Duration,
}

/// JWT signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub keys: JwtKeys,
    pub ttl: Duration,
}

/// Key material used to sign and verify access tokens.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub enum JwtKeys {
    /// RS256 key pair, PEM-encoded.
    Rsa {
        private_pem: SecretString,
        public_pem: String,
    },
    /// HS256 shared secret.
    Hmac { secret: SecretString },
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa { public_pem, .. } => f
                .debug_struct("Rsa")
                .field("private_pem", &"[REDACTED]")
                .field("public_pem", public_pem)
                .finish(),
            Self::Hmac { .. } => f
                .debug_struct("Hmac")
                .field("secret", &"[REDACTED]")
                .finish(),
        }
    }
}

impl ApiConfig {
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
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = SecretString::from(required(env, "DATABASE_URL")?);
        let host = parse_var(env, "API_HOST", "127.0.0.1")?;
        let port = parse_var(env, "PORT", "4200")?;

        let catalog = CatalogConfig::from_lookup(env)?;
        let jwt = JwtConfig::from_lookup(env)?;

        Ok(Self {
            database_url,
            host,
            port,
            catalog,
            jwt,
            sentry_dsn: env("SENTRY_DSN"),
            sentry_environment: env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = required(env, "PRODUCTS_API_URL")?;
        let products_api_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("PRODUCTS_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(products_api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "PRODUCTS_API_URL".to_string(),
                format!("unsupported scheme '{}'", products_api_url.scheme()),
            ));
        }
        let timeout_secs: u64 = parse_var(env, "PRODUCTS_API_TIMEOUT_SECS", "10")?;

        Ok(Self {
            products_api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl JwtConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let keys = match (env("JWT_PRIVATE_KEY"), env("JWT_PUBLIC_KEY")) {
            (Some(private), Some(public)) => JwtKeys::Rsa {
                private_pem: SecretString::from(decode_pem("JWT_PRIVATE_KEY", &private)?),
                public_pem: decode_pem("JWT_PUBLIC_KEY", &public)?,
            },
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("JWT_PUBLIC_KEY".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("JWT_PRIVATE_KEY".into())),
            (None, None) => {
                let secret = required(env, "JWT_SECRET")?;
                validate_jwt_secret(&secret, "JWT_SECRET")?;
                JwtKeys::Hmac {
                    secret: SecretString::from(secret),
                }
            }
        };
        let ttl_secs: u64 = parse_var(env, "JWT_TTL_SECS", "86400")?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            keys,
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn required(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    env(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Keys are shipped base64-encoded so the PEM fits on a single env line.
fn decode_pem(key: &str, value: &str) -> Result<String, ConfigError> {
    let bytes = BASE64
        .decode(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    let pem = String::from_utf8(bytes)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !pem.contains("-----BEGIN") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "decoded value is not a PEM document".to_string(),
        ));
    }
    Ok(pem)
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject short, placeholder-looking or low-entropy signing secrets.
fn validate_jwt_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
