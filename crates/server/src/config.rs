//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FARMLINK_DATABASE_URL` - `PostgreSQL` connection string
//! - `FARMLINK_JWT_SECRET` - Bearer-token signing secret (min 32 chars, high entropy)
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `CLOUDINARY_CLOUD_NAME` - Cloudinary cloud identifier
//! - `CLOUDINARY_API_KEY` - Cloudinary API key
//! - `CLOUDINARY_API_SECRET` - Cloudinary API secret
//!
//! ## Optional
//! - `FARMLINK_HOST` - Bind address (default: 127.0.0.1)
//! - `FARMLINK_PORT` - Listen port (default: 5000)
//! - `FARMLINK_TOKEN_TTL_SECS` - Token lifetime (default: 30 days)
//! - `FARMLINK_CURRENCY` - ISO currency code for payments (default: npr)
//! - `FARMLINK_TAX_RATE` - Tax rate as a decimal fraction (default: 0.15)
//! - `FARMLINK_SHIPPING_FLAT_FEE` - Flat shipping fee (default: 10.00)
//! - `FARMLINK_FREE_SHIPPING_OVER` - Free-shipping threshold (default: 100.00)
//! - `FARMLINK_VOID_PENDING_AFTER_SECS` - Reconciler timeout for unpaid orders (default: 1 hour)
//! - `CLOUDINARY_FOLDER` - Upload folder (default: farmlink)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use farmlink_core::PricingRules;

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
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer-token signing secret
    pub jwt_secret: SecretString,
    /// Lifetime of issued tokens, in seconds
    pub token_ttl_secs: u64,
    /// Pricing rules used for authoritative totals
    pub pricing: PricingRules,
    /// Unconfirmed `pending_payment` orders older than this are swept
    /// by the reconciler
    pub void_pending_after_secs: u64,
    /// Stripe payment configuration
    pub stripe: StripeConfig,
    /// Cloudinary image hosting configuration
    pub cloudinary: CloudinaryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe API secret key (server-side only, never sent to clients)
    pub secret_key: SecretString,
    /// ISO 4217 currency code, lowercase (e.g. "npr")
    pub currency: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish()
    }
}

/// Cloudinary image hosting configuration.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// Cloud name, part of the upload URL
    pub cloud_name: String,
    /// API key (sent with upload requests)
    pub api_key: String,
    /// API secret used to sign uploads
    pub api_secret: SecretString,
    /// Folder uploads are placed under
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .finish()
    }
}

impl ServerConfig {
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

        let database_url = get_database_url("FARMLINK_DATABASE_URL")?;
        let host = get_env_or_default("FARMLINK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMLINK_HOST".to_string(), e.to_string()))?;
        let port = parse_env_or_default("FARMLINK_PORT", 5000)?;
        let jwt_secret = get_validated_secret("FARMLINK_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "FARMLINK_JWT_SECRET")?;
        let token_ttl_secs = parse_env_or_default("FARMLINK_TOKEN_TTL_SECS", 30 * 24 * 60 * 60)?;
        let void_pending_after_secs =
            parse_env_or_default("FARMLINK_VOID_PENDING_AFTER_SECS", 60 * 60)?;

        let pricing = pricing_from_env()?;
        let stripe = StripeConfig::from_env()?;
        let cloudinary = CloudinaryConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_secs,
            pricing,
            void_pending_after_secs,
            stripe,
            cloudinary,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_required_secret("STRIPE_SECRET_KEY")?,
            currency: get_env_or_default("FARMLINK_CURRENCY", "npr"),
        })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_required_secret("CLOUDINARY_API_SECRET")?,
            folder: get_env_or_default("CLOUDINARY_FOLDER", "farmlink"),
        })
    }
}

fn pricing_from_env() -> Result<PricingRules, ConfigError> {
    let defaults = PricingRules::default();
    Ok(PricingRules {
        tax_rate: parse_decimal_or("FARMLINK_TAX_RATE", defaults.tax_rate)?,
        shipping_flat_fee: parse_decimal_or("FARMLINK_SHIPPING_FLAT_FEE", defaults.shipping_flat_fee)?,
        free_shipping_over: parse_decimal_or("FARMLINK_FREE_SHIPPING_OVER", defaults.free_shipping_over)?,
    })
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

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_decimal_or(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    parse_env_or_default(key, default)
}

/// Validate that the JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
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
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_jwt_secret(&secret, "TEST_JWT").is_err());
    }

    #[test]
    fn test_validate_jwt_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_jwt_secret(&secret, "TEST_JWT").is_ok());
    }

    #[test]
    fn test_stripe_config_debug_redacts_secret() {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_live_abc123"),
            currency: "npr".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("npr"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_live_abc123"));
    }

    #[test]
    fn test_cloudinary_config_debug_redacts_secret() {
        let config = CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key123".to_string(),
            api_secret: SecretString::from("cloudinary_api_secret_value"),
            folder: "farmlink".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("demo"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("cloudinary_api_secret_value"));
    }
}
