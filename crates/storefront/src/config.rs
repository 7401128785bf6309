//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Supabase project URL (REST and Storage APIs)
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service role key (falls back to `SUPABASE_ANON_KEY`)
//! - `MIDTRANS_SERVER_KEY` - Midtrans server key (`SB-` prefix selects the sandbox)
//! - `N8N_WEBHOOK_URL` - AI webhook that extracts product data from a photo
//!
//! ## Optional
//! - `STOREFRONT_BASE_URL` - Public URL used for payment callbacks
//!   (falls back to `NEXT_PUBLIC_BASE_URL`, then `VERCEL_URL`)
//! - `MIDTRANS_SNAP_URL` - Override the Snap transactions endpoint
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Logging is configured by the binary: `RUST_LOG` sets the filter and
//! `LOG_FORMAT=json` switches to structured JSON output.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without a trailing slash
    pub base_url: Option<String>,
    /// Supabase REST and Storage configuration
    pub supabase: SupabaseConfig,
    /// Midtrans Snap configuration
    pub midtrans: MidtransConfig,
    /// AI product extraction webhook configuration
    pub extractor: ExtractorConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Supabase project configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: Url,
    /// Service role (or anon) key, sent as `apikey` and bearer token
    pub service_key: SecretString,
}

/// Midtrans Snap configuration.
#[derive(Debug, Clone)]
pub struct MidtransConfig {
    /// Server key used for Basic auth and notification signatures
    pub server_key: SecretString,
    /// Explicit Snap endpoint; derived from the key when absent
    pub snap_url: Option<Url>,
}

/// AI webhook configuration.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Webhook receiving `{ "image_url": ... }`
    pub webhook_url: Url,
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_optional_env("STOREFRONT_BASE_URL")
            .or_else(|| get_optional_env("NEXT_PUBLIC_BASE_URL"))
            .or_else(|| get_optional_env("VERCEL_URL"))
            .and_then(|raw| resolve_base_url(&raw));

        Ok(Self {
            host,
            port,
            base_url,
            supabase: SupabaseConfig::from_env()?,
            midtrans: MidtransConfig::from_env()?,
            extractor: ExtractorConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_required_url("SUPABASE_URL")?;
        let service_key = match get_validated_secret("SUPABASE_SERVICE_ROLE_KEY") {
            Err(ConfigError::MissingEnvVar(_)) => get_validated_secret("SUPABASE_ANON_KEY")
                .map_err(|e| match e {
                    ConfigError::MissingEnvVar(_) => {
                        ConfigError::MissingEnvVar("SUPABASE_SERVICE_ROLE_KEY".to_string())
                    }
                    other => other,
                })?,
            other => other?,
        };
        Ok(Self { url, service_key })
    }
}

impl MidtransConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let snap_url = get_optional_env("MIDTRANS_SNAP_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("MIDTRANS_SNAP_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;
        Ok(Self {
            server_key: get_validated_secret("MIDTRANS_SERVER_KEY")?,
            snap_url,
        })
    }
}

impl ExtractorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            webhook_url: get_required_url("N8N_WEBHOOK_URL")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Normalize a public base URL: prefix `https://` when no scheme is given and
/// drop trailing slashes. Blank input yields `None`.
fn resolve_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable and parse it as a URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

    // Real API keys have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the provider dashboard."
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
