//! Relay configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SENDGRID_API_KEY` - SendGrid API key (validated: no placeholders, high entropy)
//! - `EMAIL_FROM` - Sender address for all outgoing mail
//! - `SALES_EMAIL` - Address that receives quote notifications (`QUOTE_EMAIL_TO` is
//!   accepted as a fallback)
//! - `SHOPIFY_SHOP` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (validated like the API key)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 10000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-07)
//! - `SHOPIFY_API_BASE` - Override for the Admin API origin (default: `https://{SHOPIFY_SHOP}`)
//! - `SENDGRID_API_BASE` - Override for the SendGrid API origin (default: <https://api.sendgrid.com>)
//! - `ALLOWED_ORIGINS` - Comma-separated browser origins allowed by CORS
//! - `OUTBOUND_TIMEOUT_SECS` - Timeout for every outbound API call (default: 10)
//! - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use popup_relay_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-07";
const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

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

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for local development.
    #[default]
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

/// Relay application configuration.
///
/// Built once at startup and handed to every client through `AppState`.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Transactional email configuration
    pub email: EmailConfig,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Browser origins allowed to call the API
    pub allowed_origins: Vec<String>,
    /// Upper bound on every outbound HTTP call
    pub outbound_timeout: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Sentry performance tracing sample rate
    pub sentry_traces_sample_rate: f32,
}

/// SendGrid configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct EmailConfig {
    /// SendGrid API key
    pub api_key: SecretString,
    /// SendGrid API origin
    pub api_base: Url,
    /// Sender address
    pub from_address: Email,
    /// Recipient of quote notifications
    pub sales_address: Email,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base.as_str())
            .field("from_address", &self.from_address)
            .field("sales_address", &self.sales_address)
            .finish()
    }
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub shop: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Admin API version (e.g., 2025-07)
    pub api_version: String,
    /// Admin API origin, normally `https://{shop}`
    pub api_base: Url,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl ShopifyConfig {
    /// Base URL for Admin REST calls, e.g. `https://shop/admin/api/2025-07`.
    #[must_use]
    pub fn admin_api_url(&self) -> String {
        format!(
            "{}/admin/api/{}",
            self.api_base.as_str().trim_end_matches('/'),
            self.api_version
        )
    }
}

impl RelayConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RelayConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env
            .get_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = env
            .get_or_default("PORT", "10000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let email = EmailConfig::from_env(&env)?;
        let shopify = ShopifyConfig::from_env(&env)?;

        let allowed_origins = env
            .optional("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .transpose()?
            .unwrap_or_default();

        let outbound_timeout = env
            .get_or_default("OUTBOUND_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "OUTBOUND_TIMEOUT_SECS".to_string(),
                    "must be a positive number of seconds".to_string(),
                )
            })?;

        let log_format = match env.get_or_default("LOG_FORMAT", "pretty").as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected 'pretty' or 'json', got '{other}'"),
                ));
            }
        };

        let sentry_traces_sample_rate = env
            .get_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            email,
            shopify,
            allowed_origins,
            outbound_timeout,
            log_format,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let sales_key = if env.optional("SALES_EMAIL").is_some() {
            "SALES_EMAIL"
        } else if env.optional("QUOTE_EMAIL_TO").is_some() {
            "QUOTE_EMAIL_TO"
        } else {
            return Err(ConfigError::MissingEnvVar("SALES_EMAIL".to_string()));
        };

        Ok(Self {
            api_key: env.validated_secret("SENDGRID_API_KEY")?,
            api_base: env.url_or_default("SENDGRID_API_BASE", DEFAULT_SENDGRID_API_BASE)?,
            from_address: env.email("EMAIL_FROM")?,
            sales_address: env.email(sales_key)?,
        })
    }
}

impl ShopifyConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let shop = env.required("SHOPIFY_SHOP")?;
        let default_base = format!("https://{shop}");

        Ok(Self {
            api_base: env.url_or_default("SHOPIFY_API_BASE", &default_base)?,
            access_token: env.validated_secret("SHOPIFY_ACCESS_TOKEN")?,
            api_version: env.get_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            shop,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the typed accessors used above.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a required variable holding an email address.
    fn email(&self, key: &str) -> Result<Email, ConfigError> {
        let value = self.required(key)?;
        Email::parse(value.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get a URL variable with a default value.
    fn url_or_default(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        Url::parse(&self.get_or_default(key, default))
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
///
/// CORS is sent with credentials, which browsers refuse to pair with a
/// wildcard origin, so `*` is rejected here.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Err(ConfigError::InvalidEnvVar(
            "ALLOWED_ORIGINS".to_string(),
            "wildcard '*' cannot be used with credentialed CORS; list origins explicitly"
                .to_string(),
        ));
    }

    Ok(origins)
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
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}
