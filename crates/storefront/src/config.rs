//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LUMINA_API_URL` - Base URL of the CRUD service (default: `http://localhost/api`)
//! - `LUMINA_API_SUFFIX` - Suffix appended to every endpoint path, e.g. `.php` (default: empty)
//! - `LUMINA_DATA_DIR` - Directory for the local cart/wishlist/session snapshots
//!   (default: the platform data directory joined with `lumina`)
//! - `LUMINA_CHECKOUT_DELAY_MS` - Simulated payment processing time (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost/api";
const DEFAULT_CHECKOUT_DELAY_MS: u64 = 2000;
const DATA_DIR_NAME: &str = "lumina";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote CRUD service configuration
    pub api: ApiConfig,
    /// Directory holding the local snapshots
    pub data_dir: PathBuf,
    /// Simulated checkout processing delay
    pub checkout_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Remote CRUD service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash
    pub base_url: Url,
    /// Appended to every endpoint path (`/products` becomes `/products.php`)
    pub endpoint_suffix: String,
}

impl ApiConfig {
    /// Create a configuration for `base_url` with no endpoint suffix.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            endpoint_suffix: String::new(),
        }
    }

    /// Full URL for an endpoint path such as `/products`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{path}{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.endpoint_suffix
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = get_or_default(&lookup, "LUMINA_API_URL", DEFAULT_API_URL);
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("LUMINA_API_URL".to_string(), e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "LUMINA_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let endpoint_suffix = lookup("LUMINA_API_SUFFIX").unwrap_or_default();

        let data_dir = match lookup("LUMINA_DATA_DIR") {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir(),
        };

        let delay_ms = get_or_default(
            &lookup,
            "LUMINA_CHECKOUT_DELAY_MS",
            &DEFAULT_CHECKOUT_DELAY_MS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("LUMINA_CHECKOUT_DELAY_MS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                endpoint_suffix,
            },
            data_dir,
            checkout_delay: Duration::from_millis(delay_ms),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Platform data directory for the local snapshots, falling back to `./.lumina`.
fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(".lumina"),
        |dir| dir.join(DATA_DIR_NAME),
    )
}
