//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ROCKETSHOES_API_URL` - Inventory service base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_STORAGE_DIR` - Directory for the file-backed store (default: `.rocketshoes`)
//! - `ROCKETSHOES_STORAGE_KEY` - Key of the cart blob (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_LOCALE` - Notice language, `pt-BR` or `en` (default: `pt-BR`)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product record cache TTL (default: 300)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - HTTP request timeout (default: none)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::notice::Locale;
use crate::store::{DEFAULT_STORAGE_KEY, StoreSettings};

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Inventory service configuration
    pub inventory: InventoryConfig,
    /// Directory for the file-backed store
    pub storage_dir: PathBuf,
    /// Key the cart blob is stored under
    pub storage_key: String,
    /// Notice language
    pub locale: Locale,
}

/// Inventory service configuration.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Base URL; `stock/{id}` and `products/{id}` are resolved against it
    pub base_url: Url,
    /// How long product records stay cached (stock is never cached)
    pub product_cache_ttl: Duration,
    /// Per-request timeout, if any
    pub timeout: Option<Duration>,
}

impl InventoryConfig {
    /// Configuration pointing at `base_url` with default cache TTL and no timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            product_cache_ttl: Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS),
            timeout: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("ROCKETSHOES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_API_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let product_cache_ttl = parse_secs(&lookup, "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS")?
            .unwrap_or(Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS));
        let timeout = parse_secs(&lookup, "ROCKETSHOES_HTTP_TIMEOUT_SECS")?;

        let locale = match lookup("ROCKETSHOES_LOCALE") {
            Some(value) => value.parse::<Locale>().map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_LOCALE".to_string(), e.to_string())
            })?,
            None => Locale::default(),
        };

        let storage_key = lookup("ROCKETSHOES_STORAGE_KEY")
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            inventory: InventoryConfig {
                base_url,
                product_cache_ttl,
                timeout,
            },
            storage_dir: lookup("ROCKETSHOES_STORAGE_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from),
            storage_key,
            locale,
        })
    }

    /// Settings for opening a [`crate::CartStore`].
    #[must_use]
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            key: self.storage_key.clone(),
            locale: self.locale,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional whole number of seconds.
fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.inventory.base_url.as_str(), "http://localhost:3333/");
        assert_eq!(config.inventory.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.inventory.timeout, None);
        assert_eq!(config.storage_dir, PathBuf::from(".rocketshoes"));
        assert_eq!(config.storage_key, "@RocketShoes:cart");
        assert_eq!(config.locale, Locale::PtBr);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ROCKETSHOES_API_URL", "https://api.example.com/v1/"),
            ("ROCKETSHOES_STORAGE_DIR", "/var/lib/cart"),
            ("ROCKETSHOES_STORAGE_KEY", "@Shop:cart"),
            ("ROCKETSHOES_LOCALE", "en"),
            ("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS", "10"),
            ("ROCKETSHOES_HTTP_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.inventory.base_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(config.inventory.product_cache_ttl, Duration::from_secs(10));
        assert_eq!(config.inventory.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/cart"));
        assert_eq!(config.store_settings().key, "@Shop:cart");
        assert_eq!(config.store_settings().locale, Locale::En);
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("ROCKETSHOES_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ROCKETSHOES_API_URL"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(load(&[("ROCKETSHOES_API_URL", "ftp://example.com")]).is_err());
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("ROCKETSHOES_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ROCKETSHOES_HTTP_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_invalid_locale() {
        assert!(load(&[("ROCKETSHOES_LOCALE", "klingon")]).is_err());
    }

    #[test]
    fn test_empty_storage_key_falls_back_to_default() {
        let config = load(&[("ROCKETSHOES_STORAGE_KEY", "")]).unwrap();
        assert_eq!(config.storage_key, "@RocketShoes:cart");
    }
}
