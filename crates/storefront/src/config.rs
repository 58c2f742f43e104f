//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BMART_FAKESTORE_URL` - FakeStore API base URL (default: <https://fakestoreapi.com>)
//! - `BMART_DUMMYJSON_URL` - DummyJSON API base URL (default: <https://dummyjson.com>)
//! - `BMART_CATEGORY_TIMEOUT_MS` - Per-request timeout for category lists (default: 5000)
//! - `BMART_PRODUCT_TIMEOUT_MS` - Per-request timeout for product lists (default: 8000)
//! - `BMART_CACHE_TTL_SECS` - Upstream response cache lifetime (default: 300)
//! - `BMART_MIN_PRODUCTS` - Top up the catalog below this many products (default: 20)
//! - `BMART_TOPUP_PRODUCTS` - Synthetic products added by a top-up (default: 30)
//! - `BMART_FALLBACK_PRODUCTS` - Synthetic catalog size when every source fails (default: 50)
//! - `BMART_STORAGE_DIR` - Directory for cart, roster and session files (default: in-memory)
//! - `BMART_RNG_SEED` - Seed for catalog randomness (default: OS entropy)

use core::str::FromStr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::catalog::CatalogSettings;
use crate::sources::UpstreamSource;

const DEFAULT_FAKESTORE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_DUMMYJSON_URL: &str = "https://dummyjson.com";
const DEFAULT_CATEGORY_TIMEOUT_MS: u64 = 5000;
const DEFAULT_PRODUCT_TIMEOUT_MS: u64 = 8000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_MIN_PRODUCTS: usize = 20;
const DEFAULT_TOPUP_PRODUCTS: usize = 30;
const DEFAULT_FALLBACK_PRODUCTS: usize = 50;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub fakestore_url: Url,
    pub dummyjson_url: Url,
    pub category_timeout: Duration,
    pub product_timeout: Duration,
    /// Lifetime of cached upstream responses
    pub cache_ttl: Duration,
    pub min_products: usize,
    pub topup_products: usize,
    pub fallback_products: usize,
    /// `None` keeps cart, roster and session in memory
    pub storage_dir: Option<PathBuf>,
    /// `None` seeds from OS entropy
    pub rng_seed: Option<u64>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            fakestore_url: default_url(DEFAULT_FAKESTORE_URL),
            dummyjson_url: default_url(DEFAULT_DUMMYJSON_URL),
            category_timeout: Duration::from_millis(DEFAULT_CATEGORY_TIMEOUT_MS),
            product_timeout: Duration::from_millis(DEFAULT_PRODUCT_TIMEOUT_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            min_products: DEFAULT_MIN_PRODUCTS,
            topup_products: DEFAULT_TOPUP_PRODUCTS,
            fallback_products: DEFAULT_FALLBACK_PRODUCTS,
            storage_dir: None,
            rng_seed: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            fakestore_url: get_url("BMART_FAKESTORE_URL", DEFAULT_FAKESTORE_URL)?,
            dummyjson_url: get_url("BMART_DUMMYJSON_URL", DEFAULT_DUMMYJSON_URL)?,
            category_timeout: Duration::from_millis(get_parsed_or_default(
                "BMART_CATEGORY_TIMEOUT_MS",
                DEFAULT_CATEGORY_TIMEOUT_MS,
            )?),
            product_timeout: Duration::from_millis(get_parsed_or_default(
                "BMART_PRODUCT_TIMEOUT_MS",
                DEFAULT_PRODUCT_TIMEOUT_MS,
            )?),
            cache_ttl: Duration::from_secs(get_parsed_or_default(
                "BMART_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?),
            min_products: get_parsed_or_default("BMART_MIN_PRODUCTS", DEFAULT_MIN_PRODUCTS)?,
            topup_products: get_parsed_or_default("BMART_TOPUP_PRODUCTS", DEFAULT_TOPUP_PRODUCTS)?,
            fallback_products: get_parsed_or_default(
                "BMART_FALLBACK_PRODUCTS",
                DEFAULT_FALLBACK_PRODUCTS,
            )?,
            storage_dir: get_optional_env("BMART_STORAGE_DIR").map(PathBuf::from),
            rng_seed: get_optional_env("BMART_RNG_SEED")
                .map(|v| parse_value("BMART_RNG_SEED", &v))
                .transpose()?,
        })
    }

    /// The FakeStore and DummyJSON endpoints, in product merge order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if an endpoint path cannot be
    /// joined onto its base URL.
    pub fn upstream_sources(&self) -> Result<Vec<UpstreamSource>, ConfigError> {
        let fakestore = UpstreamSource::fakestore(&self.fakestore_url).map_err(|e| {
            ConfigError::InvalidEnvVar("BMART_FAKESTORE_URL".to_string(), e.to_string())
        })?;
        let dummyjson = UpstreamSource::dummyjson(&self.dummyjson_url).map_err(|e| {
            ConfigError::InvalidEnvVar("BMART_DUMMYJSON_URL".to_string(), e.to_string())
        })?;
        Ok(vec![fakestore, dummyjson])
    }

    /// Catalog loader settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::upstream_sources`].
    pub fn catalog_settings(&self) -> Result<CatalogSettings, ConfigError> {
        Ok(CatalogSettings {
            sources: self.upstream_sources()?,
            category_timeout: self.category_timeout,
            product_timeout: self.product_timeout,
            min_products: self.min_products,
            topup_products: self.topup_products,
            fallback_products: self.fallback_products,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |v| parse_value(key, &v))
}

fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    let value = get_env_or_default(key, default);
    let url = parse_value::<Url>(key, &value)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("default upstream URL is valid")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.fakestore_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.dummyjson_url.as_str(), "https://dummyjson.com/");
        assert_eq!(config.category_timeout, Duration::from_millis(5000));
        assert_eq!(config.product_timeout, Duration::from_millis(8000));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(
            (config.min_products, config.topup_products, config.fallback_products),
            (20, 30, 50)
        );
        assert!(config.storage_dir.is_none());
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_upstream_sources() {
        let sources = StorefrontConfig::default().upstream_sources().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(
            sources[0].products_url.as_str(),
            "https://fakestoreapi.com/products"
        );
        assert_eq!(
            sources[0].categories_url.as_str(),
            "https://fakestoreapi.com/products/categories"
        );
        assert_eq!(
            sources[1].products_url.as_str(),
            "https://dummyjson.com/products?limit=100"
        );
    }

    #[test]
    fn test_catalog_settings_carry_thresholds() {
        let config = StorefrontConfig {
            min_products: 5,
            topup_products: 7,
            fallback_products: 9,
            product_timeout: Duration::from_millis(10),
            ..StorefrontConfig::default()
        };
        let settings = config.catalog_settings().unwrap();
        assert_eq!(settings.min_products, 5);
        assert_eq!(settings.topup_products, 7);
        assert_eq!(settings.fallback_products, 9);
        assert_eq!(settings.product_timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_parse_value_errors_name_the_variable() {
        let err = parse_value::<u64>("BMART_CACHE_TTL_SECS", "soon").unwrap_err();
        assert!(matches!(&err, ConfigError::InvalidEnvVar(key, _) if key == "BMART_CACHE_TTL_SECS"));
        assert_eq!(parse_value::<u64>("X", " 42 ").unwrap(), 42);
    }

    #[test]
    fn test_url_validation() {
        assert!(parse_value::<Url>("X", "not a url").is_err());
        let url = parse_value::<Url>("X", "mailto:someone@example.com").unwrap();
        assert!(url.cannot_be_a_base());
    }
}
