//! Storefront kit configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables have local-development defaults so the kit can start without
//! a `.env` file. The defaults for the store domain and access token are not
//! usable against a real store; [`StorefrontKitConfig::validate`] rejects them.
//!
//! - `SHOPIFY_DOMAIN` - Shopify store domain (default: your-store.myshopify.com)
//! - `STOREFRONT_TOKEN` - Storefront API access token
//! - `API_VERSION` - Storefront API version (default: 2023-04)
//! - `CACHE_TTL` - Cache time-to-live in milliseconds (default: 300000)
//! - `STOREFRONT_KIT_DATA_DIR` - Directory for durable storage (default: .storefront-kit)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Default store domain; invalid for production.
pub const DEFAULT_SHOPIFY_DOMAIN: &str = "your-store.myshopify.com";
/// Default access token; invalid for production.
pub const DEFAULT_STOREFRONT_TOKEN: &str = "your-storefront-access-token";
/// Default Storefront API version.
pub const DEFAULT_API_VERSION: &str = "2023-04";
/// Default cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(5 * 60 * 1000);
/// Default durable storage directory.
pub const DEFAULT_DATA_DIR: &str = ".storefront-kit";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more settings still hold missing or placeholder values.
    #[error("Configuration errors: {}", .0.join(", "))]
    Invalid(Vec<String>),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront kit configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StorefrontKitConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub shopify_domain: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
    /// Storefront API version (e.g., 2023-04)
    pub api_version: String,
    /// Time-to-live of every cache entry
    pub cache_ttl: Duration,
    /// Directory backing the file store
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for StorefrontKitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontKitConfig")
            .field("shopify_domain", &self.shopify_domain)
            .field("storefront_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("cache_ttl", &self.cache_ttl)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl Default for StorefrontKitConfig {
    fn default() -> Self {
        Self {
            shopify_domain: DEFAULT_SHOPIFY_DOMAIN.to_string(),
            storefront_token: SecretString::from(DEFAULT_STOREFRONT_TOKEN),
            api_version: DEFAULT_API_VERSION.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StorefrontKitConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Never
    /// fails: unset variables take their defaults. Call [`Self::validate`]
    /// before talking to a real store.
    #[must_use]
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self {
            shopify_domain: get_env_or_default("SHOPIFY_DOMAIN", DEFAULT_SHOPIFY_DOMAIN),
            storefront_token: SecretString::from(get_env_or_default(
                "STOREFRONT_TOKEN",
                DEFAULT_STOREFRONT_TOKEN,
            )),
            api_version: get_env_or_default("API_VERSION", DEFAULT_API_VERSION),
            cache_ttl: parse_cache_ttl(get_optional_env("CACHE_TTL").as_deref()),
            data_dir: PathBuf::from(get_env_or_default("STOREFRONT_KIT_DATA_DIR", DEFAULT_DATA_DIR)),
        }
    }

    /// Reject missing and placeholder values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` listing every offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.shopify_domain.trim().is_empty() || self.shopify_domain == DEFAULT_SHOPIFY_DOMAIN {
            errors.push("SHOPIFY_DOMAIN must be configured".to_string());
        } else if self.api_url().is_err() {
            errors.push("SHOPIFY_DOMAIN must be a valid host name".to_string());
        }

        let token = self.storefront_token.expose_secret();
        if token.trim().is_empty() || token == DEFAULT_STOREFRONT_TOKEN {
            errors.push("STOREFRONT_TOKEN must be configured".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// The Storefront GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the domain does not form a
    /// valid URL.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!(
            "https://{}/api/{}/graphql.json",
            self.shopify_domain, self.api_version
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_DOMAIN".to_string(), e.to_string()))
    }

    /// Cache TTL in milliseconds.
    #[must_use]
    pub fn cache_ttl_millis(&self) -> i64 {
        i64::try_from(self.cache_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse `CACHE_TTL` like `parseInt(value) || default`.
fn parse_cache_ttl(raw: Option<&str>) -> Duration {
    raw.and_then(leading_integer)
        .filter(|millis| *millis > 0)
        .map_or(DEFAULT_CACHE_TTL, Duration::from_millis)
}

/// Parse the leading decimal digits of a string (`"300abc"` → 300).
pub(crate) fn leading_integer(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn configured() -> StorefrontKitConfig {
        StorefrontKitConfig {
            shopify_domain: "acme.myshopify.com".to_string(),
            storefront_token: SecretString::from("a1b2c3d4e5"),
            ..StorefrontKitConfig::default()
        }
    }

    #[test]
    fn test_defaults_are_rejected_individually() {
        let err = StorefrontKitConfig::default().validate().unwrap_err();
        match &err {
            ConfigError::Invalid(errors) => assert_eq!(errors.len(), 2),
            ConfigError::InvalidEnvVar(..) => panic!("unexpected error: {err}"),
        }
        assert_eq!(
            err.to_string(),
            "Configuration errors: SHOPIFY_DOMAIN must be configured, STOREFRONT_TOKEN must be configured"
        );
    }

    #[test]
    fn test_only_placeholder_token_reported() {
        let config = StorefrontKitConfig {
            shopify_domain: "acme.myshopify.com".to_string(),
            ..StorefrontKitConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration errors: STOREFRONT_TOKEN must be configured"
        );
    }

    #[test]
    fn test_configured_values_pass() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            configured().api_url().unwrap().as_str(),
            "https://acme.myshopify.com/api/2023-04/graphql.json"
        );
    }

    #[test]
    fn test_invalid_domain_reported() {
        let config = StorefrontKitConfig {
            shopify_domain: "bad host/with space".to_string(),
            ..configured()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration errors: SHOPIFY_DOMAIN must be a valid host name"
        );
    }

    #[test]
    fn test_parse_cache_ttl() {
        assert_eq!(parse_cache_ttl(None), DEFAULT_CACHE_TTL);
        assert_eq!(parse_cache_ttl(Some("60000")), Duration::from_millis(60_000));
        assert_eq!(parse_cache_ttl(Some("1500ms")), Duration::from_millis(1_500));
        assert_eq!(parse_cache_ttl(Some("0")), DEFAULT_CACHE_TTL);
        assert_eq!(parse_cache_ttl(Some("soon")), DEFAULT_CACHE_TTL);
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", configured());
        assert!(debug_output.contains("acme.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("a1b2c3d4e5"));
    }
}
