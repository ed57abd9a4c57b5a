//! Configuration check.
//!
//! ```bash
//! sfk config check
//! ```

use serde_json::json;
use storefront_kit::StorefrontKitConfig;
use tracing::info;

use super::{CommandResult, write_json};

/// Validate the environment configuration and print the resolved settings.
///
/// # Errors
///
/// Returns every configuration problem at once, or an error if the API URL
/// cannot be built.
pub fn check() -> CommandResult {
    let config = StorefrontKitConfig::from_env();
    config.validate()?;
    let endpoint = config.api_url()?;

    info!(endpoint = %endpoint, "Configuration is valid");
    write_json(&json!({
        "endpoint": endpoint.as_str(),
        "apiVersion": config.api_version,
        "cacheTtlMillis": config.cache_ttl_millis(),
        "dataDir": config.data_dir.display().to_string(),
    }))
}
