//! Response cache maintenance.
//!
//! ```bash
//! sfk cache stats
//! sfk cache clear            # every partition
//! sfk cache clear search     # one partition
//! ```

use storefront_kit::Partition;
use tracing::info;

use super::{CommandResult, session, write_json};

/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn stats() -> CommandResult {
    let storefront = session()?;
    write_json(&storefront.cache().stats())
}

/// Clear `partition`, or every partition when `None`.
///
/// # Errors
///
/// Returns an error for an unknown partition name or a storage failure.
pub fn clear(partition: Option<&str>) -> CommandResult {
    let partition = partition.map(str::parse::<Partition>).transpose()?;
    let storefront = session()?;
    storefront.cache().clear(partition)?;
    match partition {
        Some(partition) => info!(%partition, "Cache partition cleared"),
        None => info!("Cache cleared"),
    }
    Ok(())
}
