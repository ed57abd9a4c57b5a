//! Timestamped cache entries.

use serde::{Deserialize, Serialize};

/// A cached snapshot of one remote read.
///
/// Entries are immutable once written; a refresh replaces the whole entry.
/// Serialized as `{"data": ..., "timestamp": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T = serde_json::Value> {
    /// The cached payload.
    pub data: T,
    /// Write time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Create an entry written at `timestamp`.
    #[must_use]
    pub const fn new(data: T, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// Whether the entry is still fresh at `now` for the given TTL.
    ///
    /// Valid iff `now - timestamp < ttl_millis`.
    #[must_use]
    pub const fn is_valid_at(&self, now: i64, ttl_millis: i64) -> bool {
        now.saturating_sub(self.timestamp) < ttl_millis
    }
}
