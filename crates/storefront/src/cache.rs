//! Timestamped, durably persisted response cache.
//!
//! # Partitions
//!
//! Entries live in one partition per entity kind, each persisted under its
//! own storage key as a JSON object of `key -> {data, timestamp}`:
//!
//! | Partition | Key | Storage key |
//! |---|---|---|
//! | `ProductById` | product GID | `shopify-cache-productById` |
//! | `ProductByHandle` | product handle | `shopify-cache-productByHandle` |
//! | `Collections` | collection name | `shopify-cache-collections` |
//! | `Search` | search term | `shopify-cache-search` |
//! | `CollectionsList` | (singleton) | `shopify-cache-collectionsList` |
//!
//! The collections list is a single `{data, timestamp}` entry rather than a map.
//!
//! # Strategy
//!
//! Pure time-based expiry with one TTL for every entry. No eviction, no
//! capacity bound, no partial invalidation. [`CacheStore::read_through`]
//! never serves an expired entry: a failed refresh surfaces the error and
//! leaves the stale entry in place until a successful refresh replaces it.
//!
//! Two concurrent reads of the same cold key may both fetch; the last write
//! wins. Entries are snapshots of the same remote read, so this is harmless.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storefront_kit_core::CacheEntry;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::storage::{
    self, COLLECTIONS_KEY, COLLECTIONS_LIST_KEY, DurableStore, PRODUCT_BY_HANDLE_KEY,
    PRODUCT_BY_ID_KEY, SEARCH_KEY, StorageError,
};

// =============================================================================
// Partitions and Keys
// =============================================================================

/// A named subdivision of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    ProductById,
    ProductByHandle,
    Collections,
    Search,
    CollectionsList,
}

impl Partition {
    /// Every partition, in storage-key order.
    pub const ALL: [Self; 5] = [
        Self::ProductById,
        Self::ProductByHandle,
        Self::Collections,
        Self::Search,
        Self::CollectionsList,
    ];

    /// The durable storage key holding this partition.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::ProductById => PRODUCT_BY_ID_KEY,
            Self::ProductByHandle => PRODUCT_BY_HANDLE_KEY,
            Self::Collections => COLLECTIONS_KEY,
            Self::Search => SEARCH_KEY,
            Self::CollectionsList => COLLECTIONS_LIST_KEY,
        }
    }

    /// Short name (`productById`, `search`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProductById => "productById",
            Self::ProductByHandle => "productByHandle",
            Self::Collections => "collections",
            Self::Search => "search",
            Self::CollectionsList => "collectionsList",
        }
    }

    const fn is_singleton(self) -> bool {
        matches!(self, Self::CollectionsList)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Partition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::validation(format!("Unknown cache partition \"{s}\"")))
    }
}

/// Address of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    ProductById(&'a str),
    ProductByHandle(&'a str),
    Collection(&'a str),
    Search(&'a str),
    /// The unkeyed collections list.
    CollectionsList,
}

impl<'a> CacheKey<'a> {
    /// The partition this key addresses.
    #[must_use]
    pub const fn partition(self) -> Partition {
        match self {
            Self::ProductById(_) => Partition::ProductById,
            Self::ProductByHandle(_) => Partition::ProductByHandle,
            Self::Collection(_) => Partition::Collections,
            Self::Search(_) => Partition::Search,
            Self::CollectionsList => Partition::CollectionsList,
        }
    }

    /// The key within the partition, `None` for the singleton.
    #[must_use]
    pub const fn key(self) -> Option<&'a str> {
        match self {
            Self::ProductById(k)
            | Self::ProductByHandle(k)
            | Self::Collection(k)
            | Self::Search(k) => Some(k),
            Self::CollectionsList => None,
        }
    }
}

// =============================================================================
// In-memory partition state
// =============================================================================

#[derive(Debug)]
enum Slot {
    Keyed(HashMap<String, CacheEntry>),
    Single(Option<CacheEntry>),
}

impl Slot {
    fn load(store: &dyn DurableStore, partition: Partition) -> Self {
        let key = partition.storage_key();
        if partition.is_singleton() {
            Self::Single(storage::load_json(store, key))
        } else {
            Self::Keyed(storage::load_json(store, key).unwrap_or_default())
        }
    }

    fn get(&self, key: Option<&str>) -> Option<&CacheEntry> {
        match (self, key) {
            (Self::Keyed(entries), Some(key)) => entries.get(key),
            (Self::Single(entry), None) => entry.as_ref(),
            _ => None,
        }
    }

    fn insert(&mut self, key: Option<&str>, entry: CacheEntry) {
        match (self, key) {
            (Self::Keyed(entries), Some(key)) => {
                entries.insert(key.to_string(), entry);
            }
            (Self::Single(slot), None) => *slot = Some(entry),
            _ => {}
        }
    }

    fn entries(&self) -> Vec<&CacheEntry> {
        match self {
            Self::Keyed(entries) => entries.values().collect(),
            Self::Single(entry) => entry.iter().collect(),
        }
    }

    fn persist(&self, store: &dyn DurableStore, partition: Partition) -> std::result::Result<(), StorageError> {
        let key = partition.storage_key();
        match self {
            Self::Keyed(entries) => storage::save_json(store, key, entries),
            Self::Single(Some(entry)) => storage::save_json(store, key, entry),
            Self::Single(None) => store.remove(key),
        }
    }
}

/// Entry counts of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    pub partition: Partition,
    /// Entries held, fresh or stale.
    pub entries: usize,
    /// Entries still within the TTL.
    pub valid: usize,
}

impl Serialize for Partition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// =============================================================================
// CacheStore
// =============================================================================

/// The response cache shared by all accessors.
pub struct CacheStore {
    storage: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
    slots: Mutex<HashMap<Partition, Slot>>,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("ttl_millis", &self.ttl_millis)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Create a cache over `storage`. Nothing is read until first access.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            storage,
            clock,
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn with_slot<R>(&self, partition: Partition, f: impl FnOnce(&mut Slot) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .entry(partition)
            .or_insert_with(|| Slot::load(self.storage.as_ref(), partition));
        f(slot)
    }

    /// Look up an entry, fresh or stale.
    #[must_use]
    pub fn get(&self, key: CacheKey<'_>) -> Option<CacheEntry> {
        self.with_slot(key.partition(), |slot| slot.get(key.key()).cloned())
    }

    /// Write a fresh entry stamped with the current time.
    ///
    /// The whole partition is written through to durable storage. A storage
    /// failure is logged; the in-memory entry is updated regardless.
    pub fn set(&self, key: CacheKey<'_>, data: Value) {
        let partition = key.partition();
        let entry = CacheEntry::new(data, self.clock.now_millis());
        self.with_slot(partition, |slot| {
            slot.insert(key.key(), entry);
            if let Err(e) = slot.persist(self.storage.as_ref(), partition) {
                tracing::warn!(partition = %partition, error = %e, "Failed to persist cache partition");
            }
        });
    }

    /// Whether `entry` is within the TTL right now.
    #[must_use]
    pub fn is_valid(&self, entry: &CacheEntry) -> bool {
        entry.is_valid_at(self.clock.now_millis(), self.ttl_millis)
    }

    /// Serve `key` from cache if fresh, otherwise call `fetch` and store its
    /// result.
    ///
    /// A cached value that no longer decodes as `T` counts as a miss.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns. The stale entry, if any, is left
    /// untouched.
    pub async fn read_through<T, F, Fut>(&self, key: CacheKey<'_>, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(entry) = self.get(key).filter(|entry| self.is_valid(entry)) {
            match serde_json::from_value(entry.data) {
                Ok(data) => {
                    tracing::debug!(partition = %key.partition(), key = ?key.key(), "Cache hit");
                    return Ok(data);
                }
                Err(e) => {
                    tracing::warn!(partition = %key.partition(), error = %e, "Cached value has unexpected shape");
                }
            }
        }

        tracing::debug!(partition = %key.partition(), key = ?key.key(), "Cache miss");
        let data = fetch().await?;
        let value = serde_json::to_value(&data).map_err(|source| {
            Error::Storage(StorageError::Encode {
                key: key.partition().storage_key().to_string(),
                source,
            })
        })?;
        self.set(key, value);
        Ok(data)
    }

    /// Drop one partition, or all of them, from memory and durable storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a storage key cannot be removed.
    pub fn clear(&self, partition: Option<Partition>) -> std::result::Result<(), StorageError> {
        let targets = partition.map_or_else(|| Partition::ALL.to_vec(), |p| vec![p]);
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        for target in targets {
            slots.remove(&target);
            self.storage.remove(target.storage_key())?;
            tracing::info!(partition = %target, "Cleared cache partition");
        }
        Ok(())
    }

    /// Entry counts per partition.
    #[must_use]
    pub fn stats(&self) -> Vec<PartitionStats> {
        let now = self.clock.now_millis();
        Partition::ALL
            .into_iter()
            .map(|partition| {
                self.with_slot(partition, |slot| {
                    let entries = slot.entries();
                    PartitionStats {
                        partition,
                        entries: entries.len(),
                        valid: entries
                            .iter()
                            .filter(|e| e.is_valid_at(now, self.ttl_millis))
                            .count(),
                    }
                })
            })
            .collect()
    }
}
