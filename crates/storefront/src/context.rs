//! The storefront context.
//!
//! [`Storefront`] owns everything that would otherwise be process-wide state:
//! the gateway, the response cache and the cart. The composing application
//! creates one per session and passes it to the accessors, the cart and
//! checkout operations and the declarative loader.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::cart::CartStore;
use crate::clock::{Clock, SystemClock};
use crate::config::StorefrontKitConfig;
use crate::error::Result;
use crate::shopify::{Gateway, StorefrontClient};
use crate::storage::{DurableStore, FileStore};

/// A storefront session.
pub struct Storefront {
    gateway: Arc<dyn Gateway>,
    cache: CacheStore,
    cart: CartStore,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cache", &self.cache)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create a session on the system clock.
    ///
    /// The cart line list is read from `storage` here; cache partitions are
    /// read on first use.
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, storage: Arc<dyn DurableStore>, cache_ttl: Duration) -> Self {
        Self::with_clock(gateway, storage, Arc::new(SystemClock), cache_ttl)
    }

    /// Create a session with an explicit clock.
    #[must_use]
    pub fn with_clock(
        gateway: Arc<dyn Gateway>,
        storage: Arc<dyn DurableStore>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache: CacheStore::new(Arc::clone(&storage), clock, cache_ttl),
            cart: CartStore::load(storage),
            gateway,
        }
    }

    /// Create a session talking to the configured store over HTTP, persisting
    /// to the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the store domain does not form a URL.
    pub fn from_config(config: &StorefrontKitConfig) -> Result<Self> {
        let client = StorefrontClient::new(config)?;
        tracing::debug!(endpoint = %client.endpoint(), data_dir = %config.data_dir.display(), "Storefront session created");
        Ok(Self::new(
            Arc::new(client),
            Arc::new(FileStore::new(config.data_dir.clone())),
            config.cache_ttl,
        ))
    }

    /// The remote request gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    /// The response cache.
    #[must_use]
    pub const fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The local cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }
}
