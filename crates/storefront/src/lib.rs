//! Storefront Kit library.
//!
//! A headless storefront client for the Shopify Storefront API:
//! - [`catalog`] - Cached product, collection and search accessors
//! - [`cart`] - Durable local cart and cart hydration
//! - [`checkout`] - Remote cart creation and checkout redirect
//! - [`render`] - Declarative page rendering from `data-shopify` bindings
//!
//! Everything hangs off a [`Storefront`] session, which owns the gateway,
//! the response cache and the cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod render;
pub mod shopify;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{CacheKey, CacheStore, Partition, PartitionStats};
pub use cart::{CartStore, HydratedLine, HydratedProduct};
pub use checkout::Navigator;
pub use clock::{Clock, SystemClock};
pub use config::StorefrontKitConfig;
pub use context::Storefront;
pub use error::{Error, Result};
pub use render::{DeclarativeLoader, HtmlPage, Surface, Trigger};
pub use shopify::{Gateway, RequestError, StorefrontClient};
pub use storage::{DurableStore, FileStore, MemoryStore};
