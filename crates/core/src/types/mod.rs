//! Core types for the storefront kit.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cache;
pub mod cart;
pub mod id;
pub mod price;

pub use cache::CacheEntry;
pub use cart::{CartLine, RemoteCartHandle};
pub use id::*;
pub use price::{Price, PriceError, ZERO_PRICE, display_amount};
