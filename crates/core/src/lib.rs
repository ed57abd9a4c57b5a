//! Storefront Kit Core - Shared types library.
//!
//! This crate provides the types shared by every storefront kit component:
//! - `storefront-kit` - Gateway, cache, cart, checkout and rendering engine
//! - `storefront-kit-cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify global IDs, cart lines, cache
//!   entries and prices
//! - [`pagination`] - Client-side page windows

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod types;

pub use pagination::{has_next_page, paginate};
pub use types::*;
