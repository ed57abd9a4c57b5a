//! Unified error handling.
//!
//! Every public operation of the kit returns [`Result<T>`]. The `Display` of
//! each variant is the user-facing message: the rendering engine shows it as
//! `Error: <message>` and checkout alerts show `Checkout failed: <message>`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::render::RenderError;
use crate::shopify::RequestError;
use crate::storage::StorageError;

/// Kit-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Gateway request failed (transport or GraphQL errors).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A required parameter or setting is missing.
    #[error("{0}")]
    Validation(String),

    /// Checkout attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// The API returned no entity for a lookup.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote cart creation failed or returned no checkout URL.
    #[error("{0}")]
    Checkout(String),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Page rewriting failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Error {
    /// A validation failure with the given message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
