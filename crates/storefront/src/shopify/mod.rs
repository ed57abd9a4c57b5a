//! Shopify Storefront API gateway.
//!
//! # Architecture
//!
//! - A single GraphQL endpoint, one kind of call: `request(operation, variables)`
//! - Uses `graphql_client` wire types (`QueryBody`, `Response`) with `reqwest`
//!   for HTTP
//! - Transport failures (non-2xx) and application failures (GraphQL `errors`)
//!   are normalized into one message-bearing [`RequestError`], so callers never
//!   branch on where a failure came from
//! - Responses stay as `serde_json::Value`; callers decode only the envelope
//!   they need (see [`types`]) and hand entities to the rendering engine as-is
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_kit::shopify::{Gateway, StorefrontClient, queries};
//!
//! let client = StorefrontClient::new(&config)?;
//! let data = client
//!     .request(&queries::GET_PRODUCT_BY_HANDLE, json!({ "handle": "tee" }))
//!     .await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use storefront::queries::{self, Operation};
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// The remote request gateway.
///
/// Implemented over HTTP by [`StorefrontClient`]; tests substitute a scripted
/// gateway.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Execute one GraphQL operation and return its `data` object.
    ///
    /// # Errors
    ///
    /// Returns a `RequestError` if the transport fails, the server answers
    /// with a non-success status, or the response carries GraphQL errors.
    async fn request(&self, operation: &Operation, variables: Value) -> Result<Value, RequestError>;
}

/// Where a [`RequestError`] originated. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorOrigin {
    /// Connection failure or non-2xx HTTP status.
    Transport,
    /// GraphQL `errors`, mutation user errors, or a response without data.
    Application,
    /// The response did not have the expected shape.
    Decode,
}

/// The uniform failure of a gateway request.
///
/// Displays as its message only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RequestError {
    origin: RequestErrorOrigin,
    message: String,
}

impl RequestError {
    /// A transport-level failure.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            origin: RequestErrorOrigin::Transport,
            message: message.into(),
        }
    }

    /// A failure reported by the API itself.
    #[must_use]
    pub fn application(message: impl Into<String>) -> Self {
        Self {
            origin: RequestErrorOrigin::Application,
            message: message.into(),
        }
    }

    /// A response that could not be decoded.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            origin: RequestErrorOrigin::Decode,
            message: message.into(),
        }
    }

    /// Build an application error from GraphQL error entries.
    #[must_use]
    pub fn from_graphql(errors: &[GraphQLError]) -> Self {
        Self::application(format_graphql_errors(errors))
    }

    /// The failure origin.
    #[must_use]
    pub const fn origin(&self) -> RequestErrorOrigin {
        self.origin
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(e: graphql_client::Error) -> Self {
        Self {
            message: e.message,
            locations: e.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: e.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => Value::String(s),
                        graphql_client::PathFragment::Index(i) => Value::Number(i.into()),
                    })
                    .collect()
            }),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
