//! Bindings: page elements that declare which data to render.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::RenderError;
use crate::config::leading_integer;

/// Default page size for list bindings.
pub const DEFAULT_LIMIT: usize = 10;

/// Position of a binding within its page, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub usize);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The data source named by `data-shopify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Products,
    Product,
    Collections,
    Search,
    Cart,
}

impl SourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Product => "product",
            Self::Collections => "collections",
            Self::Search => "search",
            Self::Cart => "cart",
        }
    }
}

impl FromStr for SourceKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "product" => Ok(Self::Product),
            "collections" => Ok(Self::Collections),
            "search" => Ok(Self::Search),
            "cart" => Ok(Self::Cart),
            other => Err(RenderError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source parameters read from the binding's `data-*` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingParams {
    pub collection: Option<String>,
    pub handle: Option<String>,
    pub id: Option<String>,
    pub query: Option<String>,
    pub limit: usize,
    /// Stored for hosts that read it; no source sorts by it.
    pub sort: Option<String>,
    pub page: u32,
}

impl Default for BindingParams {
    fn default() -> Self {
        Self {
            collection: None,
            handle: None,
            id: None,
            query: None,
            limit: DEFAULT_LIMIT,
            sort: None,
            page: 1,
        }
    }
}

/// A declared binding.
///
/// `source` keeps the raw `data-shopify` value so an unknown type is only
/// reported when the binding is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub id: BindingId,
    pub source: String,
    pub template: Option<String>,
    pub params: BindingParams,
}

impl Binding {
    /// Build a binding from an element's attributes, keyed by full attribute
    /// name (`data-shopify`, `data-limit`, ...).
    #[must_use]
    pub fn from_attributes(id: BindingId, attributes: &HashMap<String, String>) -> Self {
        let get = |name: &str| attributes.get(name).filter(|v| !v.is_empty()).cloned();

        let limit = attributes
            .get("data-limit")
            .and_then(|raw| leading_integer(raw))
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_LIMIT);
        let page = attributes
            .get("data-page")
            .and_then(|raw| leading_integer(raw))
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);

        Self {
            id,
            source: attributes.get("data-shopify").cloned().unwrap_or_default(),
            template: get("data-template"),
            params: BindingParams {
                collection: get("data-collection"),
                handle: get("data-handle"),
                id: get("data-id"),
                query: get("data-query"),
                limit,
                sort: get("data-sort"),
                page,
            },
        }
    }

    /// Parse the declared source.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::UnknownSource` for anything but the five known
    /// types.
    pub fn kind(&self) -> Result<SourceKind, RenderError> {
        self.source.parse()
    }
}

/// Lifecycle of one binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BindingState {
    #[default]
    Idle,
    Loading,
    Rendered,
    Error(String),
}
