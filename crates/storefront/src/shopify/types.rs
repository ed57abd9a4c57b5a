//! Response envelopes for Shopify Storefront API operations.
//!
//! Entities (products, collections) are kept as raw JSON so the rendering
//! engine can read whatever shape a query selected. Only the connection
//! wrappers and the payloads the kit itself interprets are typed here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RequestError;

// =============================================================================
// Connection Types
// =============================================================================

/// A Relay-style connection (`{ edges: [{ node }] }`).
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Connection<T> {
    /// Edges in server order.
    #[serde(default)]
    pub edges: Vec<Edge<T>>,
}

/// One edge of a [`Connection`].
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Edge<T> {
    /// The wrapped entity.
    pub node: T,
}

impl<T> Connection<T> {
    /// Unwrap the edges into their nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

/// Decode an operation's `data` object into a typed envelope.
///
/// # Errors
///
/// Returns a decode `RequestError` if the data does not match `T`.
pub fn decode<T: DeserializeOwned>(data: Value) -> Result<T, RequestError> {
    serde_json::from_value(data)
        .map_err(|e| RequestError::decode(format!("Unexpected response shape: {e}")))
}

// =============================================================================
// Catalog Envelopes
// =============================================================================

/// `GetProductById` data.
#[derive(Debug, Deserialize)]
pub struct ProductByIdData {
    pub product: Option<Value>,
}

/// `GetProductByHandle` data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductByHandleData {
    pub product_by_handle: Option<Value>,
}

/// `GetCollections` data.
#[derive(Debug, Deserialize)]
pub struct CollectionsData {
    pub collections: Connection<Value>,
}

/// `GetProductsByCollection` data.
#[derive(Debug, Deserialize)]
pub struct ProductsByCollectionData {
    pub collections: Connection<CollectionProducts>,
}

/// A collection node that only selects its products.
#[derive(Debug, Deserialize)]
pub struct CollectionProducts {
    pub products: Connection<Value>,
}

/// `SearchProducts` data.
#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<Value>,
}

// =============================================================================
// Cart Hydration
// =============================================================================

/// `GetCartVariants` data. Unknown IDs come back as `null` nodes.
#[derive(Debug, Deserialize)]
pub struct CartVariantsData {
    pub nodes: Vec<Option<VariantNode>>,
}

/// A product variant as selected by `GetCartVariants`.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantNode {
    pub id: String,
    pub price: MoneyV2,
    pub product: VariantProduct,
}

/// Monetary amount as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    /// Decimal amount as string (preserves precision).
    pub amount: Value,
    /// ISO 4217 currency code, when selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// The product a hydrated variant belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub images: Option<Connection<ImageNode>>,
}

/// An image node (`{ url }`).
#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    pub url: String,
}

// =============================================================================
// Remote Cart
// =============================================================================

/// A cart as selected by the cart operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNode {
    pub id: String,
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// A mutation user error (`{ field, message }`).
#[derive(Debug, Clone, Deserialize)]
pub struct CartUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Shared payload of `cartCreate` and `cartLinesAdd`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationPayload {
    pub cart: Option<CartNode>,
    #[serde(default)]
    pub user_errors: Vec<CartUserError>,
}

/// `CreateCart` data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartData {
    pub cart_create: Option<CartMutationPayload>,
}

/// `AddCartLines` data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartLinesData {
    pub cart_lines_add: Option<CartMutationPayload>,
}

/// `GetCart` data.
#[derive(Debug, Deserialize)]
pub struct GetCartData {
    pub cart: Option<CartNode>,
}

/// Line input for cart mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: String,
    /// Number of units.
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_connection_into_nodes() {
        let data: CollectionsData = decode(json!({
            "collections": { "edges": [
                { "node": { "title": "Shirts" } },
                { "node": { "title": "Hats" } }
            ]}
        }))
        .unwrap_or_else(|e| panic!("{e}"));
        let titles: Vec<_> = data
            .collections
            .into_nodes()
            .into_iter()
            .map(|n| n["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("Shirts"), json!("Hats")]);
    }

    #[test]
    fn test_decode_reports_shape_errors() {
        let err = decode::<CollectionsData>(json!({ "collections": 3 }))
            .err()
            .unwrap_or_else(|| panic!("expected a decode error"));
        assert!(err.message().starts_with("Unexpected response shape"));
    }

    #[test]
    fn test_cart_variants_allow_null_nodes() {
        let data: CartVariantsData = decode(json!({ "nodes": [null] }))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(data.nodes[0].is_none());
    }
}
