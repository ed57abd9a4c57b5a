//! Cart line and remote cart handle types.

use serde::{Deserialize, Serialize};

use super::id::{CartId, VariantId};

/// One (product variant, quantity) pair in the local cart.
///
/// Stored as `{"variantId": "...", "quantity": n}`. The quantity is always at
/// least one; a line whose quantity would drop to zero is removed instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Merchandise (product variant) ID.
    #[serde(rename = "variantId")]
    pub variant_id: VariantId,
    /// Number of units, never zero.
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub fn new(variant_id: impl Into<VariantId>, quantity: u32) -> Self {
        Self {
            variant_id: variant_id.into(),
            quantity,
        }
    }
}

/// A server-side cart created from the local cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartHandle {
    /// Shopify cart ID.
    pub id: CartId,
    /// Hosted checkout URL for this cart.
    pub checkout_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_uses_variant_id_key() {
        let line = CartLine::new("gid://shopify/ProductVariant/1", 2);
        let json = serde_json::to_value(&line).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({"variantId": "gid://shopify/ProductVariant/1", "quantity": 2})
        );
    }
}
