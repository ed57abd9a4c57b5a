//! The local cart.
//!
//! The in-memory line list is authoritative for the session. It is read from
//! durable storage once, when the [`CartStore`] is created, and every mutation
//! writes the full list back. Every mutation also forgets the last remote
//! cart ID, so the next checkout is built from the current lines.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use storefront_kit_core::{CartId, CartLine, VariantId};
use tracing::instrument;

use crate::context::Storefront;
use crate::error::Result;
use crate::shopify::{CartVariantsData, VariantNode, decode, queries};
use crate::storage::{self, CART_ID_KEY, CART_KEY, DurableStore};

// =============================================================================
// CartStore
// =============================================================================

/// A stored line as older writers left it, with a possibly non-positive
/// quantity.
#[derive(Deserialize)]
struct StoredLine {
    #[serde(rename = "variantId")]
    variant_id: VariantId,
    quantity: i64,
}

impl StoredLine {
    fn into_line(self) -> Option<CartLine> {
        let quantity = u32::try_from(self.quantity).ok().filter(|q| *q > 0)?;
        Some(CartLine::new(self.variant_id, quantity))
    }
}

/// Ordered list of (variant, quantity) lines, persisted durably.
pub struct CartStore {
    storage: Arc<dyn DurableStore>,
    lines: Mutex<Vec<CartLine>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.list())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from `storage`. A missing or corrupt list starts empty;
    /// lines with a quantity below one are dropped.
    #[must_use]
    pub fn load(storage: Arc<dyn DurableStore>) -> Self {
        let stored: Vec<StoredLine> = storage::load_json(storage.as_ref(), CART_KEY)
            .unwrap_or_default();
        let lines = stored.into_iter().filter_map(StoredLine::into_line).collect();
        Self {
            storage,
            lines: Mutex::new(lines),
        }
    }

    /// Apply `f` to the lines, then persist them and drop the remote cart ID.
    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLine>)) -> Result<()> {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut lines);
        storage::save_json(self.storage.as_ref(), CART_KEY, &*lines)?;
        self.storage.remove(CART_ID_KEY)?;
        Ok(())
    }

    /// Add `quantity` units of a variant, merging into an existing line.
    ///
    /// Adding zero units changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the cart cannot be persisted.
    pub fn add(&self, variant_id: impl Into<VariantId>, quantity: u32) -> Result<()> {
        let variant_id = variant_id.into();
        tracing::debug!(variant_id = %variant_id, quantity, "Adding to cart");
        if quantity == 0 {
            return Ok(());
        }
        self.mutate(|lines| {
            match lines.iter_mut().find(|l| l.variant_id == variant_id) {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                None => lines.push(CartLine::new(variant_id, quantity)),
            }
        })
    }

    /// Remove a variant's line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove(&self, variant_id: &str) -> Result<()> {
        self.mutate(|lines| lines.retain(|l| l.variant_id.as_str() != variant_id))
    }

    /// Set a variant's quantity. Zero removes the line; an absent line is
    /// not created.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn update(&self, variant_id: &str, quantity: u32) -> Result<()> {
        self.mutate(|lines| {
            if quantity == 0 {
                lines.retain(|l| l.variant_id.as_str() != variant_id);
            } else if let Some(line) = lines.iter_mut().find(|l| l.variant_id.as_str() == variant_id) {
                line.quantity = quantity;
            }
        })
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        self.mutate(Vec::clear)
    }

    /// A copy of the current lines.
    #[must_use]
    pub fn list(&self) -> Vec<CartLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|l| u64::from(l.quantity))
            .sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// The remote cart last created from these lines, if still current.
    #[must_use]
    pub fn remote_cart_id(&self) -> Option<CartId> {
        match self.storage.get(CART_ID_KEY) {
            Ok(id) => id.filter(|id| !id.is_empty()).map(CartId::from),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read remote cart id");
                None
            }
        }
    }

    /// Remember the remote cart created from the current lines.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the ID cannot be persisted.
    pub fn set_remote_cart_id(&self, id: &CartId) -> Result<()> {
        Ok(self.storage.set(CART_ID_KEY, id.as_str())?)
    }

    /// Forget the remote cart.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the ID cannot be removed.
    pub fn clear_remote_cart_id(&self) -> Result<()> {
        Ok(self.storage.remove(CART_ID_KEY)?)
    }
}

// =============================================================================
// Hydration
// =============================================================================

/// A cart line joined with its remote price and product metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedLine {
    pub variant_id: VariantId,
    pub quantity: u32,
    /// Unit price amount as returned by the API.
    pub price: String,
    pub product: HydratedProduct,
}

/// Product metadata of a [`HydratedLine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydratedProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    /// First image URL, empty if the product has none.
    pub image: String,
}

fn amount_text(amount: &Value) -> String {
    match amount {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl HydratedLine {
    fn join(node: VariantNode, quantity: u32) -> Self {
        let image = node
            .product
            .images
            .and_then(|images| images.into_nodes().into_iter().next())
            .map(|image| image.url)
            .unwrap_or_default();
        Self {
            variant_id: VariantId::from(node.id),
            quantity,
            price: amount_text(&node.price.amount),
            product: HydratedProduct {
                id: node.product.id,
                title: node.product.title,
                handle: node.product.handle,
                image,
            },
        }
    }
}

impl Storefront {
    /// Resolve the cart lines against the catalog in one batched request.
    ///
    /// An empty cart resolves to an empty list without a request. Variants
    /// the store no longer has are skipped.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the batched read fails; nothing is
    /// partially hydrated.
    #[instrument(skip(self))]
    pub async fn hydrate_cart(&self) -> Result<Vec<HydratedLine>> {
        let lines = self.cart().list();
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = lines.iter().map(|l| l.variant_id.as_str()).collect();
        let data: CartVariantsData = decode(
            self.gateway()
                .request(&queries::GET_CART_VARIANTS, json!({ "ids": ids }))
                .await?,
        )?;

        let mut hydrated = Vec::with_capacity(lines.len());
        for (index, node) in data.nodes.into_iter().enumerate() {
            let Some(node) = node else {
                tracing::warn!(index, "Cart variant no longer exists, skipping");
                continue;
            };
            let Some(line) = lines.iter().find(|l| l.variant_id.as_str() == node.id) else {
                tracing::warn!(variant_id = %node.id, "Hydrated variant not in cart, skipping");
                continue;
            };
            hydrated.push(HydratedLine::join(node, line.quantity));
        }
        Ok(hydrated)
    }
}
