//! Local cart management.
//!
//! ```bash
//! sfk cart add gid://shopify/ProductVariant/123 --quantity 2
//! sfk cart update gid://shopify/ProductVariant/123 5
//! sfk cart show
//! ```
//!
//! Only `show` talks to the store; the other actions work offline against
//! the persisted cart.

use tracing::info;

use super::{CommandResult, session, write_json, write_line};

/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub fn add(variant_id: &str, quantity: u32) -> CommandResult {
    let storefront = session()?;
    storefront.cart().add(variant_id, quantity)?;
    info!(variant_id, quantity, count = storefront.cart().count(), "Added to cart");
    Ok(())
}

/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub fn remove(variant_id: &str) -> CommandResult {
    let storefront = session()?;
    storefront.cart().remove(variant_id)?;
    info!(variant_id, "Removed from cart");
    Ok(())
}

/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub fn update(variant_id: &str, quantity: u32) -> CommandResult {
    let storefront = session()?;
    storefront.cart().update(variant_id, quantity)?;
    info!(variant_id, quantity, "Updated cart line");
    Ok(())
}

/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub fn clear() -> CommandResult {
    let storefront = session()?;
    storefront.cart().clear()?;
    info!("Cart cleared");
    Ok(())
}

/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn list() -> CommandResult {
    let storefront = session()?;
    write_json(&storefront.cart().list())
}

/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn count() -> CommandResult {
    let storefront = session()?;
    write_line(storefront.cart().count())
}

/// Print the cart joined with current prices, titles and images.
///
/// # Errors
///
/// Returns an error if the variant lookup fails.
pub async fn show() -> CommandResult {
    let storefront = session()?;
    write_json(&storefront.hydrate_cart().await?)
}
