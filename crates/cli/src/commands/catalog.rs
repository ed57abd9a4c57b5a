//! Catalog lookups.
//!
//! ```bash
//! sfk product --handle classic-tee
//! sfk collections
//! sfk collection Shirts --limit 5
//! sfk search linen
//! ```

use storefront_kit_core::paginate;

use super::{CommandResult, session, write_json};

/// Print one product, by handle if given, otherwise by id.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
pub async fn product(handle: Option<&str>, id: Option<&str>) -> CommandResult {
    let storefront = session()?;
    let product = match (handle, id) {
        (Some(handle), _) => storefront.product_by_handle(handle).await?,
        (None, Some(id)) => storefront.product_by_id(id).await?,
        (None, None) => return Err("either --handle or --id is required".into()),
    };
    write_json(&product)
}

/// Print all collections.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn collections() -> CommandResult {
    let storefront = session()?;
    write_json(&storefront.collections().await?)
}

/// Print the products of the collection titled `name`.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn collection(name: &str, limit: Option<usize>) -> CommandResult {
    let storefront = session()?;
    let products = storefront.products_by_collection(name).await?;
    write_json(&first_page(&products, limit))
}

/// Print search results.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn search(term: &str, limit: Option<usize>) -> CommandResult {
    let storefront = session()?;
    let results = storefront.search_products(term).await?;
    write_json(&first_page(&results, limit))
}

fn first_page<T>(items: &[T], limit: Option<usize>) -> &[T] {
    limit.map_or(items, |limit| paginate(items, 1, limit))
}
