//! Field resolution for template placeholders.
//!
//! Upstream entities come in several shapes depending on which query selected
//! them: a product from a collection carries a `priceRange`, a search result
//! only its first variant edge, a hand-built entity a plain `variants` array.
//! Three field names are therefore resolved through an ordered list of
//! shapes instead of a plain lookup:
//!
//! | Field | Shapes, in order | Fallback |
//! |---|---|---|
//! | `price` | `priceRange.minVariantPrice.amount`, `variants.edges[0].node.price.amount`, `variants[0].price.amount` | the entity's own `price` |
//! | `image` | `image.url`, `images.edges[0].node.url`, `images[0].url` or `images[0]` | placeholder URL |
//! | `variantId` | `variants.edges[0].node.id`, `variants[0].id` | the entity's own `variantId` |
//!
//! The order matters: the first shape *present* wins, even if its value is
//! empty.

use std::borrow::Cow;

use serde_json::Value;
use storefront_kit_core::display_amount;

/// Image shown when an entity has none.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=No+Image";

/// JavaScript truthiness of a JSON value.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| truthy(v))
}

fn first_edge_node<'a>(connection: &'a Value) -> Option<&'a Value> {
    connection
        .get("edges")?
        .as_array()?
        .first()?
        .get("node")
}

fn first_item(list: &Value) -> Option<&Value> {
    list.as_array()?.first()
}

// =============================================================================
// Price
// =============================================================================

/// Where an entity's display price comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceShape<'a> {
    /// `priceRange.minVariantPrice`
    PriceRange(&'a Value),
    /// First node of `variants.edges`
    VariantEdge(&'a Value),
    /// First element of a plain `variants` array
    DirectVariant(&'a Value),
}

impl<'a> PriceShape<'a> {
    /// The first shape the entity has.
    #[must_use]
    pub fn detect(entity: &'a Value) -> Option<Self> {
        if let Some(min) = present(entity, "priceRange").and_then(|r| present(r, "minVariantPrice")) {
            return Some(Self::PriceRange(min));
        }
        let variants = present(entity, "variants");
        if let Some(node) = variants.and_then(first_edge_node) {
            return Some(Self::VariantEdge(node));
        }
        variants
            .and_then(first_item)
            .filter(|variant| variant.get("price").is_some_and(truthy))
            .map(Self::DirectVariant)
    }

    /// The raw amount this shape points at.
    #[must_use]
    pub fn amount(self) -> Option<&'a Value> {
        match self {
            Self::PriceRange(money) => money.get("amount"),
            Self::VariantEdge(variant) | Self::DirectVariant(variant) => {
                variant.get("price")?.get("amount")
            }
        }
    }
}

/// Display price of an entity, e.g. `19.90`.
///
/// Without any price shape the entity's own `price` is used, either a money
/// object or a bare amount. `None` if there is no price at all.
#[must_use]
pub fn price(entity: &Value) -> Option<String> {
    if let Some(shape) = PriceShape::detect(entity) {
        return Some(display_amount(shape.amount()));
    }
    present(entity, "price").map(|own| display_amount(own.get("amount").or(Some(own))))
}

// =============================================================================
// Image
// =============================================================================

/// Where an entity's image comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageShape<'a> {
    /// `image.url` (collections)
    Direct(&'a Value),
    /// First node of `images.edges`
    Edge(&'a Value),
    /// First element of a plain `images` array, an object or a URL string
    List(&'a Value),
}

impl<'a> ImageShape<'a> {
    /// The first shape the entity has.
    #[must_use]
    pub fn detect(entity: &'a Value) -> Option<Self> {
        if let Some(url) = present(entity, "image").and_then(|image| present(image, "url")) {
            return Some(Self::Direct(url));
        }
        let images = present(entity, "images");
        if let Some(node) = images.and_then(first_edge_node) {
            return Some(Self::Edge(node));
        }
        images.and_then(first_item).map(Self::List)
    }

    /// The URL this shape points at, if it holds a non-empty string.
    #[must_use]
    pub fn url(self) -> Option<&'a str> {
        let url = match self {
            Self::Direct(url) => Some(url),
            Self::Edge(node) => node.get("url"),
            Self::List(item) => present(item, "url").or(Some(item)),
        };
        url.and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

/// Image URL of an entity, or [`PLACEHOLDER_IMAGE`].
#[must_use]
pub fn image(entity: &Value) -> String {
    match ImageShape::detect(entity) {
        Some(shape) => shape.url().unwrap_or_default().to_string(),
        None => {
            let name = entity.get("title").or_else(|| entity.get("id"));
            tracing::warn!(entity = ?name, "No image found");
            PLACEHOLDER_IMAGE.to_string()
        }
    }
}

// =============================================================================
// Variant ID
// =============================================================================

/// Where an entity's first variant comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantShape<'a> {
    /// First node of `variants.edges`
    Edge(&'a Value),
    /// First element of a plain `variants` array
    Direct(&'a Value),
}

impl<'a> VariantShape<'a> {
    /// The first shape the entity has.
    #[must_use]
    pub fn detect(entity: &'a Value) -> Option<Self> {
        let variants = present(entity, "variants")?;
        if let Some(node) = first_edge_node(variants) {
            return Some(Self::Edge(node));
        }
        first_item(variants).map(Self::Direct)
    }

    /// The variant's ID.
    #[must_use]
    pub fn id(self) -> Option<&'a Value> {
        match self {
            Self::Edge(variant) | Self::Direct(variant) => variant.get("id"),
        }
    }
}

/// First variant ID of an entity, falling back to its own `variantId`.
#[must_use]
pub fn variant_id(entity: &Value) -> Option<&Value> {
    match VariantShape::detect(entity) {
        Some(shape) => shape.id(),
        None => entity.get("variantId"),
    }
}

// =============================================================================
// Path lookup
// =============================================================================

/// Resolve a dotted path against an entity, special-casing `price`, `image`
/// and `variantId` at every level. Numeric segments index into arrays.
#[must_use]
pub fn lookup<'a>(entity: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let mut keys = path.split('.').peekable();
    let mut current = entity;
    while let Some(key) = keys.next() {
        if !(current.is_object() || current.is_array()) {
            return None;
        }
        match resolve_key(current, key)? {
            Cow::Borrowed(next) => current = next,
            // Special-cased fields resolve to strings, which have no fields.
            owned @ Cow::Owned(_) => return keys.peek().is_none().then_some(owned),
        }
    }
    Some(Cow::Borrowed(current))
}

fn resolve_key<'a>(value: &'a Value, key: &str) -> Option<Cow<'a, Value>> {
    match key {
        "price" => price(value).map(|p| Cow::Owned(Value::String(p))),
        "image" => Some(Cow::Owned(Value::String(image(value)))),
        "variantId" => variant_id(value).map(Cow::Borrowed),
        _ => field(value, key).map(Cow::Borrowed),
    }
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => value.get(key),
    }
}

/// Resolve a plain dotted path, without special cases.
#[must_use]
pub fn plain_lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| field(current, key))
}

/// Text of a resolved value: strings as-is, numbers and `true` as text,
/// everything else empty.
///
/// A numeric zero renders as `"0"`, not as empty text.
#[must_use]
pub fn text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(Value::Bool(true)) => Cow::Borrowed("true"),
        _ => Cow::Borrowed(""),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_price_prefers_price_range() {
        let entity = json!({
            "priceRange": { "minVariantPrice": { "amount": "10.0" } },
            "variants": { "edges": [{ "node": { "price": { "amount": "99.0" } } }] }
        });
        assert!(matches!(PriceShape::detect(&entity), Some(PriceShape::PriceRange(_))));
        assert_eq!(price(&entity).as_deref(), Some("10.00"));
    }

    #[test]
    fn test_price_from_variant_edge_then_direct_variant() {
        let edge = json!({ "variants": { "edges": [{ "node": { "price": { "amount": "7.5" } } }] } });
        assert_eq!(price(&edge).as_deref(), Some("7.50"));

        let direct = json!({ "variants": [{ "price": { "amount": 3 } }] });
        assert!(matches!(PriceShape::detect(&direct), Some(PriceShape::DirectVariant(_))));
        assert_eq!(price(&direct).as_deref(), Some("3.00"));
    }

    #[test]
    fn test_price_missing_or_zero() {
        assert_eq!(price(&json!({ "title": "Shirt" })), None);
        assert_eq!(
            price(&json!({ "priceRange": { "minVariantPrice": { "amount": "0.0" } } })).as_deref(),
            Some("0.00")
        );
        // An empty edge list is not a variant-edge shape.
        assert_eq!(price(&json!({ "variants": { "edges": [] } })), None);
        // A direct variant without a price is skipped.
        assert!(PriceShape::detect(&json!({ "variants": [{ "id": "v" }] })).is_none());
    }

    #[test]
    fn test_price_falls_back_to_own_price() {
        assert_eq!(price(&json!({ "price": "19.5" })).as_deref(), Some("19.50"));
        assert_eq!(
            price(&json!({ "price": { "amount": "4", "currencyCode": "USD" } })).as_deref(),
            Some("4.00")
        );
        assert_eq!(price(&json!({ "price": null })), None);
    }

    #[test]
    fn test_image_order() {
        let direct = json!({
            "image": { "url": "a.png" },
            "images": { "edges": [{ "node": { "url": "b.png" } }] }
        });
        assert_eq!(image(&direct), "a.png");

        let edge = json!({ "images": { "edges": [{ "node": { "url": "b.png" } }] } });
        assert_eq!(image(&edge), "b.png");

        let list_of_objects = json!({ "images": [{ "url": "c.png" }] });
        assert_eq!(image(&list_of_objects), "c.png");

        let list_of_strings = json!({ "images": ["d.png"] });
        assert_eq!(image(&list_of_strings), "d.png");
    }

    #[test]
    fn test_image_placeholder() {
        assert_eq!(image(&json!({ "title": "Bare" })), PLACEHOLDER_IMAGE);
        assert_eq!(image(&json!({ "images": { "edges": [] } })), PLACEHOLDER_IMAGE);
        assert_eq!(image(&json!({ "image": null })), PLACEHOLDER_IMAGE);
        assert_eq!(image(&json!({ "id": "gid://shopify/Product/1" })), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_variant_id_order_and_fallback() {
        let edge = json!({
            "variantId": "own",
            "variants": { "edges": [{ "node": { "id": "gid://V/1" } }] }
        });
        assert_eq!(variant_id(&edge), Some(&json!("gid://V/1")));

        let direct = json!({ "variants": [{ "id": "gid://V/2" }] });
        assert_eq!(variant_id(&direct), Some(&json!("gid://V/2")));

        let own = json!({ "variantId": "gid://V/3", "quantity": 1 });
        assert_eq!(variant_id(&own), Some(&json!("gid://V/3")));
    }

    #[test]
    fn test_lookup_walks_dotted_paths() {
        let entity = json!({
            "title": "Shirt",
            "seo": { "title": "Best Shirt" },
            "featured": { "priceRange": { "minVariantPrice": { "amount": "4" } } }
        });
        assert_eq!(text(lookup(&entity, "title").as_deref()), "Shirt");
        assert_eq!(text(lookup(&entity, "seo.title").as_deref()), "Best Shirt");
        assert_eq!(text(lookup(&entity, "featured.price").as_deref()), "4.00");
        assert_eq!(text(lookup(&entity, "price.amount").as_deref()), "");
        assert_eq!(text(lookup(&entity, "missing.deeper").as_deref()), "");
    }

    #[test]
    fn test_numeric_segments_index_arrays() {
        let entity = json!({ "tags": ["new", "sale"] });
        assert_eq!(text(lookup(&entity, "tags.1").as_deref()), "sale");
        assert_eq!(plain_lookup(&entity, "tags.0"), Some(&json!("new")));
        assert_eq!(plain_lookup(&entity, "tags.9"), None);
    }

    #[test]
    fn test_text_of_values() {
        assert_eq!(text(Some(&json!(3))), "3");
        assert_eq!(text(Some(&json!(0))), "0");
        assert_eq!(text(Some(&json!(true))), "true");
        assert_eq!(text(Some(&json!(false))), "");
        assert_eq!(text(Some(&json!({ "a": 1 }))), "");
        assert_eq!(text(Some(&Value::Null)), "");
        assert_eq!(text(None), "");
    }
}
