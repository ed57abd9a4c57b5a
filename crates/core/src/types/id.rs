//! Newtype IDs for type-safe Shopify global ID references.
//!
//! Use the `define_gid!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Shopify IDs are opaque
//! strings such as `gid://shopify/ProductVariant/123`; nothing here parses them.

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use storefront_kit_core::define_gid;
/// define_gid!(LineId);
/// define_gid!(OrderId);
///
/// let line = LineId::new("gid://shopify/CartLine/1");
/// let order = OrderId::new("gid://shopify/Order/1");
///
/// // These are different types, so this won't compile:
/// // let _: LineId = order;
/// assert_eq!(line.as_str(), "gid://shopify/CartLine/1");
/// # let _ = order;
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Shopify entity IDs used by the kit
define_gid!(VariantId);
define_gid!(CartId);
