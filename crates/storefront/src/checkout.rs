//! Checkout: turn the local cart into a remote cart and redirect to it.
//!
//! Payment happens on the store's hosted checkout page. The host supplies a
//! [`Navigator`] that performs the redirect and shows blocking alerts.

use serde_json::json;
use storefront_kit_core::{CartId, CartLine, RemoteCartHandle};
use tracing::instrument;

use crate::context::Storefront;
use crate::error::{Error, Result};
use crate::shopify::{
    AddCartLinesData, CartLineInput, CartMutationPayload, CartNode, CreateCartData, GetCartData,
    RequestError, decode, queries,
};

/// Host-provided navigation: the browser's `location` and `alert`.
pub trait Navigator: Send + Sync {
    /// Leave the page for `url`.
    fn redirect(&self, url: &str);

    /// Show a blocking message to the shopper.
    fn alert(&self, message: &str);
}

fn line_inputs(lines: &[CartLine]) -> Vec<CartLineInput> {
    lines
        .iter()
        .map(|line| CartLineInput {
            merchandise_id: line.variant_id.to_string(),
            quantity: line.quantity,
        })
        .collect()
}

/// Unwrap a mutation payload, failing on user errors.
fn mutation_cart(payload: Option<CartMutationPayload>, operation: &str) -> Result<CartNode> {
    let payload = payload.ok_or_else(|| {
        RequestError::application(format!("{operation} returned no payload"))
    })?;

    if !payload.user_errors.is_empty() {
        let message = payload
            .user_errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::Checkout(message));
    }

    payload
        .cart
        .ok_or_else(|| RequestError::application(format!("{operation} returned no cart")).into())
}

fn handle_from(cart: CartNode) -> Result<RemoteCartHandle> {
    match cart.checkout_url.filter(|url| !url.is_empty()) {
        Some(checkout_url) => Ok(RemoteCartHandle {
            id: CartId::from(cart.id),
            checkout_url,
        }),
        None => Err(Error::Checkout("Failed to get checkout URL".to_string())),
    }
}

impl Storefront {
    /// Create a remote cart from `lines` and remember its ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::Checkout` with the mutation's user errors joined by
    /// `", "`, or when the cart has no checkout URL; the gateway error if the
    /// request fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn create_remote_cart(&self, lines: &[CartLine]) -> Result<RemoteCartHandle> {
        let data: CreateCartData = decode(
            self.gateway()
                .request(
                    &queries::CREATE_CART,
                    json!({ "input": { "lines": line_inputs(lines) } }),
                )
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Error creating cart"))?,
        )?;
        let cart = mutation_cart(data.cart_create, "cartCreate")?;
        self.cart().set_remote_cart_id(&CartId::from(cart.id.clone()))?;
        handle_from(cart)
    }

    /// Fetch a remote cart. `None` if the store no longer knows it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the request fails.
    #[instrument(skip(self))]
    pub async fn remote_cart(&self, id: &CartId) -> Result<Option<RemoteCartHandle>> {
        let data: GetCartData = decode(
            self.gateway()
                .request(&queries::GET_CART, json!({ "id": id.as_str() }))
                .await?,
        )?;
        Ok(data.cart.and_then(|cart| handle_from(cart).ok()))
    }

    /// Add lines to an existing remote cart.
    ///
    /// # Errors
    ///
    /// Returns `Error::Checkout` with the mutation's user errors joined by
    /// `", "`; the gateway error if the request fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn add_remote_cart_lines(
        &self,
        id: &CartId,
        lines: &[CartLine],
    ) -> Result<RemoteCartHandle> {
        let data: AddCartLinesData = decode(
            self.gateway()
                .request(
                    &queries::ADD_CART_LINES,
                    json!({ "cartId": id.as_str(), "lines": line_inputs(lines) }),
                )
                .await?,
        )?;
        handle_from(mutation_cart(data.cart_lines_add, "cartLinesAdd")?)
    }

    /// Create a remote cart from the local cart and redirect to its checkout.
    ///
    /// Any failure is shown to the shopper as `Checkout failed: <message>`
    /// and then returned.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyCart` if the cart has no lines (nothing is
    /// requested), or the failure of [`Self::create_remote_cart`].
    #[instrument(skip(self, navigator))]
    pub async fn checkout(&self, navigator: &dyn Navigator) -> Result<RemoteCartHandle> {
        match self.checkout_new().await {
            Ok(handle) => {
                tracing::info!(cart_id = %handle.id, "Redirecting to checkout");
                navigator.redirect(&handle.checkout_url);
                Ok(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Checkout error");
                navigator.alert(&format!("Checkout failed: {e}"));
                Err(e)
            }
        }
    }

    async fn checkout_new(&self) -> Result<RemoteCartHandle> {
        let lines = self.cart().list();
        if lines.is_empty() {
            return Err(Error::EmptyCart);
        }
        self.create_remote_cart(&lines).await
    }

    /// Redirect to the remembered remote cart's checkout, or fall back to
    /// [`Self::checkout`].
    ///
    /// Best-effort: a missing ID, a cart the store no longer has, or any
    /// error fetching it all fall back to a fresh checkout.
    ///
    /// # Errors
    ///
    /// Returns the failure of the fallback [`Self::checkout`].
    #[instrument(skip(self, navigator))]
    pub async fn checkout_existing(&self, navigator: &dyn Navigator) -> Result<RemoteCartHandle> {
        let Some(id) = self.cart().remote_cart_id() else {
            return self.checkout(navigator).await;
        };

        match self.remote_cart(&id).await {
            Ok(Some(handle)) => {
                tracing::info!(cart_id = %handle.id, "Redirecting to existing checkout");
                navigator.redirect(&handle.checkout_url);
                Ok(handle)
            }
            Ok(None) => {
                tracing::info!(cart_id = %id, "Remembered cart is gone, creating a new one");
                if let Err(e) = self.cart().clear_remote_cart_id() {
                    tracing::warn!(error = %e, "Failed to forget remote cart id");
                }
                self.checkout(navigator).await
            }
            Err(e) => {
                tracing::warn!(cart_id = %id, error = %e, "Existing cart checkout error, creating a new one");
                self.checkout(navigator).await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;
    use crate::storage::{CART_ID_KEY, DurableStore};
    use crate::testing::{self, MockGateway, NavigatorEvent, RecordingNavigator};

    fn created(id: &str, url: Option<&str>) -> Value {
        json!({ "cartCreate": {
            "cart": { "id": id, "checkoutUrl": url },
            "userErrors": []
        }})
    }

    #[tokio::test]
    async fn test_empty_cart_fails_without_redirect() {
        let gateway = Arc::new(MockGateway::new());
        let (storefront, _, _) = testing::storefront(gateway.clone());
        let navigator = RecordingNavigator::new();

        let err = storefront.checkout(&navigator).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCart));
        assert!(navigator.redirects().is_empty());
        assert_eq!(navigator.alerts(), vec!["Checkout failed: Cart is empty"]);
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_checkout_redirects_and_remembers_cart() {
        let gateway = Arc::new(MockGateway::new().with_data(
            &queries::CREATE_CART,
            created("gid://shopify/Cart/c1", Some("https://shop.example.com/checkouts/c1")),
        ));
        let (storefront, storage, _) = testing::storefront(gateway.clone());
        storefront.cart().add("gid://V/1", 2).unwrap();
        let navigator = RecordingNavigator::new();

        let handle = storefront.checkout(&navigator).await.unwrap();
        assert_eq!(handle.id.as_str(), "gid://shopify/Cart/c1");
        assert_eq!(
            navigator.events(),
            vec![NavigatorEvent::Redirect("https://shop.example.com/checkouts/c1".to_string())]
        );
        assert_eq!(
            storage.get(CART_ID_KEY).unwrap().as_deref(),
            Some("gid://shopify/Cart/c1")
        );
        assert_eq!(
            gateway.calls()[0].variables,
            json!({ "input": { "lines": [{ "merchandiseId": "gid://V/1", "quantity": 2 }] } })
        );
    }

    #[tokio::test]
    async fn test_user_errors_are_joined() {
        let gateway = Arc::new(MockGateway::new().with_data(
            &queries::CREATE_CART,
            json!({ "cartCreate": {
                "cart": null,
                "userErrors": [
                    { "field": ["lines"], "message": "Variant is sold out" },
                    { "field": null, "message": "Quantity too high" }
                ]
            }}),
        ));
        let (storefront, _, _) = testing::storefront(gateway);
        storefront.cart().add("gid://V/1", 1).unwrap();
        let navigator = RecordingNavigator::new();

        let err = storefront.checkout(&navigator).await.unwrap_err();
        assert_eq!(err.to_string(), "Variant is sold out, Quantity too high");
        assert_eq!(
            navigator.alerts(),
            vec!["Checkout failed: Variant is sold out, Quantity too high"]
        );
    }

    #[tokio::test]
    async fn test_missing_checkout_url() {
        let gateway = Arc::new(
            MockGateway::new().with_data(&queries::CREATE_CART, created("gid://shopify/Cart/c1", None)),
        );
        let (storefront, _, _) = testing::storefront(gateway);
        storefront.cart().add("gid://V/1", 1).unwrap();
        let navigator = RecordingNavigator::new();

        let err = storefront.checkout(&navigator).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get checkout URL");
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_existing_cart_is_reused() {
        let gateway = Arc::new(MockGateway::new().with_data(
            &queries::GET_CART,
            json!({ "cart": { "id": "gid://shopify/Cart/old", "checkoutUrl": "https://shop.example.com/checkouts/old" } }),
        ));
        let (storefront, storage, _) = testing::storefront(gateway.clone());
        storefront.cart().add("gid://V/1", 1).unwrap();
        storage.set(CART_ID_KEY, "gid://shopify/Cart/old").unwrap();
        let navigator = RecordingNavigator::new();

        storefront.checkout_existing(&navigator).await.unwrap();
        assert_eq!(navigator.redirects(), vec!["https://shop.example.com/checkouts/old"]);
        assert_eq!(gateway.calls_to(&queries::CREATE_CART), 0);
    }

    #[tokio::test]
    async fn test_vanished_cart_falls_back_to_new_checkout() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_data(&queries::GET_CART, json!({ "cart": null }))
                .with_data(
                    &queries::CREATE_CART,
                    created("gid://shopify/Cart/new", Some("https://shop.example.com/checkouts/new")),
                ),
        );
        let (storefront, storage, _) = testing::storefront(gateway.clone());
        storefront.cart().add("gid://V/1", 1).unwrap();
        storage.set(CART_ID_KEY, "gid://shopify/Cart/old").unwrap();
        let navigator = RecordingNavigator::new();

        storefront.checkout_existing(&navigator).await.unwrap();
        assert_eq!(navigator.redirects(), vec!["https://shop.example.com/checkouts/new"]);
        assert_eq!(
            storage.get(CART_ID_KEY).unwrap().as_deref(),
            Some("gid://shopify/Cart/new")
        );
    }

    #[tokio::test]
    async fn test_fetch_error_falls_back_to_new_checkout() {
        let gateway = Arc::new(MockGateway::new().with_data(
            &queries::CREATE_CART,
            created("gid://shopify/Cart/new", Some("https://shop.example.com/checkouts/new")),
        ));
        gateway.respond(&queries::GET_CART, Err(RequestError::transport("HTTP error! status: 503")));
        let (storefront, storage, _) = testing::storefront(gateway.clone());
        storefront.cart().add("gid://V/1", 1).unwrap();
        storage.set(CART_ID_KEY, "gid://shopify/Cart/old").unwrap();
        let navigator = RecordingNavigator::new();

        storefront.checkout_existing(&navigator).await.unwrap();
        assert_eq!(navigator.redirects(), vec!["https://shop.example.com/checkouts/new"]);
        assert_eq!(gateway.calls_to(&queries::CREATE_CART), 1);
    }

    #[tokio::test]
    async fn test_no_remembered_cart_goes_straight_to_checkout() {
        let gateway = Arc::new(MockGateway::new());
        let (storefront, _, _) = testing::storefront(gateway.clone());
        let navigator = RecordingNavigator::new();

        let err = storefront.checkout_existing(&navigator).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCart));
        assert_eq!(gateway.calls_to(&queries::GET_CART), 0);
    }

    #[tokio::test]
    async fn test_add_remote_cart_lines() {
        let gateway = Arc::new(MockGateway::new().with_data(
            &queries::ADD_CART_LINES,
            json!({ "cartLinesAdd": {
                "cart": { "id": "gid://shopify/Cart/c1", "checkoutUrl": "https://shop.example.com/checkouts/c1" },
                "userErrors": []
            }}),
        ));
        let (storefront, _, _) = testing::storefront(gateway.clone());

        let handle = storefront
            .add_remote_cart_lines(&CartId::from("gid://shopify/Cart/c1"), &[CartLine::new("gid://V/2", 1)])
            .await
            .unwrap();
        assert_eq!(handle.checkout_url, "https://shop.example.com/checkouts/c1");
        assert_eq!(
            gateway.calls()[0].variables,
            json!({ "cartId": "gid://shopify/Cart/c1", "lines": [{ "merchandiseId": "gid://V/2", "quantity": 1 }] })
        );
    }
}
