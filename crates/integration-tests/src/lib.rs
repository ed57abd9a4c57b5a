//! Integration tests for the storefront kit.
//!
//! Every test runs the real HTTP gateway against an `httpmock` server and
//! persists to a `tempfile` directory, so nothing touches a live store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-kit-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `gateway` - Request shape and error normalization
//! - `catalog_cache` - Read-through caching across sessions
//! - `cart_checkout` - Cart hydration and checkout
//! - `render_page` - Rendering a static page end to end

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use secrecy::SecretString;
use serde_json::{Value, json};
use storefront_kit::{FileStore, Storefront, StorefrontClient};
use url::Url;

/// Path the mock endpoint is served under.
pub const GRAPHQL_PATH: &str = "/api/2023-04/graphql.json";

/// Access token the client sends.
pub const TEST_TOKEN: &str = "test-storefront-token";

/// Header the token travels in.
pub const TOKEN_HEADER: &str = "x-shopify-storefront-access-token";

/// A gateway pointed at `server`.
///
/// # Panics
///
/// Panics if the mock server URL does not parse.
#[must_use]
pub fn client(server: &MockServer) -> StorefrontClient {
    let endpoint = Url::parse(&server.url(GRAPHQL_PATH)).expect("mock server URL is valid");
    StorefrontClient::with_endpoint(endpoint, SecretString::from(TEST_TOKEN))
}

/// A session talking to `server` and persisting under `dir`.
#[must_use]
pub fn session(server: &MockServer, dir: &Path) -> Storefront {
    Storefront::new(
        Arc::new(client(server)),
        Arc::new(FileStore::new(dir)),
        Duration::from_secs(300),
    )
}

/// A successful GraphQL response body.
#[must_use]
pub fn graphql_data(data: &Value) -> String {
    json!({ "data": data }).to_string()
}
