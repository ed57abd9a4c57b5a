//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` wire types with `reqwest` 0.13 for HTTP. The client
//! itself is stateless apart from its connection pool; caching happens one
//! layer up in [`crate::cache`].

pub mod queries;

use std::sync::Arc;

use async_trait::async_trait;
use graphql_client::{QueryBody, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::config::{ConfigError, StorefrontKitConfig};
use crate::shopify::{Gateway, GraphQLError, RequestError};

use queries::Operation;

/// Header carrying the Storefront API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

// =============================================================================
// StorefrontClient
// =============================================================================

/// HTTP client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: Url,
    access_token: SecretString,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontClient {
    /// Create a client for the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured domain does not form a URL.
    pub fn new(config: &StorefrontKitConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_endpoint(
            config.api_url()?,
            config.storefront_token.clone(),
        ))
    }

    /// Create a client for an explicit endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: Url, access_token: SecretString) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token,
            }),
        }
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    async fn execute(&self, operation: &Operation, variables: Value) -> Result<Value, RequestError> {
        let request_body = QueryBody {
            variables,
            query: operation.query,
            operation_name: operation.name,
        };

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(RequestError::transport(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let response: Response<Value> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Storefront GraphQL response"
                );
                return Err(RequestError::decode(format!("Invalid response body: {e}")));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");

            let errors: Vec<GraphQLError> = errors.into_iter().map(GraphQLError::from).collect();
            return Err(RequestError::from_graphql(&errors));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront GraphQL response has no data and no errors"
            );
            RequestError::application("No data in response")
        })
    }
}

#[async_trait]
impl Gateway for StorefrontClient {
    #[instrument(skip(self, variables), fields(operation = operation.name))]
    async fn request(&self, operation: &Operation, variables: Value) -> Result<Value, RequestError> {
        self.execute(operation, variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let endpoint = Url::parse("https://shop.example.com/api/2023-04/graphql.json")
            .unwrap_or_else(|e| panic!("{e}"));
        let client = StorefrontClient::with_endpoint(endpoint, SecretString::from("shpat_live_secret"));
        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("shop.example.com"));
        assert!(!debug_output.contains("shpat_live_secret"));
    }
}
