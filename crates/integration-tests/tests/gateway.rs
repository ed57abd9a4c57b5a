//! Integration tests for the HTTP gateway.
//!
//! The gateway posts GraphQL operations with the access token header and
//! normalizes every failure into a single message.

#![allow(clippy::unwrap_used)]

use httpmock::MockServer;
use serde_json::json;
use storefront_kit::shopify::{Gateway, RequestErrorOrigin, queries};
use storefront_kit_integration_tests::{GRAPHQL_PATH, TEST_TOKEN, TOKEN_HEADER, client, graphql_data};

#[tokio::test]
async fn test_request_sends_token_and_operation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path(GRAPHQL_PATH)
                .header(TOKEN_HEADER, TEST_TOKEN);
            then.status(200)
                .header("content-type", "application/json")
                .body(graphql_data(&json!({ "productByHandle": { "title": "Tee" } })));
        })
        .await;

    let data = client(&server)
        .request(&queries::GET_PRODUCT_BY_HANDLE, json!({ "handle": "tee" }))
        .await
        .unwrap();

    assert_eq!(data["productByHandle"]["title"], "Tee");
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(500).body("upstream exploded");
        })
        .await;

    let err = client(&server)
        .request(&queries::GET_COLLECTIONS, json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP error! status: 500");
    assert_eq!(err.origin(), RequestErrorOrigin::Transport);
}

#[tokio::test]
async fn test_graphql_errors_are_joined() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({ "errors": [
                        {
                            "message": "Field 'bogus' doesn't exist",
                            "path": ["query", "bogus"],
                            "locations": [{ "line": 2, "column": 3 }]
                        },
                        { "message": "Throttled" }
                    ]})
                    .to_string(),
                );
        })
        .await;

    let err = client(&server)
        .request(&queries::SEARCH_PRODUCTS, json!({ "q": "tee" }))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Field 'bogus' doesn't exist path: query.bogus at line 2:3; Throttled"
    );
    assert_eq!(err.origin(), RequestErrorOrigin::Application);
}

#[tokio::test]
async fn test_unreadable_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server)
        .request(&queries::GET_COLLECTIONS, json!({}))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Invalid response body"));
    assert_eq!(err.origin(), RequestErrorOrigin::Decode);
}
