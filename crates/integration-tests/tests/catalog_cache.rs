//! Integration tests for read-through caching.
//!
//! Cache partitions are written through to the file store, so a second
//! session over the same directory is served without a request.

#![allow(clippy::unwrap_used)]

use httpmock::MockServer;
use serde_json::json;
use storefront_kit::Partition;
use storefront_kit_integration_tests::{GRAPHQL_PATH, graphql_data, session};

#[tokio::test]
async fn test_cached_product_survives_new_session() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .body(graphql_data(&json!({
                    "productByHandle": { "id": "gid://shopify/Product/1", "title": "Tee" }
                })));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();

    let first = session(&server, dir.path());
    assert_eq!(first.product_by_handle("tee").await.unwrap()["title"], "Tee");
    assert_eq!(first.product_by_handle("tee").await.unwrap()["title"], "Tee");
    mock.assert_hits_async(1).await;

    let second = session(&server, dir.path());
    assert_eq!(second.product_by_handle("tee").await.unwrap()["title"], "Tee");
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_clearing_partition_forces_refetch() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .body(graphql_data(&json!({ "products": { "edges": [
                    { "node": { "title": "Linen Shirt" } }
                ]}})));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let storefront = session(&server, dir.path());

    assert_eq!(storefront.search_products("linen").await.unwrap().len(), 1);
    storefront.cache().clear(Some(Partition::Search)).unwrap();
    assert_eq!(storefront.search_products("linen").await.unwrap().len(), 1);

    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_failed_request_is_not_cached() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(503);
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let storefront = session(&server, dir.path());

    assert!(storefront.collections().await.is_err());
    assert!(storefront.collections().await.is_err());

    mock.assert_hits_async(2).await;
    assert!(storefront.cache().stats().iter().all(|s| s.entries == 0));
}
