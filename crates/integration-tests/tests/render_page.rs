//! Integration tests for rendering a static page end to end.

#![allow(clippy::unwrap_used)]

use httpmock::MockServer;
use serde_json::json;
use storefront_kit::{DeclarativeLoader, HtmlPage};
use storefront_kit_integration_tests::{GRAPHQL_PATH, graphql_data, session};

const PAGE: &str = r#"<main>
<template id="card"><article><h2>{{title}}</h2><p>{{price}}</p><img src="{{image}}"></article></template>
<template id="line"><li>{{variantId}} x {{quantity}}</li></template>
<section data-shopify="products" data-collection="Shirts" data-template="card" data-limit="2"></section>
<ul data-shopify="cart" data-template="line"></ul>
<div data-shopify="reviews" data-template="card"></div>
</main>"#;

fn product(title: &str, amount: &str) -> serde_json::Value {
    json!({
        "title": title,
        "priceRange": { "minVariantPrice": { "amount": amount, "currencyCode": "USD" } },
        "images": { "edges": [{ "node": { "url": format!("https://cdn.example.com/{title}.png") } }] }
    })
}

#[tokio::test]
async fn test_page_renders_every_binding() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST").path(GRAPHQL_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .body(graphql_data(&json!({ "collections": { "edges": [
                    { "node": { "products": { "edges": [
                        { "node": product("Tee", "25.0") },
                        { "node": product("Polo", "40") },
                        { "node": product("Henley", "35.5") }
                    ]}}}
                ]}})));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let storefront = session(&server, dir.path());

    let mut page = HtmlPage::parse(PAGE).unwrap();
    let mut loader = DeclarativeLoader::from_page(&storefront, &page);
    let failures = loader.process_all(&mut page).await;
    let html = page.to_html().unwrap();

    assert_eq!(failures, 1);
    assert!(html.contains(
        r#"<article><h2>Tee</h2><p>25.00</p><img src="https://cdn.example.com/Tee.png"></article><article><h2>Polo</h2><p>40.00</p>"#
    ));
    assert!(!html.contains("<h2>Henley</h2>"));
    assert!(html.contains(r#"<ul data-shopify="cart" data-template="line"><p>Your cart is empty</p></ul>"#));
    assert!(html.contains(r#"<div class="shopify-error">Error: Unknown shopify type: reviews</div>"#));
    // Templates survive untouched.
    assert!(html.contains(r#"<template id="line"><li>{{variantId}} x {{quantity}}</li></template>"#));
    mock.assert_hits_async(1).await;
}
