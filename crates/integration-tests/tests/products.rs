//! Integration tests for the product listing and health checks.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use httpmock::prelude::*;
use serde_json::json;
use warung_integration_tests::TestContext;

#[tokio::test]
async fn test_empty_store_seeds_demo_product() {
    let ctx = TestContext::start().await;

    let list = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/products")
                .query_param("order", "created_at.desc");
            then.status(200).json_body(json!([]));
        })
        .await;
    let insert = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/products")
                .json_body_partial(
                    json!({
                        "name": "Nasi Goreng Spesial (Demo)",
                        "price": 2_500_000,
                        "image_url": null,
                    })
                    .to_string(),
                );
            then.status(201).json_body(json!([{
                "id": 1,
                "name": "Nasi Goreng Spesial (Demo)",
                "description": "Item demo untuk uji checkout end-to-end tanpa gambar.",
                "price": 2_500_000,
                "image_url": null,
            }]));
        })
        .await;

    let (status, body) = ctx.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    list.assert_async().await;
    insert.assert_async().await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], "1");
    assert_eq!(products[0]["name"], "Nasi Goreng Spesial (Demo)");
    assert_eq!(products[0]["price"], 2_500_000);
}

#[tokio::test]
async fn test_existing_products_are_listed_without_seeding() {
    let ctx = TestContext::start().await;

    ctx.supabase
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/products");
            then.status(200).json_body(json!([
                {"id": "b", "name": "Es Teh", "description": null, "price": 500_000, "image_url": null},
                {"id": "a", "name": "Sate Ayam", "description": "10 tusuk", "price": 3_000_000,
                 "image_url": "https://cdn.test/sate.jpg"},
            ]));
        })
        .await;
    let insert = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/products");
            then.status(201).json_body(json!([]));
        })
        .await;

    let (status, body) = ctx.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(insert.hits_async().await, 0);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["name"], "Es Teh");
    assert_eq!(products[1]["image_url"], "https://cdn.test/sate.jpg");
}

#[tokio::test]
async fn test_listing_database_error_is_500() {
    let ctx = TestContext::start().await;

    ctx.supabase
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/products");
            then.status(500)
                .json_body(json!({"message": "relation \"products\" does not exist"}));
        })
        .await;

    let (status, body) = ctx.get("/api/products").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "relation \"products\" does not exist");
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::start().await;

    let (status, body) = ctx.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_readiness_follows_supabase() {
    let ctx = TestContext::start().await;

    let mut ping = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/products")
                .query_param("limit", "1");
            then.status(200).json_body(json!([]));
        })
        .await;

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);

    ping.delete_async().await;
    ctx.supabase
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/products");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let ctx = TestContext::start().await;
    let router = ctx.router();

    let response = router
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}
