//! Integration tests for the admin photo upload.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use httpmock::Mock;
use httpmock::prelude::*;
use serde_json::{Value, json};
use warung_integration_tests::{TestContext, WEBHOOK_PATH};
use warung_storefront::routes::UPLOAD_BODY_LIMIT;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

/// Mock bucket creation (reporting an existing bucket) and the object upload.
async fn mock_storage(ctx: &TestContext) -> Mock<'_> {
    ctx.supabase
        .mock_async(|when, then| {
            when.method(POST).path("/storage/v1/bucket");
            then.status(400).json_body(json!({
                "statusCode": "409",
                "error": "Duplicate",
                "message": "The resource already exists",
            }));
        })
        .await;
    ctx.supabase
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/storage/v1/object/products/products/")
                .header("x-upsert", "false");
            then.status(200).json_body(json!({"Key": "products/products/x.png"}));
        })
        .await
}

async fn mock_ai_reply(ctx: &TestContext, reply: Value) -> Mock<'_> {
    ctx.n8n
        .mock_async(|when, then| {
            when.method(POST)
                .path(WEBHOOK_PATH)
                .body_contains("/storage/v1/object/public/products/products/");
            then.status(200).json_body(reply);
        })
        .await
}

#[tokio::test]
async fn test_upload_creates_product_with_normalized_price() {
    let ctx = TestContext::start().await;
    let upload = mock_storage(&ctx).await;
    let ai = mock_ai_reply(
        &ctx,
        json!({"data": {"name": " Ayam Goreng ", "description": "Pedas manis", "price": "25rb"}}),
    )
    .await;
    let insert = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/products")
                .json_body_partial(
                    json!({"name": "Ayam Goreng", "description": "Pedas manis", "price": 2_500_000})
                        .to_string(),
                );
            then.status(201).json_body(json!([{
                "id": "c0ffee",
                "name": "Ayam Goreng",
                "description": "Pedas manis",
                "price": 2_500_000,
                "image_url": "http://storage.test/products/x.png",
            }]));
        })
        .await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "ayam-goreng.png", "image/png", PNG_BYTES)
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    upload.assert_async().await;
    ai.assert_async().await;
    insert.assert_async().await;
    assert_eq!(body["product"]["id"], "c0ffee");
    assert_eq!(body["product"]["price"], 2_500_000);
}

#[tokio::test]
async fn test_upload_falls_back_to_file_name() {
    let ctx = TestContext::start().await;
    mock_storage(&ctx).await;
    mock_ai_reply(&ctx, json!({"name": "", "price": 15000})).await;
    let insert = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/products")
                .json_body_partial(
                    json!({"name": "Es Teh Manis", "price": 1_500_000}).to_string(),
                );
            then.status(201).json_body(json!([{
                "id": 9,
                "name": "Es Teh Manis",
                "description": null,
                "price": 1_500_000,
                "image_url": null,
            }]));
        })
        .await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "es_teh-manis.jpg", "image/jpeg", PNG_BYTES)
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    insert.assert_async().await;
    assert_eq!(body["product"]["name"], "Es Teh Manis");
}

#[tokio::test]
async fn test_upload_without_price_is_422() {
    let ctx = TestContext::start().await;
    mock_storage(&ctx).await;
    mock_ai_reply(&ctx, json!({"status": "done", "message": "no product found"})).await;
    let insert = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/products");
            then.status(201).json_body(json!([]));
        })
        .await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "bakso-urat.png", "image/png", PNG_BYTES)
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(insert.hits_async().await, 0);
    assert_eq!(body["error"], "AI extraction returned invalid data");
    assert_eq!(
        body["details"]["received"],
        json!({"status": "done", "message": "no product found"})
    );
    assert_eq!(body["details"]["parsed"]["name"], "Bakso Urat");
    assert_eq!(body["details"]["parsed"]["price"], Value::Null);
}

#[tokio::test]
async fn test_upload_price_too_large_to_store_is_422() {
    for price in [json!(1e28), json!("70000000000000000000000 jt")] {
        let ctx = TestContext::start().await;
        mock_storage(&ctx).await;
        mock_ai_reply(&ctx, json!({"name": "Nasi Uduk", "price": price})).await;
        let insert = ctx
            .supabase
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/products");
                then.status(201).json_body(json!([]));
            })
            .await;

        let (status, body) = ctx
            .post_file("/api/admin/upload", "image", "uduk.png", "image/png", PNG_BYTES)
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{price}: {body}");
        assert_eq!(body["error"], "AI extraction returned invalid data");
        assert_eq!(body["details"]["parsed"]["name"], "Nasi Uduk");
        assert_eq!(insert.hits_async().await, 0);
    }
}

#[tokio::test]
async fn test_upload_webhook_failure_is_502() {
    let ctx = TestContext::start().await;
    mock_storage(&ctx).await;
    ctx.n8n
        .mock_async(|when, then| {
            when.method(POST).path(WEBHOOK_PATH);
            then.status(500).body("workflow crashed");
        })
        .await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "soto.png", "image/png", PNG_BYTES)
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "n8n error: workflow crashed");
}

#[tokio::test]
async fn test_upload_without_image_field_is_400() {
    let ctx = TestContext::start().await;
    let bucket = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST).path("/storage/v1/bucket");
            then.status(200).json_body(json!({"name": "products"}));
        })
        .await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "photo", "soto.png", "image/png", PNG_BYTES)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file");
    assert_eq!(bucket.hits_async().await, 0);
}

#[tokio::test]
async fn test_upload_over_body_limit_is_413() {
    let ctx = TestContext::start().await;
    let bucket = ctx
        .supabase
        .mock_async(|when, then| {
            when.method(POST).path("/storage/v1/bucket");
            then.status(200).json_body(json!({"name": "products"}));
        })
        .await;

    let oversized = vec![0_u8; UPLOAD_BODY_LIMIT + 1];
    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "besar.png", "image/png", &oversized)
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
    assert_eq!(bucket.hits_async().await, 0);
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let ctx = TestContext::start().await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "menu.pdf", "application/pdf", b"%PDF-1.7")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_upload_storage_failure_is_500() {
    let ctx = TestContext::start().await;
    ctx.supabase
        .mock_async(|when, then| {
            when.method(POST).path("/storage/v1/bucket");
            then.status(403)
                .json_body(json!({"statusCode": "403", "error": "Unauthorized", "message": "new row violates row-level security policy"}));
        })
        .await;

    let (status, body) = ctx
        .post_file("/api/admin/upload", "image", "soto.png", "image/png", PNG_BYTES)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "new row violates row-level security policy");
}
