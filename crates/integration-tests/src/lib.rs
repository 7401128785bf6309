//! Integration tests for Warung.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p warung-integration-tests
//! ```
//!
//! Each test builds the storefront router in-process and points it at
//! `httpmock` servers standing in for Supabase, Midtrans and the n8n webhook.
//! Requests are driven through `tower::ServiceExt::oneshot`, so no port is
//! bound for the storefront itself.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use httpmock::MockServer;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use warung_storefront::config::{
    ExtractorConfig, MidtransConfig, StorefrontConfig, SupabaseConfig,
};
use warung_storefront::state::AppState;

/// Midtrans sandbox server key used by every test.
pub const SERVER_KEY: &str = "SB-Mid-server-q8Zk3LpW7vTn2RcYbH5dJf0a";

/// Public base URL configured for every test.
pub const BASE_URL: &str = "https://warung.test";

/// Path of the mocked Snap endpoint.
pub const SNAP_PATH: &str = "/snap/v1/transactions";

/// Path of the mocked n8n webhook.
pub const WEBHOOK_PATH: &str = "/webhook/extract";

/// Boundary used by [`multipart_body`].
const BOUNDARY: &str = "warung-test-boundary";

/// Upstream mocks plus a router wired to them.
pub struct TestContext {
    pub supabase: MockServer,
    pub midtrans: MockServer,
    pub n8n: MockServer,
    router: Router,
}

impl TestContext {
    /// Start the mock servers and build the router.
    pub async fn start() -> Self {
        let supabase = MockServer::start_async().await;
        let midtrans = MockServer::start_async().await;
        let n8n = MockServer::start_async().await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: Some(BASE_URL.to_string()),
            supabase: SupabaseConfig {
                url: Url::parse(&supabase.base_url()).unwrap(),
                service_key: SecretString::from("service-role-key-for-tests"),
            },
            midtrans: MidtransConfig {
                server_key: SecretString::from(SERVER_KEY),
                snap_url: Some(Url::parse(&midtrans.url(SNAP_PATH)).unwrap()),
            },
            extractor: ExtractorConfig {
                webhook_url: Url::parse(&n8n.url(WEBHOOK_PATH)).unwrap(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).unwrap();
        Self {
            supabase,
            midtrans,
            n8n,
            router: warung_storefront::app(state),
        }
    }

    /// A handle to the router, for tests that need the raw response.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Send a request and return the status and the body parsed as JSON
    /// (`Value::Null` for an empty body, a JSON string for plain text).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// GET `uri`.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST `body` as JSON to `uri`.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a single-file multipart form to `uri`.
    pub async fn post_file(
        &self,
        uri: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    field,
                    file_name,
                    content_type,
                    data,
                )))
                .unwrap(),
        )
        .await
    }
}

/// Encode one file part as a `multipart/form-data` body.
#[must_use]
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
