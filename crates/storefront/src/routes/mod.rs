//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (Supabase reachable)
//!
//! # API
//! GET  /api/products           - Product listing (seeds a demo product when empty)
//! POST /api/admin/upload       - Upload a photo, create the product the AI describes
//! POST /api/checkout           - Create an order and a Snap payment session
//! POST /api/midtrans/callback  - Payment notification from Midtrans
//! ```

pub mod admin;
pub mod checkout;
pub mod health;
pub mod payments;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted upload request body.
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route(
            "/admin/upload",
            post(admin::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/checkout", post(checkout::create))
        .route("/midtrans/callback", post(payments::callback))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api", api_routes())
}
