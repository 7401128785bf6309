//! Product listing.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;
use warung_core::{NewProduct, Product};

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// List products, newest first.
///
/// GET /api/products
///
/// An empty catalogue gets the demo product inserted so checkout can be tried
/// right away; the response then lists just that product.
///
/// # Errors
///
/// Returns `AppError::Supabase` if listing or seeding fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<ProductsResponse>> {
    let mut products = state.database().list_products().await?;

    if products.is_empty() {
        let demo = state.database().insert_product(&NewProduct::demo()).await?;
        tracing::info!(product_id = %demo.id, "Seeded demo product");
        products.push(demo);
    }

    Ok(Json(ProductsResponse { products }))
}
