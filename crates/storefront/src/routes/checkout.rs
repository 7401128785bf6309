//! Checkout through Midtrans Snap.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use warung_core::ExternalOrderId;
use warung_core::checkout::{CartLine, reconcile};

use crate::error::{Result, add_breadcrumb};
use crate::midtrans::{SnapCallbacks, SnapRequest, TransactionDetails};
use crate::models::{NewOrder, NewOrderItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub redirect_url: String,
}

/// Create a pending order and a Snap payment session for a cart.
///
/// POST /api/checkout
///
/// The order stores the minor-unit total; Snap receives the gross amount in
/// whole major units. Order, items and payment session are created in that
/// order with no rollback when a later step fails.
///
/// # Errors
///
/// - 400 for an empty cart, a zero quantity or a total below one
/// - 500 when the database fails
/// - 502 when Midtrans rejects the payload or omits the redirect URL
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>> {
    let Json(request) = payload?;
    let totals = reconcile(&request.items)?;

    let external_id = ExternalOrderId::generate();
    let order = state
        .database()
        .insert_order(&NewOrder::pending(external_id.clone(), totals.stored_total))
        .await?;

    let items: Vec<NewOrderItem> = request
        .items
        .iter()
        .map(|line| NewOrderItem::from_line(&order.id, line))
        .collect();
    state.database().insert_order_items(&items).await?;
    add_breadcrumb(
        "checkout",
        "Created order",
        Some(&[("order_id", external_id.as_str())]),
    );

    let base_url = state.config().base_url.as_deref();
    tracing::info!(
        order_id = %external_id,
        item_count = totals.item_details.len(),
        stored_total = %totals.stored_total,
        gross_amount = totals.gross_amount,
        has_base_url = base_url.is_some(),
        "Midtrans payload summary"
    );

    let transaction = state
        .snap()
        .create_transaction(&SnapRequest {
            transaction_details: TransactionDetails {
                order_id: external_id.as_str(),
                gross_amount: totals.gross_amount,
            },
            item_details: &totals.item_details,
            callbacks: base_url.map(SnapCallbacks::for_base_url),
        })
        .await?;

    Ok(Json(CheckoutResponse {
        redirect_url: transaction.redirect_url,
    }))
}
