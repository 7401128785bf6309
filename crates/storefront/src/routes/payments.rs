//! Midtrans payment notifications.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;
use warung_core::payment::PaymentNotification;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub ok: bool,
}

/// Apply a signed payment notification to its order.
///
/// POST /api/midtrans/callback
///
/// # Errors
///
/// - 400 when the body is not a notification
/// - 401 when the signature does not verify (the order is left untouched)
/// - 500 when the database update fails
#[instrument(skip(state, payload))]
pub async fn callback(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PaymentNotification>, JsonRejection>,
) -> Result<Json<CallbackResponse>> {
    let Json(notification) = payload?;
    let order_id = notification.order_id.to_string();

    let server_key = state.config().midtrans.server_key.expose_secret();
    if !notification.verify_signature(server_key) {
        tracing::warn!(%order_id, "Payment notification signature mismatch");
        return Err(AppError::Unauthorized("Invalid signature".to_string()));
    }

    let status = notification.order_status();
    state
        .database()
        .update_order_status(&order_id, status)
        .await?;
    tracing::info!(
        %order_id,
        transaction_status = notification.transaction_status.as_deref().unwrap_or_default(),
        %status,
        "Order status updated"
    );

    Ok(Json(CallbackResponse { ok: true }))
}
