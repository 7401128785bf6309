//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error response is a JSON object `{ "error": ..., "details"?: ... }`.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use warung_core::checkout::CheckoutError;

use crate::extractor::ExtractorError;
use crate::midtrans::MidtransError;
use crate::supabase::SupabaseError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database or storage operation failed.
    #[error("{0}")]
    Supabase(#[from] SupabaseError),

    /// Payment provider call failed.
    #[error("{0}")]
    Midtrans(#[from] MidtransError),

    /// AI extraction webhook failed.
    #[error("{0}")]
    Extractor(#[from] ExtractorError),

    /// Cart could not be reconciled.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Caller could not be authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed request whose content cannot be used.
    #[error("{message}")]
    Unprocessable { message: String, details: Value },

    /// Multipart body could not be read.
    #[error("{0}")]
    Multipart(#[from] MultipartError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Supabase(_) | Self::Midtrans(MidtransError::Config(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Midtrans(_) | Self::Extractor(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            // Oversized bodies keep axum's 413
            Self::Multipart(err) => err.status(),
        }
    }

    fn body(&self) -> ErrorBody {
        let details = match self {
            Self::Midtrans(
                MidtransError::Rejected { details, .. }
                | MidtransError::MissingRedirectUrl { details },
            )
            | Self::Unprocessable { details, .. } => Some(details.clone()),
            Self::Checkout(CheckoutError::InvalidTotal {
                gross_amount,
                item_details,
            }) => Some(json!({
                "grossAmount": gross_amount,
                "itemDetails": item_details,
            })),
            _ => None,
        };

        let error = match self {
            Self::Multipart(err) => err.body_text(),
            Self::Extractor(ExtractorError::Http(e)) => format!("n8n error: {e}"),
            _ => self.to_string(),
        };

        ErrorBody { error, details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Created order", Some(&[("order_id", "order_123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use warung_core::ProductId;
    use warung_core::checkout::ItemDetail;

    use super::*;

    async fn response_parts(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Unauthorized("Invalid signature".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Checkout(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Supabase(SupabaseError::Parse("x".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Extractor(ExtractorError::Api {
                status: 500,
                body: "boom".to_string(),
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_empty_cart_body() {
        let (status, body) = response_parts(CheckoutError::EmptyCart.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No items"}));
    }

    #[tokio::test]
    async fn test_invalid_total_body_carries_details() {
        let err = CheckoutError::InvalidTotal {
            gross_amount: Some(0),
            item_details: vec![ItemDetail {
                id: ProductId::new("p1"),
                name: "Kerupuk".to_string(),
                price: 0,
                quantity: 1,
            }],
        };
        let (status, body) = response_parts(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid total");
        assert_eq!(body["details"]["grossAmount"], 0);
        assert_eq!(body["details"]["itemDetails"][0]["name"], "Kerupuk");
    }

    #[tokio::test]
    async fn test_midtrans_rejection_body() {
        let err = MidtransError::Rejected {
            status: 400,
            details: json!({"error_messages": ["gross_amount is not equal"]}),
        };
        let (status, body) = response_parts(err.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Midtrans rejected payload");
        assert_eq!(body["details"]["error_messages"][0], "gross_amount is not equal");
    }

    #[tokio::test]
    async fn test_supabase_message_passed_through() {
        let err = SupabaseError::Api {
            status: 409,
            message: "duplicate key value".to_string(),
        };
        let (status, body) = response_parts(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "duplicate key value"}));
    }
}
