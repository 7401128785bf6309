//! Midtrans Snap client.
//!
//! Creates hosted payment sessions. The server key doubles as the Basic auth
//! user name (with an empty password) and selects the environment: keys
//! starting with `SB-` belong to the sandbox.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;
use warung_core::checkout::ItemDetail;

use crate::config::MidtransConfig;

/// Snap transactions endpoint for sandbox keys.
pub const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap/v1/transactions";

/// Snap transactions endpoint for production keys.
pub const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com/snap/v1/transactions";

/// Errors that can occur when creating a Snap transaction.
#[derive(Debug, Error)]
pub enum MidtransError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Midtrans answered with a non-success status.
    #[error("Midtrans rejected payload")]
    Rejected {
        status: u16,
        details: serde_json::Value,
    },

    /// Midtrans accepted the payload but sent no redirect URL.
    #[error("Midtrans response missing redirect_url")]
    MissingRedirectUrl { details: serde_json::Value },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Snap transactions endpoint matching a server key's environment.
#[must_use]
pub fn snap_endpoint_for(server_key: &str) -> &'static str {
    if server_key.starts_with("SB-") {
        SANDBOX_SNAP_URL
    } else {
        PRODUCTION_SNAP_URL
    }
}

/// Snap transaction request.
#[derive(Debug, Serialize)]
pub struct SnapRequest<'a> {
    pub transaction_details: TransactionDetails<'a>,
    pub item_details: &'a [ItemDetail],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<SnapCallbacks>,
}

#[derive(Debug, Serialize)]
pub struct TransactionDetails<'a> {
    pub order_id: &'a str,
    /// Whole major units; must equal Σ item price × quantity.
    pub gross_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct SnapCallbacks {
    /// Where the customer lands after paying.
    pub finish: String,
}

impl SnapCallbacks {
    /// Callbacks returning the customer to the storefront's checkout page.
    #[must_use]
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            finish: format!("{base_url}/checkout"),
        }
    }
}

/// A created payment session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapTransaction {
    pub redirect_url: String,
}

/// Midtrans Snap API client.
#[derive(Clone)]
pub struct SnapClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl SnapClient {
    /// Create a new Snap client.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is invalid, the key is not a valid header
    /// value, or the HTTP client fails to build.
    pub fn new(config: &MidtransConfig) -> Result<Self, MidtransError> {
        let key = config.server_key.expose_secret();
        let endpoint = match &config.snap_url {
            Some(url) => url.clone(),
            None => Url::parse(snap_endpoint_for(key))
                .map_err(|e| MidtransError::Config(format!("Invalid Snap URL: {e}")))?,
        };

        let mut auth = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(format!("{key}:"))))
            .map_err(|e| MidtransError::Config(format!("Invalid server key format: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// The endpoint transactions are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Create a payment session.
    ///
    /// # Errors
    ///
    /// Returns [`MidtransError::Rejected`] for a non-success status (details are
    /// the parsed JSON body, or the raw text when it is not JSON) and
    /// [`MidtransError::MissingRedirectUrl`] when the reply has no redirect URL
    /// or an empty one.
    #[instrument(skip(self, request), fields(order_id = request.transaction_details.order_id))]
    pub async fn create_transaction(
        &self,
        request: &SnapRequest<'_>,
    ) -> Result<SnapTransaction, MidtransError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let details = serde_json::from_str::<serde_json::Value>(&text)
            .unwrap_or(serde_json::Value::String(text));

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %details, "Midtrans rejected payload");
            return Err(MidtransError::Rejected {
                status: status.as_u16(),
                details,
            });
        }

        match serde_json::from_value::<SnapTransaction>(details.clone()) {
            Ok(transaction) if !transaction.redirect_url.is_empty() => Ok(transaction),
            _ => Err(MidtransError::MissingRedirectUrl { details }),
        }
    }
}
