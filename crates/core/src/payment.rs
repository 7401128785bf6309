//! Payment provider notifications and signature verification.
//!
//! The provider signs every notification with
//! `SHA-512(order_id + status_code + gross_amount + server_key)`, hex encoded,
//! and sends the digest as `signature_key`. Verification recomputes the digest
//! from the received fields and compares it in constant time.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use crate::types::OrderStatus;

/// A notification field that the provider may send as a string or a number.
///
/// The signature covers the field's textual form, so numbers are rendered the
/// way a JSON number prints (`50000`, `50000.5`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationField {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for NotificationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => {
                if let Some(i) = n.as_i64() {
                    write!(f, "{i}")
                } else if let Some(u) = n.as_u64() {
                    write!(f, "{u}")
                } else if let Some(x) = n.as_f64() {
                    // f64's Display drops a trailing ".0", matching JSON output.
                    write!(f, "{x}")
                } else {
                    write!(f, "{n}")
                }
            }
        }
    }
}

impl From<&str> for NotificationField {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Payment status notification posted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    /// The order reference sent at checkout (`external_id` on the order row).
    pub order_id: NotificationField,
    pub status_code: NotificationField,
    /// Gross amount in major units, as the provider formats it.
    pub gross_amount: NotificationField,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub signature_key: Option<String>,
}

impl PaymentNotification {
    /// Compute the signature the provider should have sent for this payload.
    #[must_use]
    pub fn expected_signature(&self, server_key: &str) -> String {
        signature_digest(
            &self.order_id.to_string(),
            &self.status_code.to_string(),
            &self.gross_amount.to_string(),
            server_key,
        )
    }

    /// Check the payload's `signature_key` against the recomputed digest.
    ///
    /// A missing signature never verifies.
    #[must_use]
    pub fn verify_signature(&self, server_key: &str) -> bool {
        let Some(provided) = self.signature_key.as_deref() else {
            return false;
        };
        let expected = self.expected_signature(server_key);
        constant_time_compare(expected.as_bytes(), provided.as_bytes())
    }

    /// Order status implied by `transaction_status`.
    ///
    /// A missing status maps to pending, like any unknown one.
    #[must_use]
    pub fn order_status(&self) -> OrderStatus {
        OrderStatus::from_transaction_status(self.transaction_status.as_deref().unwrap_or_default())
    }
}

/// Hex-encoded SHA-512 of the concatenated fields and server key.
#[must_use]
pub fn signature_digest(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
