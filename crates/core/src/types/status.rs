//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Canonical order payment status, as stored on the order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    #[default]
    Pending,
    /// Payment settled or captured.
    Paid,
    /// Payment denied, cancelled, expired, refunded or charged back.
    Failed,
}

impl OrderStatus {
    /// Map a payment provider `transaction_status` onto an order status.
    ///
    /// The mapping is total: any status the provider adds in the future is
    /// treated as still pending.
    #[must_use]
    pub fn from_transaction_status(status: &str) -> Self {
        match status {
            "settlement" | "capture" => Self::Paid,
            "deny" | "cancel" | "expire" | "refund" | "partial_refund" | "chargeback"
            | "partial_chargeback" | "failure" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Get the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
