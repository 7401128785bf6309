//! Cart lines and order total reconciliation.
//!
//! Carts are priced in minor units, but the payment provider requires whole
//! major units. Checkout therefore produces two totals that are computed
//! independently:
//!
//! - the **stored total**, `Σ price × quantity` over the original minor-unit
//!   prices, persisted on the order row;
//! - the **gross amount**, `Σ round(price / 100) × quantity` over the
//!   converted item details, sent to the provider.
//!
//! They agree only up to the rounding of each line's `/100` conversion, and
//! both the database and the provider depend on exactly this behavior.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MinorUnits, ProductId};

/// Maximum item name length accepted by the payment provider.
pub const MAX_ITEM_NAME_CHARS: usize = 50;

/// A cart line as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    /// Unit price in minor units.
    pub price: MinorUnits,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
}

/// A line item in the payment provider's format (major units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: ProductId,
    pub name: String,
    /// Unit price in whole major units.
    pub price: i64,
    pub quantity: u32,
}

impl From<&CartLine> for ItemDetail {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.chars().take(MAX_ITEM_NAME_CHARS).collect(),
            price: line.price.to_major_rounded(),
            quantity: line.quantity,
        }
    }
}

/// Result of reconciling a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotals {
    /// Line items to send to the payment provider.
    pub item_details: Vec<ItemDetail>,
    /// Sum of `item_details` price × quantity, in major units.
    pub gross_amount: i64,
    /// Sum of the original prices × quantity, in minor units.
    pub stored_total: MinorUnits,
}

/// Reasons a cart cannot be checked out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("No items")]
    EmptyCart,

    /// A line has a quantity of zero.
    #[error("Invalid quantity for item {0}")]
    InvalidQuantity(ProductId),

    /// The gross amount is not a positive integer (or does not fit in `i64`).
    #[error("Invalid total")]
    InvalidTotal {
        gross_amount: Option<i64>,
        item_details: Vec<ItemDetail>,
    },
}

/// Reconcile cart lines into provider line items and both order totals.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] if `lines` is empty
/// - [`CheckoutError::InvalidQuantity`] if any line has quantity 0
/// - [`CheckoutError::InvalidTotal`] if the gross amount is below 1 or
///   either total overflows
pub fn reconcile(lines: &[CartLine]) -> Result<OrderTotals, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if let Some(line) = lines.iter().find(|line| line.quantity == 0) {
        return Err(CheckoutError::InvalidQuantity(line.id.clone()));
    }

    let item_details: Vec<ItemDetail> = lines.iter().map(ItemDetail::from).collect();

    let gross_amount = item_details.iter().try_fold(0_i64, |sum, d| {
        d.price
            .checked_mul(i64::from(d.quantity))
            .and_then(|line| sum.checked_add(line))
    });
    let stored_total = lines.iter().try_fold(0_i64, |sum, line| {
        line.price
            .as_i64()
            .checked_mul(i64::from(line.quantity))
            .and_then(|line| sum.checked_add(line))
    });

    match (gross_amount, stored_total) {
        (Some(gross_amount), Some(stored_total)) if gross_amount >= 1 => Ok(OrderTotals {
            item_details,
            gross_amount,
            stored_total: MinorUnits::new(stored_total),
        }),
        (gross_amount, _) => Err(CheckoutError::InvalidTotal {
            gross_amount,
            item_details,
        }),
    }
}
