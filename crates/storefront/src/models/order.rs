//! Orders and order items.

use serde::{Deserialize, Serialize};
use warung_core::checkout::CartLine;
use warung_core::{ExternalOrderId, MinorUnits, OrderId, OrderStatus, ProductId};

/// An order about to be inserted into `orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    /// Reference shared with the payment provider.
    pub external_id: ExternalOrderId,
    pub status: OrderStatus,
    /// Stored total in minor units.
    pub total: MinorUnits,
}

impl NewOrder {
    /// A pending order for the given stored total.
    #[must_use]
    pub const fn pending(external_id: ExternalOrderId, total: MinorUnits) -> Self {
        Self {
            external_id,
            status: OrderStatus::Pending,
            total,
        }
    }
}

/// An order as returned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub external_id: ExternalOrderId,
    pub status: OrderStatus,
    pub total: MinorUnits,
}

/// A row for `order_items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price in minor units, as the client submitted it.
    pub price: MinorUnits,
}

impl NewOrderItem {
    /// Item row for a cart line of the given order.
    #[must_use]
    pub fn from_line(order_id: &OrderId, line: &CartLine) -> Self {
        Self {
            order_id: order_id.clone(),
            product_id: line.id.clone(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// Patch body for `orders.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_serializes_pending() {
        let order = NewOrder::pending(ExternalOrderId::new("order_1"), MinorUnits::new(5_000_000));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"external_id": "order_1", "status": "pending", "total": 5_000_000})
        );
    }

    #[test]
    fn test_order_row_accepts_integer_id() {
        let row: OrderRow = serde_json::from_str(
            r#"{"id":42,"external_id":"order_1","status":"paid","total":100}"#,
        )
        .unwrap();
        assert_eq!(row.id.as_str(), "42");
        assert_eq!(row.status, OrderStatus::Paid);
    }

    #[test]
    fn test_item_keeps_minor_unit_price() {
        let line = CartLine {
            id: ProductId::new("p1"),
            name: "Es Teh".to_string(),
            price: MinorUnits::new(500_050),
            image_url: None,
            quantity: 3,
        };
        let item = NewOrderItem::from_line(&OrderId::new("o1"), &line);
        assert_eq!(item.price, MinorUnits::new(500_050));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.product_id.as_str(), "p1");
    }
}
