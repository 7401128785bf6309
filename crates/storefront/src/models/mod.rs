//! Row types for the storefront's database tables.

pub mod order;

pub use order::{NewOrder, NewOrderItem, OrderRow, OrderStatusUpdate};
