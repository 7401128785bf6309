//! Core types for Warung.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use money::MinorUnits;
pub use price::{PriceInput, parse_price, parse_price_text};
pub use product::{NewProduct, Product, derive_name_from_filename};
pub use status::OrderStatus;
