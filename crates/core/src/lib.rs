//! Warung Core - Shared domain library.
//!
//! This crate provides the types and pure routines used by the storefront:
//! - [`types`] - Newtype IDs, money amounts, price normalization, order statuses, products
//! - [`checkout`] - Cart lines and the order total reconciler
//! - [`payment`] - Payment notifications and signature verification
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and easy to test.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod payment;
pub mod types;

pub use types::*;
