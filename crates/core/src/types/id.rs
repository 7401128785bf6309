//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! Row ids come back from the database REST API either as strings (uuid
//! columns) or as integers (identity columns). Both are accepted and carried
//! as text, so callers never have to care which one the schema uses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire representation accepted when deserializing an ID.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Integer(i64),
}

impl RawId {
    #[doc(hidden)]
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or an integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use warung_core::define_id;
/// define_id!(CustomerId);
/// define_id!(InvoiceId);
///
/// let customer = CustomerId::new("42");
/// let invoice = InvoiceId::new("42");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = invoice;
/// # let _ = (customer, invoice);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)
                    .map(|raw| Self(raw.into_string()))
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(OrderId);

/// Order reference shared with the payment provider.
///
/// Generated once per checkout as `order_<uuid v4>` and stored on the order
/// row as `external_id`. Payment notifications refer to orders by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalOrderId(String);

impl ExternalOrderId {
    /// Prefix of every generated reference.
    pub const PREFIX: &'static str = "order_";

    /// Generate a fresh, random order reference.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
    }

    /// Wrap an existing reference (e.g. one received from the provider).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ExternalOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
