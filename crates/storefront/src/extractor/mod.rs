//! AI product extraction webhook.
//!
//! The webhook receives `{ "image_url": ... }` and answers with whatever its
//! workflow produced. Replies carry the product fields either at the top level
//! or wrapped in one envelope key; [`AiReply::decode`] settles which.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;
use url::Url;
use warung_core::PriceInput;

use crate::config::ExtractorConfig;

/// Envelope keys checked, in order, when the top level has no product fields.
pub const ENVELOPE_KEYS: [&str; 4] = ["data", "result", "output", "payload"];

const FIELD_KEYS: [&str; 3] = ["name", "description", "price"];

/// Errors that can occur when calling the extraction webhook.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook answered with a non-success status.
    #[error("n8n error: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    image_url: &'a str,
}

/// Product fields suggested by the AI. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
}

impl ProductFields {
    fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_owned);
        let price = match object.get("price") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64().map(PriceInput::Number),
            Some(Value::String(s)) => Some(PriceInput::Text(s.clone())),
            Some(other) => Some(PriceInput::Other(other.clone())),
        };
        Self {
            name: text("name"),
            description: text("description"),
            price,
        }
    }

    /// Trimmed, non-empty name.
    #[must_use]
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Where the product fields were found in a webhook reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AiReply {
    /// Fields at the top level of the reply object.
    Flat(ProductFields),
    /// Fields inside one of [`ENVELOPE_KEYS`].
    Wrapped {
        envelope: &'static str,
        fields: ProductFields,
    },
    /// Neither the top level nor any envelope carries a product field.
    Unrecognized,
}

impl AiReply {
    /// Locate the product fields in a reply.
    ///
    /// A level counts when it is an object with at least one of `name`,
    /// `description` or `price`. The top level wins over envelopes, and
    /// envelopes are tried in [`ENVELOPE_KEYS`] order.
    #[must_use]
    pub fn decode(reply: &Value) -> Self {
        let Some(top) = reply.as_object() else {
            return Self::Unrecognized;
        };
        if has_product_field(top) {
            return Self::Flat(ProductFields::from_object(top));
        }
        for envelope in ENVELOPE_KEYS {
            if let Some(inner) = top.get(envelope).and_then(Value::as_object)
                && has_product_field(inner)
            {
                return Self::Wrapped {
                    envelope,
                    fields: ProductFields::from_object(inner),
                };
            }
        }
        Self::Unrecognized
    }

    /// The located fields; empty when unrecognized.
    #[must_use]
    pub fn into_fields(self) -> ProductFields {
        match self {
            Self::Flat(fields) | Self::Wrapped { fields, .. } => fields,
            Self::Unrecognized => ProductFields::default(),
        }
    }
}

fn has_product_field(object: &serde_json::Map<String, Value>) -> bool {
    FIELD_KEYS.iter().any(|key| object.contains_key(*key))
}

/// Client for the AI extraction webhook.
#[derive(Clone)]
pub struct ExtractorClient {
    client: reqwest::Client,
    webhook_url: Url,
}

impl ExtractorClient {
    /// Create a new webhook client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            webhook_url: config.webhook_url.clone(),
        })
    }

    /// Ask the webhook to describe the product in an image.
    ///
    /// Returns the raw reply. A body that is not JSON comes back as a JSON
    /// string, which decodes as [`AiReply::Unrecognized`].
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the webhook answers non-2xx.
    #[instrument(skip(self))]
    pub async fn extract(&self, image_url: &str) -> Result<Value, ExtractorError> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&ExtractRequest { image_url })
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ExtractorError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_flat() {
        let reply = AiReply::decode(&json!({"name": "Ayam Goreng", "price": "25rb"}));
        assert_eq!(
            reply,
            AiReply::Flat(ProductFields {
                name: Some("Ayam Goreng".to_string()),
                description: None,
                price: Some(PriceInput::Text("25rb".to_string())),
            })
        );
    }

    #[test]
    fn test_decode_envelope_order() {
        let reply = AiReply::decode(&json!({
            "status": "ok",
            "output": {"name": "From output"},
            "result": {"name": "From result", "price": 15000},
        }));
        match reply {
            AiReply::Wrapped { envelope, fields } => {
                assert_eq!(envelope, "result");
                assert_eq!(fields.name.as_deref(), Some("From result"));
                assert_eq!(fields.price, Some(PriceInput::Number(15000.0)));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_decode_top_level_wins() {
        let reply = AiReply::decode(&json!({"price": 1, "data": {"name": "Inner"}}));
        assert!(matches!(reply, AiReply::Flat(_)));
    }

    #[test]
    fn test_decode_unrecognized() {
        assert_eq!(AiReply::decode(&json!({"data": "nope"})), AiReply::Unrecognized);
        assert_eq!(AiReply::decode(&json!([{"name": "x"}])), AiReply::Unrecognized);
        assert_eq!(AiReply::decode(&json!("plain text")), AiReply::Unrecognized);
        assert_eq!(AiReply::Unrecognized.into_fields(), ProductFields::default());
    }

    #[test]
    fn test_null_price_is_absent() {
        let fields = AiReply::decode(&json!({"name": "Es Teh", "price": null})).into_fields();
        assert_eq!(fields.price, None);
    }

    #[test]
    fn test_trimmed_name() {
        let fields = ProductFields {
            name: Some("   ".to_string()),
            ..ProductFields::default()
        };
        assert_eq!(fields.trimmed_name(), None);

        let fields = ProductFields {
            name: Some("  Sate Ayam ".to_string()),
            ..ProductFields::default()
        };
        assert_eq!(fields.trimmed_name(), Some("Sate Ayam"));
    }
}
