//! Admin product upload.
//!
//! The photo is stored in the public products bucket, the AI webhook is asked
//! to describe it, and the resulting product is inserted.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;
use warung_core::{MinorUnits, NewProduct, Product, derive_name_from_filename, parse_price};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extractor::AiReply;
use crate::state::AppState;
use crate::supabase::PRODUCTS_BUCKET;

/// Multipart field carrying the photo.
const IMAGE_FIELD: &str = "image";

const DEFAULT_EXTENSION: &str = "jpg";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub product: Product,
}

/// An image read from the multipart body.
struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

/// Upload a product photo and create the product the AI describes.
///
/// POST /api/admin/upload
///
/// # Errors
///
/// - 400 when the `image` field is missing or not an image
/// - 413 when the body exceeds the upload limit
/// - 422 when the AI reply yields no usable name or price
/// - 502 when the AI webhook fails
/// - 500 when storage or the database fails
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let image = read_image(multipart?)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file".to_string()))?;

    let storage = state.storage();
    storage.ensure_bucket(PRODUCTS_BUCKET).await?;

    let path = format!("products/{}.{}", Uuid::new_v4(), file_extension(&image.file_name));
    storage
        .upload(PRODUCTS_BUCKET, &path, &image.content_type, image.bytes)
        .await?;
    let image_url = storage.public_url(PRODUCTS_BUCKET, &path)?.to_string();
    add_breadcrumb("upload", "Stored product photo", Some(&[("path", path.as_str())]));

    let raw = state.extractor().extract(&image_url).await?;
    tracing::debug!(payload = %raw, "AI raw payload");

    let fields = AiReply::decode(&raw).into_fields();
    let name = fields
        .trimmed_name()
        .map_or_else(|| derive_name_from_filename(&image.file_name), str::to_owned);
    let price = fields.price.as_ref().and_then(parse_price);
    tracing::info!(%name, price = ?price, "AI parsed values");

    let minor = match price.and_then(MinorUnits::from_major) {
        Some(minor) if !name.is_empty() => minor,
        _ => {
            return Err(AppError::Unprocessable {
                message: "AI extraction returned invalid data".to_string(),
                details: json!({
                    "received": raw,
                    "parsed": { "name": name, "price": price.map_or(Value::Null, decimal_json) },
                }),
            });
        }
    };

    let product = state
        .database()
        .insert_product(&NewProduct {
            name,
            description: fields.description,
            price: minor,
            image_url: Some(image_url),
        })
        .await?;
    tracing::info!(product_id = %product.id, price = %product.price, "Created product");

    Ok(Json(UploadResponse { product }))
}

/// Read the first `image` field, rejecting non-image content types.
async fn read_image(mut multipart: Multipart) -> Result<Option<ImageUpload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = match field.content_type() {
            None | Some("") => DEFAULT_CONTENT_TYPE.to_string(),
            Some(ct) if ct.starts_with("image/") => ct.to_string(),
            Some(ct) => {
                return Err(AppError::BadRequest(format!(
                    "File must be an image, got {ct}"
                )));
            }
        };
        let bytes = field.bytes().await?;

        return Ok(Some(ImageUpload {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// Extension for the stored object: the file name's last extension when it is
/// plain alphanumeric, otherwise `jpg`.
fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| DEFAULT_EXTENSION.to_string(), str::to_ascii_lowercase)
}

/// Render a price as a JSON number (integer when whole).
fn decimal_json(value: Decimal) -> Value {
    if value.fract().is_zero()
        && let Some(whole) = value.to_i64()
    {
        return Value::from(whole);
    }
    value.to_f64().map_or(Value::Null, Value::from)
}
