//! Product catalogue types.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::MinorUnits;

/// A product as stored in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units.
    pub price: MinorUnits,
    pub image_url: Option<String>,
}

/// A product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units.
    pub price: MinorUnits,
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Demo item inserted when the catalogue is empty, so checkout can be
    /// exercised end-to-end without uploading anything.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            name: "Nasi Goreng Spesial (Demo)".to_string(),
            description: Some("Item demo untuk uji checkout end-to-end tanpa gambar.".to_string()),
            price: MinorUnits::new(25_000 * 100),
            image_url: None,
        }
    }
}

/// Derive a human-readable product name from an uploaded file name.
///
/// Drops the last extension, turns runs of `-`/`_` into spaces, collapses
/// whitespace and capitalizes the first letter of every word:
/// `nasi_goreng-spesial.jpg` becomes `Nasi Goreng Spesial`.
#[must_use]
pub fn derive_name_from_filename(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };

    let spaced: String = stem
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut name = String::with_capacity(collapsed.len());
    let mut prev_is_word = false;
    for c in collapsed.chars() {
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_is_word {
            name.push(c.to_ascii_uppercase());
        } else {
            name.push(c);
        }
        prev_is_word = is_word;
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name_basic() {
        assert_eq!(derive_name_from_filename("ayam-goreng.jpg"), "Ayam Goreng");
        assert_eq!(
            derive_name_from_filename("nasi__goreng--spesial.png"),
            "Nasi Goreng Spesial"
        );
    }

    #[test]
    fn test_derive_name_keeps_inner_dots() {
        assert_eq!(derive_name_from_filename("es.teh.manis.webp"), "Es.Teh.Manis");
    }

    #[test]
    fn test_derive_name_without_extension() {
        assert_eq!(derive_name_from_filename("sate ayam"), "Sate Ayam");
        assert_eq!(derive_name_from_filename(".hidden"), ".Hidden");
        assert_eq!(derive_name_from_filename(""), "");
    }

    #[test]
    fn test_derive_name_collapses_whitespace() {
        assert_eq!(derive_name_from_filename("  bakso   _urat .jpeg"), "Bakso Urat");
    }

    #[test]
    fn test_demo_product_price_in_minor_units() {
        let demo = NewProduct::demo();
        assert_eq!(demo.price.as_i64(), 2_500_000);
        assert!(demo.image_url.is_none());
    }

    #[test]
    fn test_product_deserializes_numeric_id() {
        let product: Product = serde_json::from_str(
            r#"{"id":7,"name":"Es Teh","description":null,"price":500000,"image_url":null}"#,
        )
        .unwrap();
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.price, MinorUnits::new(500_000));
    }
}
