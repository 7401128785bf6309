//! Price normalization for free-form Rupiah text.
//!
//! Product prices extracted by the AI webhook arrive in whatever shape the
//! model produced: a bare number, `"Rp 25.000"`, `"25rb"`, `"25k"`, `"1 jt"`,
//! `"1,5 juta"`, `"2m"`. [`parse_price`] turns any of those into a positive
//! major-unit amount, or `None` when nothing usable is present.
//!
//! Rules, in priority order:
//!
//! 1. Numbers are accepted as-is when finite and positive.
//! 2. `<number> jt|juta|m` multiplies by one million.
//! 3. `<number> rb|k` multiplies by one thousand.
//! 4. Otherwise every non-digit (currency markers, separators, whitespace) is
//!    dropped and the remaining digits are read as an integer.
//!
//! Suffixed numbers accept `.` or `,` as the decimal separator. Only the first
//! match of a scale is considered, and the million scale wins over thousands.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

static MILLION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:[.,][0-9]+)?)\s*(?:jt|juta|m)\b").expect("Invalid regex")
});

static THOUSAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:[.,][0-9]+)?)\s*(?:rb|k)\b").expect("Invalid regex")
});

/// A price as received from an untyped source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// A JSON number.
    Number(f64),
    /// Free-form text.
    Text(String),
    /// Anything else (booleans, objects, arrays). Never yields a price.
    Other(serde_json::Value),
}

impl From<&str> for PriceInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<f64> for PriceInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Normalize a price into a positive major-unit amount.
///
/// Returns `None` when the input carries no positive, finite amount.
#[must_use]
pub fn parse_price(input: &PriceInput) -> Option<Decimal> {
    match input {
        PriceInput::Number(n) => Decimal::from_f64(*n).filter(|d| *d > Decimal::ZERO),
        PriceInput::Text(s) => parse_price_text(s),
        PriceInput::Other(_) => None,
    }
}

/// Normalize a price string into a positive whole major-unit amount.
#[must_use]
pub fn parse_price_text(input: &str) -> Option<Decimal> {
    let s = input.trim().to_lowercase();

    if let Some(amount) = scaled_match(&MILLION_RE, &s, 1_000_000) {
        return Some(amount);
    }
    if let Some(amount) = scaled_match(&THOUSAND_RE, &s, 1_000) {
        return Some(amount);
    }

    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .map(Decimal::from)
}

/// Apply a scale suffix regex to `s`, returning the rounded amount when the
/// first match has a positive numeric part.
fn scaled_match(re: &Regex, s: &str, scale: i64) -> Option<Decimal> {
    let number = re.captures(s)?.get(1)?.as_str().replace(',', ".");
    let base = Decimal::from_str(&number).ok()?;
    if base <= Decimal::ZERO {
        return None;
    }
    let amount = base
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Some(amount.normalize())
}
