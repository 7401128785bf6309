//! Money amounts in minor currency units.
//!
//! Prices are stored as integers in hundredths of the display currency
//! (`Rp 25.000` is stored as `2_500_000`). The payment provider only accepts
//! whole major units, so conversions in both directions live here.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of minor units in one major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

/// An amount in minor units (hundredths of a Rupiah).
///
/// Amounts produced by this crate are never negative. Amounts received from
/// clients are carried as-is and clamped only when converted to major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw minor-unit value.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw minor-unit value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Convert a major-unit amount to minor units, rounding to the nearest
    /// hundredth.
    ///
    /// Returns `None` for negative amounts or amounts that do not fit in `i64`.
    #[must_use]
    pub fn from_major(major: Decimal) -> Option<Self> {
        if major.is_sign_negative() {
            return None;
        }
        let minor = major
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        minor.to_i64().map(Self)
    }

    /// Convert to whole major units for the payment provider.
    ///
    /// Divides by 100, rounds half up and floors at zero.
    #[must_use]
    pub const fn to_major_rounded(self) -> i64 {
        if self.0 <= 0 {
            return 0;
        }
        let whole = self.0 / MINOR_PER_MAJOR;
        if self.0 % MINOR_PER_MAJOR >= MINOR_PER_MAJOR / 2 {
            whole + 1
        } else {
            whole
        }
    }
}

impl From<i64> for MinorUnits {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl core::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
