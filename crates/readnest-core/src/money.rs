//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Where Floats Still Appear
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The outside world speaks dollars as floating point:                   │
//! │                                                                         │
//! │    catalog API   saleInfo.retailPrice.amount = 12.99                   │
//! │    row store     orders.total_amount         = 31.05                   │
//! │                                                                         │
//! │  Inside ReadNest everything is integer cents:                           │
//! │                                                                         │
//! │    12.99 ──from_major_f64──► Money(1299) ──as_major_units──► 12.99     │
//! │                                                                         │
//! │  Conversion happens exactly once per boundary crossing.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use readnest_core::money::Money;
//!
//! let price = Money::from_cents(1299);        // $12.99
//! let line = price * 2;                        // $25.98
//! let total = line + Money::from_cents(499);   // + shipping
//! assert_eq!(total.to_string(), "$30.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction never wraps
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use readnest_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit float from an external API into cents.
    ///
    /// Rounds to the nearest cent. Non-finite input becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use readnest_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(12.99).cents(), 1299);
    /// assert_eq!(Money::from_major_f64(15.588).cents(), 1559);
    /// ```
    pub fn from_major_f64(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value as a major-unit float, for external APIs only.
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`
    ///
    /// ## Example
    /// ```rust
    /// use readnest_core::money::Money;
    /// use readnest_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1299); // $12.99
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(800));
    /// // $12.99 × 8% = $1.0392 → $1.04
    /// assert_eq!(tax.cents(), 104);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large carts from overflowing
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Scales the amount by a float factor and rounds to the cent.
    ///
    /// Used by catalog price generation (age adjustments such as ×1.2).
    pub fn scale(&self, factor: f64) -> Money {
        Money((self.0 as f64 * factor).round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.99`.
///
/// Pages that honor a configured currency symbol use
/// `ConfigState::format_currency` instead.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde Adapter
// =============================================================================

/// Serializes `Money` as a major-unit JSON number (`12.99`).
///
/// The row store keeps `total_amount`, `price` and `price_at_purchase` as
/// numeric columns in dollars.
///
/// ```rust,ignore
/// #[serde(with = "readnest_core::money::as_major_units")]
/// pub total_amount: Money,
/// ```
pub mod as_major_units {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_major_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_major_f64(amount))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_f64_rounds_to_cent() {
        assert_eq!(Money::from_major_f64(12.99).cents(), 1299);
        assert_eq!(Money::from_major_f64(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major_f64(f64::NAN).cents(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83
        let amount = Money::from_cents(1000);
        let tax = amount.calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_scale() {
        // Fiction base $12.99 for a brand new release (×1.2)
        assert_eq!(Money::from_cents(1299).scale(1.2).cents(), 1559);
        // Old title (×0.8)
        assert_eq!(Money::from_cents(1299).scale(0.8).cents(), 1039);
    }

    #[test]
    fn test_major_units_serde() {
        #[derive(Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_major_units")]
            total_amount: Money,
        }

        let row: Row = serde_json::from_str(r#"{"total_amount": 31.05}"#).unwrap();
        assert_eq!(row.total_amount.cents(), 3105);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"total_amount":31.05}"#);
    }
}
