//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill must satisfy grand_total == sub_total + tax EXACTLY, and        │
//! │  tax == cgst + sgst + igst EXACTLY. Floats cannot promise that.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹1180.00 is stored as 118000 and every sum is exact.                │
//! │    Rounding happens once, at a documented point (half away from 0).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::Money;
//!
//! let price = Money::from_paise(10_050); // 100.50
//! let doubled = price * 2;               // 201.00
//! assert_eq!(doubled.paise(), 20_100);
//! assert_eq!(doubled.to_string(), "201.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::Quantity;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Where Money is Used
/// ```text
/// SaleLineInput.unit_price ──► LineTax.line_subtotal ──► LineTax.line_tax
///                                       │                      │
///                                       ▼                      ▼
///                               SaleTotals.sub_total   SaleTotals.cgst/sgst/igst
///                                       │                      │
///                                       └──────► grand_total ◄─┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(type = "number")]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(100).paise(), 10_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at `rate`, rounding half away from zero.
    ///
    /// Returns `None` if the result does not fit in an `i64`.
    ///
    /// ## Implementation
    /// Integer math only: `(amount * bps ± 5000) / 10000`, widened to i128
    /// and narrowed back with a range check.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    /// use kirana_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_paise(1_000);   // 10.00
    /// let tax = subtotal.checked_calculate_tax(TaxRate::from_bps(1250)); // 12.5%
    /// assert_eq!(tax, Some(Money::from_paise(125)));
    ///
    /// // 0.05 at 5% = 0.0025 → rounds to 0.00
    /// assert_eq!(
    ///     Money::from_paise(5).checked_calculate_tax(TaxRate::from_bps(500)),
    ///     Some(Money::zero())
    /// );
    /// ```
    pub fn checked_calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        narrow(round_div(self.0 as i128 * rate.bps() as i128, 10_000))
    }

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// Returns `None` if the result does not fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    /// use kirana_core::quantity::Quantity;
    ///
    /// // 1.250 kg at 80.00/kg = 100.00
    /// let price = Money::from_major(80);
    /// let qty = Quantity::from_milli(1_250);
    /// assert_eq!(price.checked_multiply_quantity(qty), Some(Money::from_major(100)));
    /// ```
    pub fn checked_multiply_quantity(&self, qty: Quantity) -> Option<Money> {
        narrow(round_div(
            self.0 as i128 * qty.milli() as i128,
            Quantity::SCALE as i128,
        ))
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Splits an amount into two halves that always sum back to `self`.
    ///
    /// The first half receives the odd paisa. Used for the CGST/SGST split.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let (a, b) = Money::from_paise(181).split_even();
    /// assert_eq!((a.paise(), b.paise()), (91, 90));
    /// ```
    pub const fn split_even(&self) -> (Money, Money) {
        let second = self.0 / 2;
        (Money(self.0 - second), Money(second))
    }
}

fn narrow(value: i128) -> Option<Money> {
    i64::try_from(value).ok().map(Money)
}

/// Integer division rounding half away from zero.
pub(crate) fn round_div(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimals and no currency symbol: `1180.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Money::from_paise(1099).paise(), 1099);
        assert_eq!(Money::from_major(10).paise(), 1000);
        assert_eq!(Money::from_major_minor(10, 99).paise(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).paise(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(118_000).to_string(), "1180.00");
        assert_eq!(Money::from_paise(505).to_string(), "5.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_tax_eighteen_percent() {
        let subtotal = Money::from_major(1000);
        let tax = subtotal.checked_calculate_tax(TaxRate::from_bps(1800));
        assert_eq!(tax, Some(Money::from_major(180)));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 0.25 at 18% = 0.045 → 0.05
        assert_eq!(
            Money::from_paise(25).checked_calculate_tax(TaxRate::from_bps(1800)),
            Some(Money::from_paise(5))
        );
        // 0.24 at 18% = 0.0432 → 0.04
        assert_eq!(
            Money::from_paise(24).checked_calculate_tax(TaxRate::from_bps(1800)),
            Some(Money::from_paise(4))
        );
        // Negative amounts mirror positive ones
        assert_eq!(
            Money::from_paise(-25).checked_calculate_tax(TaxRate::from_bps(1800)),
            Some(Money::from_paise(-5))
        );
    }

    #[test]
    fn test_multiply_fractional_quantity() {
        // 0.333 kg at 10.00 = 3.33
        let price = Money::from_major(10);
        assert_eq!(
            price.checked_multiply_quantity(Quantity::from_milli(333)),
            Some(Money::from_paise(333))
        );
        // 0.005 units at 1.00 = 0.005 → 0.01
        assert_eq!(
            Money::from_major(1).checked_multiply_quantity(Quantity::from_milli(5)),
            Some(Money::from_paise(1))
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = Money::from_paise(i64::MAX / 2);
        assert_eq!(huge.checked_multiply_quantity(Quantity::from_units(3)), None);
        assert_eq!(
            Money::from_paise(i64::MAX).checked_calculate_tax(TaxRate::from_bps(10_000)),
            Some(Money::from_paise(i64::MAX))
        );
        assert_eq!(huge.checked_add(huge), Some(Money::from_paise(i64::MAX - 1)));
        assert_eq!(huge.checked_add(Money::from_paise(i64::MAX)), None);
    }

    #[test]
    fn test_typescript_shape_is_number() {
        // Matches the serde wire format: a bare integer
        assert_eq!(Money::inline(), "number");
        assert_eq!(Quantity::inline(), "number");
        assert_eq!(TaxRate::inline(), "number");
    }

    #[test]
    fn test_split_even_is_exact() {
        for paise in [0_i64, 1, 2, 179, 180, 181, 99_999] {
            let (a, b) = Money::from_paise(paise).split_even();
            assert_eq!((a + b).paise(), paise);
            assert!(a.paise() - b.paise() <= 1);
        }
    }
}
