//! # Quantity Module
//!
//! Stock and line quantities stored as integer thousandths of a unit.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Counter sells both pieces and loose goods:                             │
//! │                                                                         │
//! │    3 packets of biscuits   →  Quantity(3000)                            │
//! │    1.25 kg of rice         →  Quantity(1250)                            │
//! │    0.5 litre of oil        →  Quantity(500)                             │
//! │                                                                         │
//! │  Sums, comparisons and the ledger replay stay exact integers.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// A quantity of stock in thousandths of a unit.
///
/// Negative values only appear in signed ledger deltas (`ADJUSTMENT`) and in a
/// stock counter that an adjustment drove below zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(type = "number")]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Number of stored steps per whole unit.
    pub const SCALE: i64 = 1000;

    /// Creates a quantity of whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * Self::SCALE)
    }

    /// Creates a quantity from thousandths of a unit.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Returns the stored value in thousandths of a unit.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value, used when a signed delta is stored as a magnitude.
    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }
}

// =============================================================================
// Parsing & Display
// =============================================================================

/// Parses `"10"`, `"1.5"`, `"-2.125"`. At most three decimal places.
impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ValidationError::invalid_format("quantity", reason);

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("must be a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a number"));
        }
        if frac.len() > 3 {
            return Err(invalid("at most 3 decimal places"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("too large"))?
        };
        let frac_milli: i64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<3}", frac)
                .parse()
                .map_err(|_| invalid("must be a number"))?
        };

        let magnitude = whole
            .checked_mul(Self::SCALE)
            .and_then(|m| m.checked_add(frac_milli))
            .ok_or_else(|| invalid("too large"))?;

        Ok(Quantity(if negative { -magnitude } else { magnitude }))
    }
}

/// Whole quantities print without decimals (`10`), fractional ones with
/// trailing zeros trimmed (`1.25`).
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = (self.0 / Self::SCALE).abs();
        let frac = (self.0 % Self::SCALE).abs();

        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let frac = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, whole, frac.trim_end_matches('0'))
        }
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_units(3).to_string(), "3");
        assert_eq!(Quantity::from_milli(1500).to_string(), "1.5");
        assert_eq!(Quantity::from_milli(1250).to_string(), "1.25");
        assert_eq!(Quantity::from_milli(5).to_string(), "0.005");
        assert_eq!(Quantity::from_units(-2).to_string(), "-2");
        assert_eq!(Quantity::from_milli(-500).to_string(), "-0.5");
    }

    #[test]
    fn test_parse() {
        assert_eq!("10".parse::<Quantity>().unwrap(), Quantity::from_units(10));
        assert_eq!("1.5".parse::<Quantity>().unwrap(), Quantity::from_milli(1500));
        assert_eq!("0.125".parse::<Quantity>().unwrap(), Quantity::from_milli(125));
        assert_eq!(".5".parse::<Quantity>().unwrap(), Quantity::from_milli(500));
        assert_eq!("-5".parse::<Quantity>().unwrap(), Quantity::from_units(-5));
        assert_eq!(" 2 ".parse::<Quantity>().unwrap(), Quantity::from_units(2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Quantity>().is_err());
        assert!("abc".parse::<Quantity>().is_err());
        assert!("1.2345".parse::<Quantity>().is_err());
        assert!("1e3".parse::<Quantity>().is_err());
        assert!("1.2.3".parse::<Quantity>().is_err());
        assert!("99999999999999999999".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let stock = Quantity::from_units(3);
        let adjusted = stock + Quantity::from_units(-5);
        assert_eq!(adjusted, Quantity::from_units(-2));
        assert!(adjusted.is_negative());
        assert_eq!(-adjusted, Quantity::from_units(2));
        assert_eq!(adjusted.abs(), Quantity::from_units(2));

        let total: Quantity = [1, 2, 3].into_iter().map(Quantity::from_units).sum();
        assert_eq!(total, Quantity::from_units(6));
    }
}
