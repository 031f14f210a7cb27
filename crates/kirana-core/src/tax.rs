//! # Tax Calculator
//!
//! GST computation for sale lines and sale totals.
//!
//! ## Line Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price × quantity ──round──► line_subtotal                        │
//! │                                        │                                │
//! │                        × rate ──round──► line_tax                       │
//! │                                        │                                │
//! │                     ┌──────────────────┼──────────────────┐             │
//! │                     ▼                  ▼                  ▼             │
//! │        cgst = tax - tax/2       sgst = tax/2          igst = 0          │
//! │                                                                         │
//! │  line_total = line_subtotal + line_tax                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are intra-state: the tax is split evenly between the central and
//! state components and IGST is always zero. CGST takes the odd paisa, so
//! `cgst + sgst + igst == line_tax` holds exactly for every line.
//!
//! ## Rate Precedence
//! 1. Rate supplied on the sale line
//! 2. Product's own `tax_rate_bps`
//! 3. Shop default from [`TaxPolicy`] (18% unless configured)

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::TaxRate;
use crate::validation::{validate_price, validate_tax_rate, ValidationResult};
use crate::DEFAULT_TAX_RATE_BPS;

// =============================================================================
// Tax Policy
// =============================================================================

/// Shop-level tax settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Rate applied when neither the line nor the product names one.
    pub default_rate: TaxRate,
}

impl TaxPolicy {
    pub const fn new(default_rate: TaxRate) -> Self {
        Self { default_rate }
    }

    /// Picks the rate for a line: line rate, then product rate, then default.
    pub fn resolve(&self, line_rate: Option<TaxRate>, product_rate: Option<TaxRate>) -> TaxRate {
        line_rate.or(product_rate).unwrap_or(self.default_rate)
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::new(TaxRate::from_bps(DEFAULT_TAX_RATE_BPS))
    }
}

// =============================================================================
// Line Tax
// =============================================================================

/// Tax breakdown of a single sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineTax {
    /// Rate that was applied.
    pub rate: TaxRate,
    pub line_subtotal: Money,
    pub line_tax: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub line_total: Money,
}

/// Computes the GST breakdown for one line.
///
/// `rate` of `None` falls back to the policy default; callers that know the
/// product resolve precedence with [`TaxPolicy::resolve`] first.
///
/// ## Errors
/// - quantity not positive
/// - negative unit price, or above [`crate::MAX_UNIT_PRICE_PAISE`]
/// - a line amount that does not fit in an `i64`
/// - rate above 100%
///
/// ## Example
/// ```rust
/// use kirana_core::money::Money;
/// use kirana_core::quantity::Quantity;
/// use kirana_core::tax::{calculate_line, TaxPolicy};
/// use kirana_core::types::TaxRate;
///
/// // 1.5 kg at 60.00 with 5% GST
/// let line = calculate_line(
///     Money::from_major(60),
///     Quantity::from_milli(1_500),
///     Some(TaxRate::from_bps(500)),
///     &TaxPolicy::default(),
/// )
/// .unwrap();
///
/// assert_eq!(line.line_subtotal.paise(), 9_000);
/// assert_eq!(line.line_tax.paise(), 450);
/// assert_eq!(line.cgst.paise() + line.sgst.paise(), 450);
/// ```
pub fn calculate_line(
    unit_price: Money,
    quantity: Quantity,
    rate: Option<TaxRate>,
    policy: &TaxPolicy,
) -> ValidationResult<LineTax> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    validate_price(unit_price)?;

    let rate = rate.unwrap_or(policy.default_rate);
    validate_tax_rate(rate)?;

    let line_subtotal = unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| too_large("line_subtotal"))?;
    let line_tax = line_subtotal
        .checked_calculate_tax(rate)
        .ok_or_else(|| too_large("line_tax"))?;
    let line_total = line_subtotal
        .checked_add(line_tax)
        .ok_or_else(|| too_large("line_total"))?;
    let (cgst, sgst) = line_tax.split_even();

    Ok(LineTax {
        rate,
        line_subtotal,
        line_tax,
        cgst,
        sgst,
        igst: Money::zero(),
        line_total,
    })
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

fn checked_sum(a: Money, b: Money, field: &str) -> ValidationResult<Money> {
    a.checked_add(b).ok_or_else(|| too_large(field))
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Running totals for a sale header, built only from line results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub sub_total: Money,
    pub tax_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub grand_total: Money,
}

impl SaleTotals {
    /// Adds one line to the totals.
    ///
    /// Leaves the totals untouched and returns `OutOfRange` if any sum
    /// would overflow.
    pub fn add_line(&mut self, line: &LineTax) -> ValidationResult<()> {
        let sub_total = checked_sum(self.sub_total, line.line_subtotal, "sub_total")?;
        let tax_amount = checked_sum(self.tax_amount, line.line_tax, "tax_amount")?;
        let next = SaleTotals {
            sub_total,
            tax_amount,
            cgst: checked_sum(self.cgst, line.cgst, "cgst")?,
            sgst: checked_sum(self.sgst, line.sgst, "sgst")?,
            igst: checked_sum(self.igst, line.igst, "igst")?,
            grand_total: checked_sum(sub_total, tax_amount, "grand_total")?,
        };
        *self = next;
        Ok(())
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a LineTax>) -> ValidationResult<Self> {
        let mut totals = SaleTotals::default();
        for line in lines {
            totals.add_line(line)?;
        }
        Ok(totals)
    }

    /// Checks both header identities.
    pub fn is_balanced(&self) -> bool {
        self.grand_total == self.sub_total + self.tax_amount
            && self.tax_amount == self.cgst + self.sgst + self.igst
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price_paise: i64, qty_milli: i64, bps: Option<u32>) -> LineTax {
        calculate_line(
            Money::from_paise(price_paise),
            Quantity::from_milli(qty_milli),
            bps.map(TaxRate::from_bps),
            &TaxPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_rate_ten_units() {
        let l = line(10_000, 10_000, None);
        assert_eq!(l.rate.bps(), 1800);
        assert_eq!(l.line_subtotal.paise(), 100_000);
        assert_eq!(l.line_tax.paise(), 18_000);
        assert_eq!(l.cgst.paise(), 9_000);
        assert_eq!(l.sgst.paise(), 9_000);
        assert_eq!(l.igst.paise(), 0);
        assert_eq!(l.line_total.paise(), 118_000);
    }

    #[test]
    fn test_odd_paisa_goes_to_cgst() {
        // 5.03 at 18% = 0.9054 → 0.91; split 0.46 + 0.45
        let l = line(503, 1_000, None);
        assert_eq!(l.line_tax.paise(), 91);
        assert_eq!(l.cgst.paise(), 46);
        assert_eq!(l.sgst.paise(), 45);
    }

    #[test]
    fn test_zero_rate_and_free_item() {
        let exempt = line(2_500, 2_000, Some(0));
        assert_eq!(exempt.line_tax, Money::zero());
        assert_eq!(exempt.line_total.paise(), 5_000);

        let free = line(0, 1_000, None);
        assert_eq!(free.line_total, Money::zero());
    }

    #[test]
    fn test_rejects_malformed_input() {
        let policy = TaxPolicy::default();
        let price = Money::from_major(10);

        assert!(calculate_line(price, Quantity::zero(), None, &policy).is_err());
        assert!(calculate_line(price, Quantity::from_units(-1), None, &policy).is_err());
        assert!(calculate_line(Money::from_paise(-1), Quantity::from_units(1), None, &policy).is_err());
        assert!(calculate_line(
            price,
            Quantity::from_units(1),
            Some(TaxRate::from_bps(10_001)),
            &policy
        )
        .is_err());
    }

    #[test]
    fn test_rate_precedence() {
        let policy = TaxPolicy::new(TaxRate::from_bps(1200));
        let line_rate = Some(TaxRate::from_bps(500));
        let product_rate = Some(TaxRate::from_bps(2800));

        assert_eq!(policy.resolve(line_rate, product_rate).bps(), 500);
        assert_eq!(policy.resolve(None, product_rate).bps(), 2800);
        assert_eq!(policy.resolve(None, None).bps(), 1200);
    }

    #[test]
    fn test_totals_stay_balanced() {
        let lines = [
            line(503, 1_000, None),
            line(1_999, 3_000, Some(500)),
            line(8_000, 1_250, Some(1200)),
            line(1, 1, Some(2800)),
        ];
        let totals = SaleTotals::from_lines(&lines).unwrap();

        assert!(totals.is_balanced());
        let subtotal: Money = lines.iter().map(|l| l.line_subtotal).sum();
        let total: Money = lines.iter().map(|l| l.line_total).sum();
        assert_eq!(totals.sub_total, subtotal);
        assert_eq!(totals.grand_total, total);
        assert_eq!(totals.igst, Money::zero());
    }

    #[test]
    fn test_oversized_line_rejected() {
        let policy = TaxPolicy::default();

        let result = calculate_line(
            Money::from_paise(i64::MAX / 2),
            Quantity::from_units(3),
            Some(TaxRate::zero()),
            &policy,
        );
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));

        // Largest accepted price times a quantity that no longer fits
        let result = calculate_line(
            Money::from_paise(crate::MAX_UNIT_PRICE_PAISE),
            Quantity::from_milli(i64::MAX / 1_000),
            None,
            &policy,
        );
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_totals_overflow_rejected() {
        let big = LineTax {
            rate: TaxRate::zero(),
            line_subtotal: Money::from_paise(i64::MAX - 10),
            line_tax: Money::zero(),
            cgst: Money::zero(),
            sgst: Money::zero(),
            igst: Money::zero(),
            line_total: Money::from_paise(i64::MAX - 10),
        };
        let mut totals = SaleTotals::default();
        totals.add_line(&big).unwrap();
        let before = totals;

        assert!(totals.add_line(&big).is_err());
        assert_eq!(totals, before);
    }
}
