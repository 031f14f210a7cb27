//! # Stock Ledger Arithmetic
//!
//! How each movement type changes the stock counter, and how the ledger is
//! replayed to audit `current_stock`.
//!
//! ## Replay Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  row 1  ADJUSTMENT +10 (OPENING)   stock_after 10                       │
//! │  row 2  OUT         3  (SALE)      stock_after  7                       │
//! │  row 3  IN          3  (CANCEL)    stock_after 10                       │
//! │  row 4  ADJUSTMENT -12 (MANUAL)    stock_after -2                       │
//! │                                                                         │
//! │  Σ signed_delta == products.current_stock == last stock_after          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `OUT` refuses to take stock below zero. `ADJUSTMENT` is an unconditional
//! correction (stock counts, shrinkage) and may do so.

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::types::{MovementType, StockMovement};
use crate::validation::ValidationResult;

impl MovementType {
    /// Converts a stored quantity into the delta applied to stock.
    #[inline]
    pub fn signed_delta(&self, quantity: Quantity) -> Quantity {
        match self {
            MovementType::In | MovementType::Adjustment => quantity,
            MovementType::Out => -quantity,
        }
    }

    /// Whether applying this movement must leave stock at or above zero.
    #[inline]
    pub fn enforces_floor(&self) -> bool {
        matches!(self, MovementType::Out)
    }
}

/// Checks the quantity of a movement against its type.
///
/// - `IN` / `OUT`: strictly positive
/// - `ADJUSTMENT`: non-zero, either sign
pub fn validate_movement_quantity(
    movement_type: MovementType,
    quantity: Quantity,
) -> ValidationResult<()> {
    match movement_type {
        MovementType::In | MovementType::Out if !quantity.is_positive() => {
            Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            })
        }
        MovementType::Adjustment if quantity.is_zero() => Err(ValidationError::MustNotBeZero {
            field: "quantity".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Applies a movement to a stock level.
///
/// Returns `None` when an `OUT` would go below zero.
///
/// ```rust
/// use kirana_core::ledger::apply_movement;
/// use kirana_core::quantity::Quantity;
/// use kirana_core::types::MovementType;
///
/// let stock = Quantity::from_units(3);
/// assert_eq!(apply_movement(stock, MovementType::Out, Quantity::from_units(5)), None);
/// assert_eq!(
///     apply_movement(stock, MovementType::Adjustment, Quantity::from_units(-5)),
///     Some(Quantity::from_units(-2))
/// );
/// ```
pub fn apply_movement(
    stock: Quantity,
    movement_type: MovementType,
    quantity: Quantity,
) -> Option<Quantity> {
    let next = stock + movement_type.signed_delta(quantity);
    if movement_type.enforces_floor() && next.is_negative() {
        None
    } else {
        Some(next)
    }
}

/// Sums the signed deltas of `movements`.
pub fn replay<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> Quantity {
    movements
        .into_iter()
        .map(|m| m.movement_type.signed_delta(m.quantity))
        .sum()
}

/// Index of the first row whose `stock_after` disagrees with the running
/// sum, if any. Rows must be in creation order.
pub fn first_inconsistent_row(movements: &[StockMovement]) -> Option<usize> {
    let mut running = Quantity::zero();
    movements.iter().position(|m| {
        running += m.movement_type.signed_delta(m.quantity);
        m.stock_after != running
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovementReference;
    use chrono::Utc;

    fn row(movement_type: MovementType, units: i64, after: i64) -> StockMovement {
        StockMovement {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: "p-1".into(),
            shop_id: "shop-1".into(),
            movement_type,
            quantity: Quantity::from_units(units),
            stock_after: Quantity::from_units(after),
            reference_type: MovementReference::Manual,
            reference_number: None,
            batch_number: None,
            expiry_date: None,
            notes: None,
            actor: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_quantity_rules() {
        let q = Quantity::from_units;
        assert!(validate_movement_quantity(MovementType::In, q(1)).is_ok());
        assert!(validate_movement_quantity(MovementType::In, q(0)).is_err());
        assert!(validate_movement_quantity(MovementType::Out, q(-1)).is_err());
        assert!(validate_movement_quantity(MovementType::Adjustment, q(-5)).is_ok());
        assert_eq!(
            validate_movement_quantity(MovementType::Adjustment, q(0)),
            Err(ValidationError::MustNotBeZero {
                field: "quantity".to_string()
            })
        );
    }

    #[test]
    fn test_out_floor_and_adjustment_asymmetry() {
        let stock = Quantity::from_units(3);
        assert_eq!(
            apply_movement(stock, MovementType::Out, Quantity::from_units(3)),
            Some(Quantity::zero())
        );
        assert_eq!(apply_movement(stock, MovementType::Out, Quantity::from_units(4)), None);
        assert_eq!(
            apply_movement(stock, MovementType::In, Quantity::from_units(4)),
            Some(Quantity::from_units(7))
        );
    }

    #[test]
    fn test_replay_matches_stock_after() {
        let rows = vec![
            row(MovementType::Adjustment, 10, 10),
            row(MovementType::Out, 3, 7),
            row(MovementType::In, 3, 10),
            row(MovementType::Adjustment, -12, -2),
        ];
        assert_eq!(replay(&rows), Quantity::from_units(-2));
        assert_eq!(first_inconsistent_row(&rows), None);
    }

    #[test]
    fn test_detects_drift() {
        let rows = vec![
            row(MovementType::In, 5, 5),
            row(MovementType::Out, 2, 4),
            row(MovementType::In, 1, 5),
        ];
        assert_eq!(first_inconsistent_row(&rows), Some(1));
    }
}
