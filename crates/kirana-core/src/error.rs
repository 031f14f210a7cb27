//! # Error Types
//!
//! Domain-specific error types for kirana-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kirana-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Malformed or missing input                     │
//! │  └── ErrorKind        - Caller-facing classification                   │
//! │                                                                         │
//! │  kirana-db errors (separate crate)                                     │
//! │  └── DbError          - Wraps CoreError + database failures            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller (HTTP/UI layer)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, sale id, quantities)
//! 3. Errors are enum variants, never String
//! 4. Every error maps to exactly one [`ErrorKind`]

use serde::Serialize;
use thiserror::Error;

use crate::quantity::Quantity;
use crate::types::SaleStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// Caller-facing classification of a failed operation.
///
/// The transport layer (out of scope here) translates these into user-facing
/// messages and status codes. Every mutating operation either commits fully
/// or fails with exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Referenced product or sale does not exist.
    NotFound,
    /// The operation would drive stock negative on a checked path.
    InsufficientStock,
    /// Operation not legal in the current state (e.g. double cancel).
    InvalidState,
    /// A competing transaction held the row; safe to retry.
    ConcurrencyConflict,
    /// Infrastructure failure (connection, migration, corrupt data).
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in database
    /// - Product was deactivated (soft delete)
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete a sale line or an OUT movement.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout line: Basmati Rice 1kg × 5
    ///      │
    ///      ▼
    /// Conditional decrement: available = 3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Basmati Rice 1kg", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, counter shows "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {name} ({product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Sale is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Cancelling a sale that is already cancelled
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: SaleStatus,
    },

    /// A purchase order receipt was already recorded for this reference.
    #[error("Purchase order {0} has already been received")]
    PurchaseOrderAlreadyReceived(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the caller-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::InvalidSaleStatus { .. } | CoreError::PurchaseOrderAlreadyReceived(_) => {
                ErrorKind::InvalidState
            }
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any row is touched, so a validation failure never leaves a
/// transaction behind.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustNotBeZero { field: String },

    /// Invalid format (e.g., invalid UUID, unparseable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            name: "Basmati Rice 1kg".to_string(),
            available: Quantity::from_units(3),
            requested: Quantity::from_units(5),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Basmati Rice 1kg (p-1): available 3, requested 5"
        );
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    }

    #[test]
    fn test_invalid_status_message() {
        let err = CoreError::InvalidSaleStatus {
            sale_id: "s-1".to_string(),
            current_status: SaleStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Sale s-1 is CANCELLED, cannot perform operation"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("shop_id").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
        assert_eq!(core_err.to_string(), "Validation error: shop_id is required");
    }

    #[test]
    fn test_not_found_kinds() {
        assert_eq!(
            CoreError::ProductNotFound("p".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CoreError::SaleNotFound("s".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::PurchaseOrderAlreadyReceived("PO-1".into()).kind(),
            ErrorKind::InvalidState
        );
    }
}
