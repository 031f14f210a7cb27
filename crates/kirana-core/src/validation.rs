//! # Validation Module
//!
//! Input validation for every mutating request.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (checkout screen, API handler)                        │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any transaction opens)                   │
//! │  ├── Required ids, non-empty item lists                                │
//! │  └── Quantity, price and tax rate ranges                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on totals                                       │
//! │  ├── UNIQUE (shop_id, bill_number)                                     │
//! │  └── Immutability triggers                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::validation::{validate_line_quantity, validate_sku};
//! use kirana_core::quantity::Quantity;
//!
//! validate_sku("ATTA-5KG").unwrap();
//! validate_line_quantity(Quantity::from_units(5)).unwrap();
//! ```

use crate::error::ValidationError;
use crate::ledger::validate_movement_quantity;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{
    CreateSaleRequest, NewProduct, PurchaseOrderReceipt, RecordMovementRequest, TaxRate,
};
use crate::{MAX_LINE_QUANTITY_UNITS, MAX_SALE_LINES, MAX_UNIT_PRICE_PAISE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that an identifier is present.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates an optional free-text field against a maximum length.
pub fn validate_max_len(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, numbers, hyphens, underscores
///
/// ```rust
/// use kirana_core::validation::validate_sku;
///
/// assert!(validate_sku("ATTA-5KG").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    validate_required("sku", sku)?;
    validate_max_len("sku", Some(sku), 50)?;

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "sku",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a product name: required, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    validate_required("name", name)?;
    validate_max_len("name", Some(name), 200)
}

/// Validates a UUID string.
///
/// ```rust
/// use kirana_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_required("id", id)?;

    uuid::Uuid::parse_str(id)
        .map_err(|_| ValidationError::invalid_format("id", "must be a valid UUID"))?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity on a sale line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_LINE_QUANTITY_UNITS`
///
/// ## User Workflow
/// ```text
/// Cashier keys quantity: 10000 (meant 10)
///      │
///      ▼
/// validate_line_quantity ← THIS FUNCTION
///      │
///      ├── qty <= 0?     → "quantity must be positive"
///      ├── qty > 99999?  → "quantity must be between ..."
///      └── OK → line goes into create_sale
/// ```
pub fn validate_line_quantity(qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    let max = Quantity::from_units(MAX_LINE_QUANTITY_UNITS);
    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY_UNITS,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit_price".to_string(),
        });
    }
    if price.paise() > MAX_UNIT_PRICE_PAISE {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_PAISE,
        });
    }
    Ok(())
}

/// Validates a tax rate: 0% to 100%.
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.bps() > TaxRate::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: TaxRate::MAX_BPS as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a checkout before a transaction is opened.
pub fn validate_create_sale(req: &CreateSaleRequest) -> ValidationResult<()> {
    validate_required("shop_id", &req.shop_id)?;

    if req.items.is_empty() {
        return Err(ValidationError::required("items"));
    }
    if req.items.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    for item in &req.items {
        validate_required("product_id", &item.product_id)?;
        validate_line_quantity(item.quantity)?;
        validate_price(item.unit_price)?;
        if let Some(rate) = item.tax_rate {
            validate_tax_rate(rate)?;
        }
    }

    Ok(())
}

/// Validates a manual stock movement.
pub fn validate_record_movement(req: &RecordMovementRequest) -> ValidationResult<()> {
    validate_required("product_id", &req.product_id)?;
    validate_movement_quantity(req.movement_type, req.quantity)?;
    validate_max_len("batch_number", req.batch_number.as_deref(), 64)?;
    validate_max_len("reference_number", req.reference_number.as_deref(), 64)?;
    validate_max_len("notes", req.notes.as_deref(), 500)
}

/// Validates a purchase order receipt.
pub fn validate_purchase_receipt(receipt: &PurchaseOrderReceipt) -> ValidationResult<()> {
    validate_required("shop_id", &receipt.shop_id)?;
    validate_required("reference_number", &receipt.reference_number)?;
    validate_max_len("reference_number", Some(receipt.reference_number.as_str()), 64)?;

    if receipt.lines.is_empty() {
        return Err(ValidationError::required("lines"));
    }

    for line in &receipt.lines {
        validate_required("product_id", &line.product_id)?;
        if !line.quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        validate_max_len("batch_number", line.batch_number.as_deref(), 64)?;
    }

    Ok(())
}

/// Validates a new product.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_required("shop_id", &product.shop_id)?;
    validate_product_name(&product.name)?;
    if let Some(sku) = &product.sku {
        validate_sku(sku)?;
    }
    validate_price(product.cost_price)?;
    validate_price(product.selling_price)?;
    if let Some(rate) = product.tax_rate {
        validate_tax_rate(rate)?;
    }
    // Stock may only go negative through a recorded adjustment
    if product.opening_stock.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening_stock".to_string(),
        });
    }
    if product.reorder_level.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "reorder_level".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
