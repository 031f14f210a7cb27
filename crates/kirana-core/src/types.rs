//! # Domain Types
//!
//! Core domain types of the sale transaction core.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  sale_id (FK)   │       │
//! │  │  sku (business) │   │  bill_number    │   │  line_no        │       │
//! │  │  current_stock  │   │  status         │   │  snapshots      │       │
//! │  │  selling_price  │   │  cgst/sgst/igst │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  StockMovement  │   │   SaleStatus    │   │  MovementType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity       │   │  Paid           │   │  In             │       │
//! │  │  stock_after    │   │  Cancelled      │   │  Out            │       │
//! │  │  reference_type │   └─────────────────┘   │  Adjustment     │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, bill_number) - human-readable, unique within a shop
//!
//! ## Storage Encoding
//! Enum columns are stored lowercase (`paid`, `out`, `purchase_order`); the
//! wire format (serde) is upper case (`PAID`, `OUT`, `PURCHASE_ORDER`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (standard GST slab), 500 bps = 5%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(type = "number")]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The largest legal rate: 100%.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage such as `18.0` or `12.5`.
    ///
    /// Rejects NaN, infinities, negative rates and rates above 100%.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::try_from_percentage(18.0).unwrap().bps(), 1800);
    /// assert!(TaxRate::try_from_percentage(f64::NAN).is_err());
    /// assert!(TaxRate::try_from_percentage(-1.0).is_err());
    /// assert!(TaxRate::try_from_percentage(100.5).is_err());
    /// ```
    pub fn try_from_percentage(pct: f64) -> Result<Self, ValidationError> {
        if !pct.is_finite() {
            return Err(ValidationError::invalid_format("tax_rate", "must be a finite number"));
        }
        if !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "tax_rate".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(TaxRate((pct * 100.0).round() as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate (exempt goods).
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Unit of measure a product is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum QuantityType {
    Piece,
    Kg,
    Gram,
    Litre,
    Ml,
    Box,
    Pack,
    Dozen,
}

impl Default for QuantityType {
    fn default() -> Self {
        QuantityType::Piece
    }
}

/// How the customer paid. A sale has exactly one payment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
    Credit,
}

/// The status of a sale.
///
/// ## State Machine
/// ```text
///   create_sale            cancel_sale
///  ────────────► PAID ─────────────────► CANCELLED (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Sale committed and paid; stock has been decremented.
    Paid,
    /// Sale reversed; stock has been restored. Never changes again.
    Cancelled,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Paid => "PAID",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a stock movement.
///
/// | Type         | Quantity           | Effect on stock          |
/// |--------------|--------------------|--------------------------|
/// | `In`         | positive magnitude | `+ q`                    |
/// | `Out`        | positive magnitude | `- q`, never below zero  |
/// | `Adjustment` | signed, non-zero   | `+ q`, no floor check    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

/// What caused a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementReference {
    /// Entered by staff on the stock screen.
    Manual,
    /// Goods received against a purchase order.
    PurchaseOrder,
    /// Decrement by a POS sale.
    Sale,
    /// Restoration by a sale cancellation.
    SaleCancellation,
    /// Opening stock written when the product was created.
    Opening,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shop this product belongs to.
    pub shop_id: String,

    /// Display name shown to the cashier and on the bill.
    pub name: String,

    /// Stock Keeping Unit, unique within the shop when present.
    pub sku: Option<String>,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    pub quantity_type: QuantityType,

    /// Purchase cost per unit.
    pub cost_price: Money,

    /// Default selling price per unit.
    pub selling_price: Money,

    /// Per-product GST override. `None` falls back to the shop default.
    pub tax_rate_bps: Option<TaxRate>,

    /// Current stock. Mutated only inside kirana-db transactions.
    pub current_stock: Quantity,

    /// Stock at or below this level counts as low stock.
    pub reorder_level: Quantity,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether the product should be reordered.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.reorder_level
    }

    /// Checks if `quantity` can be taken out without going below zero.
    pub fn can_sell(&self, quantity: Quantity) -> bool {
        self.is_active && self.current_stock >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub shop_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    #[serde(default)]
    pub quantity_type: QuantityType,
    pub cost_price: Money,
    pub selling_price: Money,
    pub tax_rate: Option<TaxRate>,
    /// Written to the ledger as an `OPENING` adjustment when non-zero.
    #[serde(default)]
    pub opening_stock: Quantity,
    #[serde(default)]
    pub reorder_level: Quantity,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale (bill) header.
///
/// ## Invariants
/// - `grand_total == sub_total + tax_amount`
/// - `tax_amount == cgst + sgst + igst`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub shop_id: String,
    /// Human-readable invoice number, e.g. `INV-A1B2-20240115-0001`.
    pub bill_number: String,
    pub customer_id: Option<String>,
    pub payment_mode: PaymentMode,
    pub status: SaleStatus,
    pub sub_total: Money,
    pub tax_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub grand_total: Money,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Position in the checkout request, starting at 1.
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: Option<String>,
    pub quantity: Quantity,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// GST rate actually applied to this line.
    pub tax_rate_bps: TaxRate,
    pub line_subtotal: Money,
    pub tax_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub line_total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale header together with its lines in `line_no` order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Sale Requests
// =============================================================================

/// One line of a checkout request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineInput {
    pub product_id: String,
    pub quantity: Quantity,
    /// Price charged per unit (may differ from the catalogue price).
    pub unit_price: Money,
    /// Explicit GST rate for this line; overrides product and shop defaults.
    pub tax_rate: Option<TaxRate>,
}

/// A complete checkout, committed all-or-nothing by `create_sale`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub shop_id: String,
    pub customer_id: Option<String>,
    pub payment_mode: PaymentMode,
    /// Cashier or user that rang up the sale.
    pub created_by: Option<String>,
    pub items: Vec<SaleLineInput>,
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// One row of the append-only stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub shop_id: String,
    pub movement_type: MovementType,
    /// Magnitude for `In`/`Out`, signed for `Adjustment`.
    pub quantity: Quantity,
    /// Product stock immediately after this row was applied.
    pub stock_after: Quantity,
    pub reference_type: MovementReference,
    pub reference_number: Option<String>,
    pub batch_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub actor: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A manual stock movement entered on the stock screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordMovementRequest {
    pub product_id: String,
    pub movement_type: MovementType,
    pub quantity: Quantity,
    pub batch_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub actor: Option<String>,
}

impl RecordMovementRequest {
    /// A bare movement with no batch, reference or notes.
    pub fn new(product_id: impl Into<String>, movement_type: MovementType, quantity: Quantity) -> Self {
        Self {
            product_id: product_id.into(),
            movement_type,
            quantity,
            batch_number: None,
            expiry_date: None,
            reference_number: None,
            notes: None,
            actor: None,
        }
    }
}

/// Result of a committed stock movement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementOutcome {
    pub movement: StockMovement,
    pub new_stock: Quantity,
}

/// One received line of a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseReceiptLine {
    pub product_id: String,
    pub quantity: Quantity,
    pub batch_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
}

/// A purchase order transitioning to "received".
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderReceipt {
    pub shop_id: String,
    /// Purchase order number; a shop can receive each number once.
    pub reference_number: String,
    pub actor: Option<String>,
    pub lines: Vec<PurchaseReceiptLine>,
}

// =============================================================================
// Unit Tests
// =============================================================================
