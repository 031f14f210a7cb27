//! # kirana-core: Pure Business Logic for the Sale Transaction Core
//!
//! This crate holds every rule of the checkout core that can be expressed
//! without touching a database: money and quantity arithmetic, the GST
//! calculator, invoice number formatting, stock-ledger arithmetic and input
//! validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kirana POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        POS checkout / stock screens (external callers)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CreateSaleRequest, RecordMovement...   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money   │ │   tax   │ │ invoice │ │ ledger │  │   │
//! │  │   │ Product │ │  Money   │ │ LineTax │ │ INV-... │ │ replay │  │   │
//! │  │   │  Sale   │ │ Quantity │ │ Totals  │ │         │ │ deltas │  │   │
//! │  │   └─────────┘ └──────────┘ └─────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kirana-db (Database Layer)                      │   │
//! │  │     SQLite transactions: create sale, cancel sale, ledger       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, StockMovement, ...)
//! - [`money`] - Money type with integer arithmetic (paise, no floating point)
//! - [`quantity`] - Stock quantities in thousandths of a unit
//! - [`tax`] - GST calculator (CGST/SGST/IGST) and sale totals
//! - [`invoice`] - Bill number formatting
//! - [`ledger`] - Stock movement arithmetic and replay
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kirana_core::money::Money;
//! use kirana_core::quantity::Quantity;
//! use kirana_core::tax::{calculate_line, TaxPolicy};
//!
//! // 10 units at 100.00 with the default 18% GST
//! let line = calculate_line(
//!     Money::from_major(100),
//!     Quantity::from_units(10),
//!     None,
//!     &TaxPolicy::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(line.line_subtotal, Money::from_major(1000));
//! assert_eq!(line.line_tax, Money::from_major(180));
//! assert_eq!(line.cgst, Money::from_major(90));
//! assert_eq!(line.sgst, Money::from_major(90));
//! assert_eq!(line.line_total, Money::from_major(1180));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod ledger;
pub mod money;
pub mod quantity;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use tax::{LineTax, SaleTotals, TaxPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default GST rate applied when neither the line nor the product carries one.
///
/// 1800 basis points = 18%. Shops override it through [`TaxPolicy`].
pub const DEFAULT_TAX_RATE_BPS: u32 = 1800;

/// Maximum number of line items in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity on a single sale line, in whole units.
///
/// Guards against typing 10000 instead of 10 at the counter.
pub const MAX_LINE_QUANTITY_UNITS: i64 = 99_999;

/// Maximum unit price in paise (1 crore rupees).
pub const MAX_UNIT_PRICE_PAISE: i64 = 1_000_000_000;
