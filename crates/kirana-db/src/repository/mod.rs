//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes current_stock                             │
//! │                                                                         │
//! │  SaleRepository::create_sale ─────┐                                    │
//! │  SaleRepository::cancel_sale ─────┼──► stock::apply_stock_delta        │
//! │  StockLedgerRepository::* ────────┤       + stock::append_movement     │
//! │  ProductRepository::insert ───────┘       (same transaction)           │
//! │                                                                         │
//! │  Nothing else updates products.current_stock. Every change leaves a    │
//! │  stock_movements row, so the ledger replays to the counter.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product lookup, creation, low stock
//! - [`SaleRepository`](sale::SaleRepository) - Sale creation and cancellation
//! - [`StockLedgerRepository`](stock::StockLedgerRepository) - Manual movements, purchase receipts
//! - [`InvoiceSequenceRepository`](invoice::InvoiceSequenceRepository) - Bill number counter

pub mod invoice;
pub mod product;
pub mod sale;
pub mod stock;
