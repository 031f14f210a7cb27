//! # kirana-db: Database Layer for Kirana POS
//!
//! This crate owns the SQLite database behind the checkout counter and every
//! transaction that touches it: sale creation, sale cancellation, the stock
//! ledger and the invoice counter.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kirana POS Data Flow                             │
//! │                                                                         │
//! │  Checkout screen (create_sale)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kirana-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 0001_initial │  │   │
//! │  │   │ TaxPolicy     │    │ StockLedger   │    │              │  │   │
//! │  │   │               │    │ InvoiceSeq    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           ▲                                                     │   │
//! │  │   ┌───────┴───────┐                                             │   │
//! │  │   │  PosConfig    │  kirana.toml + KIRANA_* environment         │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite Database (WAL mode)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `kirana.toml` loading and environment overrides
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale, stock, invoice)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kirana_db::{Database, PosConfig};
//!
//! let config = PosConfig::load(Some("kirana.toml".as_ref()))?;
//! let db = Database::from_config(&config).await?;
//!
//! let sale = db.sales().create_sale(&request).await?;
//! println!("{} {}", sale.sale.bill_number, sale.sale.grand_total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, PosConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::invoice::InvoiceSequenceRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockLedgerRepository;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber for binaries built on this crate.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kirana_db=trace` - Show trace for the database layer only
/// - Default: INFO, with debug for kirana crates and warnings from sqlx
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kirana_db=debug,kirana_core=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
