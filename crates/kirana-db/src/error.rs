//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (kirana-core)           │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄──── Domain(CoreError)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError::kind() → ErrorKind → caller's message / status code          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_core::{CoreError, ErrorKind, ValidationError};
use thiserror::Error;

/// SQLite primary result code for SQLITE_BUSY.
const SQLITE_BUSY: &str = "5";
/// SQLite primary result code for SQLITE_LOCKED.
const SQLITE_LOCKED: &str = "6";

/// Database operation errors.
///
/// These errors wrap sqlx errors and domain errors raised inside a
/// transaction, so every repository method returns a single error type.
#[derive(Debug, Error)]
pub enum DbError {
    /// A business rule rejected the operation (stock, status, validation).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting duplicate SKU within a shop
    /// - Duplicate bill number (backstop behind the sequence counter)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Another transaction held the write lock past the busy timeout.
    ///
    /// ## When This Occurs
    /// - Two counters commit sales touching the same database at once and
    ///   one waits longer than `busy_timeout`
    ///
    /// Safe to retry.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the caller-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Domain(e) => e.kind(),
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorKind::Validation
            }
            DbError::Conflict(_) | DbError::PoolExhausted => ErrorKind::ConcurrencyConflict,
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            DbError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound           → DbError::NotFound
/// sqlx::Error::Database (BUSY/LOCKED) → DbError::Conflict
/// sqlx::Error::Database (UNIQUE)      → DbError::UniqueViolation
/// sqlx::Error::Database (FK)          → DbError::ForeignKeyViolation
/// sqlx::Error::PoolTimedOut           → DbError::PoolExhausted
/// Other                               → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                // Extended codes (e.g. 517 BUSY_SNAPSHOT) share the low byte
                let primary = db_err
                    .code()
                    .and_then(|c| c.parse::<i32>().ok())
                    .map(|c| (c & 0xff).to_string());

                if matches!(primary.as_deref(), Some(SQLITE_BUSY) | Some(SQLITE_LOCKED))
                    || msg.contains("database is locked")
                {
                    DbError::Conflict(msg.to_string())
                } else if db_err.is_unique_violation() {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kirana_core::Quantity;

    #[test]
    fn test_kind_passes_through_domain_errors() {
        let err: DbError = CoreError::InsufficientStock {
            product_id: "p-1".into(),
            name: "Sugar 1kg".into(),
            available: Quantity::from_units(1),
            requested: Quantity::from_units(2),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(err.as_domain().is_some());
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Sugar 1kg (p-1): available 1, requested 2"
        );
    }

    #[test]
    fn test_validation_converts_to_domain() {
        let err: DbError = ValidationError::required("items").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_infrastructure_kinds() {
        assert_eq!(
            DbError::Conflict("database is locked".into()).kind(),
            ErrorKind::ConcurrencyConflict
        );
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::ConcurrencyConflict);
        assert_eq!(DbError::not_found("Sale", "s-1").kind(), ErrorKind::NotFound);
        assert_eq!(DbError::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_sqlx_row_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
