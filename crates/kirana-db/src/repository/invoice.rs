//! # Invoice Sequence Repository
//!
//! Per-(shop, business day) counter behind bill numbers.
//!
//! ## Why a Counter Table?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: COUNT(*) of today's sales + 1                                │
//! │     Two counters read 41 at once → both print INV-...-0042             │
//! │                                                                         │
//! │  ✅ CORRECT: one upsert inside the sale transaction                     │
//! │     INSERT ... ON CONFLICT DO UPDATE SET last_seq = last_seq + 1       │
//! │     RETURNING last_seq                                                 │
//! │                                                                         │
//! │  The increment happens under the writer lock, so no two committed      │
//! │  sales share a number; a rolled-back sale rolls its number back too.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use kirana_core::invoice::{business_date, format_bill_number};

use crate::error::DbResult;

/// Advances and returns the sequence for `(shop_id, date)`, starting at 1.
///
/// Must run on the connection of the enclosing write transaction.
pub(crate) async fn next_sequence(
    conn: &mut SqliteConnection,
    shop_id: &str,
    date: NaiveDate,
) -> DbResult<i64> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_sequences (shop_id, business_date, last_seq)
        VALUES (?1, ?2, 1)
        ON CONFLICT (shop_id, business_date)
        DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(shop_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;

    Ok(seq)
}

/// Mints the next bill number for a sale created at `created_at`.
pub(crate) async fn mint_bill_number(
    conn: &mut SqliteConnection,
    shop_id: &str,
    created_at: DateTime<Utc>,
) -> DbResult<String> {
    let date = business_date(created_at);
    let seq = next_sequence(conn, shop_id, date).await?;
    let bill_number = format_bill_number(shop_id, date, seq);

    debug!(shop_id = %shop_id, seq, bill_number = %bill_number, "Minted bill number");
    Ok(bill_number)
}

/// Read access to invoice counters.
#[derive(Debug, Clone)]
pub struct InvoiceSequenceRepository {
    pool: SqlitePool,
}

impl InvoiceSequenceRepository {
    /// Creates a new InvoiceSequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceSequenceRepository { pool }
    }

    /// Last number issued for a shop on a day, 0 if none yet.
    pub async fn last_sequence(&self, shop_id: &str, date: NaiveDate) -> DbResult<i64> {
        let seq: Option<i64> = sqlx::query_scalar(
            "SELECT last_seq FROM invoice_sequences WHERE shop_id = ?1 AND business_date = ?2",
        )
        .bind(shop_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(seq.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{memory_db, SHOP};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_sequence_starts_at_one_and_increments() {
        let db = memory_db().await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        {
            let mut conn = db.pool().acquire().await.unwrap();
            assert_eq!(next_sequence(&mut conn, SHOP, date).await.unwrap(), 1);
            assert_eq!(next_sequence(&mut conn, SHOP, date).await.unwrap(), 2);
            assert_eq!(next_sequence(&mut conn, SHOP, date).await.unwrap(), 3);
        }

        assert_eq!(db.invoices().last_sequence(SHOP, date).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sequences_are_per_shop_and_day() {
        let db = memory_db().await;
        let day1 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        next_sequence(&mut conn, SHOP, day1).await.unwrap();
        next_sequence(&mut conn, SHOP, day1).await.unwrap();

        assert_eq!(next_sequence(&mut conn, SHOP, day2).await.unwrap(), 1);
        assert_eq!(next_sequence(&mut conn, "other-shop", day1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mint_bill_number() {
        let db = memory_db().await;
        let created_at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let first = mint_bill_number(&mut conn, SHOP, created_at).await.unwrap();
        let second = mint_bill_number(&mut conn, SHOP, created_at).await.unwrap();

        assert_eq!(first, "INV-A1B2-20240115-0001");
        assert_eq!(second, "INV-A1B2-20240115-0002");
    }
}
