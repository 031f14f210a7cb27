//! # Stock Ledger Repository
//!
//! The append-only stock movement log and the only code path that writes
//! `products.current_stock`.
//!
//! ## Movement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  record_movement (one transaction)                      │
//! │                                                                         │
//! │  validate request (kirana-core)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET current_stock = current_stock + Δ                 │
//! │   WHERE id = ? AND is_active = 1 [AND current_stock + Δ >= 0]          │
//! │   RETURNING current_stock, ...        ← first statement is a write     │
//! │       │                                                                 │
//! │       ├── no row? → ProductNotFound or InsufficientStock (rollback)    │
//! │       ▼                                                                 │
//! │  INSERT INTO stock_movements (..., stock_after)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The floor check is part of the UPDATE's WHERE clause, so the comparison
//! and the decrement are one atomic step. No code here reads stock, compares
//! in Rust, then writes.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use kirana_core::validation::{validate_purchase_receipt, validate_record_movement};
use kirana_core::{
    ledger, CoreError, MovementOutcome, MovementReference, MovementType, PurchaseOrderReceipt,
    Quantity, RecordMovementRequest, StockMovement, TaxRate,
};

use crate::error::{DbError, DbResult};

const MOVEMENT_COLUMNS: &str = r#"
    id, product_id, shop_id, movement_type, quantity, stock_after,
    reference_type, reference_number, batch_number, expiry_date,
    notes, actor, created_at
"#;

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Which guards an atomic stock update enforces.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DeltaRule<'a> {
    /// Active product only, never below zero, optionally scoped to a shop.
    /// Used by sales and `OUT` movements.
    Checked { shop_id: Option<&'a str> },
    /// Active product of the given shop, no floor. Used by purchase receipts,
    /// which may land on stock an adjustment left negative.
    Scoped { shop_id: &'a str },
    /// Active product only, no floor. Used by `IN` and `ADJUSTMENT`.
    Unchecked,
    /// Any product, no floor. Used to put back stock a sale took, even if
    /// the product has since been deactivated.
    Restore,
}

impl DeltaRule<'_> {
    fn enforces_floor(&self) -> bool {
        matches!(self, DeltaRule::Checked { .. })
    }

    fn active_only(&self) -> bool {
        !matches!(self, DeltaRule::Restore)
    }

    fn shop_id(&self) -> Option<&str> {
        match self {
            DeltaRule::Checked { shop_id } => *shop_id,
            DeltaRule::Scoped { shop_id } => Some(shop_id),
            DeltaRule::Unchecked | DeltaRule::Restore => None,
        }
    }
}

/// Product fields returned by an atomic stock update.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct StockUpdate {
    pub stock_after: Quantity,
    pub shop_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub tax_rate_bps: Option<TaxRate>,
}

#[derive(Debug, FromRow)]
struct StockSnapshot {
    current_stock: Quantity,
    name: String,
    is_active: bool,
    shop_id: String,
}

/// Applies `delta` to a product's stock in one conditional UPDATE.
///
/// ## Errors
/// - [`CoreError::ProductNotFound`] - missing, inactive (unless restoring),
///   or belongs to another shop
/// - [`CoreError::InsufficientStock`] - a checked update would go negative
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: Quantity,
    rule: DeltaRule<'_>,
    now: DateTime<Utc>,
) -> DbResult<StockUpdate> {
    let updated: Option<StockUpdate> = sqlx::query_as(
        r#"
        UPDATE products
        SET current_stock = current_stock + ?1,
            updated_at = ?2
        WHERE id = ?3
          AND (?4 = 0 OR is_active = 1)
          AND (?5 = 0 OR current_stock + ?1 >= 0)
          AND (?6 IS NULL OR shop_id = ?6)
        RETURNING current_stock AS stock_after, shop_id, name, sku, tax_rate_bps
        "#,
    )
    .bind(delta)
    .bind(now)
    .bind(product_id)
    .bind(rule.active_only())
    .bind(rule.enforces_floor())
    .bind(rule.shop_id())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(update) = updated {
        debug!(
            product_id = %product_id,
            delta = %delta,
            stock_after = %update.stock_after,
            "Stock updated"
        );
        return Ok(update);
    }

    // Nothing matched: the write lock is already held, so this read sees the
    // same row the UPDATE did.
    let current: Option<StockSnapshot> = sqlx::query_as(
        "SELECT current_stock, name, is_active, shop_id FROM products WHERE id = ?1",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let err = match current {
        Some(p)
            if (!rule.active_only() || p.is_active)
                && rule.shop_id().map_or(true, |s| s == p.shop_id) =>
        {
            warn!(
                product_id = %product_id,
                available = %p.current_stock,
                requested = %delta.abs(),
                "Rejected stock decrement"
            );
            CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                name: p.name,
                available: p.current_stock,
                requested: delta.abs(),
            }
        }
        _ => {
            warn!(product_id = %product_id, "Stock update on unknown or inactive product");
            CoreError::ProductNotFound(product_id.to_string())
        }
    };

    Err(err.into())
}

/// Appends one ledger row.
pub(crate) async fn append_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, shop_id, movement_type, quantity, stock_after,
            reference_type, reference_number, batch_number, expiry_date,
            notes, actor, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.shop_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.stock_after)
    .bind(movement.reference_type)
    .bind(&movement.reference_number)
    .bind(&movement.batch_number)
    .bind(movement.expiry_date)
    .bind(&movement.notes)
    .bind(&movement.actor)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Builds a ledger row with the common fields filled in.
pub(crate) fn new_movement(
    product_id: &str,
    update: &StockUpdate,
    movement_type: MovementType,
    quantity: Quantity,
    reference_type: MovementReference,
    now: DateTime<Utc>,
) -> StockMovement {
    StockMovement {
        id: Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        shop_id: update.shop_id.clone(),
        movement_type,
        quantity,
        stock_after: update.stock_after,
        reference_type,
        reference_number: None,
        batch_number: None,
        expiry_date: None,
        notes: None,
        actor: None,
        created_at: now,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the stock ledger.
#[derive(Debug, Clone)]
pub struct StockLedgerRepository {
    pool: SqlitePool,
}

impl StockLedgerRepository {
    /// Creates a new StockLedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedgerRepository { pool }
    }

    /// Records a manual stock movement and updates stock atomically.
    ///
    /// | Type         | Quantity       | Effect                              |
    /// |--------------|----------------|-------------------------------------|
    /// | `IN`         | > 0            | stock += q                          |
    /// | `OUT`        | > 0            | stock -= q, or `InsufficientStock`  |
    /// | `ADJUSTMENT` | != 0, signed   | stock += q, may go negative         |
    pub async fn record_movement(&self, req: &RecordMovementRequest) -> DbResult<MovementOutcome> {
        validate_record_movement(req)?;

        let now = Utc::now();
        let delta = req.movement_type.signed_delta(req.quantity);
        let rule = if req.movement_type.enforces_floor() {
            DeltaRule::Checked { shop_id: None }
        } else {
            DeltaRule::Unchecked
        };

        debug!(
            product_id = %req.product_id,
            movement_type = ?req.movement_type,
            quantity = %req.quantity,
            "Recording stock movement"
        );

        let mut tx = self.pool.begin().await?;

        let update = apply_stock_delta(&mut tx, &req.product_id, delta, rule, now).await?;

        let mut movement = new_movement(
            &req.product_id,
            &update,
            req.movement_type,
            req.quantity,
            MovementReference::Manual,
            now,
        );
        movement.reference_number = req.reference_number.clone();
        movement.batch_number = req.batch_number.clone();
        movement.expiry_date = req.expiry_date;
        movement.notes = req.notes.clone();
        movement.actor = req.actor.clone();

        append_movement(&mut tx, &movement).await?;

        tx.commit().await?;

        info!(
            product_id = %req.product_id,
            movement_id = %movement.id,
            new_stock = %update.stock_after,
            "Stock movement recorded"
        );

        Ok(MovementOutcome {
            new_stock: update.stock_after,
            movement,
        })
    }

    /// Receives a purchase order: one `IN` movement per line, all or nothing.
    ///
    /// The `purchase_receipts` insert is the first write, so a second receipt
    /// of the same reference fails before any stock moves.
    pub async fn receive_purchase_order(
        &self,
        receipt: &PurchaseOrderReceipt,
    ) -> DbResult<Vec<MovementOutcome>> {
        validate_purchase_receipt(receipt)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO purchase_receipts (id, shop_id, reference_number, line_count, actor, received_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&receipt.shop_id)
        .bind(&receipt.reference_number)
        .bind(receipt.lines.len() as i64)
        .bind(&receipt.actor)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &inserted {
            if db_err.is_unique_violation() {
                warn!(reference = %receipt.reference_number, "Purchase order already received");
                return Err(
                    CoreError::PurchaseOrderAlreadyReceived(receipt.reference_number.clone())
                        .into(),
                );
            }
        }
        inserted?;

        let mut outcomes = Vec::with_capacity(receipt.lines.len());

        for line in &receipt.lines {
            let update = apply_stock_delta(
                &mut tx,
                &line.product_id,
                line.quantity,
                DeltaRule::Scoped {
                    shop_id: &receipt.shop_id,
                },
                now,
            )
            .await?;

            let mut movement = new_movement(
                &line.product_id,
                &update,
                MovementType::In,
                line.quantity,
                MovementReference::PurchaseOrder,
                now,
            );
            movement.reference_number = Some(receipt.reference_number.clone());
            movement.batch_number = line.batch_number.clone();
            movement.expiry_date = line.expiry_date;
            movement.actor = receipt.actor.clone();

            append_movement(&mut tx, &movement).await?;

            outcomes.push(MovementOutcome {
                new_stock: update.stock_after,
                movement,
            });
        }

        tx.commit().await?;

        info!(
            shop_id = %receipt.shop_id,
            reference = %receipt.reference_number,
            lines = outcomes.len(),
            "Purchase order received"
        );

        Ok(outcomes)
    }

    /// Lists a product's movements in the order they were applied.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {} FROM stock_movements WHERE product_id = ?1 ORDER BY rowid",
            MOVEMENT_COLUMNS
        );

        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Lists movements that carry a given reference (a bill or PO number).
    pub async fn list_for_reference(
        &self,
        shop_id: &str,
        reference_type: MovementReference,
        reference_number: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {} FROM stock_movements \
             WHERE shop_id = ?1 AND reference_type = ?2 AND reference_number = ?3 \
             ORDER BY rowid",
            MOVEMENT_COLUMNS
        );

        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(shop_id)
            .bind(reference_type)
            .bind(reference_number)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Replays the ledger for a product: the stock it implies.
    ///
    /// Equal to `products.current_stock` for every product; a mismatch means
    /// something wrote stock outside this crate.
    pub async fn replay(&self, product_id: &str) -> DbResult<Quantity> {
        let movements = self.list_for_product(product_id).await?;

        if let Some(idx) = ledger::first_inconsistent_row(&movements) {
            warn!(
                product_id = %product_id,
                movement_id = %movements[idx].id,
                "Ledger stock_after does not match running total"
            );
        }

        Ok(ledger::replay(&movements))
    }

    /// Replays the ledger and compares it with the stored counter.
    pub async fn verify(&self, product_id: &str) -> DbResult<bool> {
        let replayed = self.replay(product_id).await?;

        let current: Option<Quantity> =
            sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        match current {
            Some(current) => Ok(current == replayed),
            None => Err(DbError::not_found("Product", product_id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{memory_db, new_product, seed_product, stock_of, SHOP};
    use kirana_core::{ErrorKind, PurchaseReceiptLine};

    fn movement(product_id: &str, movement_type: MovementType, units: i64) -> RecordMovementRequest {
        RecordMovementRequest::new(product_id, movement_type, Quantity::from_units(units))
    }

    #[tokio::test]
    async fn test_in_and_out() {
        let db = memory_db().await;
        let p = seed_product(&db, "Parle-G 100g", 10, 3).await;

        let out = db
            .stock()
            .record_movement(&movement(&p.id, MovementType::In, 7))
            .await
            .unwrap();
        assert_eq!(out.new_stock, Quantity::from_units(10));
        assert_eq!(out.movement.stock_after, Quantity::from_units(10));
        assert_eq!(out.movement.reference_type, MovementReference::Manual);

        let out = db
            .stock()
            .record_movement(&movement(&p.id, MovementType::Out, 4))
            .await
            .unwrap();
        assert_eq!(out.new_stock, Quantity::from_units(6));
        assert_eq!(stock_of(&db, &p.id).await, Quantity::from_units(6));
    }

    #[tokio::test]
    async fn test_out_beyond_stock_fails_and_changes_nothing() {
        let db = memory_db().await;
        let p = seed_product(&db, "Maggi 70g", 14, 3).await;
        let before = db.stock().list_for_product(&p.id).await.unwrap().len();

        let err = db
            .stock()
            .record_movement(&movement(&p.id, MovementType::Out, 5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, Quantity::from_units(3));
                assert_eq!(requested, Quantity::from_units(5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock_of(&db, &p.id).await, Quantity::from_units(3));
        assert_eq!(db.stock().list_for_product(&p.id).await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_adjustment_may_go_negative() {
        let db = memory_db().await;
        let p = seed_product(&db, "Amul Butter 100g", 56, 3).await;

        let out = db
            .stock()
            .record_movement(&movement(&p.id, MovementType::Adjustment, -5))
            .await
            .unwrap();

        assert_eq!(out.new_stock, Quantity::from_units(-2));
        assert_eq!(out.movement.quantity, Quantity::from_units(-5));
        assert_eq!(stock_of(&db, &p.id).await, Quantity::from_units(-2));
        assert!(db.stock().verify(&p.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_quantities_rejected() {
        let db = memory_db().await;
        let p = seed_product(&db, "Salt 1kg", 20, 3).await;

        for req in [
            movement(&p.id, MovementType::In, 0),
            movement(&p.id, MovementType::Out, -1),
            movement(&p.id, MovementType::Adjustment, 0),
        ] {
            let err = db.stock().record_movement(&req).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(stock_of(&db, &p.id).await, Quantity::from_units(3));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products() {
        let db = memory_db().await;

        let err = db
            .stock()
            .record_movement(&movement("missing", MovementType::In, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let p = seed_product(&db, "Old Stock", 5, 2).await;
        db.products().deactivate(&p.id).await.unwrap();
        let err = db
            .stock()
            .record_movement(&movement(&p.id, MovementType::Adjustment, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_movement_keeps_batch_details() {
        let db = memory_db().await;
        let p = seed_product(&db, "Paracetamol Strip", 30, 0).await;

        let mut req = movement(&p.id, MovementType::In, 10);
        req.batch_number = Some("B-2024-07".into());
        req.expiry_date = chrono::NaiveDate::from_ymd_opt(2026, 7, 31);
        req.notes = Some("counted at opening".into());
        req.actor = Some("staff-1".into());
        db.stock().record_movement(&req).await.unwrap();

        let rows = db.stock().list_for_product(&p.id).await.unwrap();
        let last = rows.last().unwrap();
        assert_eq!(last.batch_number.as_deref(), Some("B-2024-07"));
        assert_eq!(last.expiry_date, chrono::NaiveDate::from_ymd_opt(2026, 7, 31));
        assert_eq!(last.actor.as_deref(), Some("staff-1"));
    }

    fn receipt(reference: &str, lines: Vec<(&str, i64)>) -> PurchaseOrderReceipt {
        PurchaseOrderReceipt {
            shop_id: SHOP.to_string(),
            reference_number: reference.to_string(),
            actor: Some("manager".into()),
            lines: lines
                .into_iter()
                .map(|(id, units)| PurchaseReceiptLine {
                    product_id: id.to_string(),
                    quantity: Quantity::from_units(units),
                    batch_number: None,
                    expiry_date: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_receive_purchase_order() {
        let db = memory_db().await;
        let rice = seed_product(&db, "Basmati Rice 5kg", 450, 2).await;
        let oil = seed_product(&db, "Sunflower Oil 1L", 160, 0).await;

        let outcomes = db
            .stock()
            .receive_purchase_order(&receipt("PO-0042", vec![(&rice.id, 10), (&oil.id, 24)]))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(stock_of(&db, &rice.id).await, Quantity::from_units(12));
        assert_eq!(stock_of(&db, &oil.id).await, Quantity::from_units(24));

        let rows = db
            .stock()
            .list_for_reference(SHOP, MovementReference::PurchaseOrder, "PO-0042")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|m| m.movement_type == MovementType::In));
    }

    #[tokio::test]
    async fn test_purchase_order_received_once() {
        let db = memory_db().await;
        let rice = seed_product(&db, "Basmati Rice 5kg", 450, 0).await;

        db.stock()
            .receive_purchase_order(&receipt("PO-7", vec![(&rice.id, 5)]))
            .await
            .unwrap();

        let err = db
            .stock()
            .receive_purchase_order(&receipt("PO-7", vec![(&rice.id, 5)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::PurchaseOrderAlreadyReceived(_))
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(stock_of(&db, &rice.id).await, Quantity::from_units(5));
    }

    #[tokio::test]
    async fn test_purchase_order_is_all_or_nothing() {
        let db = memory_db().await;
        let rice = seed_product(&db, "Basmati Rice 5kg", 450, 1).await;

        let err = db
            .stock()
            .receive_purchase_order(&receipt("PO-9", vec![(&rice.id, 5), ("missing", 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stock_of(&db, &rice.id).await, Quantity::from_units(1));

        // The failed attempt did not mark the order as received
        db.stock()
            .receive_purchase_order(&receipt("PO-9", vec![(&rice.id, 5)]))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &rice.id).await, Quantity::from_units(6));
    }

    #[tokio::test]
    async fn test_purchase_receipt_on_negative_stock() {
        let db = memory_db().await;
        let p = seed_product(&db, "Toor Dal 1kg", 150, 3).await;

        // Shrinkage recorded after a stock count
        let adj = db
            .stock()
            .record_movement(&movement(&p.id, MovementType::Adjustment, -5))
            .await
            .unwrap();
        assert_eq!(adj.new_stock, Quantity::from_units(-2));

        let outcomes = db
            .stock()
            .receive_purchase_order(&receipt("PO-0100", vec![(&p.id, 1)]))
            .await
            .unwrap();

        assert_eq!(outcomes[0].new_stock, Quantity::from_units(-1));
        assert_eq!(outcomes[0].movement.stock_after, Quantity::from_units(-1));
        assert_eq!(stock_of(&db, &p.id).await, Quantity::from_units(-1));
        assert!(db.stock().verify(&p.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_purchase_receipt_stays_in_shop() {
        let db = memory_db().await;
        let mut other = new_product("Sugar 1kg", 44, 4);
        other.shop_id = "shop-z9y8".to_string();
        let other = db.products().insert(&other).await.unwrap();

        let err = db
            .stock()
            .receive_purchase_order(&receipt("PO-0101", vec![(&other.id, 10)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stock_of(&db, &other.id).await, Quantity::from_units(4));
    }

    #[tokio::test]
    async fn test_replay_matches_current_stock() {
        let db = memory_db().await;
        let p = seed_product(&db, "Tata Tea 250g", 125, 10).await;

        for req in [
            movement(&p.id, MovementType::Out, 4),
            movement(&p.id, MovementType::In, 12),
            movement(&p.id, MovementType::Adjustment, -20),
            movement(&p.id, MovementType::Adjustment, 3),
        ] {
            db.stock().record_movement(&req).await.unwrap();
        }
        // Rejected movement leaves no row behind
        assert!(db
            .stock()
            .record_movement(&movement(&p.id, MovementType::Out, 50))
            .await
            .is_err());

        let current = stock_of(&db, &p.id).await;
        assert_eq!(current, Quantity::from_units(1));
        assert_eq!(db.stock().replay(&p.id).await.unwrap(), current);
        assert!(db.stock().verify(&p.id).await.unwrap());

        let rows = db.stock().list_for_product(&p.id).await.unwrap();
        assert_eq!(rows.first().unwrap().reference_type, MovementReference::Opening);
        assert_eq!(ledger::first_inconsistent_row(&rows), None);
    }
}
