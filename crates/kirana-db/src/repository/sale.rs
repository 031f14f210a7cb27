//! # Sale Repository
//!
//! Sale creation and cancellation, each one SQLite transaction.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE  (create_sale, one transaction)                             │
//! │     ├── per line: conditional stock decrement   ← first write          │
//! │     │            resolve GST rate, compute line                        │
//! │     ├── mint bill number (invoice_sequences upsert)                    │
//! │     ├── INSERT sales        { status: PAID }                           │
//! │     ├── INSERT sale_items   (line_no 1..n, snapshots)                  │
//! │     ├── INSERT stock_movements (OUT, SALE, bill number)                │
//! │     └── COMMIT                                                         │
//! │                                                                         │
//! │  2. CANCEL  (cancel_sale, one transaction)                             │
//! │     ├── UPDATE sales SET status = cancelled WHERE status = paid        │
//! │     ├── per item: restore stock                                        │
//! │     ├── INSERT stock_movements (IN, SALE_CANCELLATION)                 │
//! │     └── COMMIT                                                         │
//! │                                                                         │
//! │  PAID ──cancel──► CANCELLED   (terminal, rows are never deleted)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure before COMMIT drops the transaction, which rolls back every
//! decrement, the invoice counter, and all inserted rows.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use kirana_core::tax::calculate_line;
use kirana_core::validation::validate_create_sale;
use kirana_core::{
    CoreError, CreateSaleRequest, MovementReference, MovementType, Sale, SaleItem, SaleStatus,
    SaleTotals, SaleWithItems, TaxPolicy,
};

use crate::error::DbResult;
use crate::repository::invoice::mint_bill_number;
use crate::repository::stock::{apply_stock_delta, append_movement, new_movement, DeltaRule};

const SALE_COLUMNS: &str = r#"
    id, shop_id, bill_number, customer_id, payment_mode, status,
    sub_total, tax_amount, cgst, sgst, igst, grand_total,
    created_by, created_at, updated_at, cancelled_at, cancelled_by
"#;

const ITEM_COLUMNS: &str = r#"
    id, sale_id, line_no, product_id, name_snapshot, sku_snapshot,
    quantity, unit_price, tax_rate_bps,
    line_subtotal, tax_amount, cgst, sgst, igst, line_total, created_at
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    tax_policy: TaxPolicy,
}

impl SaleRepository {
    /// Creates a new SaleRepository using `tax_policy` for lines and products
    /// without a rate of their own.
    pub fn new(pool: SqlitePool, tax_policy: TaxPolicy) -> Self {
        SaleRepository { pool, tax_policy }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a paid sale from a checkout request.
    ///
    /// Either everything commits (header, items, stock decrements, ledger
    /// rows, bill number) or nothing does.
    ///
    /// ## Errors
    /// - `Validation` - empty request, bad quantity, price or rate
    /// - `ProductNotFound` - missing, inactive or another shop's product
    /// - `InsufficientStock` - a line asks for more than is on hand
    /// - `Conflict` - the database stayed locked past the busy timeout
    pub async fn create_sale(&self, req: &CreateSaleRequest) -> DbResult<SaleWithItems> {
        validate_create_sale(req)?;

        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        debug!(
            shop_id = %req.shop_id,
            lines = req.items.len(),
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;

        let mut totals = SaleTotals::default();
        let mut items = Vec::with_capacity(req.items.len());
        let mut movements = Vec::with_capacity(req.items.len());

        for (idx, line) in req.items.iter().enumerate() {
            let update = apply_stock_delta(
                &mut tx,
                &line.product_id,
                -line.quantity,
                DeltaRule::Checked {
                    shop_id: Some(&req.shop_id),
                },
                now,
            )
            .await?;

            let rate = self.tax_policy.resolve(line.tax_rate, update.tax_rate_bps);
            let tax = calculate_line(line.unit_price, line.quantity, Some(rate), &self.tax_policy)?;
            totals.add_line(&tax)?;

            items.push(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                line_no: idx as i64 + 1,
                product_id: line.product_id.clone(),
                name_snapshot: update.name.clone(),
                sku_snapshot: update.sku.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                tax_rate_bps: tax.rate,
                line_subtotal: tax.line_subtotal,
                tax_amount: tax.line_tax,
                cgst: tax.cgst,
                sgst: tax.sgst,
                igst: tax.igst,
                line_total: tax.line_total,
                created_at: now,
            });

            movements.push(new_movement(
                &line.product_id,
                &update,
                MovementType::Out,
                line.quantity,
                MovementReference::Sale,
                now,
            ));
        }

        let bill_number = mint_bill_number(&mut tx, &req.shop_id, now).await?;

        let sale = Sale {
            id: sale_id,
            shop_id: req.shop_id.clone(),
            bill_number: bill_number.clone(),
            customer_id: req.customer_id.clone(),
            payment_mode: req.payment_mode,
            status: SaleStatus::Paid,
            sub_total: totals.sub_total,
            tax_amount: totals.tax_amount,
            cgst: totals.cgst,
            sgst: totals.sgst,
            igst: totals.igst,
            grand_total: totals.grand_total,
            created_by: req.created_by.clone(),
            created_at: now,
            updated_at: now,
            cancelled_at: None,
            cancelled_by: None,
        };

        insert_sale(&mut tx, &sale).await?;
        for item in &items {
            insert_item(&mut tx, item).await?;
        }
        for mut movement in movements {
            movement.reference_number = Some(bill_number.clone());
            movement.actor = req.created_by.clone();
            append_movement(&mut tx, &movement).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            bill_number = %sale.bill_number,
            grand_total = %sale.grand_total,
            lines = items.len(),
            "Sale created"
        );

        Ok(SaleWithItems { sale, items })
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    /// Cancels a paid sale and puts its stock back.
    ///
    /// Restoration ignores whether a product has since been deactivated.
    ///
    /// ## Errors
    /// - `SaleNotFound` - no such sale
    /// - `InvalidSaleStatus` - already cancelled
    pub async fn cancel_sale(&self, sale_id: &str, actor: Option<&str>) -> DbResult<SaleWithItems> {
        let now = Utc::now();

        debug!(sale_id = %sale_id, "Cancelling sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = 'cancelled',
                cancelled_at = ?1,
                cancelled_by = ?2,
                updated_at = ?1
            WHERE id = ?3 AND status = 'paid'
            "#,
        )
        .bind(now)
        .bind(actor)
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let status: Option<SaleStatus> =
                sqlx::query_scalar("SELECT status FROM sales WHERE id = ?1")
                    .bind(sale_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let err = match status {
                Some(current_status) => {
                    warn!(sale_id = %sale_id, status = %current_status, "Sale cannot be cancelled");
                    CoreError::InvalidSaleStatus {
                        sale_id: sale_id.to_string(),
                        current_status,
                    }
                }
                None => CoreError::SaleNotFound(sale_id.to_string()),
            };
            return Err(err.into());
        }

        let sale = fetch_sale(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        let items = fetch_items(&mut tx, sale_id).await?;

        for item in &items {
            let update =
                apply_stock_delta(&mut tx, &item.product_id, item.quantity, DeltaRule::Restore, now)
                    .await?;

            let mut movement = new_movement(
                &item.product_id,
                &update,
                MovementType::In,
                item.quantity,
                MovementReference::SaleCancellation,
                now,
            );
            movement.reference_number = Some(sale.bill_number.clone());
            movement.actor = actor.map(str::to_string);

            append_movement(&mut tx, &movement).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            bill_number = %sale.bill_number,
            lines = items.len(),
            "Sale cancelled"
        );

        Ok(SaleWithItems { sale, items })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Gets a sale by its bill number.
    pub async fn get_by_bill_number(&self, shop_id: &str, bill_number: &str) -> DbResult<Option<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE shop_id = ?1 AND bill_number = ?2",
            SALE_COLUMNS
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(shop_id)
            .bind(bill_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in `line_no` order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut conn, sale_id).await
    }

    /// Gets a sale with its items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let mut conn = self.pool.acquire().await?;

        let Some(sale) = fetch_sale(&mut conn, id).await? else {
            return Ok(None);
        };
        let items = fetch_items(&mut conn, id).await?;

        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Lists a shop's sales created in `[from, to)`, oldest first.
    pub async fn list_between(
        &self,
        shop_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales \
             WHERE shop_id = ?1 AND created_at >= ?2 AND created_at < ?3 \
             ORDER BY created_at, rowid",
            SALE_COLUMNS
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(shop_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, shop_id, bill_number, customer_id, payment_mode, status,
            sub_total, tax_amount, cgst, sgst, igst, grand_total,
            created_by, created_at, updated_at, cancelled_at, cancelled_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, NULL, NULL)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.shop_id)
    .bind(&sale.bill_number)
    .bind(&sale.customer_id)
    .bind(sale.payment_mode)
    .bind(sale.status)
    .bind(sale.sub_total)
    .bind(sale.tax_amount)
    .bind(sale.cgst)
    .bind(sale.sgst)
    .bind(sale.igst)
    .bind(sale.grand_total)
    .bind(&sale.created_by)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, line_no, product_id, name_snapshot, sku_snapshot,
            quantity, unit_price, tax_rate_bps,
            line_subtotal, tax_amount, cgst, sgst, igst, line_total, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(item.line_no)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(&item.sku_snapshot)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.tax_rate_bps)
    .bind(item.line_subtotal)
    .bind(item.tax_amount)
    .bind(item.cgst)
    .bind(item.sgst)
    .bind(item.igst)
    .bind(item.line_total)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn fetch_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);

    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(sale)
}

async fn fetch_items(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let sql = format!(
        "SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY line_no",
        ITEM_COLUMNS
    );

    let items = sqlx::query_as::<_, SaleItem>(&sql)
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================
