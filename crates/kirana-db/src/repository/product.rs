//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookup by id, SKU or barcode
//! - Creation with an opening-stock ledger row
//! - Low-stock listing
//! - Soft delete
//!
//! ## Opening Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(NewProduct { opening_stock: 24, .. })                          │
//! │       │                                                                 │
//! │       ▼  one transaction                                                │
//! │  INSERT INTO products (current_stock = 24)                             │
//! │  INSERT INTO stock_movements (ADJUSTMENT +24, OPENING, stock_after 24) │
//! │                                                                         │
//! │  A product created with zero stock has no ledger rows until its first  │
//! │  movement. Either way replay(product) == current_stock.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is never written here after creation. Every later change goes
//! through the stock ledger or the sale repository.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use kirana_core::validation::validate_new_product;
use kirana_core::{MovementReference, MovementType, NewProduct, Product};

use crate::error::{DbError, DbResult};
use crate::repository::stock::{append_movement, new_movement, StockUpdate};

const PRODUCT_COLUMNS: &str = r#"
    id, shop_id, name, sku, barcode, quantity_type,
    cost_price, selling_price, tax_rate_bps,
    current_stock, reorder_level, is_active,
    created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.insert(&new_product).await?;
/// let found = repo.get_by_sku("shop-1", "ATTA-5KG").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID, active or not.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product by SKU within a shop.
    pub async fn get_by_sku(&self, shop_id: &str, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE shop_id = ?1 AND sku = ?2 AND is_active = 1",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product by barcode within a shop.
    ///
    /// Used by the scanner at the counter.
    pub async fn get_by_barcode(&self, shop_id: &str, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE shop_id = ?1 AND barcode = ?2 AND is_active = 1 LIMIT 1",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists a shop's active products by name.
    pub async fn list_active(&self, shop_id: &str, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE shop_id = ?1 AND is_active = 1 ORDER BY name LIMIT ?2",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active products at or below their reorder level, lowest first.
    pub async fn list_low_stock(&self, shop_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products \
             WHERE shop_id = ?1 AND is_active = 1 AND current_stock <= reorder_level \
             ORDER BY current_stock, name",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(shop_id = %shop_id, count = products.len(), "Low stock products");
        Ok(products)
    }

    /// Creates a product, recording any opening stock in the ledger.
    ///
    /// ## Errors
    /// - `Domain(Validation)` - bad name, SKU, price or tax rate
    /// - `UniqueViolation` - SKU already used in this shop
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        validate_new_product(new)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            shop_id: new.shop_id.clone(),
            name: new.name.trim().to_string(),
            sku: new.sku.as_deref().map(|s| s.trim().to_string()),
            barcode: new.barcode.clone(),
            quantity_type: new.quantity_type,
            cost_price: new.cost_price,
            selling_price: new.selling_price,
            tax_rate_bps: new.tax_rate,
            current_stock: new.opening_stock,
            reorder_level: new.reorder_level,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, shop_id, name, sku, barcode, quantity_type,
                cost_price, selling_price, tax_rate_bps,
                current_stock, reorder_level, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.shop_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.quantity_type)
        .bind(product.cost_price)
        .bind(product.selling_price)
        .bind(product.tax_rate_bps)
        .bind(product.current_stock)
        .bind(product.reorder_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        if !product.current_stock.is_zero() {
            let update = StockUpdate {
                stock_after: product.current_stock,
                shop_id: product.shop_id.clone(),
                name: product.name.clone(),
                sku: product.sku.clone(),
                tax_rate_bps: product.tax_rate_bps,
            };
            let movement = new_movement(
                &product.id,
                &update,
                MovementType::Adjustment,
                product.current_stock,
                MovementReference::Opening,
                now,
            );
            append_movement(&mut tx, &movement).await?;
        }

        tx.commit().await?;

        info!(
            product_id = %product.id,
            name = %product.name,
            opening_stock = %product.current_stock,
            "Product created"
        );

        Ok(product)
    }

    /// Soft-deletes a product.
    ///
    /// Past sale items keep referring to it; new sales and movements treat
    /// it as not found. Cancelling an old sale still restores its stock.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?1 WHERE id = ?2 AND is_active = 1",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deactivated");
        Ok(())
    }

    /// Counts active products in a shop.
    pub async fn count(&self, shop_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE shop_id = ?1 AND is_active = 1",
        )
        .bind(shop_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{memory_db, new_product, seed_product, SHOP};
    use kirana_core::{ErrorKind, Money, Quantity, QuantityType, TaxRate};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = memory_db().await;

        let mut new = new_product("  Aashirvaad Atta 5kg ", 265, 12);
        new.sku = Some("ATTA-5KG".into());
        new.barcode = Some("8901725133979".into());
        new.quantity_type = QuantityType::Pack;
        new.tax_rate = Some(TaxRate::from_bps(500));
        let created = db.products().insert(&new).await.unwrap();

        assert_eq!(created.name, "Aashirvaad Atta 5kg");
        assert_eq!(created.current_stock, Quantity::from_units(12));

        let found = db.products().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(found.name, created.name);
        assert_eq!(found.quantity_type, QuantityType::Pack);
        assert_eq!(found.selling_price, Money::from_major(265));
        assert_eq!(found.tax_rate_bps, Some(TaxRate::from_bps(500)));
        assert!(found.is_active);

        let by_sku = db.products().get_by_sku(SHOP, "ATTA-5KG").await.unwrap();
        assert_eq!(by_sku.map(|p| p.id), Some(created.id.clone()));

        let by_barcode = db
            .products()
            .get_by_barcode(SHOP, "8901725133979")
            .await
            .unwrap();
        assert_eq!(by_barcode.map(|p| p.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = memory_db().await;
        assert!(db.products().get_by_id("nope").await.unwrap().is_none());
        assert!(db.products().get_by_sku(SHOP, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_opening_stock_written_to_ledger() {
        let db = memory_db().await;
        let stocked = seed_product(&db, "Surf Excel 1kg", 140, 24).await;
        let empty = seed_product(&db, "Vim Bar", 10, 0).await;

        let rows = db.stock().list_for_product(&stocked.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movement_type, MovementType::Adjustment);
        assert_eq!(rows[0].reference_type, MovementReference::Opening);
        assert_eq!(rows[0].quantity, Quantity::from_units(24));
        assert_eq!(rows[0].stock_after, Quantity::from_units(24));

        assert!(db.stock().list_for_product(&empty.id).await.unwrap().is_empty());
        assert_eq!(db.stock().replay(&empty.id).await.unwrap(), Quantity::zero());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = memory_db().await;

        let mut first = new_product("Toor Dal 1kg", 150, 5);
        first.sku = Some("DAL-TOOR-1KG".into());
        db.products().insert(&first).await.unwrap();

        let mut second = new_product("Toor Dal 1kg (new)", 155, 5);
        second.sku = Some("DAL-TOOR-1KG".into());
        let err = db.products().insert(&second).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(db.products().count(SHOP).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_product_rejected() {
        let db = memory_db().await;

        let mut bad = new_product("", 10, 0);
        let err = db.products().insert(&bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        bad.name = "Sugar 1kg".into();
        bad.selling_price = Money::from_paise(-1);
        let err = db.products().insert(&bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_negative_opening_stock_rejected() {
        let db = memory_db().await;

        let err = db
            .products()
            .insert(&new_product("Mustard Oil 1L", 180, -1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(db.products().count(SHOP).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let db = memory_db().await;

        let mut low = new_product("Eggs (tray)", 180, 2);
        low.reorder_level = Quantity::from_units(5);
        let low = db.products().insert(&low).await.unwrap();

        let mut fine = new_product("Bread", 40, 20);
        fine.reorder_level = Quantity::from_units(5);
        db.products().insert(&fine).await.unwrap();

        let listed = db.products().list_low_stock(SHOP).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, low.id);
        assert!(listed[0].is_low_stock());
    }

    #[tokio::test]
    async fn test_deactivate() {
        let db = memory_db().await;
        let p = seed_product(&db, "Discontinued Soap", 25, 3).await;

        db.products().deactivate(&p.id).await.unwrap();

        let found = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert!(!found.is_active);
        assert_eq!(db.products().count(SHOP).await.unwrap(), 0);
        assert!(db.products().list_active(SHOP, 10).await.unwrap().is_empty());

        // Second deactivation finds nothing active
        let err = db.products().deactivate(&p.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
