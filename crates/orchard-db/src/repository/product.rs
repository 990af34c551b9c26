//! # Product Repository
//!
//! Catalog management and stock reservation.
//!
//! ## Stock Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Guarded Stock Decrement                                │
//! │                                                                         │
//! │  reserve_stock(conn, product_id, requested)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT product ──► NotFound if absent                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check_reservation() ──► ProductInactive / BelowMinimumOrder /         │
//! │       │                  InsufficientStock (precondition snapshot)     │
//! │       ▼                                                                 │
//! │  UPDATE products SET stock_grams = stock_grams - ?                     │
//! │  WHERE id = ? AND active = 1 AND stock_grams >= ?                      │
//! │       │                                                                 │
//! │       ├── rows_affected = 1 ──► reserved                               │
//! │       └── rows_affected = 0 ──► a concurrent reservation won the race; │
//! │                                 re-read and report the precise failure │
//! │                                                                         │
//! │  Two simultaneous reservations can both pass the precondition check,   │
//! │  but the guarded UPDATE serializes them: only decrements that keep     │
//! │  stock non-negative succeed. The caller's transaction rolls back on    │
//! │  failure, so no oversell and no partial decrement can ever commit.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use orchard_core::pricing::check_reservation;
use orchard_core::validation::validate_product_input;
use orchard_core::{Product, ProductDetail, ProductInput, Quantity};

/// Column list mapping storage names (paise/grams suffixes) onto the domain
/// struct's field names.
const PRODUCT_COLUMNS: &str = "id, name, description, \
    list_price_paise AS list_price, sale_price_paise AS sale_price, \
    stock_grams AS stock, min_order_grams AS min_order, \
    active, special, created_at, updated_at";

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product together with its attribute set.
    pub async fn create(&self, input: &ProductInput) -> StoreResult<Product> {
        validate_product_input(input)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %input.name, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description,
                list_price_paise, sale_price_paise,
                stock_grams, min_order_grams,
                active, special, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9, ?9)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.list_price)
        .bind(input.sale_price)
        .bind(input.stock)
        .bind(input.min_order)
        .bind(input.special)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_attributes(&mut tx, &id, &input.attributes).await?;

        tx.commit().await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", &id))
    }

    /// Gets a product by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product with its attributes and derived pricing fields.
    pub async fn get_detail(&self, id: &str) -> StoreResult<ProductDetail> {
        let product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        let attributes = self.attributes(id).await?;

        Ok(detail(product, attributes))
    }

    /// Gets a product's attribute set.
    pub async fn attributes(&self, product_id: &str) -> StoreResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT attr_key, attr_value FROM product_attributes WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Lists active products in name order, fully materialized for the
    /// storefront (attributes fetched in one batched query, not per row).
    pub async fn list_active(&self) -> StoreResult<Vec<ProductDetail>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE active = 1 ORDER BY name");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT pa.product_id, pa.attr_key, pa.attr_value
            FROM product_attributes pa
            JOIN products p ON p.id = pa.product_id
            WHERE p.active = 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_product: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (product_id, key, value) in rows {
            by_product.entry(product_id).or_default().insert(key, value);
        }

        Ok(products
            .into_iter()
            .map(|p| {
                let attributes = by_product.remove(&p.id).unwrap_or_default();
                detail(p, attributes)
            })
            .collect())
    }

    /// Lists every product, active or not (admin view), newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Case-insensitive name search over active products.
    pub async fn search(&self, query: &str) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE active = 1 AND name LIKE ?1 COLLATE NOCASE ORDER BY name"
        );

        let pattern = format!("%{}%", query.trim());

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Updates a product, replacing its attribute set wholesale.
    ///
    /// The `active` flag is not touched here; it is managed by
    /// [`set_active`](Self::set_active) so an edit can never resurrect a
    /// soft-deleted product.
    pub async fn update(&self, id: &str, input: &ProductInput) -> StoreResult<Product> {
        validate_product_input(input)?;

        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                list_price_paise = ?4,
                sale_price_paise = ?5,
                stock_grams = ?6,
                min_order_grams = ?7,
                special = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.list_price)
        .bind(input.sale_price)
        .bind(input.stock)
        .bind(input.min_order)
        .bind(input.special)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        sqlx::query("DELETE FROM product_attributes WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_attributes(&mut tx, id, &input.attributes).await?;

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    /// Soft-deletes or restores a product.
    pub async fn set_active(&self, id: &str, active: bool) -> StoreResult<()> {
        debug!(id = %id, active = active, "Setting product active flag");

        let result =
            sqlx::query("UPDATE products SET active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Flips the featured/special flag, returning the new value.
    pub async fn toggle_special(&self, id: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE products SET special = 1 - special, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        let special: bool = sqlx::query_scalar("SELECT special FROM products WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(special)
    }

    /// Reserves stock outside of an order (admin corrections, holds).
    ///
    /// Runs in its own transaction; order placement instead calls
    /// [`reserve_stock`] inside the placement transaction.
    pub async fn reserve(&self, product_id: &str, requested: Quantity) -> StoreResult<Product> {
        let mut tx = self.pool.begin().await?;
        let product = reserve_stock(&mut tx, product_id, requested).await?;
        tx.commit().await?;
        Ok(product)
    }
}

/// Builds the storefront projection for a product.
fn detail(product: Product, attributes: HashMap<String, String>) -> ProductDetail {
    let effective_price = product.effective_price();
    let on_sale = product.on_sale();
    let in_stock = product.in_stock();
    ProductDetail {
        product,
        attributes,
        effective_price,
        on_sale,
        in_stock,
    }
}

/// Inserts an attribute set for a product inside an open transaction.
async fn insert_attributes(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: &str,
    attributes: &HashMap<String, String>,
) -> StoreResult<()> {
    for (key, value) in attributes {
        sqlx::query(
            "INSERT INTO product_attributes (product_id, attr_key, attr_value) VALUES (?1, ?2, ?3)",
        )
        .bind(product_id)
        .bind(key)
        .bind(value)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Reserves `requested` stock for a product on an open connection.
///
/// This is the serialization point for the no-oversell guarantee: the
/// decrement only succeeds while it keeps stock non-negative, so two
/// concurrent reservations can never jointly exceed available stock. Called
/// by order placement with its transaction's connection; any error leaves the
/// caller to roll back.
pub(crate) async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    requested: Quantity,
) -> StoreResult<Product> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Product", product_id))?;

    check_reservation(&product, requested)?;

    let result = sqlx::query(
        r#"
        UPDATE products SET
            stock_grams = stock_grams - ?2,
            updated_at = ?3
        WHERE id = ?1 AND active = 1 AND stock_grams >= ?2
        "#,
    )
    .bind(product_id)
    .bind(requested)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // A concurrent reservation changed the row between our read and the
        // guarded write. Re-read so the error reports current state.
        let current = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", product_id))?;

        check_reservation(&current, requested)?;

        return Err(StoreError::Rule(orchard_core::CoreError::InsufficientStock {
            name: current.name,
            available: current.stock,
            requested,
        }));
    }

    debug!(
        product_id = %product_id,
        requested_grams = requested.grams(),
        "Stock reserved"
    );

    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================
