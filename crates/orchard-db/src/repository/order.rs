//! # Order Repository
//!
//! Order placement and the delivery lifecycle.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place(customer_id, request)                                            │
//! │                                                                         │
//! │  validate request shape          (pure, orchard-core)                  │
//! │  season gate                     (settings read, OUTSIDE the tx)       │
//! │       │                                                                 │
//! │       ▼  BEGIN ──────────────────────────────────────────────┐         │
//! │       │  resolve customer   ─► NotFound / CustomerInactive   │         │
//! │       │  resolve address    ─► NotFound / Forbidden          │         │
//! │       │  for each line, in submitted order:                  │         │
//! │       │      reserve_stock()  ─► guarded decrement           │         │
//! │       │      price = effective_price(product snapshot)       │         │
//! │       │      total += price × quantity                       │         │
//! │       │  INSERT order (CONFIRMED / PAID) + N lines           │         │
//! │       ▼  COMMIT ─────────────────────────────────────────────┘         │
//! │                                                                         │
//! │  Any failure rolls back the WHOLE transaction: stock decremented for   │
//! │  earlier lines in the same request is restored. All-or-nothing.        │
//! │                                                                         │
//! │  Name and unit price are snapshotted onto each line; later catalog     │
//! │  renames or reprices never change a placed order.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::product::reserve_stock;
use crate::repository::settings::SettingsRepository;
use orchard_core::validation::validate_order_request;
use orchard_core::{
    CoreError, Customer, Money, Order, OrderAddress, OrderCustomer, OrderDetail, OrderLine,
    OrderRequest, OrderStatus, PaymentStatus,
};

/// Header query joining the order to its customer and address projections.
/// One row per order; no lazy loading.
const HEADER_SELECT: &str = r#"
    SELECT
        o.id, o.customer_id, o.address_id,
        o.total_paise AS total_amount,
        o.status, o.payment_status, o.payment_reference,
        o.courier_name, o.tracking_id,
        o.created_at, o.updated_at,
        c.name AS customer_name,
        c.phone AS customer_phone,
        c.email AS customer_email,
        a.full_name AS addr_full_name,
        a.phone AS addr_phone,
        a.address_line AS addr_address_line,
        a.city AS addr_city,
        a.state AS addr_state,
        a.pincode AS addr_pincode
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
    JOIN addresses a ON a.id = o.address_id
"#;

const LINE_COLUMNS: &str = "l.id, l.order_id, l.product_id, l.product_name, \
    l.quantity_grams AS quantity, l.unit_price_paise AS unit_price, l.created_at";

/// Flat row shape for the header join, split into the aggregate's parts.
#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: String,
    customer_id: String,
    address_id: String,
    total_amount: Money,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_reference: Option<String>,
    courier_name: Option<String>,
    tracking_id: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    customer_name: String,
    customer_phone: String,
    customer_email: String,
    addr_full_name: String,
    addr_phone: String,
    addr_address_line: String,
    addr_city: String,
    addr_state: String,
    addr_pincode: String,
}

impl OrderHeaderRow {
    fn into_detail(self, lines: Vec<OrderLine>) -> OrderDetail {
        OrderDetail {
            customer: OrderCustomer {
                id: self.customer_id.clone(),
                name: self.customer_name,
                phone: self.customer_phone,
                email: self.customer_email,
            },
            address: OrderAddress {
                full_name: self.addr_full_name,
                phone: self.addr_phone,
                address_line: self.addr_address_line,
                city: self.addr_city,
                state: self.addr_state,
                pincode: self.addr_pincode,
            },
            order: Order {
                id: self.id,
                customer_id: self.customer_id,
                address_id: self.address_id,
                total_amount: self.total_amount,
                status: self.status,
                payment_status: self.payment_status,
                payment_reference: self.payment_reference,
                courier_name: self.courier_name,
                tracking_id: self.tracking_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            lines,
        }
    }
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for a customer.
    ///
    /// The whole operation is one transaction: every line's stock
    /// reservation and the order/line inserts commit together or not at
    /// all. Lines are processed in the order submitted, each priced at the
    /// product's effective price at that moment.
    pub async fn place(&self, customer_id: &str, request: &OrderRequest) -> StoreResult<OrderDetail> {
        validate_order_request(request)?;

        // The season gate runs before any order data is touched.
        let season_active = SettingsRepository::new(self.pool.clone())
            .is_season_active()
            .await?;
        if !season_active {
            return Err(StoreError::Rule(CoreError::SeasonInactive));
        }

        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, active, created_at, updated_at \
             FROM customers WHERE id = ?1",
        )
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Customer", customer_id))?;

        if !customer.active {
            return Err(StoreError::Rule(CoreError::CustomerInactive {
                id: customer.id,
            }));
        }

        let address_owner: Option<String> =
            sqlx::query_scalar("SELECT customer_id FROM addresses WHERE id = ?1")
                .bind(&request.address_id)
                .fetch_optional(&mut *tx)
                .await?;

        match address_owner {
            None => return Err(StoreError::not_found("Address", &request.address_id)),
            Some(owner) if owner != customer_id => {
                return Err(StoreError::forbidden(
                    "Address does not belong to the customer",
                ));
            }
            Some(_) => {}
        }

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut total = Money::zero();

        // Snapshots accumulated before insert: (line_id, product_id, name, unit_price)
        let mut snapshots = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            let product = reserve_stock(&mut tx, &line.product_id, line.quantity).await?;

            let unit_price = product.effective_price();
            total += unit_price.times(line.quantity);

            snapshots.push((
                Uuid::new_v4().to_string(),
                product.id,
                product.name,
                unit_price,
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, address_id, total_paise,
                status, payment_status, payment_reference,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
        )
        .bind(&order_id)
        .bind(customer_id)
        .bind(&request.address_id)
        .bind(total)
        .bind(OrderStatus::default())
        .bind(PaymentStatus::default())
        .bind(&request.payment_reference)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (request_line, (line_id, product_id, product_name, unit_price)) in
            request.lines.iter().zip(&snapshots)
        {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, product_id, product_name,
                    quantity_grams, unit_price_paise, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(line_id)
            .bind(&order_id)
            .bind(product_id)
            .bind(product_name)
            .bind(request_line.quantity)
            .bind(unit_price)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            customer_id = %customer_id,
            lines = request.lines.len(),
            total = %total,
            "Order placed"
        );

        self.get(&order_id).await
    }

    /// Gets an order aggregate by id.
    pub async fn get(&self, order_id: &str) -> StoreResult<OrderDetail> {
        let sql = format!("{HEADER_SELECT} WHERE o.id = ?1");

        let header = sqlx::query_as::<_, OrderHeaderRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;

        let lines_sql = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines l \
             WHERE l.order_id = ?1 ORDER BY l.created_at, l.rowid"
        );

        let lines = sqlx::query_as::<_, OrderLine>(&lines_sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(header.into_detail(lines))
    }

    /// Lists all orders, newest first, optionally filtered by status.
    pub async fn list_all(&self, status: Option<OrderStatus>) -> StoreResult<Vec<OrderDetail>> {
        let headers_sql = format!(
            "{HEADER_SELECT} WHERE (?1 IS NULL OR o.status = ?1) ORDER BY o.created_at DESC"
        );
        let lines_sql = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines l \
             JOIN orders o ON o.id = l.order_id \
             WHERE (?1 IS NULL OR o.status = ?1) \
             ORDER BY l.created_at, l.rowid"
        );

        self.fetch_list(&headers_sql, &lines_sql, status, None).await
    }

    /// Lists a customer's own orders, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> StoreResult<Vec<OrderDetail>> {
        let headers_sql = format!(
            "{HEADER_SELECT} WHERE (?1 IS NULL OR o.status = ?1) AND o.customer_id = ?2 \
             ORDER BY o.created_at DESC"
        );
        let lines_sql = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines l \
             JOIN orders o ON o.id = l.order_id \
             WHERE (?1 IS NULL OR o.status = ?1) AND o.customer_id = ?2 \
             ORDER BY l.created_at, l.rowid"
        );

        self.fetch_list(&headers_sql, &lines_sql, None, Some(customer_id))
            .await
    }

    /// Lists today's orders (UTC), optionally filtered by status.
    pub async fn list_todays(&self, status: Option<OrderStatus>) -> StoreResult<Vec<OrderDetail>> {
        let headers_sql = format!(
            "{HEADER_SELECT} WHERE (?1 IS NULL OR o.status = ?1) \
             AND date(o.created_at) = date('now') \
             ORDER BY o.created_at DESC"
        );
        let lines_sql = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines l \
             JOIN orders o ON o.id = l.order_id \
             WHERE (?1 IS NULL OR o.status = ?1) \
             AND date(o.created_at) = date('now') \
             ORDER BY l.created_at, l.rowid"
        );

        self.fetch_list(&headers_sql, &lines_sql, status, None).await
    }

    /// Sets an order's status.
    ///
    /// Transitions are deliberately permissive: any status may be set from
    /// any status. Admin workflows rely on being able to correct mistakes
    /// (e.g. a delivered order flipped back to confirmed). Cancellation does
    /// NOT restock reserved quantities.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> StoreResult<OrderDetail> {
        debug!(order_id = %order_id, status = ?status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", order_id));
        }

        self.get(order_id).await
    }

    /// Records courier name and tracking id.
    ///
    /// Side effect: a PENDING or CONFIRMED order auto-advances to SHIPPED.
    /// Orders further along keep their status; the courier fields still
    /// update.
    pub async fn update_courier_info(
        &self,
        order_id: &str,
        courier_name: &str,
        tracking_id: &str,
    ) -> StoreResult<OrderDetail> {
        debug!(order_id = %order_id, courier = %courier_name, "Recording courier info");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                courier_name = ?2,
                tracking_id = ?3,
                status = CASE
                    WHEN status IN ('PENDING', 'CONFIRMED') THEN 'SHIPPED'
                    ELSE status
                END,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(courier_name)
        .bind(tracking_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", order_id));
        }

        self.get(order_id).await
    }

    /// Runs a header + batched-lines query pair and assembles aggregates.
    async fn fetch_list(
        &self,
        headers_sql: &str,
        lines_sql: &str,
        status: Option<OrderStatus>,
        customer_id: Option<&str>,
    ) -> StoreResult<Vec<OrderDetail>> {
        let mut headers_query = sqlx::query_as::<_, OrderHeaderRow>(headers_sql).bind(status);
        let mut lines_query = sqlx::query_as::<_, OrderLine>(lines_sql).bind(status);

        if let Some(customer_id) = customer_id {
            headers_query = headers_query.bind(customer_id);
            lines_query = lines_query.bind(customer_id);
        }

        let headers = headers_query.fetch_all(&self.pool).await?;
        let lines = lines_query.fetch_all(&self.pool).await?;

        let mut by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id.clone()).or_default().push(line);
        }

        Ok(headers
            .into_iter()
            .map(|h| {
                let lines = by_order.remove(&h.id).unwrap_or_default();
                h.into_detail(lines)
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
