//! # Domain Types
//!
//! Core domain types for the store backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Address      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  list_price     │   │  total_amount   │   │  customer_id    │       │
//! │  │  sale_price?    │   │  status         │   │  state (zone)   │       │
//! │  │  stock (grams)  │   │  payment_status │   │  is_default     │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns                                  │
//! │                        ┌────────▼────────┐                              │
//! │                        │   OrderLine     │  immutable snapshot of       │
//! │                        │  product_name   │  name and unit price at      │
//! │                        │  unit_price     │  placement time              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status enums serialize as their symbolic names ("CONFIRMED",
//! "OUT_FOR_DELIVERY") in both JSON and the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::{Money, Quantity};

// =============================================================================
// Product
// =============================================================================

/// A mango variety available in the catalog.
///
/// Stock is mutated only by the reservation step of order placement; the
/// `active` flag soft-deletes (historical order lines keep referencing the
/// row, so it is never removed).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the storefront and snapshotted onto order lines.
    pub name: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Regular price per kilogram.
    #[ts(as = "String")]
    pub list_price: Money,

    /// Discounted price per kilogram, if any. Only honored when strictly
    /// below the list price; see [`crate::pricing`].
    #[ts(as = "Option<String>")]
    pub sale_price: Option<Money>,

    /// Current stock on hand.
    #[ts(as = "String")]
    pub stock: Quantity,

    /// Smallest quantity a single order line may request.
    #[ts(as = "String")]
    pub min_order: Quantity,

    /// Whether the product can be ordered (soft delete flag).
    pub active: bool,

    /// Featured/special flag for the storefront.
    pub special: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A product together with its free-form attribute set and derived pricing
/// fields, as presented to the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDetail {
    pub product: Product,
    /// Arbitrary key→value attributes (origin, ripening method, ...).
    pub attributes: HashMap<String, String>,
    /// The price actually charged right now.
    #[ts(as = "String")]
    pub effective_price: Money,
    pub on_sale: bool,
    pub in_stock: bool,
}

/// Input for creating or updating a product.
///
/// On update the attribute set is replaced wholesale; the `active` flag is
/// managed separately so an edit can never accidentally resurrect a
/// soft-deleted product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub list_price: Money,
    #[ts(as = "Option<String>")]
    pub sale_price: Option<Money>,
    #[ts(as = "String")]
    pub stock: Quantity,
    #[ts(as = "String")]
    pub min_order: Quantity,
    #[serde(default)]
    pub special: bool,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
///
/// The order engine only reads `id` and `active`; the remaining fields feed
/// the order aggregate shown to admins.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Deactivated customers cannot place orders.
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Address
// =============================================================================

/// A delivery address owned by a customer.
///
/// ## Invariant
/// At most one of a customer's addresses carries `is_default`, and the first
/// address ever created for a customer is always default regardless of the
/// request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Address {
    pub id: String,
    pub customer_id: String,
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    /// Delivery zone; validated against the configured allow-list on create.
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
}

/// Input for creating an address.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Request to become the default address. The first address for a
    /// customer becomes default even when this is false.
    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// Order Status
// =============================================================================

/// The delivery lifecycle state of an order.
///
/// ## Note on transitions
/// The engine deliberately does NOT enforce a transition table: any status may
/// be set from any status, matching long-standing admin workflows (e.g.
/// correcting a mis-click on a delivered order). The only automatic
/// transition is PENDING/CONFIRMED → SHIPPED when courier info is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    /// New orders start out confirmed, not pending.
    fn default() -> Self {
        OrderStatus::Confirmed
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Whether an order has been paid.
///
/// Defaults to PAID even when no payment reference was supplied (cash-like
/// flows); the engine records externally verified payments, it does not run
/// a gateway protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// ## Invariant
/// `total_amount` equals the sum of all line totals at placement time and is
/// never recomputed, even if referenced products are later repriced.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub address_id: String,
    #[ts(as = "String")]
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Externally verified payment reference, when one was supplied.
    pub payment_reference: Option<String>,
    pub courier_name: Option<String>,
    pub tracking_id: Option<String>,
    /// Placement time; immutable once set.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item in an order.
///
/// Uses the snapshot pattern: the product name and unit price are frozen at
/// placement time, so later catalog renames or reprices cannot corrupt
/// history. `product_id` is nullable defensively in case the product row is
/// ever hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: Option<String>,
    /// Product name at placement time (frozen).
    pub product_name: String,
    /// Ordered weight.
    #[ts(as = "String")]
    pub quantity: Quantity,
    /// Price per kilogram at placement time (frozen).
    #[ts(as = "String")]
    pub unit_price: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Line total = captured unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

// =============================================================================
// Order Aggregate
// =============================================================================

/// Customer projection embedded in an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderCustomer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Address projection embedded in an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// An order together with its customer, address, and line snapshots.
///
/// Every order read returns this fully materialized aggregate in one
/// consistent fetch; there is no lazy loading anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub customer: OrderCustomer,
    pub address: OrderAddress,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Order Request
// =============================================================================

/// A single requested cart line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: String,
    #[ts(as = "String")]
    pub quantity: Quantity,
}

/// A request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    pub address_id: String,
    /// Lines are reserved in the order submitted.
    pub lines: Vec<OrderLineRequest>,
    /// Externally verified payment reference, if the caller already paid.
    #[serde(default)]
    pub payment_reference: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_symbolic_name() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"CONFIRMED\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"OUT_FOR_DELIVERY\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"PAID\""
        );
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Confirmed);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Paid);
    }

    #[test]
    fn test_line_total() {
        let line = OrderLine {
            id: "l1".to_string(),
            order_id: "o1".to_string(),
            product_id: Some("p1".to_string()),
            product_name: "Alphonso".to_string(),
            quantity: Quantity::from_kg(5),
            unit_price: Money::from_rupees(450),
            created_at: Utc::now(),
        };
        assert_eq!(line.line_total(), Money::from_paise(225_000));
    }

    #[test]
    fn test_order_request_deserializes_without_payment_reference() {
        let json = r#"{"address_id":"a1","lines":[{"product_id":"p1","quantity":"5.00"}]}"#;
        let req: OrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.lines.len(), 1);
        assert_eq!(req.lines[0].quantity, Quantity::from_kg(5));
        assert!(req.payment_reference.is_none());
    }
}
