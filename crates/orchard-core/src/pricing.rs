//! # Pricing Policy and Reservation Preconditions
//!
//! The two pure decision points of order placement:
//!
//! - [`effective_price`] - which price a line is charged at
//! - [`check_reservation`] - whether a requested quantity may be reserved
//!
//! ## Why pure functions?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  placeOrder (orchard-db, inside one transaction)                        │
//! │                                                                         │
//! │  for each requested line:                                               │
//! │      product ← catalog read           (I/O)                             │
//! │      check_reservation(product, qty)  (PURE, this module)               │
//! │      effective_price(product)         (PURE, this module)               │
//! │      stock ← stock − qty              (I/O, guarded UPDATE)             │
//! │                                                                         │
//! │  Pricing is evaluated per product at the moment the line is priced,    │
//! │  never cached across requests: admins reprice concurrently with        │
//! │  customers ordering.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::CoreError;
use crate::money::{Money, Quantity};
use crate::types::Product;

/// Returns the price a product is actually sold at: the sale price when one
/// is set and strictly below the list price, otherwise the list price.
///
/// A sale price at or above the list price is ignored rather than rejected,
/// matching catalog behavior: admins park stale sale prices on products all
/// the time.
#[inline]
pub fn effective_price(product: &Product) -> Money {
    match product.sale_price {
        Some(sale) if sale < product.list_price => sale,
        _ => product.list_price,
    }
}

/// Whether the product is currently discounted.
#[inline]
pub fn on_sale(product: &Product) -> bool {
    matches!(product.sale_price, Some(sale) if sale < product.list_price)
}

/// Checks the reservation preconditions for a requested quantity.
///
/// ## Failure conditions (each distinct and user-addressable)
/// - [`CoreError::ProductInactive`] - product is soft-deleted
/// - [`CoreError::BelowMinimumOrder`] - quantity under the product minimum
/// - [`CoreError::InsufficientStock`] - stock cannot cover the request
///
/// This checks against the stock level in the snapshot it is given; the
/// database layer still guards the actual decrement, so a concurrent
/// reservation that slips between read and write cannot oversell.
pub fn check_reservation(product: &Product, requested: Quantity) -> Result<(), CoreError> {
    if !product.active {
        return Err(CoreError::ProductInactive {
            name: product.name.clone(),
        });
    }

    if requested < product.min_order {
        return Err(CoreError::BelowMinimumOrder {
            name: product.name.clone(),
            min_order: product.min_order,
        });
    }

    if product.stock < requested {
        return Err(CoreError::InsufficientStock {
            name: product.name.clone(),
            available: product.stock,
            requested,
        });
    }

    Ok(())
}

impl Product {
    /// The price actually charged right now. See [`effective_price`].
    #[inline]
    pub fn effective_price(&self) -> Money {
        effective_price(self)
    }

    /// Whether the product is currently discounted.
    #[inline]
    pub fn on_sale(&self) -> bool {
        on_sale(self)
    }

    /// "In stock" means at least one minimum-sized order can be served.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock >= self.min_order
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
