//! # orchard-core: Pure Business Logic for the Orchard Store
//!
//! This crate is the heart of the store backend. It contains all business
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Orchard Store Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP / API layer (external)                     │   │
//! │  │    place_order, addresses, catalog, admin fulfillment          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orchard-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ effective │  │   rules   │  │   │
//! │  │   │   Order   │  │  Quantity │  │   price   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  orchard-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Address, etc.)
//! - [`money`] - Fixed-point `Money` (paise) and `Quantity` (grams) types
//! - [`error`] - Domain error types
//! - [`pricing`] - Effective-price policy and reservation preconditions
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Arithmetic**: Prices are paise (i64), weights are grams (i64);
//!    floats never touch money or stock
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Quantity};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Regions the store delivers to, used as the default allow-list when the
/// `delivery_zones` setting has never been configured.
///
/// Matching against this list is case-insensitive.
pub const DELIVERY_ZONES: &[&str] = &["Tamil Nadu", "Pondicherry", "Puducherry", "Karnataka"];

/// Settings key for the season gate. Orders are accepted only while the
/// stored value is "true" (case-insensitive). Missing means inactive.
pub const SETTING_SEASON_ACTIVE: &str = "season_active";

/// Settings key for the storefront banner text.
pub const SETTING_SEASON_BANNER: &str = "season_banner_text";

/// Settings key for the delivery-zone allow-list, stored as a comma-separated
/// list of region names.
pub const SETTING_DELIVERY_ZONES: &str = "delivery_zones";

/// Default banner text seeded when none has been configured.
pub const DEFAULT_SEASON_BANNER: &str = "Mango Season 2026 is LIVE!";

/// Maximum lines allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the placement transaction bounded.
pub const MAX_ORDER_LINES: usize = 50;
