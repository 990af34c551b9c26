//! # Error Types
//!
//! Domain-specific error types for orchard-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orchard-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  orchard-db errors (separate crate)                                    │
//! │  └── StoreError       - Persistence failures + the full taxonomy       │
//! │                         (NotFound / Forbidden / Validation /           │
//! │                          BusinessRule / Unexpected)                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → API response         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, available stock, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant is a distinct, user-addressable failure: the caller can fix
/// their request (order less, pick another zone, wait for the season) without
/// guessing what went wrong.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The season gate reports ordering disabled.
    ///
    /// Checked before any customer, address, or product lookup.
    #[error("Ordering is disabled: mango season has not started yet")]
    SeasonInactive,

    /// The customer exists but the account has been deactivated.
    #[error("Customer account is deactivated: {id}")]
    CustomerInactive { id: String },

    /// Product exists but has been deactivated (soft-deleted).
    #[error("Product is not available: {name}")]
    ProductInactive { name: String },

    /// Requested quantity is below the product's minimum order.
    ///
    /// ## User Workflow
    /// ```text
    /// Request 2.00 kg of "Alphonso" (minimum 3.00 kg)
    ///      │
    ///      ▼
    /// BelowMinimumOrder { name: "Alphonso", min_order: 3.00 }
    ///      │
    ///      ▼
    /// UI shows: "Minimum order for Alphonso is 3.00 kg"
    /// ```
    #[error("Minimum order for {name} is {min_order} kg")]
    BelowMinimumOrder { name: String, min_order: Quantity },

    /// Not enough stock to cover the requested quantity.
    ///
    /// This is the failure the reservation guard exists for: two concurrent
    /// orders must never both succeed when their combined weight exceeds the
    /// available stock.
    #[error("Insufficient stock for {name}: available {available} kg, requested {requested} kg")]
    InsufficientStock {
        name: String,
        available: Quantity,
        requested: Quantity,
    },

    /// The address state is outside the delivery allow-list.
    ///
    /// The message lists every permitted zone so the caller can correct the
    /// address instead of retrying blindly.
    #[error("Delivery is available only in: {}", zones.join(", "))]
    UnsupportedZone { state: String, zones: Vec<String> },

    /// Order has exceeded the maximum allowed number of lines.
    #[error("Order cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements, before any business
/// logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed decimal amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate email at registration).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
