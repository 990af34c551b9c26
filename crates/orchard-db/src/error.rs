//! # Store Error Types
//!
//! The single error type every repository operation returns, covering the
//! whole failure taxonomy the API layer needs.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error) ──► StoreError (infra variants)            │
//! │  CoreError / ValidationError ──► StoreError (domain variants)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError::kind() ──► ErrorKind                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  API layer maps: NotFound/Forbidden/Validation/BusinessRule → 4xx      │
//! │                  Unexpected → 5xx (message logged, body redactable)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use orchard_core::{CoreError, ValidationError};

/// Coarse classification of a [`StoreError`], used by the API layer to pick a
/// response status without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity id unresolvable.
    NotFound,
    /// Entity exists but the caller does not own it.
    Forbidden,
    /// Malformed or out-of-range input.
    Validation,
    /// A domain rule was broken (inactive product, insufficient stock,
    /// unsupported zone, season inactive, duplicate email, ...).
    BusinessRule,
    /// Anything unanticipated: connection failures, constraint surprises.
    Unexpected,
}

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Entity exists but belongs to a different customer.
    #[error("{0}")]
    Forbidden(String),

    /// Input failed field-level validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A business rule was violated.
    #[error(transparent)]
    Rule(CoreError),

    /// Unique constraint violation (duplicate email, phone, ...).
    #[error("Duplicate {field}: already exists")]
    Duplicate { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Forbidden error with a caller-facing message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        StoreError::Forbidden(message.into())
    }

    /// Classifies the error for response mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Forbidden(_) => ErrorKind::Forbidden,
            StoreError::Validation(_) | StoreError::Rule(CoreError::Validation(_)) => {
                ErrorKind::Validation
            }
            StoreError::Rule(_) | StoreError::Duplicate { .. } => ErrorKind::BusinessRule,
            StoreError::ForeignKeyViolation { .. }
            | StoreError::ConnectionFailed(_)
            | StoreError::MigrationFailed(_)
            | StoreError::QueryFailed(_)
            | StoreError::PoolExhausted
            | StoreError::Internal(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            // Unwrap so field-level failures classify as Validation even when
            // they traveled inside a CoreError.
            CoreError::Validation(v) => StoreError::Validation(v),
            other => StoreError::Rule(other),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint message formats:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::Duplicate { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_core::Quantity;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            StoreError::not_found("Order", "o1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            StoreError::forbidden("Address does not belong to the customer").kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            StoreError::from(CoreError::SeasonInactive).kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            StoreError::Duplicate {
                field: "customers.email".to_string()
            }
            .kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            StoreError::Internal("disk I/O error".to_string()).kind(),
            ErrorKind::Unexpected
        );
    }

    #[test]
    fn test_validation_inside_core_error_classifies_as_validation() {
        let err = CoreError::Validation(ValidationError::Required {
            field: "lines".to_string(),
        });
        assert_eq!(StoreError::from(err).kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_business_rule_message_passes_through() {
        let err = StoreError::from(CoreError::InsufficientStock {
            name: "Alphonso".to_string(),
            available: Quantity::from_kg(5),
            requested: Quantity::from_kg(6),
        });
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Alphonso: available 5.00 kg, requested 6.00 kg"
        );
    }
}
