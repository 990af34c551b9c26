//! # Validation Module
//!
//! Input validation for requests entering the engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API layer (deserialization)                                  │
//! │  ├── Type validation (malformed decimals rejected by serde)            │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - field-level rules                              │
//! │  ├── Required fields, length limits, positive amounts                  │
//! │  └── Runs before any database work                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / foreign key constraints                       │
//! │                                                                         │
//! │  Business rules (stock, zones, season) are NOT validation; they live   │
//! │  in pricing.rs and the repositories and return CoreError variants.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewAddress, OrderRequest, ProductInput};
use crate::MAX_ORDER_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks a required text field: non-blank after trimming, within `max`
/// characters.
fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name (required, at most 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, 200)
}

/// Validates catalog input before create/update.
///
/// ## Rules
/// - name required (max 200)
/// - list price and sale price (when present) strictly positive
/// - stock non-negative, minimum order at least 1.00 kg
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_product_name(&input.name)?;

    if !input.list_price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "list_price".to_string(),
        });
    }

    if let Some(sale) = input.sale_price {
        if !sale.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "sale_price".to_string(),
            });
        }
    }

    if input.stock.grams() < 0 {
        return Err(ValidationError::InvalidFormat {
            field: "stock".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    if input.min_order.grams() < 1_000 {
        return Err(ValidationError::InvalidFormat {
            field: "min_order".to_string(),
            reason: "must be at least 1.00 kg".to_string(),
        });
    }

    Ok(())
}

/// Validates address input before the delivery-zone check runs.
pub fn validate_address(input: &NewAddress) -> ValidationResult<()> {
    require_text("full_name", &input.full_name, 100)?;
    require_text("phone", &input.phone, 20)?;
    require_text("address_line", &input.address_line, 255)?;
    require_text("city", &input.city, 100)?;
    require_text("state", &input.state, 100)?;
    require_text("pincode", &input.pincode, 10)?;
    Ok(())
}

/// Validates an order request's shape: a non-empty, bounded line list with
/// strictly positive quantities.
///
/// Minimum-order and stock checks need the product rows and happen later,
/// inside the placement transaction.
pub fn validate_order_request(request: &OrderRequest) -> ValidationResult<()> {
    require_text("address_id", &request.address_id, 64)?;

    if request.lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if request.lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::TooLong {
            field: "lines".to_string(),
            max: MAX_ORDER_LINES,
        });
    }

    for line in &request.lines {
        require_text("product_id", &line.product_id, 64)?;

        if !line.quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Money, Quantity};
    use crate::types::OrderLineRequest;
    use std::collections::HashMap;

    fn product_input() -> ProductInput {
        ProductInput {
            name: "Alphonso".to_string(),
            description: None,
            list_price: Money::from_rupees(500),
            sale_price: Some(Money::from_rupees(450)),
            stock: Quantity::from_kg(10),
            min_order: Quantity::from_kg(3),
            special: false,
            attributes: HashMap::new(),
        }
    }

    fn new_address() -> NewAddress {
        NewAddress {
            full_name: "Asha Kumar".to_string(),
            phone: "+91 98400 12345".to_string(),
            address_line: "12 Beach Road".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600001".to_string(),
            is_default: false,
        }
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&product_input()).is_ok());

        let mut input = product_input();
        input.name = "   ".to_string();
        assert!(validate_product_input(&input).is_err());

        let mut input = product_input();
        input.list_price = Money::zero();
        assert!(validate_product_input(&input).is_err());

        let mut input = product_input();
        input.min_order = Quantity::from_grams(500);
        assert!(validate_product_input(&input).is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address(&new_address()).is_ok());

        let mut input = new_address();
        input.city = String::new();
        assert!(matches!(
            validate_address(&input),
            Err(ValidationError::Required { field }) if field == "city"
        ));

        let mut input = new_address();
        input.pincode = "60000160001".to_string();
        assert!(matches!(
            validate_address(&input),
            Err(ValidationError::TooLong { field, .. }) if field == "pincode"
        ));
    }

    #[test]
    fn test_validate_order_request() {
        let request = OrderRequest {
            address_id: "a1".to_string(),
            lines: vec![OrderLineRequest {
                product_id: "p1".to_string(),
                quantity: Quantity::from_kg(5),
            }],
            payment_reference: None,
        };
        assert!(validate_order_request(&request).is_ok());
    }

    #[test]
    fn test_validate_order_request_rejects_empty_cart() {
        let request = OrderRequest {
            address_id: "a1".to_string(),
            lines: vec![],
            payment_reference: None,
        };
        assert!(matches!(
            validate_order_request(&request),
            Err(ValidationError::Required { field }) if field == "lines"
        ));
    }

    #[test]
    fn test_validate_order_request_rejects_zero_quantity() {
        let request = OrderRequest {
            address_id: "a1".to_string(),
            lines: vec![OrderLineRequest {
                product_id: "p1".to_string(),
                quantity: Quantity::zero(),
            }],
            payment_reference: None,
        };
        assert!(matches!(
            validate_order_request(&request),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_order_request_caps_line_count() {
        let line = OrderLineRequest {
            product_id: "p1".to_string(),
            quantity: Quantity::from_kg(3),
        };
        let request = OrderRequest {
            address_id: "a1".to_string(),
            lines: vec![line; MAX_ORDER_LINES + 1],
            payment_reference: None,
        };
        assert!(validate_order_request(&request).is_err());
    }
}
