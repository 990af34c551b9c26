//! # Address Repository
//!
//! The customer address book.
//!
//! ## Default-Flag Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  At most ONE of a customer's addresses carries is_default, and the     │
//! │  first address a customer ever creates is default regardless of the    │
//! │  request.                                                               │
//! │                                                                         │
//! │  add(customer, input):                                                  │
//! │    validate fields ─► zone allow-list check (settings, outside tx)     │
//! │         │                                                               │
//! │         ▼  one transaction                                              │
//! │    ┌────────────────────────────────────────────────────┐              │
//! │    │ customer exists?            ─► NotFound            │              │
//! │    │ is_first = COUNT(existing) == 0                    │              │
//! │    │ default  = is_first OR input.is_default            │              │
//! │    │ if default: UPDATE ... SET is_default = 0          │              │
//! │    │             WHERE customer_id = ?  (single UPDATE) │              │
//! │    │ INSERT new row                                     │              │
//! │    └────────────────────────────────────────────────────┘              │
//! │                                                                         │
//! │  Deletion does NOT promote another address to default; callers see     │
//! │  a customer with zero defaults until they set a new one.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::settings::SettingsRepository;
use orchard_core::validation::validate_address;
use orchard_core::{Address, CoreError, NewAddress};

const ADDRESS_COLUMNS: &str =
    "id, customer_id, full_name, phone, address_line, city, state, pincode, is_default";

/// Repository for delivery addresses.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    /// Creates a new AddressRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AddressRepository { pool }
    }

    /// Lists a customer's addresses, default first.
    pub async fn list_for_customer(&self, customer_id: &str) -> StoreResult<Vec<Address>> {
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses \
             WHERE customer_id = ?1 ORDER BY is_default DESC, created_at"
        );

        let addresses = sqlx::query_as::<_, Address>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(addresses)
    }

    /// Gets an address by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Address>> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1");

        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(address)
    }

    /// Adds an address for a customer.
    ///
    /// Validates the state against the configured delivery-zone allow-list
    /// (case-insensitive), then applies the default-flag invariant in one
    /// transaction.
    pub async fn add(&self, customer_id: &str, input: &NewAddress) -> StoreResult<Address> {
        validate_address(input)?;

        // Zone check reads settings outside the transaction; the allow-list
        // changes rarely and never inside a request.
        let zones = SettingsRepository::new(self.pool.clone())
            .delivery_zones()
            .await?;

        let state = input.state.trim();
        if !zones.iter().any(|z| z.eq_ignore_ascii_case(state)) {
            return Err(StoreError::Rule(CoreError::UnsupportedZone {
                state: state.to_string(),
                zones,
            }));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        debug!(id = %id, customer_id = %customer_id, "Adding address");

        let mut tx = self.pool.begin().await?;

        let customer_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;

        if customer_count == 0 {
            return Err(StoreError::not_found("Customer", customer_id));
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE customer_id = ?1")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;

        let is_default = existing == 0 || input.is_default;

        if is_default {
            sqlx::query("UPDATE addresses SET is_default = 0 WHERE customer_id = ?1")
                .bind(customer_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, customer_id, full_name, phone,
                address_line, city, state, pincode,
                is_default, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(customer_id)
        .bind(input.full_name.trim())
        .bind(input.phone.trim())
        .bind(input.address_line.trim())
        .bind(input.city.trim())
        .bind(state)
        .bind(input.pincode.trim())
        .bind(is_default)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| StoreError::not_found("Address", &id))
    }

    /// Deletes an address owned by the given customer.
    ///
    /// The default flag is NOT rebalanced onto another address.
    pub async fn delete(&self, customer_id: &str, address_id: &str) -> StoreResult<()> {
        let owner: Option<String> =
            sqlx::query_scalar("SELECT customer_id FROM addresses WHERE id = ?1")
                .bind(address_id)
                .fetch_optional(&self.pool)
                .await?;

        match owner {
            None => return Err(StoreError::not_found("Address", address_id)),
            Some(owner) if owner != customer_id => {
                return Err(StoreError::forbidden(
                    "Address does not belong to the customer",
                ));
            }
            Some(_) => {}
        }

        debug!(id = %address_id, "Deleting address");

        sqlx::query("DELETE FROM addresses WHERE id = ?1")
            .bind(address_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn test_customer(db: &Database) -> String {
        db.customers()
            .create("Asha Kumar", "asha@example.com", "+91 98400 12345")
            .await
            .unwrap()
            .id
    }

    fn chennai_address(is_default: bool) -> NewAddress {
        NewAddress {
            full_name: "Asha Kumar".to_string(),
            phone: "+91 98400 12345".to_string(),
            address_line: "12 Beach Road".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600001".to_string(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_first_address_becomes_default_even_when_not_requested() {
        let db = test_db().await;
        let customer_id = test_customer(&db).await;

        let address = db
            .addresses()
            .add(&customer_id, &chennai_address(false))
            .await
            .unwrap();
        assert!(address.is_default);
    }

    #[tokio::test]
    async fn test_at_most_one_default_after_switching() {
        let db = test_db().await;
        let addresses = db.addresses();
        let customer_id = test_customer(&db).await;

        let first = addresses
            .add(&customer_id, &chennai_address(false))
            .await
            .unwrap();
        assert!(first.is_default);

        let mut second = chennai_address(true);
        second.city = "Coimbatore".to_string();
        let second = addresses.add(&customer_id, &second).await.unwrap();
        assert!(second.is_default);

        let all = addresses.list_for_customer(&customer_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
        assert_eq!(all[0].id, second.id); // default sorts first
    }

    #[tokio::test]
    async fn test_non_default_addition_leaves_flags_untouched() {
        let db = test_db().await;
        let addresses = db.addresses();
        let customer_id = test_customer(&db).await;

        let first = addresses
            .add(&customer_id, &chennai_address(false))
            .await
            .unwrap();

        let mut second = chennai_address(false);
        second.city = "Madurai".to_string();
        let second = addresses.add(&customer_id, &second).await.unwrap();

        assert!(!second.is_default);
        let first = addresses.get_by_id(&first.id).await.unwrap().unwrap();
        assert!(first.is_default);
    }

    #[tokio::test]
    async fn test_unsupported_zone_lists_allowed_zones() {
        let db = test_db().await;
        let customer_id = test_customer(&db).await;

        let mut input = chennai_address(false);
        input.state = "Kerala".to_string();

        let err = db.addresses().add(&customer_id, &input).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Delivery is available only in: Tamil Nadu, Pondicherry, Puducherry, Karnataka"
        );
    }

    #[tokio::test]
    async fn test_zone_match_is_case_insensitive() {
        let db = test_db().await;
        let customer_id = test_customer(&db).await;

        let mut input = chennai_address(false);
        input.state = "tamil nadu".to_string();

        assert!(db.addresses().add(&customer_id, &input).await.is_ok());
    }

    #[tokio::test]
    async fn test_configured_zones_override_default_list() {
        let db = test_db().await;
        let customer_id = test_customer(&db).await;

        db.settings()
            .set("delivery_zones", "Kerala")
            .await
            .unwrap();

        let mut input = chennai_address(false);
        input.state = "Kerala".to_string();
        assert!(db.addresses().add(&customer_id, &input).await.is_ok());

        let rejected = db
            .addresses()
            .add(&customer_id, &chennai_address(false))
            .await;
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn test_delete_checks_ownership() {
        let db = test_db().await;
        let addresses = db.addresses();
        let customer_id = test_customer(&db).await;

        let other_id = db
            .customers()
            .create("Ravi", "ravi@example.com", "+91 98400 54321")
            .await
            .unwrap()
            .id;

        let address = addresses
            .add(&customer_id, &chennai_address(false))
            .await
            .unwrap();

        let err = addresses.delete(&other_id, &address.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let err = addresses.delete(&customer_id, "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        addresses.delete(&customer_id, &address.id).await.unwrap();
        assert!(addresses
            .list_for_customer(&customer_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_does_not_rebalance_default() {
        let db = test_db().await;
        let addresses = db.addresses();
        let customer_id = test_customer(&db).await;

        let first = addresses
            .add(&customer_id, &chennai_address(false))
            .await
            .unwrap();

        let mut second = chennai_address(false);
        second.city = "Salem".to_string();
        addresses.add(&customer_id, &second).await.unwrap();

        addresses.delete(&customer_id, &first.id).await.unwrap();

        let remaining = addresses.list_for_customer(&customer_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(!remaining[0].is_default);
    }

    #[tokio::test]
    async fn test_add_for_unknown_customer_is_not_found() {
        let db = test_db().await;

        let err = db
            .addresses()
            .add("nope", &chennai_address(false))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
