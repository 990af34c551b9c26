//! # Customer Repository
//!
//! The customer directory. The order engine reads only `id` and `active`;
//! the rest of the row feeds the order aggregate shown to admins.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use orchard_core::Customer;

/// Repository for customer records.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer.
    ///
    /// Email and phone are unique; a collision surfaces as
    /// [`StoreError::Duplicate`].
    pub async fn create(&self, name: &str, email: &str, phone: &str) -> StoreResult<Customer> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(name.trim())
        .bind(email.trim())
        .bind(phone.trim())
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| StoreError::not_found("Customer", &id))
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, active, created_at, updated_at \
             FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Whether a customer id exists.
    pub async fn exists(&self, id: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Activates or deactivates a customer. Deactivated customers cannot
    /// place orders.
    pub async fn set_active(&self, id: &str, active: bool) -> StoreResult<()> {
        debug!(id = %id, active = active, "Setting customer active flag");

        let result =
            sqlx::query("UPDATE customers SET active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", id));
        }

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

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let customers = db.customers();

        let created = customers
            .create("Asha Kumar", "asha@example.com", "+91 98400 12345")
            .await
            .unwrap();
        assert!(created.active);

        let fetched = customers.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "asha@example.com");
        assert!(customers.exists(&created.id).await.unwrap());
        assert!(!customers.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = test_db().await;
        let customers = db.customers();

        customers
            .create("Asha Kumar", "asha@example.com", "+91 98400 12345")
            .await
            .unwrap();

        let err = customers
            .create("Another Asha", "asha@example.com", "+91 98400 99999")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::BusinessRule);
    }

    #[tokio::test]
    async fn test_set_active() {
        let db = test_db().await;
        let customers = db.customers();

        let created = customers
            .create("Asha Kumar", "asha@example.com", "+91 98400 12345")
            .await
            .unwrap();

        customers.set_active(&created.id, false).await.unwrap();
        let fetched = customers.get_by_id(&created.id).await.unwrap().unwrap();
        assert!(!fetched.active);

        let err = customers.set_active("nope", true).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
