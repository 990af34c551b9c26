//! # Settings Repository
//!
//! Key→value runtime configuration: the season gate, the storefront banner,
//! and the delivery-zone allow-list.
//!
//! ## Season Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  app_settings                                                           │
//! │  ┌──────────────────────┬────────────────────────────────────┐         │
//! │  │ season_active        │ "true" / "false"                   │         │
//! │  │ season_banner_text   │ "Mango Season 2026 is LIVE!"       │         │
//! │  │ delivery_zones       │ "Tamil Nadu,Pondicherry,..."       │         │
//! │  └──────────────────────┴────────────────────────────────────┘         │
//! │                                                                         │
//! │  is_season_active(): stored value equals "true" (case-insensitive);    │
//! │  a missing key means the season is CLOSED. Order placement checks      │
//! │  this before touching any order data.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

use crate::error::StoreResult;
use orchard_core::{
    DEFAULT_SEASON_BANNER, DELIVERY_ZONES, SETTING_DELIVERY_ZONES, SETTING_SEASON_ACTIVE,
    SETTING_SEASON_BANNER,
};

/// The storefront-visible settings projection.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSettings {
    pub season_active: bool,
    pub season_banner_text: String,
    pub delivery_zones: Vec<String>,
}

/// Repository for runtime configuration.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting value, if present.
    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT setting_value FROM app_settings WHERE setting_key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Gets a setting value, falling back to a default when absent.
    pub async fn get_or(&self, key: &str, default: &str) -> StoreResult<String> {
        Ok(self.get(key).await?.unwrap_or_else(|| default.to_string()))
    }

    /// Sets a setting value (insert or overwrite).
    pub async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        debug!(key = %key, "Writing setting");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO app_settings (setting_key, setting_value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(setting_key) DO UPDATE SET
                setting_value = excluded.setting_value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns every stored setting as a key→value map.
    pub async fn all(&self) -> StoreResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT setting_key, setting_value FROM app_settings")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Whether ordering is currently open.
    ///
    /// True only when the stored `season_active` value is "true"
    /// (case-insensitive). Missing key means closed.
    pub async fn is_season_active(&self) -> StoreResult<bool> {
        let value = self.get(SETTING_SEASON_ACTIVE).await?;
        Ok(matches!(value, Some(v) if v.eq_ignore_ascii_case("true")))
    }

    /// Opens or closes the ordering season.
    pub async fn set_season_active(&self, active: bool) -> StoreResult<()> {
        self.set(SETTING_SEASON_ACTIVE, if active { "true" } else { "false" })
            .await
    }

    /// The delivery-zone allow-list.
    ///
    /// Reads the comma-separated `delivery_zones` setting; when it has never
    /// been configured, falls back to the built-in four-zone list.
    pub async fn delivery_zones(&self) -> StoreResult<Vec<String>> {
        let stored = self.get(SETTING_DELIVERY_ZONES).await?;

        let zones = match stored {
            Some(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|z| !z.is_empty())
                .map(str::to_string)
                .collect(),
            None => DELIVERY_ZONES.iter().map(|z| z.to_string()).collect(),
        };

        Ok(zones)
    }

    /// The settings projection shown to the storefront.
    pub async fn public_settings(&self) -> StoreResult<PublicSettings> {
        Ok(PublicSettings {
            season_active: self.is_season_active().await?,
            season_banner_text: self
                .get_or(SETTING_SEASON_BANNER, DEFAULT_SEASON_BANNER)
                .await?,
            delivery_zones: self.delivery_zones().await?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_set_roundtrip() {
        let db = test_db().await;
        let settings = db.settings();

        assert_eq!(settings.get("season_banner_text").await.unwrap(), None);

        settings
            .set("season_banner_text", "Season open!")
            .await
            .unwrap();
        assert_eq!(
            settings.get("season_banner_text").await.unwrap().as_deref(),
            Some("Season open!")
        );

        // Overwrite
        settings
            .set("season_banner_text", "Season closing soon")
            .await
            .unwrap();
        assert_eq!(
            settings.get("season_banner_text").await.unwrap().as_deref(),
            Some("Season closing soon")
        );
    }

    #[tokio::test]
    async fn test_season_defaults_to_closed() {
        let db = test_db().await;
        let settings = db.settings();

        assert!(!settings.is_season_active().await.unwrap());

        settings.set_season_active(true).await.unwrap();
        assert!(settings.is_season_active().await.unwrap());

        settings.set_season_active(false).await.unwrap();
        assert!(!settings.is_season_active().await.unwrap());
    }

    #[tokio::test]
    async fn test_season_flag_is_case_insensitive() {
        let db = test_db().await;
        let settings = db.settings();

        settings.set("season_active", "TRUE").await.unwrap();
        assert!(settings.is_season_active().await.unwrap());

        settings.set("season_active", "yes").await.unwrap();
        assert!(!settings.is_season_active().await.unwrap());
    }

    #[tokio::test]
    async fn test_delivery_zones_default_and_override() {
        let db = test_db().await;
        let settings = db.settings();

        let zones = settings.delivery_zones().await.unwrap();
        assert_eq!(
            zones,
            vec!["Tamil Nadu", "Pondicherry", "Puducherry", "Karnataka"]
        );

        settings
            .set("delivery_zones", "Kerala, Goa")
            .await
            .unwrap();
        let zones = settings.delivery_zones().await.unwrap();
        assert_eq!(zones, vec!["Kerala", "Goa"]);
    }

    #[tokio::test]
    async fn test_public_settings_projection() {
        let db = test_db().await;
        let settings = db.settings();

        let public = settings.public_settings().await.unwrap();
        assert!(!public.season_active);
        assert_eq!(public.season_banner_text, "Mango Season 2026 is LIVE!");
        assert_eq!(public.delivery_zones.len(), 4);
    }
}
