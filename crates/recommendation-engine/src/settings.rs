//! SQLite persistence for per-user recommendation settings.
//!
//! Settings are the only entity of this core that survives a restart;
//! everything else is recomputed per session.

use async_trait::async_trait;
use chrono::Utc;
use estate_core::{EstateError, RecommendationSettings, SettingsStore};
use sqlx::{Row, SqlitePool};

pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS recommendation_settings (
                user_id TEXT PRIMARY KEY,
                enable_personalized INTEGER NOT NULL,
                enable_similar_properties INTEGER NOT NULL,
                enable_trending INTEGER NOT NULL,
                min_match_score REAL NOT NULL,
                notify_on_new_matches INTEGER NOT NULL,
                max_recommendations_per_day INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn load(&self, user_id: &str) -> Result<Option<RecommendationSettings>, EstateError> {
        let row = sqlx::query(
            "SELECT enable_personalized, enable_similar_properties, enable_trending,
                    min_match_score, notify_on_new_matches, max_recommendations_per_day
             FROM recommendation_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EstateError::Database(e.to_string()))?;

        Ok(row.map(|row| RecommendationSettings {
            enable_personalized: row.get::<i64, _>("enable_personalized") != 0,
            enable_similar_properties: row.get::<i64, _>("enable_similar_properties") != 0,
            enable_trending: row.get::<i64, _>("enable_trending") != 0,
            min_match_score: row.get("min_match_score"),
            notify_on_new_matches: row.get::<i64, _>("notify_on_new_matches") != 0,
            max_recommendations_per_day: row.get::<i64, _>("max_recommendations_per_day") as u32,
        }))
    }

    async fn save(
        &self,
        user_id: &str,
        settings: &RecommendationSettings,
    ) -> Result<(), EstateError> {
        sqlx::query(
            "INSERT INTO recommendation_settings
                (user_id, enable_personalized, enable_similar_properties, enable_trending,
                 min_match_score, notify_on_new_matches, max_recommendations_per_day, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                enable_personalized = excluded.enable_personalized,
                enable_similar_properties = excluded.enable_similar_properties,
                enable_trending = excluded.enable_trending,
                min_match_score = excluded.min_match_score,
                notify_on_new_matches = excluded.notify_on_new_matches,
                max_recommendations_per_day = excluded.max_recommendations_per_day,
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(settings.enable_personalized as i64)
        .bind(settings.enable_similar_properties as i64)
        .bind(settings.enable_trending as i64)
        .bind(settings.min_match_score)
        .bind(settings.notify_on_new_matches as i64)
        .bind(settings.max_recommendations_per_day as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| EstateError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteSettingsStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory SQLite");
        SqliteSettingsStore::migrate(&pool).await.unwrap();
        SqliteSettingsStore::new(pool)
    }

    #[tokio::test]
    async fn missing_user_loads_none() {
        let store = setup().await;
        assert!(store.load("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = setup().await;
        let settings = RecommendationSettings {
            enable_trending: false,
            min_match_score: 0.75,
            max_recommendations_per_day: 5,
            ..Default::default()
        };
        store.save("u1", &settings).await.unwrap();
        assert_eq!(store.load("u1").await.unwrap(), Some(settings));
    }

    #[tokio::test]
    async fn save_upserts_existing_row() {
        let store = setup().await;
        store
            .save("u1", &RecommendationSettings::default())
            .await
            .unwrap();
        let updated = RecommendationSettings {
            min_match_score: 0.9,
            ..Default::default()
        };
        store.save("u1", &updated).await.unwrap();
        assert_eq!(
            store.load("u1").await.unwrap().unwrap().min_match_score,
            0.9
        );
    }
}
