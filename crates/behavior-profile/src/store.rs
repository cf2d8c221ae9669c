//! SQLite-backed behavior sink.
//!
//! Events are append-only; nothing here updates or deletes a row. The
//! tracker treats this sink as an external collaborator and never blocks
//! on it.

use async_trait::async_trait;
use chrono::Utc;
use estate_core::{BehaviorSink, EstateError, FilterSet, InteractionKind};
use sqlx::{Row, SqlitePool};

pub struct SqliteBehaviorSink {
    pool: SqlitePool,
}

impl SqliteBehaviorSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the events table if it does not exist yet.
    pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS behavior_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                query TEXT,
                property_id TEXT,
                dwell_secs INTEGER,
                filters TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn insert_event(
        &self,
        user_id: &str,
        kind: &str,
        query: Option<&str>,
        property_id: Option<&str>,
        dwell_secs: Option<u64>,
        filters: Option<String>,
    ) -> Result<(), EstateError> {
        sqlx::query(
            "INSERT INTO behavior_events
                (user_id, kind, query, property_id, dwell_secs, filters, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(kind)
        .bind(query)
        .bind(property_id)
        .bind(dwell_secs.map(|d| d as i64))
        .bind(filters)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| EstateError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BehaviorSink for SqliteBehaviorSink {
    async fn track_search(&self, user_id: &str, query: &str) -> Result<(), EstateError> {
        self.insert_event(user_id, "search", Some(query), None, None, None)
            .await
    }

    async fn track_property_view(
        &self,
        user_id: &str,
        property_id: &str,
        dwell_secs: Option<u64>,
    ) -> Result<(), EstateError> {
        self.insert_event(user_id, "view", None, Some(property_id), dwell_secs, None)
            .await
    }

    async fn track_filters(&self, user_id: &str, filters: &FilterSet) -> Result<(), EstateError> {
        let json = serde_json::to_string(filters)
            .map_err(|e| EstateError::Database(e.to_string()))?;
        self.insert_event(user_id, "filters", None, None, None, Some(json))
            .await
    }

    async fn track_interaction(
        &self,
        user_id: &str,
        property_id: &str,
        kind: InteractionKind,
    ) -> Result<(), EstateError> {
        self.insert_event(user_id, kind.as_str(), None, Some(property_id), None, None)
            .await
    }

    async fn search_history(&self, user_id: &str) -> Result<Vec<String>, EstateError> {
        let rows = sqlx::query(
            "SELECT query FROM behavior_events
             WHERE user_id = ? AND kind = 'search' AND query IS NOT NULL
             ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EstateError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("query"))
            .collect())
    }

    async fn clear(&self, user_id: &str) -> Result<(), EstateError> {
        sqlx::query("DELETE FROM behavior_events WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| EstateError::Database(e.to_string()))?;
        Ok(())
    }
}
