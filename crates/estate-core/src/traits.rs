use async_trait::async_trait;

use crate::{EstateError, FilterSet, InteractionKind, PropertyRecord, RecommendationSettings};

/// Read-only access to the external listings catalog
#[async_trait]
pub trait ListingsRepository: Send + Sync {
    async fn property(&self, id: &str) -> Result<Option<PropertyRecord>, EstateError>;
    async fn catalog(&self) -> Result<Vec<PropertyRecord>, EstateError>;
}

/// External behavior/telemetry collaborator. This core is the only
/// writer and reader of behavior data through this boundary.
#[async_trait]
pub trait BehaviorSink: Send + Sync {
    async fn track_search(&self, user_id: &str, query: &str) -> Result<(), EstateError>;
    async fn track_property_view(
        &self,
        user_id: &str,
        property_id: &str,
        dwell_secs: Option<u64>,
    ) -> Result<(), EstateError>;
    async fn track_filters(&self, user_id: &str, filters: &FilterSet) -> Result<(), EstateError>;
    async fn track_interaction(
        &self,
        user_id: &str,
        property_id: &str,
        kind: InteractionKind,
    ) -> Result<(), EstateError>;
    /// Most-recent-first search queries for a user
    async fn search_history(&self, user_id: &str) -> Result<Vec<String>, EstateError>;
    /// The one non-append operation: wipe everything for a user
    async fn clear(&self, user_id: &str) -> Result<(), EstateError>;
}

/// External key-value persistence for per-user recommendation settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<RecommendationSettings>, EstateError>;
    async fn save(
        &self,
        user_id: &str,
        settings: &RecommendationSettings,
    ) -> Result<(), EstateError>;
}

/// External text-generation collaborator used by the explanation generator.
/// Attempted once per request; failures degrade to a fallback explanation.
#[async_trait]
pub trait TextComposer: Send + Sync {
    async fn compose_summary(
        &self,
        property: &PropertyRecord,
        match_score: f64,
    ) -> Result<String, EstateError>;
    async fn compose_conclusion(
        &self,
        property: &PropertyRecord,
        match_score: f64,
    ) -> Result<String, EstateError>;
}
