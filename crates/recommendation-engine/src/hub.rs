//! Recommendation hub.
//!
//! Holds the latest resolved list per (user, kind) and coordinates
//! concurrent refreshes. Every refresh takes a monotonic sequence number
//! before it starts; only a refresh whose sequence exceeds the stored one
//! may overwrite a list, so a stale response that completes late can
//! never clobber fresher state.

use behavior_profile::ProfileTracker;
use dashmap::DashMap;
use estate_core::{
    BehaviorSink, EstateError, InteractionKind, ListKind, ListingsRepository, Recommendation,
    RecommendationSettings, SettingsStore,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::lists;
use crate::scorer::{RecommendationScorer, WeightedScorer};

struct VersionedList {
    seq: u64,
    items: Vec<Recommendation>,
}

pub struct RecommendationHub {
    repo: Arc<dyn ListingsRepository>,
    tracker: Arc<ProfileTracker>,
    settings: Arc<dyn SettingsStore>,
    sink: Arc<dyn BehaviorSink>,
    scorer: Arc<dyn RecommendationScorer>,
    cache: DashMap<(String, ListKind), VersionedList>,
    refresh_seq: AtomicU64,
}

impl RecommendationHub {
    pub fn new(
        repo: Arc<dyn ListingsRepository>,
        tracker: Arc<ProfileTracker>,
        settings: Arc<dyn SettingsStore>,
        sink: Arc<dyn BehaviorSink>,
    ) -> Self {
        Self {
            repo,
            tracker,
            settings,
            sink,
            scorer: Arc::new(WeightedScorer::new()),
            cache: DashMap::new(),
            refresh_seq: AtomicU64::new(0),
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn RecommendationScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Settings for a user, falling back to defaults when nothing is stored.
    pub async fn settings_for(&self, user_id: &str) -> Result<RecommendationSettings, EstateError> {
        Ok(self.settings.load(user_id).await?.unwrap_or_default())
    }

    pub async fn update_settings(
        &self,
        user_id: &str,
        settings: &RecommendationSettings,
    ) -> Result<(), EstateError> {
        self.settings.save(user_id, settings).await
    }

    /// Refresh one list for a user. Returns the list that is current after
    /// this refresh settles, which may be a fresher one that won the race.
    pub async fn refresh(
        &self,
        user_id: &str,
        kind: ListKind,
    ) -> Result<Vec<Recommendation>, EstateError> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let settings = self.settings_for(user_id).await?;

        let enabled = match kind {
            ListKind::Personalized => settings.enable_personalized,
            ListKind::NewListings => settings.enable_similar_properties,
            ListKind::Trending => settings.enable_trending,
        };
        if !enabled {
            return Ok(Vec::new());
        }

        let catalog = self.repo.catalog().await?;
        let snapshot = self.tracker.profile(user_id).preferences;

        let items = match kind {
            ListKind::Personalized => lists::personalized(
                user_id,
                &catalog,
                &snapshot,
                &settings,
                self.scorer.as_ref(),
            ),
            ListKind::NewListings => lists::new_listings(
                user_id,
                &catalog,
                &snapshot,
                &settings,
                self.scorer.as_ref(),
            ),
            ListKind::Trending => {
                lists::trending(user_id, &catalog, &settings, self.scorer.as_ref())
            }
        };

        Ok(self.store_if_fresher(user_id, kind, seq, items))
    }

    fn store_if_fresher(
        &self,
        user_id: &str,
        kind: ListKind,
        seq: u64,
        items: Vec<Recommendation>,
    ) -> Vec<Recommendation> {
        let key = (user_id.to_string(), kind);
        let mut entry = self
            .cache
            .entry(key)
            .or_insert_with(|| VersionedList { seq: 0, items: Vec::new() });
        if seq > entry.seq {
            entry.seq = seq;
            entry.items = items;
        } else {
            tracing::debug!(
                user_id,
                kind = kind.as_str(),
                stale_seq = seq,
                current_seq = entry.seq,
                "stale refresh dropped"
            );
        }
        entry.items.clone()
    }

    /// Latest resolved list of a kind, if any refresh has completed.
    pub fn current(&self, user_id: &str, kind: ListKind) -> Option<Vec<Recommendation>> {
        self.cache
            .get(&(user_id.to_string(), kind))
            .map(|v| v.items.clone())
    }

    /// Merged view over whatever lists are resolved, deduplicated by
    /// property id with precedence Personalized > New-Listings > Trending.
    pub fn all_recommendations(&self, user_id: &str) -> Vec<Recommendation> {
        let personalized = self.current(user_id, ListKind::Personalized).unwrap_or_default();
        let new_listings = self.current(user_id, ListKind::NewListings).unwrap_or_default();
        let trending = self.current(user_id, ListKind::Trending).unwrap_or_default();
        lists::merge_all(&[&personalized, &new_listings, &trending])
    }

    /// Mark a recommendation viewed wherever it appears. Idempotent:
    /// repeated calls leave is_viewed true with no error.
    pub fn mark_viewed(&self, user_id: &str, recommendation_id: &str) {
        for kind in [ListKind::Personalized, ListKind::NewListings, ListKind::Trending] {
            if let Some(mut entry) = self.cache.get_mut(&(user_id.to_string(), kind)) {
                for rec in entry.items.iter_mut() {
                    if rec.id == recommendation_id {
                        rec.is_viewed = true;
                    }
                }
            }
        }
    }

    /// Fire-and-forget interaction telemetry. Failures are logged and
    /// swallowed; the caller never sees them.
    pub fn track_interaction(&self, user_id: &str, property_id: &str, kind: InteractionKind) {
        let sink = Arc::clone(&self.sink);
        let (user, property) = (user_id.to_string(), property_id.to_string());
        tokio::spawn(async move {
            if let Err(e) = sink.track_interaction(&user, &property, kind).await {
                tracing::warn!(
                    user_id = %user,
                    kind = kind.as_str(),
                    error = %e,
                    "interaction telemetry dropped"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use behavior_profile::PreferenceSnapshot;
    use chrono::{Duration, Utc};
    use estate_core::{FilterSet, Location, PropertyRecord, PropertyType};
    use std::collections::HashMap;

    struct StubRepo {
        catalog: Vec<PropertyRecord>,
    }

    #[async_trait]
    impl ListingsRepository for StubRepo {
        async fn property(&self, id: &str) -> Result<Option<PropertyRecord>, EstateError> {
            Ok(self.catalog.iter().find(|p| p.id == id).cloned())
        }

        async fn catalog(&self) -> Result<Vec<PropertyRecord>, EstateError> {
            Ok(self.catalog.clone())
        }
    }

    struct NullSink;

    #[async_trait]
    impl BehaviorSink for NullSink {
        async fn track_search(&self, _: &str, _: &str) -> Result<(), EstateError> {
            Ok(())
        }
        async fn track_property_view(
            &self,
            _: &str,
            _: &str,
            _: Option<u64>,
        ) -> Result<(), EstateError> {
            Ok(())
        }
        async fn track_filters(&self, _: &str, _: &FilterSet) -> Result<(), EstateError> {
            Ok(())
        }
        async fn track_interaction(
            &self,
            _: &str,
            _: &str,
            _: InteractionKind,
        ) -> Result<(), EstateError> {
            Err(EstateError::ExternalService("sink down".into()))
        }
        async fn search_history(&self, _: &str) -> Result<Vec<String>, EstateError> {
            Ok(Vec::new())
        }
        async fn clear(&self, _: &str) -> Result<(), EstateError> {
            Ok(())
        }
    }

    struct MemorySettings {
        stored: std::sync::Mutex<HashMap<String, RecommendationSettings>>,
    }

    #[async_trait]
    impl SettingsStore for MemorySettings {
        async fn load(&self, user_id: &str) -> Result<Option<RecommendationSettings>, EstateError> {
            Ok(self.stored.lock().unwrap().get(user_id).cloned())
        }
        async fn save(
            &self,
            user_id: &str,
            settings: &RecommendationSettings,
        ) -> Result<(), EstateError> {
            self.stored
                .lock()
                .unwrap()
                .insert(user_id.to_string(), settings.clone());
            Ok(())
        }
    }

    struct FixedScorer {
        scores: HashMap<String, f64>,
    }

    impl RecommendationScorer for FixedScorer {
        fn match_score(&self, p: &PropertyRecord, _: &PreferenceSnapshot) -> f64 {
            self.scores.get(&p.id).copied().unwrap_or(0.0)
        }
        fn trend_score(&self, p: &PropertyRecord) -> f64 {
            self.scores.get(&p.id).copied().unwrap_or(0.0) / 2.0
        }
        fn reasons(&self, _: &PropertyRecord, _: &PreferenceSnapshot) -> Vec<String> {
            Vec::new()
        }
    }

    fn property(id: &str, price: f64) -> PropertyRecord {
        PropertyRecord {
            id: id.into(),
            price,
            property_type: PropertyType::Condo,
            location: Location {
                neighborhood: "Midtown".into(),
                city: "Springfield".into(),
                state: "IL".into(),
            },
            bedrooms: 2,
            bathrooms: 1,
            area_sqft: 950.0,
            year_built: 2019,
            amenities: vec![],
            created_at: Utc::now() - Duration::days(3),
        }
    }

    fn hub(catalog: Vec<PropertyRecord>, scores: &[(&str, f64)]) -> RecommendationHub {
        let tracker = Arc::new(ProfileTracker::new(Arc::new(NullSink)));
        RecommendationHub::new(
            Arc::new(StubRepo { catalog }),
            tracker,
            Arc::new(MemorySettings {
                stored: std::sync::Mutex::new(HashMap::new()),
            }),
            Arc::new(NullSink),
        )
        .with_scorer(Arc::new(FixedScorer {
            scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }))
    }

    #[tokio::test]
    async fn merged_view_attributes_duplicates_to_personalized() {
        let h = hub(
            vec![property("a", 300_000.0), property("b", 300_000.0)],
            &[("a", 0.9), ("b", 0.4)],
        );
        h.refresh("u1", ListKind::Personalized).await.unwrap();
        h.refresh("u1", ListKind::Trending).await.unwrap();

        let merged = h.all_recommendations("u1");
        assert_eq!(merged.len(), 2);
        let a = merged.iter().find(|r| r.property_id == "a").unwrap();
        assert_eq!(a.source, ListKind::Personalized);
        assert!((a.match_score - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn merged_view_tolerates_partial_resolution() {
        let h = hub(vec![property("a", 300_000.0)], &[("a", 0.9)]);
        h.refresh("u1", ListKind::Trending).await.unwrap();

        let merged = h.all_recommendations("u1");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, ListKind::Trending);
    }

    #[tokio::test]
    async fn mark_viewed_is_idempotent() {
        let h = hub(vec![property("a", 300_000.0)], &[("a", 0.9)]);
        let list = h.refresh("u1", ListKind::Personalized).await.unwrap();
        let rec_id = list[0].id.clone();

        h.mark_viewed("u1", &rec_id);
        h.mark_viewed("u1", &rec_id);

        let current = h.current("u1", ListKind::Personalized).unwrap();
        assert_eq!(current.len(), 1);
        assert!(current[0].is_viewed);
    }

    #[tokio::test]
    async fn stale_refresh_cannot_overwrite_fresher_state() {
        let h = hub(vec![property("a", 300_000.0)], &[("a", 0.9)]);

        // the newer refresh lands first
        let fresh = h.refresh("u1", ListKind::Personalized).await.unwrap();
        assert_eq!(fresh.len(), 1);

        // an older in-flight refresh completes late with an empty result;
        // its write is dropped and the fresher list is returned instead
        let late = h.store_if_fresher("u1", ListKind::Personalized, 0, vec![]);
        assert_eq!(late.len(), 1);

        let current = h.current("u1", ListKind::Personalized).unwrap();
        assert_eq!(current.len(), 1);
    }

    #[tokio::test]
    async fn disabled_list_kind_returns_empty() {
        let h = hub(vec![property("a", 300_000.0)], &[("a", 0.9)]);
        h.update_settings(
            "u1",
            &RecommendationSettings {
                enable_trending: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let list = h.refresh("u1", ListKind::Trending).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn interaction_failures_stay_inside_the_hub() {
        let h = hub(vec![property("a", 300_000.0)], &[("a", 0.9)]);
        // NullSink fails track_interaction; nothing propagates
        h.track_interaction("u1", "a", InteractionKind::Open);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn settings_round_trip_with_default_on_miss() {
        let h = hub(vec![], &[]);
        assert_eq!(
            h.settings_for("u1").await.unwrap(),
            RecommendationSettings::default()
        );

        let custom = RecommendationSettings {
            min_match_score: 0.8,
            ..Default::default()
        };
        h.update_settings("u1", &custom).await.unwrap();
        assert_eq!(h.settings_for("u1").await.unwrap(), custom);
    }
}
