//! Per-user behavior tracking and preference aggregation.
//!
//! Write paths update the in-process profile synchronously and forward the
//! event to the external behavior sink fire-and-forget: sink failures are
//! logged and swallowed, never retried, never surfaced to the caller.

use chrono::Utc;
use dashmap::DashMap;
use estate_core::{BehaviorSink, FilterSet, PropertyRecord};
use std::sync::Arc;

use crate::models::{
    BehaviorProfile, FilterEvent, SearchEvent, UiAdaptations, ViewEvent, ENGAGED_DWELL_SECS,
    MAX_FILTER_HISTORY, MAX_SEARCH_HISTORY, MAX_VIEW_HISTORY, PRICE_RANGE_BLEND,
};

pub struct ProfileTracker {
    profiles: DashMap<String, BehaviorProfile>,
    sink: Arc<dyn BehaviorSink>,
}

impl ProfileTracker {
    pub fn new(sink: Arc<dyn BehaviorSink>) -> Self {
        Self {
            profiles: DashMap::new(),
            sink,
        }
    }

    /// Record a search query for the user.
    pub fn track_search(&self, user_id: &str, query: &str) {
        let mut profile = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| BehaviorProfile::new(user_id));

        profile.searches.insert(
            0,
            SearchEvent {
                query: query.to_string(),
                at: Utc::now(),
            },
        );
        profile.searches.truncate(MAX_SEARCH_HISTORY);
        profile.preferences.last_seen_at = Utc::now();
        drop(profile);

        let sink = Arc::clone(&self.sink);
        let (user, query) = (user_id.to_string(), query.to_string());
        tokio::spawn(async move {
            if let Err(e) = sink.track_search(&user, &query).await {
                tracing::warn!(user_id = %user, error = %e, "search telemetry dropped");
            }
        });
    }

    /// Record a property view, weighting engaged views double.
    pub fn track_property_view(
        &self,
        user_id: &str,
        property: &PropertyRecord,
        dwell_secs: Option<u64>,
    ) {
        let mut profile = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| BehaviorProfile::new(user_id));

        profile.views.insert(
            0,
            ViewEvent {
                property_id: property.id.clone(),
                dwell_secs,
                at: Utc::now(),
            },
        );
        profile.views.truncate(MAX_VIEW_HISTORY);

        let weight = match dwell_secs {
            Some(d) if d >= ENGAGED_DWELL_SECS => 2,
            _ => 1,
        };
        let prefs = &mut profile.preferences;
        *prefs
            .type_counts
            .entry(property.property_type.as_str().to_string())
            .or_insert(0) += weight;
        *prefs
            .location_counts
            .entry(property.location.neighborhood.clone())
            .or_insert(0) += weight;
        for amenity in &property.amenities {
            *prefs
                .amenity_counts
                .entry(amenity.to_ascii_lowercase())
                .or_insert(0) += weight;
        }
        prefs.last_seen_at = Utc::now();
        drop(profile);

        let sink = Arc::clone(&self.sink);
        let (user, property_id) = (user_id.to_string(), property.id.clone());
        tokio::spawn(async move {
            if let Err(e) = sink.track_property_view(&user, &property_id, dwell_secs).await {
                tracing::warn!(user_id = %user, error = %e, "view telemetry dropped");
            }
        });
    }

    /// Record an applied filter set, nudging preferences toward it.
    pub fn track_filters(&self, user_id: &str, filters: FilterSet) {
        let mut profile = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| BehaviorProfile::new(user_id));

        let prefs = &mut profile.preferences;
        if let Some(min) = filters.min_price {
            prefs.price_range.0 =
                prefs.price_range.0 * (1.0 - PRICE_RANGE_BLEND) + min * PRICE_RANGE_BLEND;
        }
        if let Some(max) = filters.max_price {
            prefs.price_range.1 =
                prefs.price_range.1 * (1.0 - PRICE_RANGE_BLEND) + max * PRICE_RANGE_BLEND;
        }
        for t in &filters.property_types {
            *prefs.type_counts.entry(t.to_ascii_lowercase()).or_insert(0) += 1;
        }
        for n in &filters.neighborhoods {
            *prefs.location_counts.entry(n.clone()).or_insert(0) += 1;
        }
        for a in &filters.amenities {
            *prefs.amenity_counts.entry(a.to_ascii_lowercase()).or_insert(0) += 1;
        }
        prefs.last_seen_at = Utc::now();

        profile.filters.insert(
            0,
            FilterEvent {
                filters: filters.clone(),
                at: Utc::now(),
            },
        );
        profile.filters.truncate(MAX_FILTER_HISTORY);
        drop(profile);

        let sink = Arc::clone(&self.sink);
        let user = user_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = sink.track_filters(&user, &filters).await {
                tracing::warn!(user_id = %user, error = %e, "filter telemetry dropped");
            }
        });
    }

    /// Current profile for a user; a fresh default if none exists yet.
    pub fn profile(&self, user_id: &str) -> BehaviorProfile {
        self.profiles
            .get(user_id)
            .map(|p| p.clone())
            .unwrap_or_else(|| BehaviorProfile::new(user_id))
    }

    /// Most-recent-first search queries. Prefers the external sink's
    /// record; degrades to local history when the sink is unreachable.
    pub async fn search_history(&self, user_id: &str) -> Vec<String> {
        match self.sink.search_history(user_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "sink history unavailable, using local");
                self.profile(user_id)
                    .searches
                    .into_iter()
                    .map(|s| s.query)
                    .collect()
            }
        }
    }

    /// UI hints derived from the current snapshot.
    pub fn ui_adaptations(&self, user_id: &str) -> UiAdaptations {
        let profile = self.profile(user_id);
        let prefs = &profile.preferences;

        let mut suggested: Vec<String> = Vec::new();
        for s in &profile.searches {
            if !suggested.contains(&s.query) {
                suggested.push(s.query.clone());
            }
            if suggested.len() == 5 {
                break;
            }
        }

        UiAdaptations {
            featured_categories: prefs.ranked_types().into_iter().take(3).collect(),
            highlighted_amenities: prefs.ranked_amenities().into_iter().take(5).collect(),
            suggested_searches: suggested,
            preferred_price_range: prefs.price_range,
        }
    }

    /// Wipe the user's history, reset the snapshot to defaults, and ask
    /// the sink to forget the user. Recommendation lists already rendered
    /// are not retroactively invalidated; the next fetch reflects the
    /// cleared state.
    pub async fn clear_all_behavior_data(&self, user_id: &str) {
        self.profiles
            .insert(user_id.to_string(), BehaviorProfile::new(user_id));
        if let Err(e) = self.sink.clear(user_id).await {
            tracing::warn!(user_id, error = %e, "sink clear failed");
        }
        tracing::info!(user_id, "behavior data cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_PRICE_RANGE;
    use async_trait::async_trait;
    use chrono::Utc;
    use estate_core::{EstateError, Location, PropertyType};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Sink that records calls, or fails every call when `failing`
    struct TestSink {
        failing: bool,
        searches: Mutex<Vec<(String, String)>>,
    }

    impl TestSink {
        fn new(failing: bool) -> Arc<Self> {
            Arc::new(Self {
                failing,
                searches: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BehaviorSink for TestSink {
        async fn track_search(&self, user_id: &str, query: &str) -> Result<(), EstateError> {
            if self.failing {
                return Err(EstateError::ExternalService("sink down".into()));
            }
            self.searches
                .lock()
                .unwrap()
                .push((user_id.to_string(), query.to_string()));
            Ok(())
        }

        async fn track_property_view(
            &self,
            _user_id: &str,
            _property_id: &str,
            _dwell_secs: Option<u64>,
        ) -> Result<(), EstateError> {
            if self.failing {
                return Err(EstateError::ExternalService("sink down".into()));
            }
            Ok(())
        }

        async fn track_filters(
            &self,
            _user_id: &str,
            _filters: &FilterSet,
        ) -> Result<(), EstateError> {
            if self.failing {
                return Err(EstateError::ExternalService("sink down".into()));
            }
            Ok(())
        }

        async fn track_interaction(
            &self,
            _user_id: &str,
            _property_id: &str,
            _kind: estate_core::InteractionKind,
        ) -> Result<(), EstateError> {
            if self.failing {
                return Err(EstateError::ExternalService("sink down".into()));
            }
            Ok(())
        }

        async fn search_history(&self, user_id: &str) -> Result<Vec<String>, EstateError> {
            if self.failing {
                return Err(EstateError::ExternalService("sink down".into()));
            }
            Ok(self
                .searches
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|(u, _)| u == user_id)
                .map(|(_, q)| q.clone())
                .collect())
        }

        async fn clear(&self, user_id: &str) -> Result<(), EstateError> {
            if self.failing {
                return Err(EstateError::ExternalService("sink down".into()));
            }
            self.searches.lock().unwrap().retain(|(u, _)| u != user_id);
            Ok(())
        }
    }

    fn property(id: &str, property_type: PropertyType, neighborhood: &str, amenities: &[&str]) -> PropertyRecord {
        PropertyRecord {
            id: id.into(),
            price: 400_000.0,
            property_type,
            location: Location {
                neighborhood: neighborhood.into(),
                city: "Springfield".into(),
                state: "IL".into(),
            },
            bedrooms: 2,
            bathrooms: 1,
            area_sqft: 900.0,
            year_built: 2015,
            amenities: amenities.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn views_shape_the_snapshot() {
        let tracker = ProfileTracker::new(TestSink::new(false));
        tracker.track_property_view("u1", &property("p1", PropertyType::Condo, "Midtown", &["gym"]), None);
        tracker.track_property_view("u1", &property("p2", PropertyType::Condo, "Midtown", &[]), None);
        tracker.track_property_view("u1", &property("p3", PropertyType::House, "Oak Park", &[]), None);

        let prefs = tracker.profile("u1").preferences;
        assert_eq!(prefs.ranked_types()[0], "condo");
        assert_eq!(prefs.ranked_locations()[0], "Midtown");
        assert_eq!(prefs.amenity_counts.get("gym"), Some(&1));
    }

    #[tokio::test]
    async fn engaged_views_count_double() {
        let tracker = ProfileTracker::new(TestSink::new(false));
        tracker.track_property_view("u1", &property("p1", PropertyType::House, "Oak Park", &[]), Some(120));
        tracker.track_property_view("u1", &property("p2", PropertyType::Condo, "Midtown", &[]), Some(5));

        let prefs = tracker.profile("u1").preferences;
        assert_eq!(prefs.type_counts.get("house"), Some(&2));
        assert_eq!(prefs.type_counts.get("condo"), Some(&1));
    }

    #[tokio::test]
    async fn filters_nudge_the_price_range() {
        let tracker = ProfileTracker::new(TestSink::new(false));
        tracker.track_filters(
            "u1",
            FilterSet {
                min_price: Some(200_000.0),
                max_price: Some(500_000.0),
                ..Default::default()
            },
        );

        let (lo, hi) = tracker.profile("u1").preferences.price_range;
        // 100k * 0.7 + 200k * 0.3 and 750k * 0.7 + 500k * 0.3
        assert!((lo - 130_000.0).abs() < 1e-6);
        assert!((hi - 675_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn sink_failure_never_reaches_the_caller() {
        let tracker = ProfileTracker::new(TestSink::new(true));
        tracker.track_search("u1", "loft downtown");
        tokio::time::sleep(Duration::from_millis(20)).await;

        // local history still records the search
        let history = tracker.search_history("u1").await;
        assert_eq!(history, vec!["loft downtown".to_string()]);
    }

    #[tokio::test]
    async fn sink_history_is_preferred_when_available() {
        let tracker = ProfileTracker::new(TestSink::new(false));
        tracker.track_search("u1", "two bed condo");
        tracker.track_search("u1", "garden flat");
        tokio::time::sleep(Duration::from_millis(20)).await;

        let history = tracker.search_history("u1").await;
        assert_eq!(history.len(), 2);
        assert!(history.contains(&"two bed condo".to_string()));
        assert!(history.contains(&"garden flat".to_string()));
    }

    #[tokio::test]
    async fn clear_resets_to_documented_defaults() {
        let tracker = ProfileTracker::new(TestSink::new(true));
        tracker.track_search("u1", "penthouse");
        tracker.track_property_view("u1", &property("p1", PropertyType::Loft, "Downtown", &["pool"]), Some(90));
        tracker.track_filters(
            "u1",
            FilterSet {
                min_price: Some(900_000.0),
                ..Default::default()
            },
        );

        tracker.clear_all_behavior_data("u1").await;

        let profile = tracker.profile("u1");
        assert!(profile.searches.is_empty());
        assert!(profile.views.is_empty());
        assert!(profile.filters.is_empty());
        assert!(profile.preferences.is_empty());
        assert_eq!(profile.preferences.price_range, DEFAULT_PRICE_RANGE);

        let adaptations = tracker.ui_adaptations("u1");
        assert!(adaptations.featured_categories.is_empty());
        assert!(adaptations.suggested_searches.is_empty());
        assert_eq!(adaptations.preferred_price_range, DEFAULT_PRICE_RANGE);
    }

    #[tokio::test]
    async fn adaptations_surface_top_signals() {
        let tracker = ProfileTracker::new(TestSink::new(false));
        tracker.track_search("u1", "condo with gym");
        tracker.track_search("u1", "condo with gym");
        tracker.track_search("u1", "midtown condo");
        for _ in 0..3 {
            tracker.track_property_view("u1", &property("p1", PropertyType::Condo, "Midtown", &["gym", "pool"]), None);
        }
        tracker.track_property_view("u1", &property("p2", PropertyType::House, "Oak Park", &["garden"]), None);

        let adaptations = tracker.ui_adaptations("u1");
        assert_eq!(adaptations.featured_categories[0], "condo");
        assert_eq!(adaptations.highlighted_amenities[0], "gym");
        // duplicates collapse, most recent first
        assert_eq!(
            adaptations.suggested_searches,
            vec!["midtown condo".to_string(), "condo with gym".to_string()]
        );
    }
}
