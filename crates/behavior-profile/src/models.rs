//! Behavior history and derived preference snapshot models.

use chrono::{DateTime, Utc};
use estate_core::FilterSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default preferred price range before any filter has been observed
pub const DEFAULT_PRICE_RANGE: (f64, f64) = (100_000.0, 750_000.0);

/// How far the price bounds move toward a newly applied filter range
pub const PRICE_RANGE_BLEND: f64 = 0.3;

/// Views with at least this dwell time count double toward rankings
pub const ENGAGED_DWELL_SECS: u64 = 60;

pub const MAX_SEARCH_HISTORY: usize = 50;
pub const MAX_VIEW_HISTORY: usize = 100;
pub const MAX_FILTER_HISTORY: usize = 50;

/// A single issued search query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEvent {
    pub query: String,
    pub at: DateTime<Utc>,
}

/// A single property view, with dwell time when the UI reported one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewEvent {
    pub property_id: String,
    pub dwell_secs: Option<u64>,
    pub at: DateTime<Utc>,
}

/// A single applied filter set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterEvent {
    pub filters: FilterSet,
    pub at: DateTime<Utc>,
}

/// Derived preference state, recomputed incrementally as events arrive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    /// Preferred price bounds (lo, hi)
    pub price_range: (f64, f64),
    /// Occurrence-weighted counts feeding the ranked lists
    pub type_counts: HashMap<String, u32>,
    pub location_counts: HashMap<String, u32>,
    pub amenity_counts: HashMap<String, u32>,
    /// Most recent tracked activity; new-listing cutoff
    pub last_seen_at: DateTime<Utc>,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self {
            price_range: DEFAULT_PRICE_RANGE,
            type_counts: HashMap::new(),
            location_counts: HashMap::new(),
            amenity_counts: HashMap::new(),
            last_seen_at: Utc::now(),
        }
    }
}

impl PreferenceSnapshot {
    /// Keys of `counts` ranked by descending count, ties broken by name
    fn ranked(counts: &HashMap<String, u32>) -> Vec<String> {
        let mut entries: Vec<_> = counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn ranked_types(&self) -> Vec<String> {
        Self::ranked(&self.type_counts)
    }

    pub fn ranked_locations(&self) -> Vec<String> {
        Self::ranked(&self.location_counts)
    }

    pub fn ranked_amenities(&self) -> Vec<String> {
        Self::ranked(&self.amenity_counts)
    }

    /// Whether any preference signal has been observed yet
    pub fn is_empty(&self) -> bool {
        self.type_counts.is_empty()
            && self.location_counts.is_empty()
            && self.amenity_counts.is_empty()
    }
}

/// Per-user behavior history plus the derived snapshot.
/// Histories are append-only (most-recent-first, bounded) except for an
/// explicit clear, which resets everything to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub user_id: String,
    pub searches: Vec<SearchEvent>,
    pub views: Vec<ViewEvent>,
    pub filters: Vec<FilterEvent>,
    pub preferences: PreferenceSnapshot,
}

impl BehaviorProfile {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            searches: Vec::new(),
            views: Vec::new(),
            filters: Vec::new(),
            preferences: PreferenceSnapshot::default(),
        }
    }
}

/// UI hints derived from the snapshot for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiAdaptations {
    pub featured_categories: Vec<String>,
    pub highlighted_amenities: Vec<String>,
    pub suggested_searches: Vec<String>,
    pub preferred_price_range: (f64, f64),
}
