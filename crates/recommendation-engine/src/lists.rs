//! Recommendation list assembly.
//!
//! Pure functions over a catalog slice, a preference snapshot and the
//! user's settings. A property that fails validation is excluded with a
//! warning and never aborts the rest of the batch.

use behavior_profile::PreferenceSnapshot;
use chrono::Utc;
use estate_core::{ListKind, PropertyRecord, Recommendation, RecommendationSettings};

use crate::scorer::RecommendationScorer;

fn recommendation(
    user_id: &str,
    property: &PropertyRecord,
    score: f64,
    reasons: Vec<String>,
    source: ListKind,
) -> Recommendation {
    Recommendation {
        id: format!("{}-{}-{}", source.as_str(), user_id, property.id),
        user_id: user_id.to_string(),
        property_id: property.id.clone(),
        property: property.clone(),
        match_score: score,
        reasons,
        source,
        is_viewed: false,
        created_at: Utc::now(),
        explanation: None,
    }
}

fn valid(property: &PropertyRecord) -> bool {
    if property.price <= 0.0 || property.id.is_empty() {
        tracing::warn!(
            property_id = %property.id,
            price = property.price,
            "property excluded from scoring batch"
        );
        return false;
    }
    true
}

fn sort_by_score(items: &mut [Recommendation]) {
    items.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Personal-fit list, threshold-filtered and capped.
pub fn personalized(
    user_id: &str,
    catalog: &[PropertyRecord],
    snapshot: &PreferenceSnapshot,
    settings: &RecommendationSettings,
    scorer: &dyn RecommendationScorer,
) -> Vec<Recommendation> {
    let mut items: Vec<Recommendation> = catalog
        .iter()
        .filter(|p| valid(p))
        .filter_map(|p| {
            let score = scorer.match_score(p, snapshot);
            (score >= settings.min_match_score).then(|| {
                recommendation(
                    user_id,
                    p,
                    score,
                    scorer.reasons(p, snapshot),
                    ListKind::Personalized,
                )
            })
        })
        .collect();

    sort_by_score(&mut items);
    items.truncate(settings.max_recommendations_per_day as usize);
    items
}

/// Same threshold as Personalized, restricted to properties listed after
/// the profile's last-seen timestamp.
pub fn new_listings(
    user_id: &str,
    catalog: &[PropertyRecord],
    snapshot: &PreferenceSnapshot,
    settings: &RecommendationSettings,
    scorer: &dyn RecommendationScorer,
) -> Vec<Recommendation> {
    let mut items: Vec<Recommendation> = catalog
        .iter()
        .filter(|p| valid(p) && p.created_at > snapshot.last_seen_at)
        .filter_map(|p| {
            let score = scorer.match_score(p, snapshot);
            (score >= settings.min_match_score).then(|| {
                recommendation(
                    user_id,
                    p,
                    score,
                    scorer.reasons(p, snapshot),
                    ListKind::NewListings,
                )
            })
        })
        .collect();

    sort_by_score(&mut items);
    items.truncate(settings.max_recommendations_per_day as usize);
    items
}

/// Popularity-ranked list. Exempt from the match-score threshold.
pub fn trending(
    user_id: &str,
    catalog: &[PropertyRecord],
    settings: &RecommendationSettings,
    scorer: &dyn RecommendationScorer,
) -> Vec<Recommendation> {
    let mut items: Vec<Recommendation> = catalog
        .iter()
        .filter(|p| valid(p))
        .map(|p| {
            let score = scorer.trend_score(p);
            let reasons = vec![format!(
                "{} is one of the fastest-moving markets right now",
                p.location.neighborhood
            )];
            recommendation(user_id, p, score, reasons, ListKind::Trending)
        })
        .collect();

    sort_by_score(&mut items);
    items.truncate(settings.max_recommendations_per_day as usize);
    items
}

/// Merge lists by precedence, deduplicating on property id. Tolerates any
/// subset of sources being present.
pub fn merge_all(sources: &[&[Recommendation]]) -> Vec<Recommendation> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for list in sources {
        for rec in *list {
            if seen.insert(rec.property_id.clone()) {
                merged.push(rec.clone());
            }
        }
    }
    merged
}
