//! Property match scoring.
//!
//! Computes a normalized [0, 1] compatibility score between a preference
//! snapshot and a property from weighted factor fits, plus a separate
//! trend score for the Trending list that bypasses personal fit entirely.

use behavior_profile::PreferenceSnapshot;
use estate_core::{tables, PropertyRecord};

/// Neighborhood growth rate at which trend score saturates (%)
const TREND_SATURATION: f64 = 8.0;

/// Factor weights for the personal match score
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub price_weight: f64,
    pub type_weight: f64,
    pub location_weight: f64,
    pub amenity_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price_weight: 0.30,
            type_weight: 0.25,
            location_weight: 0.25,
            amenity_weight: 0.20,
        }
    }
}

/// Per-factor fit values, each in [0, 1]
#[derive(Debug, Clone, Copy)]
pub struct FactorFits {
    pub price_fit: f64,
    pub type_fit: f64,
    pub location_fit: f64,
    pub amenity_fit: f64,
}

/// Scoring seam so list assembly can be exercised with fixed scores
pub trait RecommendationScorer: Send + Sync {
    fn match_score(&self, property: &PropertyRecord, snapshot: &PreferenceSnapshot) -> f64;
    fn trend_score(&self, property: &PropertyRecord) -> f64;
    fn reasons(&self, property: &PropertyRecord, snapshot: &PreferenceSnapshot) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    weights: ScoringWeights,
}

impl WeightedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Individual factor fits for a property against a snapshot
    pub fn factor_fits(
        &self,
        property: &PropertyRecord,
        snapshot: &PreferenceSnapshot,
    ) -> FactorFits {
        FactorFits {
            price_fit: price_fit(property.price, snapshot.price_range),
            type_fit: ranked_fit(
                property.property_type.as_str(),
                &snapshot.ranked_types(),
            ),
            location_fit: ranked_fit(
                &property.location.neighborhood,
                &snapshot.ranked_locations(),
            ),
            amenity_fit: amenity_fit(&property.amenities, &snapshot.ranked_amenities()),
        }
    }
}

impl RecommendationScorer for WeightedScorer {
    fn match_score(&self, property: &PropertyRecord, snapshot: &PreferenceSnapshot) -> f64 {
        let fits = self.factor_fits(property, snapshot);
        let w = &self.weights;
        let score = fits.price_fit * w.price_weight
            + fits.type_fit * w.type_weight
            + fits.location_fit * w.location_weight
            + fits.amenity_fit * w.amenity_weight;
        score.clamp(0.0, 1.0)
    }

    /// Popularity signal: neighborhood appreciation normalized to [0, 1]
    /// with a small premium-amenity kicker. Personal fit plays no part.
    fn trend_score(&self, property: &PropertyRecord) -> f64 {
        let growth = tables::neighborhood_growth(&property.location.neighborhood);
        let mut score = (growth / TREND_SATURATION).clamp(0.0, 1.0);
        if tables::has_premium_amenity(&property.amenities) {
            score += 0.05;
        }
        score.clamp(0.0, 1.0)
    }

    fn reasons(&self, property: &PropertyRecord, snapshot: &PreferenceSnapshot) -> Vec<String> {
        let fits = self.factor_fits(property, snapshot);
        let mut candidates = vec![
            (fits.price_fit, "Fits your preferred price range".to_string()),
            (
                fits.type_fit,
                format!("Matches the {} listings you browse", property.property_type.as_str()),
            ),
            (
                fits.location_fit,
                format!("Located in {}, an area you favor", property.location.neighborhood),
            ),
            (
                fits.amenity_fit,
                "Offers amenities you look for".to_string(),
            ),
        ];
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates
            .into_iter()
            .filter(|(fit, _)| *fit >= 0.7)
            .take(3)
            .map(|(_, reason)| reason)
            .collect()
    }
}

/// 1.0 inside the range, decaying with relative distance outside it
fn price_fit(price: f64, (lo, hi): (f64, f64)) -> f64 {
    if price >= lo && price <= hi {
        1.0
    } else if price < lo {
        (1.0 - (lo - price) / lo).clamp(0.0, 1.0)
    } else {
        (1.0 - (price - hi) / hi).clamp(0.0, 1.0)
    }
}

/// Fit against a ranked preference list: top entry 1.0, any other entry
/// 0.7, absent 0.25, no preferences yet 0.5 (neutral).
fn ranked_fit(value: &str, ranked: &[String]) -> f64 {
    if ranked.is_empty() {
        0.5
    } else if ranked.first().map(String::as_str) == Some(value) {
        1.0
    } else if ranked.iter().any(|r| r == value) {
        0.7
    } else {
        0.25
    }
}

/// Overlap between the property's amenities and the user's top amenities
fn amenity_fit(amenities: &[String], ranked: &[String]) -> f64 {
    if ranked.is_empty() {
        return 0.5;
    }
    let top: Vec<&String> = ranked.iter().take(5).collect();
    let hits = top
        .iter()
        .filter(|r| amenities.iter().any(|a| a.eq_ignore_ascii_case(r)))
        .count();
    hits as f64 / top.len() as f64
}
