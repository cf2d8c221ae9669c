//! On-demand recommendation explanations.
//!
//! Factor math is local; summary and conclusion text come from an
//! injected composer collaborator, attempted once. If the composer fails
//! the generator degrades to a fixed fallback instead of erroring, so the
//! enclosing recommendation flow never breaks. Explanations are built
//! only when requested and are never persisted.

use behavior_profile::PreferenceSnapshot;
use estate_core::{
    tables, EstateError, ExplanationFactor, PropertyRecord, Recommendation,
    RecommendationExplanation, TextComposer,
};
use std::sync::Arc;

use crate::scorer::WeightedScorer;

pub const NO_EXPLANATION: &str = "No explanation available.";

/// Renders explanation text locally from templates. Infallible stand-in
/// for a remote text-generation service.
pub struct TemplateComposer;

#[async_trait::async_trait]
impl TextComposer for TemplateComposer {
    async fn compose_summary(
        &self,
        property: &PropertyRecord,
        match_score: f64,
    ) -> Result<String, EstateError> {
        Ok(format!(
            "This {} in {} is a {:.0}% match for your preferences.",
            property.property_type.as_str(),
            property.location.neighborhood,
            match_score * 100.0
        ))
    }

    async fn compose_conclusion(
        &self,
        property: &PropertyRecord,
        match_score: f64,
    ) -> Result<String, EstateError> {
        let verdict = if match_score >= 0.8 {
            "a strong candidate worth a closer look"
        } else if match_score >= 0.6 {
            "a solid option to keep on your shortlist"
        } else {
            "worth a glance if you are browsing broadly"
        };
        Ok(format!(
            "Overall, {} makes this {}.",
            property.location.neighborhood, verdict
        ))
    }
}

pub struct ExplanationGenerator {
    composer: Arc<dyn TextComposer>,
    scorer: WeightedScorer,
}

impl Default for ExplanationGenerator {
    fn default() -> Self {
        Self::new(Arc::new(TemplateComposer))
    }
}

impl ExplanationGenerator {
    pub fn new(composer: Arc<dyn TextComposer>) -> Self {
        Self {
            composer,
            scorer: WeightedScorer::new(),
        }
    }

    /// Build the explanation for one recommendation. Never errors; a
    /// composer failure yields the documented fallback.
    pub async fn explain(
        &self,
        recommendation: &Recommendation,
        snapshot: &PreferenceSnapshot,
    ) -> RecommendationExplanation {
        let property = &recommendation.property;

        let summary = match self
            .composer
            .compose_summary(property, recommendation.match_score)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    recommendation_id = %recommendation.id,
                    error = %e,
                    "explanation composer failed"
                );
                return fallback();
            }
        };
        let conclusion = match self
            .composer
            .compose_conclusion(property, recommendation.match_score)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    recommendation_id = %recommendation.id,
                    error = %e,
                    "explanation composer failed"
                );
                return fallback();
            }
        };

        RecommendationExplanation {
            summary,
            factors: self.factors(property, recommendation.match_score, snapshot),
            conclusion,
        }
    }

    /// 3-5 scored factors, each on a 0-5 scale.
    fn factors(
        &self,
        property: &PropertyRecord,
        match_score: f64,
        snapshot: &PreferenceSnapshot,
    ) -> Vec<ExplanationFactor> {
        let fits = self.scorer.factor_fits(property, snapshot);
        let neighborhood = &property.location.neighborhood;
        let growth = tables::neighborhood_growth(neighborhood);

        let mut factors = vec![
            ExplanationFactor {
                title: "Location".to_string(),
                description: format!(
                    "{neighborhood} compared against the areas you browse most"
                ),
                score: scale(fits.location_fit),
            },
            ExplanationFactor {
                title: "Price & value".to_string(),
                description: format!(
                    "Asking price of ${:.0} against your preferred range",
                    property.price
                ),
                score: scale(fits.price_fit),
            },
            ExplanationFactor {
                title: "Features & amenities".to_string(),
                description: if property.amenities.is_empty() {
                    "No listed amenities to compare".to_string()
                } else {
                    format!("Offers {}", property.amenities.join(", "))
                },
                score: scale(fits.amenity_fit),
            },
            ExplanationFactor {
                title: "Trend & popularity".to_string(),
                description: format!(
                    "{neighborhood} is appreciating around {growth:.1}% annually"
                ),
                score: scale((growth / 8.0).clamp(0.0, 1.0)),
            },
        ];

        if !snapshot.is_empty() {
            factors.push(ExplanationFactor {
                title: "Preference match".to_string(),
                description: "Overall fit with your tracked browsing profile".to_string(),
                score: scale(match_score),
            });
        }

        factors
    }
}

fn scale(fit: f64) -> f64 {
    (fit * 5.0 * 10.0).round() / 10.0
}

fn fallback() -> RecommendationExplanation {
    RecommendationExplanation {
        summary: NO_EXPLANATION.to_string(),
        factors: Vec::new(),
        conclusion: String::new(),
    }
}
