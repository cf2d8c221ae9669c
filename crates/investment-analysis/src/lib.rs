//! Rule-based investment analysis.
//!
//! Derives ROI per horizon from a price prediction, classifies risk from
//! the prediction's confidence tier, and collects strengths, weaknesses
//! and opportunities from independently evaluated rules. Rules only ever
//! append; no rule removes or overrides another.

use chrono::{Datelike, Utc};
use estate_core::tables;
use estate_core::{
    ConfidenceTier, EstateError, InvestmentAnalysis, PotentialTier, PricePrediction,
    PropertyRecord, RiskLevel,
};

const AFFORDABLE_PRICE: f64 = 300_000.0;
const LUXURY_PRICE: f64 = 1_000_000.0;
const STRONG_NEIGHBORHOOD_GROWTH: f64 = 5.0;
const WEAK_NEIGHBORHOOD_GROWTH: f64 = 3.0;
const STRONG_TYPE_GROWTH: f64 = 4.5;

pub struct InvestmentAnalyzer;

impl Default for InvestmentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl InvestmentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze using the current UTC year for property age.
    pub fn analyze(
        &self,
        property: &PropertyRecord,
        prediction: &PricePrediction,
    ) -> Result<InvestmentAnalysis, EstateError> {
        self.analyze_as_of(property, prediction, Utc::now().year())
    }

    pub fn analyze_as_of(
        &self,
        property: &PropertyRecord,
        prediction: &PricePrediction,
        as_of_year: i32,
    ) -> Result<InvestmentAnalysis, EstateError> {
        if prediction.current_price <= 0.0 {
            return Err(EstateError::Computation(format!(
                "ROI requires a positive current price, got {}",
                prediction.current_price
            )));
        }

        let roi = |predicted: f64| {
            (predicted - prediction.current_price) / prediction.current_price * 100.0
        };
        let roi_1yr = roi(prediction.predicted_price_1yr);
        let roi_3yr = roi(prediction.predicted_price_3yr);
        let roi_5yr = roi(prediction.predicted_price_5yr);

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        let mut opportunities = Vec::new();

        let neighborhood = &property.location.neighborhood;
        let neighborhood_rate = tables::neighborhood_growth(neighborhood);
        if neighborhood_rate > STRONG_NEIGHBORHOOD_GROWTH {
            strengths.push(format!(
                "{neighborhood} is appreciating at {neighborhood_rate:.1}% annually"
            ));
            opportunities.push(format!(
                "Early position in a fast-growing {neighborhood} market"
            ));
        } else if neighborhood_rate < WEAK_NEIGHBORHOOD_GROWTH {
            weaknesses.push(format!(
                "{neighborhood} growth is slow at {neighborhood_rate:.1}% annually"
            ));
        }

        let type_rate = tables::property_type_growth(property.property_type);
        if type_rate > STRONG_TYPE_GROWTH {
            strengths.push(format!(
                "{} demand is outpacing the broader market",
                property.property_type.as_str()
            ));
        }

        if property.price < AFFORDABLE_PRICE {
            strengths.push("Accessible entry price widens the resale pool".to_string());
        } else if property.price > LUXURY_PRICE {
            weaknesses.push("High ticket price narrows the buyer pool".to_string());
            opportunities.push("Luxury segment commands premium rents".to_string());
        }

        let age = property.age_as_of(as_of_year);
        if age < 5 {
            strengths.push("Recent construction keeps maintenance costs low".to_string());
        } else if age > 30 {
            weaknesses.push("Aging structure will need capital upkeep".to_string());
            opportunities.push("Renovation headroom can force appreciation".to_string());
        }

        let analysis = InvestmentAnalysis {
            property_id: property.id.clone(),
            potential: potential_tier(roi_5yr),
            roi_1yr,
            roi_3yr,
            roi_5yr,
            risk_level: risk_level(prediction.confidence),
            strengths,
            weaknesses,
            opportunities,
        };

        tracing::debug!(
            property_id = %property.id,
            roi_5yr,
            potential = analysis.potential.to_label(),
            "investment analysis computed"
        );

        Ok(analysis)
    }
}

/// Risk is a pure function of the prediction confidence tier.
pub fn risk_level(confidence: ConfidenceTier) -> RiskLevel {
    match confidence {
        ConfidenceTier::VeryHigh | ConfidenceTier::High => RiskLevel::Low,
        ConfidenceTier::Moderate => RiskLevel::Medium,
        ConfidenceTier::Low | ConfidenceTier::VeryLow => RiskLevel::High,
    }
}

/// Inclusive lower bounds, checked top-down.
pub fn potential_tier(roi_5yr: f64) -> PotentialTier {
    if roi_5yr >= 25.0 {
        PotentialTier::Excellent
    } else if roi_5yr >= 20.0 {
        PotentialTier::VeryGood
    } else if roi_5yr >= 15.0 {
        PotentialTier::Good
    } else if roi_5yr >= 10.0 {
        PotentialTier::Fair
    } else {
        PotentialTier::Poor
    }
}
