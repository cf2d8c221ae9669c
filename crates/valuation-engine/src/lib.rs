//! Price prediction engine.
//!
//! Combines static neighborhood and property-type growth rates into an
//! adjusted annual growth rate, then projects 1/3/5-year prices with
//! non-compounding horizon multipliers.

use chrono::{Datelike, Utc};
use estate_core::tables;
use estate_core::{ConfidenceTier, EstateError, PricePrediction, PropertyRecord};

/// Weight given to the neighborhood rate when blending with the type rate
const NEIGHBORHOOD_WEIGHT: f64 = 0.6;
const TYPE_WEIGHT: f64 = 0.4;

/// Additive growth adjustments (percentage points)
const NEW_BUILD_BONUS: f64 = 0.5;
const AGED_PENALTY: f64 = -0.7;
const PREMIUM_AMENITY_BONUS: f64 = 0.3;

/// Horizon multipliers approximating compound growth
const THREE_YEAR_MULTIPLIER: f64 = 2.8;
const FIVE_YEAR_MULTIPLIER: f64 = 4.5;

pub struct ValuationEngine;

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Predict prices for a property using the current UTC year for age.
    pub fn predict(&self, property: &PropertyRecord) -> Result<PricePrediction, EstateError> {
        self.predict_as_of(property, Utc::now().year())
    }

    /// Predict prices with an explicit as-of year. Pure function of its
    /// inputs and the static tables.
    pub fn predict_as_of(
        &self,
        property: &PropertyRecord,
        as_of_year: i32,
    ) -> Result<PricePrediction, EstateError> {
        if property.price <= 0.0 {
            return Err(EstateError::InvalidInput(format!(
                "property {} has non-positive price {}",
                property.id, property.price
            )));
        }

        let adjusted = self.adjusted_growth_rate(property, as_of_year);

        let growth_1yr = adjusted;
        let growth_3yr = adjusted * THREE_YEAR_MULTIPLIER;
        let growth_5yr = adjusted * FIVE_YEAR_MULTIPLIER;

        let prediction = PricePrediction {
            property_id: property.id.clone(),
            current_price: property.price,
            predicted_price_1yr: property.price * (1.0 + growth_1yr / 100.0),
            predicted_price_3yr: property.price * (1.0 + growth_3yr / 100.0),
            predicted_price_5yr: property.price * (1.0 + growth_5yr / 100.0),
            growth_rate_1yr: growth_1yr,
            growth_rate_3yr: growth_3yr,
            growth_rate_5yr: growth_5yr,
            confidence: confidence_tier(adjusted),
        };

        tracing::debug!(
            property_id = %property.id,
            adjusted_growth = adjusted,
            confidence = prediction.confidence.to_label(),
            "price prediction computed"
        );

        Ok(prediction)
    }

    /// Blended and adjusted annual growth rate (%) for a property
    pub fn adjusted_growth_rate(&self, property: &PropertyRecord, as_of_year: i32) -> f64 {
        let neighborhood_rate = tables::neighborhood_growth(&property.location.neighborhood);
        let type_rate = tables::property_type_growth(property.property_type);

        let mut rate = neighborhood_rate * NEIGHBORHOOD_WEIGHT + type_rate * TYPE_WEIGHT;

        let age = property.age_as_of(as_of_year);
        if age < 5 {
            rate += NEW_BUILD_BONUS;
        } else if age > 30 {
            rate += AGED_PENALTY;
        }

        if tables::has_premium_amenity(&property.amenities) {
            rate += PREMIUM_AMENITY_BONUS;
        }

        rate
    }
}

/// Tier boundaries are inclusive lower bounds, checked top-down.
/// VeryLow is unreachable from these thresholds; the variant exists for
/// risk derivation completeness.
fn confidence_tier(adjusted_growth: f64) -> ConfidenceTier {
    if adjusted_growth >= 6.0 {
        ConfidenceTier::VeryHigh
    } else if adjusted_growth >= 5.0 {
        ConfidenceTier::High
    } else if adjusted_growth >= 3.0 {
        ConfidenceTier::Moderate
    } else {
        ConfidenceTier::Low
    }
}
