use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a property sits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Category of a listed property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
    Loft,
    Land,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Loft => "loft",
            PropertyType::Land => "land",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "apartment" => PropertyType::Apartment,
            "condo" => PropertyType::Condo,
            "townhouse" => PropertyType::Townhouse,
            "loft" => PropertyType::Loft,
            "land" => PropertyType::Land,
            _ => PropertyType::House,
        }
    }
}

/// A listing as served by the external catalog. Read-only in this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    /// Asking price in dollars; must be > 0 for any analysis
    pub price: f64,
    pub property_type: PropertyType,
    pub location: Location,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: f64,
    pub year_built: i32,
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PropertyRecord {
    /// Property age in years against an explicit as-of year
    pub fn age_as_of(&self, year: i32) -> i32 {
        (year - self.year_built).max(0)
    }
}

/// Qualitative reliability of a price prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    pub fn to_label(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryLow => "Very Low",
            ConfidenceTier::Low => "Low",
            ConfidenceTier::Moderate => "Moderate",
            ConfidenceTier::High => "High",
            ConfidenceTier::VeryHigh => "Very High",
        }
    }
}

/// Investment risk bucket, derived from the prediction confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Attractiveness bucket, derived from 5-year ROI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PotentialTier {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl PotentialTier {
    pub fn to_label(&self) -> &'static str {
        match self {
            PotentialTier::Poor => "Poor",
            PotentialTier::Fair => "Fair",
            PotentialTier::Good => "Good",
            PotentialTier::VeryGood => "Very Good",
            PotentialTier::Excellent => "Excellent",
        }
    }
}

/// Demand/supply/inventory bucket for a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketLevel {
    Low,
    Moderate,
    High,
}

/// Price forecast for a single property. Recomputed per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePrediction {
    pub property_id: String,
    pub current_price: f64,
    pub predicted_price_1yr: f64,
    pub predicted_price_3yr: f64,
    pub predicted_price_5yr: f64,
    pub growth_rate_1yr: f64,
    pub growth_rate_3yr: f64,
    pub growth_rate_5yr: f64,
    pub confidence: ConfidenceTier,
}

/// Rule-based investment read on a property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAnalysis {
    pub property_id: String,
    pub potential: PotentialTier,
    pub roi_1yr: f64,
    pub roi_3yr: f64,
    pub roi_5yr: f64,
    pub risk_level: RiskLevel,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
}

/// One point of a synthesized price-index series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub month: String,
    pub value: f64,
}

/// Neighborhood-level trend summary with a 12-month synthetic index history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketTrend {
    pub neighborhood: String,
    /// Annualized growth currently attributed to the neighborhood (%)
    pub current_trend: f64,
    /// Jitter-adjusted forward growth estimate (%)
    pub forecast: f64,
    pub demand: MarketLevel,
    pub supply: MarketLevel,
    pub price_history: Vec<PricePoint>,
}

/// Which recommendation list an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Personalized,
    NewListings,
    Trending,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Personalized => "personalized",
            ListKind::NewListings => "new_listings",
            ListKind::Trending => "trending",
        }
    }
}

/// A scored property suggestion for one user. Ephemeral, recomputed per fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub property: PropertyRecord,
    /// Normalized compatibility between profile and property, 0..=1
    pub match_score: f64,
    pub reasons: Vec<String>,
    pub source: ListKind,
    pub is_viewed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<RecommendationExplanation>,
}

/// One scored factor of an explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationFactor {
    pub title: String,
    pub description: String,
    /// 0..=5
    pub score: f64,
}

/// Human-readable breakdown of why a property was recommended.
/// Generated on demand, discarded on close, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationExplanation {
    pub summary: String,
    pub factors: Vec<ExplanationFactor>,
    pub conclusion: String,
}

/// Per-user recommendation knobs. The only entity this core persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    pub enable_personalized: bool,
    pub enable_similar_properties: bool,
    pub enable_trending: bool,
    pub min_match_score: f64,
    pub notify_on_new_matches: bool,
    pub max_recommendations_per_day: u32,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            enable_personalized: true,
            enable_similar_properties: true,
            enable_trending: true,
            min_match_score: 0.5,
            notify_on_new_matches: true,
            max_recommendations_per_day: 20,
        }
    }
}

/// A filter set a user applied while browsing listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub property_types: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub amenities: Vec<String>,
    pub min_bedrooms: Option<u32>,
}

/// Kind of user interaction with a recommendation, tracked fire-and-forget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    Impression,
    Open,
    Save,
    Dismiss,
    Contact,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Impression => "impression",
            InteractionKind::Open => "open",
            InteractionKind::Save => "save",
            InteractionKind::Dismiss => "dismiss",
            InteractionKind::Contact => "contact",
        }
    }
}
