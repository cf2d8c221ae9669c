//! Static market lookup tables.
//!
//! Initialized once on first access and never mutated afterward, so
//! unsynchronized concurrent reads are safe. Misses never error; they
//! resolve to the documented fallback rates.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::{MarketLevel, PropertyType};

/// Fallback annual growth rate for neighborhoods absent from the table (%)
pub const DEFAULT_NEIGHBORHOOD_GROWTH: f64 = 4.5;

/// Fallback annual growth rate for property types absent from the table (%)
pub const DEFAULT_TYPE_GROWTH: f64 = 4.0;

/// Annual appreciation rate per neighborhood (%)
static NEIGHBORHOOD_GROWTH: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    HashMap::from([
        ("Downtown", 6.8),
        ("Riverside", 5.9),
        ("Midtown", 5.2),
        ("Arts District", 5.1),
        ("University Heights", 4.9),
        ("Harbor Point", 4.6),
        ("Oak Park", 4.2),
        ("Maplewood", 3.8),
        ("Westfield", 3.4),
        ("Cedar Hollow", 2.9),
        ("Brookside", 2.6),
        ("Fairview", 2.2),
    ])
});

/// Annual appreciation rate per property type (%)
static PROPERTY_TYPE_GROWTH: LazyLock<HashMap<PropertyType, f64>> = LazyLock::new(|| {
    HashMap::from([
        (PropertyType::Condo, 5.0),
        (PropertyType::Apartment, 4.8),
        (PropertyType::Loft, 4.6),
        (PropertyType::House, 4.5),
        (PropertyType::Townhouse, 4.4),
        (PropertyType::Land, 3.5),
    ])
});

/// Amenities that carry a valuation premium
static PREMIUM_AMENITIES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HashSet::from(["pool", "gym", "doorman", "parking", "garden"]));

/// Snapshot of broad market conditions
#[derive(Debug, Clone, Copy)]
pub struct MarketFactors {
    pub mortgage_rate: f64,
    pub inventory_level: MarketLevel,
    pub buyer_demand_index: f64,
}

static MARKET_FACTORS: LazyLock<MarketFactors> = LazyLock::new(|| MarketFactors {
    mortgage_rate: 6.4,
    inventory_level: MarketLevel::Moderate,
    buyer_demand_index: 0.62,
});

/// Growth rate for a neighborhood, falling back for unknown names
pub fn neighborhood_growth(neighborhood: &str) -> f64 {
    NEIGHBORHOOD_GROWTH
        .get(neighborhood)
        .copied()
        .unwrap_or(DEFAULT_NEIGHBORHOOD_GROWTH)
}

/// Growth rate for a property type, falling back for unmapped types
pub fn property_type_growth(property_type: PropertyType) -> f64 {
    PROPERTY_TYPE_GROWTH
        .get(&property_type)
        .copied()
        .unwrap_or(DEFAULT_TYPE_GROWTH)
}

/// Whether an amenity belongs to the fixed premium set
pub fn is_premium_amenity(amenity: &str) -> bool {
    PREMIUM_AMENITIES.contains(amenity.to_ascii_lowercase().as_str())
}

/// Whether any of the listed amenities is premium
pub fn has_premium_amenity(amenities: &[String]) -> bool {
    amenities.iter().any(|a| is_premium_amenity(a))
}

pub fn market_factors() -> MarketFactors {
    *MARKET_FACTORS
}
