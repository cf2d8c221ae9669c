//! Neighborhood market-trend synthesis.
//!
//! Produces a trend summary and a 12-month synthetic price-index series.
//! The series compounds monthly at the neighborhood rate scaled by a
//! per-point jitter draw, so output is non-deterministic unless the
//! synthesizer is seeded.

use chrono::{DateTime, Datelike, Utc};
use estate_core::tables;
use estate_core::{MarketLevel, MarketTrend, PricePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HISTORY_POINTS: usize = 12;
const BASE_INDEX: f64 = 100.0;
const JITTER_LOW: f64 = 0.9;
const JITTER_HIGH: f64 = 1.1;
const HIGH_DEMAND_TREND: f64 = 5.0;
const LOW_DEMAND_TREND: f64 = 3.0;

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub struct MarketTrendSynthesizer {
    rng: StdRng,
}

impl Default for MarketTrendSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketTrendSynthesizer {
    /// Entropy-seeded synthesizer for production use
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic synthesizer; identical seeds reproduce identical series
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Synthesize the trend summary for a neighborhood as of `as_of`.
    pub fn synthesize(&mut self, neighborhood: &str, as_of: DateTime<Utc>) -> MarketTrend {
        let current_trend = tables::neighborhood_growth(neighborhood);
        let monthly_rate = current_trend / 12.0 / 100.0;

        let mut price_history = Vec::with_capacity(HISTORY_POINTS);
        let mut value = BASE_INDEX;
        for (i, month) in trailing_month_labels(as_of).into_iter().enumerate() {
            if i > 0 {
                let jitter = self.rng.gen_range(JITTER_LOW..=JITTER_HIGH);
                value *= 1.0 + monthly_rate * jitter;
            }
            price_history.push(PricePoint {
                month,
                value: (value * 100.0).round() / 100.0,
            });
        }

        let forecast_jitter = self.rng.gen_range(JITTER_LOW..=JITTER_HIGH);
        let trend = MarketTrend {
            neighborhood: neighborhood.to_string(),
            current_trend,
            forecast: current_trend * forecast_jitter,
            demand: demand_level(current_trend),
            supply: tables::market_factors().inventory_level,
            price_history,
        };

        tracing::debug!(
            neighborhood,
            current_trend,
            forecast = trend.forecast,
            "market trend synthesized"
        );

        trend
    }
}

/// Inclusive lower bounds, checked top-down.
fn demand_level(trend: f64) -> MarketLevel {
    if trend >= HIGH_DEMAND_TREND {
        MarketLevel::High
    } else if trend >= LOW_DEMAND_TREND {
        MarketLevel::Moderate
    } else {
        MarketLevel::Low
    }
}

/// Trailing 12 abbreviated month names ending at the as-of month
fn trailing_month_labels(as_of: DateTime<Utc>) -> Vec<String> {
    let current = as_of.month0() as usize;
    (0..HISTORY_POINTS)
        .map(|i| MONTH_ABBREVS[(current + 1 + i) % 12].to_string())
        .collect()
}
