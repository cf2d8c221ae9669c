pub mod explanation;
pub mod hub;
pub mod lists;
pub mod scorer;
pub mod settings;

pub use explanation::{ExplanationGenerator, TemplateComposer};
pub use hub::RecommendationHub;
pub use scorer::{RecommendationScorer, ScoringWeights, WeightedScorer};
pub use settings::SqliteSettingsStore;
