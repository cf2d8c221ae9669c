pub mod models;
pub mod store;
pub mod tracker;

pub use models::{BehaviorProfile, PreferenceSnapshot, UiAdaptations};
pub use store::SqliteBehaviorSink;
pub use tracker::ProfileTracker;
