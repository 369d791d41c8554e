mod error_tracker;
mod scoring;

pub use error_tracker::ErrorTracker;
pub use scoring::{Gradients, ScoringNetwork, ScoringNetworkConfig};
