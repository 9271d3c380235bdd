// src/scoring/mod.rs
//! Session performance scoring

pub mod effort;
pub mod performance;
pub mod weights;

pub use effort::RpeRating;
pub use performance::{
    ChannelRates, ComponentWeights, DataCompleteness, PerformanceAggregator, PerformanceScore,
    ScoreInputs, Unconfigured, WeightsResolved,
};
pub use weights::{resolve_weights, ResolvedWeights, ScoringWeights, WeightHierarchy, WeightSource};
