//! Rating computation: statistics, thresholds, classification, reporting

pub mod brackets;
pub mod compare;
pub mod engine;
pub mod hold_harmless;
pub mod reward;
pub mod scenario;
pub mod stats;
pub mod thresholds;

pub use brackets::{
    half_star_units, round_to_half_star, BracketReport, BracketTransition, ShiftDistribution,
    TransitionDirection,
};
pub use compare::{compare_official, CandidateComparison, OfficialComparison, ThresholdDelta};
pub use engine::{
    AnalysisData, AnalysisOptions, AnalysisReport, CohortDeltas, CohortThresholds,
    ContractOutcome, RatingError, ScenarioOutcome, ScenarioSummary, SimulationEngine,
};
pub use hold_harmless::{HoldHarmlessDecision, HoldHarmlessOutcome};
pub use reward::{classify, RewardFactorResult};
pub use scenario::{Scenario, ScenarioKind};
pub use stats::{weighted_mean, ContractStatistics};
pub use thresholds::PercentileThresholds;

// ============================================================================
// Rating Scale
// ============================================================================
// Published ratings live on a fixed star scale; every adjusted rating is
// clamped back onto it after the reward factor and Categorical Adjustment.

/// Lowest publishable star rating.
pub const MIN_RATING: f64 = 1.0;

/// Highest publishable star rating.
pub const MAX_RATING: f64 = 5.0;

/// Clamp a rating onto the publishable scale.
pub fn clamp_rating(rating: f64) -> f64 {
    rating.clamp(MIN_RATING, MAX_RATING)
}
