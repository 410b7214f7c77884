// Core algorithm exports
pub mod carbon;
pub mod classify;
pub mod distance;
pub mod matcher;
pub mod scoring;

pub use carbon::{CarbonEstimator, CarbonFactors};
pub use classify::{
    ClassifierBackend, ClassifierError, ClassifierInput, HeuristicClassifier, MaterialClassifier,
    HEURISTIC_VERSION,
};
pub use distance::{haversine_distance, DistanceEstimate, DistanceResolver};
pub use matcher::{MatchEngine, MatchOutcome, DEFAULT_MIN_SCORE};
pub use scoring::{
    build_reasons, distance_score, quantity_fit_score, round_score, ScoreStrategy, ScoredFactors,
    WeightedScoreStrategy,
};
