//! Prediction evaluation and the per-image session

pub mod evaluator;
pub mod session;

pub use evaluator::{
    evaluate, EvaluationThresholds, PositionValidationResult, PredictionStatus,
    LOW_CONFIDENCE_THRESHOLD, MIN_PIECE_COUNT,
};
pub use session::{PredictionSession, RepredictOutcome, SwitchStatus};
