//! Prediction result evaluation
//!
//! Derives the view-model the shell renders from a prediction and the
//! user's corrected FEN. Nothing here is stored; call [`evaluate`] again
//! whenever either input changes.

use chesseye_common::api::PredictionResponse;
use chesseye_common::config::TomlConfig;
use chesseye_common::fen::{self, PositionError};
use serde::Serialize;
use std::fmt;

/// Confidence below which a prediction is flagged for review
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Fewest pieces for a prediction to count as a real detection
pub const MIN_PIECE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationThresholds {
    pub low_confidence_threshold: f64,
    pub min_piece_count: usize,
}

impl Default for EvaluationThresholds {
    fn default() -> Self {
        Self {
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
            min_piece_count: MIN_PIECE_COUNT,
        }
    }
}

impl EvaluationThresholds {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            low_confidence_threshold: config.low_confidence_threshold,
            min_piece_count: config.min_piece_count,
        }
    }
}

/// What the shell should show for a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    /// Detection failed or found too few pieces
    DetectionFailed,
    /// Board found but no pieces on it
    EmptyBoard,
    /// Usable, but the model was unsure
    LowConfidence,
    Valid,
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionStatus::DetectionFailed => write!(f, "Detection Failed"),
            PredictionStatus::EmptyBoard => write!(f, "Empty Board Detected"),
            PredictionStatus::LowConfidence => write!(f, "Low Confidence"),
            PredictionStatus::Valid => write!(f, "Valid"),
        }
    }
}

/// Derived view of a prediction plus the user's corrections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionValidationResult {
    /// Corrected FEN when present, otherwise the predicted one
    pub current_fen: Option<String>,
    /// Computed from the predicted FEN, not the corrected one
    pub is_empty_board: bool,
    /// Computed from the predicted FEN, not the corrected one
    pub piece_count: usize,
    pub confidence_score: f64,
    pub is_low_confidence: bool,
    /// Computed from `current_fen`
    #[serde(serialize_with = "serialize_position_error")]
    pub position_validation_error: Option<PositionError>,
    pub has_valid_prediction: bool,
}

fn serialize_position_error<S>(
    error: &Option<PositionError>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

impl PositionValidationResult {
    pub fn status(&self) -> PredictionStatus {
        if !self.has_valid_prediction {
            if self.is_empty_board {
                PredictionStatus::EmptyBoard
            } else {
                PredictionStatus::DetectionFailed
            }
        } else if self.is_low_confidence {
            PredictionStatus::LowConfidence
        } else {
            PredictionStatus::Valid
        }
    }

    /// Confidence as a percentage with one decimal, e.g. `"85.0%"`
    pub fn confidence_label(&self) -> String {
        format!("{:.1}%", self.confidence_score * 100.0)
    }

    /// Explanation shown when there is no usable prediction
    ///
    /// `None` when the prediction is usable. `server_message` is the
    /// prediction's own message, used when nothing more specific applies.
    pub fn failure_message(
        &self,
        thresholds: &EvaluationThresholds,
        server_message: Option<&str>,
    ) -> Option<String> {
        if self.has_valid_prediction {
            return None;
        }
        let message = if self.is_empty_board {
            "No chess pieces were detected on the board. Please ensure the image is clear and well-lit."
                .to_string()
        } else if self.piece_count < thresholds.min_piece_count {
            format!(
                "Only {} piece(s) detected. This may not be a valid chess position.",
                self.piece_count
            )
        } else {
            server_message
                .filter(|m| !m.is_empty())
                .unwrap_or("Unable to detect chess position. Please try another image.")
                .to_string()
        };
        Some(message)
    }
}

/// Evaluate a prediction against the user's corrected FEN
///
/// An empty corrected FEN counts as no correction.
pub fn evaluate(
    prediction: &PredictionResponse,
    corrected_fen: Option<&str>,
    thresholds: &EvaluationThresholds,
) -> PositionValidationResult {
    let predicted_fen = prediction.fen.as_deref().filter(|f| !f.is_empty());
    let current_fen = corrected_fen.filter(|f| !f.is_empty()).or(predicted_fen);

    let is_empty_board = predicted_fen.map(fen::is_empty_board).unwrap_or(true);
    let piece_count = predicted_fen.map(fen::count_pieces).unwrap_or(0);

    let confidence_score = prediction.confidence_score.unwrap_or(0.0);
    let is_low_confidence = confidence_score < thresholds.low_confidence_threshold;

    let position_validation_error = fen::position_validation_error(current_fen);

    let has_valid_prediction = prediction.success
        && predicted_fen.is_some()
        && !is_empty_board
        && piece_count >= thresholds.min_piece_count;

    PositionValidationResult {
        current_fen: current_fen.map(str::to_string),
        is_empty_board,
        piece_count,
        confidence_score,
        is_low_confidence,
        position_validation_error,
        has_valid_prediction,
    }
}
