//! Request/response types for the board recognition API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fen::BoardMatrix;

// ========================================
// Prediction Types
// ========================================

/// Outcome of one board recognition call
///
/// Replaced wholesale whenever a new prediction is obtained; never mutated.
///
/// # Examples
///
/// ```
/// use chesseye_common::api::PredictionResponse;
///
/// let json = r#"{"success": true, "prediction_id": 7, "fen": "8/8/8/8/8/8/8/8 w - - 0 1"}"#;
/// let prediction: PredictionResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(prediction.prediction_id, Some(7));
/// assert!(prediction.confidence_score.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    /// Server-side record id, used later to submit a correction
    #[serde(default)]
    pub prediction_id: Option<i64>,
    /// Best-guess position; may be null even on success
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub board_matrix: Option<BoardMatrix>,
    /// Model confidence (0.0-1.0)
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub board_detected: Option<bool>,
    /// Human-readable failure explanation
    #[serde(default)]
    pub message: Option<String>,
}

impl PredictionResponse {
    /// Failed prediction carrying only a message
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Stored prediction record (`GET /predict/{id}`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PredictionDetailResponse {
    pub id: i64,
    #[serde(default)]
    pub predicted_fen: Option<String>,
    #[serde(default)]
    pub predicted_matrix: Option<BoardMatrix>,
    #[serde(default)]
    pub corrected_fen: Option<String>,
    #[serde(default)]
    pub corrected_matrix: Option<BoardMatrix>,
    #[serde(default)]
    pub device_identifier: String,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub corrected_at: Option<String>,
    #[serde(default)]
    pub board_detected: Option<bool>,
    #[serde(default)]
    pub has_correction: bool,
    #[serde(default)]
    pub is_successful: bool,
}

// ========================================
// Correction Types
// ========================================

/// User correction submitted against a prior prediction (`POST /predict/correct`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CorrectionRequest {
    pub prediction_id: i64,
    pub corrected_fen: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorrectionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub prediction_id: Option<i64>,
    #[serde(default)]
    pub corrected_fen: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecentCorrection {
    pub id: i64,
    #[serde(default)]
    pub predicted_fen: Option<String>,
    #[serde(default)]
    pub corrected_fen: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub device_identifier: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub corrected_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecentCorrectionsResponse {
    pub count: usize,
    #[serde(default)]
    pub corrections: Vec<RecentCorrection>,
}

// ========================================
// Service Switching Types
// ========================================

/// Inference backend selection (`POST /service/switch`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceSwitchRequest {
    pub service_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceSwitchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub previous_service: String,
    #[serde(default)]
    pub new_service: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Currently active inference backend (`GET /service/current`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CurrentServiceResponse {
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub service_loaded: bool,
    #[serde(default)]
    pub service_info: Option<Value>,
    #[serde(default)]
    pub available_services: Vec<String>,
    #[serde(default)]
    pub message: String,
}

impl CurrentServiceResponse {
    /// Active service type
    ///
    /// The backend sometimes reports an empty `service_type`; in that case
    /// `service_info.service_type` is used instead.
    pub fn effective_service_type(&self) -> Option<&str> {
        self.service_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.service_info
                    .as_ref()?
                    .get("service_type")?
                    .as_str()
                    .filter(|s| !s.is_empty())
            })
    }
}

// ========================================
// Statistics and Status Types
// ========================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatsResponse {
    pub total_predictions: u64,
    pub successful_predictions: u64,
    pub failed_predictions: u64,
    pub corrections_submitted: u64,
    pub average_processing_time_ms: f64,
    pub average_confidence: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RetrainingStatusResponse {
    pub total_corrections: u64,
    pub corrections_since_last_model: u64,
    pub retrain_threshold: u64,
    pub needs_retraining: bool,
    pub corrections_until_retrain: u64,
    #[serde(default)]
    pub last_model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub model_ready: bool,
    #[serde(default)]
    pub database_ready: bool,
    #[serde(default)]
    pub timestamp: String,
}

/// Server-side FEN validation (`GET /validate/fen`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FenValidationResponse {
    pub valid: bool,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub board_matrix: Option<BoardMatrix>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Non-sensitive server configuration (`GET /config/info`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInfoResponse {
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub model_input_size: Option<(u32, u32)>,
    #[serde(default)]
    pub max_image_size_mb: f64,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub retrain_threshold: u64,
    #[serde(default)]
    pub retrain_enabled: bool,
    #[serde(default)]
    pub database_type: String,
    #[serde(default)]
    pub debug_mode: bool,
}
