//! Prediction session and service-switch coordination
//!
//! A session owns one photographed board: the source image, the active
//! prediction, the user's corrected FEN and the submission flow for that
//! prediction. When the inference backend changes, the same image is
//! re-predicted and the new result replaces the old one wholesale.
//!
//! Re-prediction requests are numbered. Only the latest request may apply
//! its result; a slower, older response is dropped so it can never
//! overwrite a newer prediction.

use chesseye_common::api::PredictionResponse;
use chesseye_common::config::TomlConfig;
use chesseye_common::events::{ChessEyeEvent, EventBus};
use chrono::Utc;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::evaluator::{evaluate, EvaluationThresholds, PositionValidationResult};
use crate::services::gateway::{GatewayError, ImageRef, PredictionGateway};
use crate::submission::{SubmissionFlow, SubmitOutcome};

/// State of the most recent service switch / re-prediction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SwitchStatus {
    #[default]
    Settled,
    /// Re-prediction in flight
    Pending,
    /// Last switch or re-prediction failed; prediction left untouched
    Failed(String),
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchStatus::Settled => write!(f, "settled"),
            SwitchStatus::Pending => write!(f, "Getting prediction from new service..."),
            SwitchStatus::Failed(message) => {
                write!(f, "Failed to get new prediction: {}", message)
            }
        }
    }
}

/// What happened to a re-prediction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepredictOutcome {
    /// New prediction is now active
    Replaced,
    /// A newer request was issued meanwhile; result dropped
    Discarded,
    Failed,
}

#[derive(Debug)]
struct SessionState {
    prediction: PredictionResponse,
    corrected_fen: Option<String>,
    status: SwitchStatus,
    latest_request: u64,
}

#[derive(Debug)]
pub struct PredictionSession {
    image: ImageRef,
    state: Mutex<SessionState>,
    submission: SubmissionFlow,
    events: EventBus,
}

impl PredictionSession {
    pub fn new(image: ImageRef, prediction: PredictionResponse, events: EventBus) -> Self {
        let submission = SubmissionFlow::new(events.clone());
        Self::with_submission(image, prediction, submission, events)
    }

    pub fn from_config(
        image: ImageRef,
        prediction: PredictionResponse,
        config: &TomlConfig,
        events: EventBus,
    ) -> Self {
        let submission = SubmissionFlow::from_config(config, events.clone());
        Self::with_submission(image, prediction, submission, events)
    }

    pub fn with_submission(
        image: ImageRef,
        prediction: PredictionResponse,
        submission: SubmissionFlow,
        events: EventBus,
    ) -> Self {
        Self {
            image,
            state: Mutex::new(SessionState {
                prediction,
                corrected_fen: None,
                status: SwitchStatus::Settled,
                latest_request: 0,
            }),
            submission,
            events,
        }
    }

    /// Predict `image` and open a session on the result
    pub async fn start<G>(
        gateway: &G,
        image: ImageRef,
        config: &TomlConfig,
        events: EventBus,
    ) -> crate::Result<Self>
    where
        G: PredictionGateway + ?Sized,
    {
        let prediction = gateway.predict_position(&image).await?;
        Ok(Self::from_config(image, prediction, config, events))
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn prediction(&self) -> PredictionResponse {
        self.lock().prediction.clone()
    }

    pub fn corrected_fen(&self) -> Option<String> {
        self.lock().corrected_fen.clone()
    }

    pub fn switch_status(&self) -> SwitchStatus {
        self.lock().status.clone()
    }

    pub fn submission(&self) -> &SubmissionFlow {
        &self.submission
    }

    /// Board edit handler
    pub fn set_corrected_fen(&self, fen: impl Into<String>) {
        self.lock().corrected_fen = Some(fen.into());
    }

    /// View-model for the active prediction and correction
    pub fn evaluation(&self, thresholds: &EvaluationThresholds) -> PositionValidationResult {
        let state = self.lock();
        evaluate(
            &state.prediction,
            state.corrected_fen.as_deref(),
            thresholds,
        )
    }

    /// Submit the current correction for the active prediction
    pub async fn submit_correction<G>(&self, gateway: &G) -> SubmitOutcome
    where
        G: PredictionGateway + ?Sized,
    {
        let (prediction_id, corrected_fen) = {
            let state = self.lock();
            (state.prediction.prediction_id, state.corrected_fen.clone())
        };
        self.submission
            .submit(gateway, prediction_id, corrected_fen.as_deref())
            .await
    }

    /// Re-predict the source image after the backend changed
    ///
    /// On success the prediction is replaced, the corrected FEN cleared and
    /// the submission flow reset. On failure everything is kept and the
    /// status carries the error.
    pub async fn on_service_switched<G>(&self, gateway: &G) -> RepredictOutcome
    where
        G: PredictionGateway + ?Sized,
    {
        let request = {
            let mut state = self.lock();
            state.latest_request += 1;
            state.status = SwitchStatus::Pending;
            state.latest_request
        };

        info!(request, "Service switched, getting fresh prediction");
        let result = gateway.predict_position(&self.image).await;

        let mut state = self.lock();
        if state.latest_request != request {
            debug!(
                request,
                latest = state.latest_request,
                "Discarding stale prediction response"
            );
            return RepredictOutcome::Discarded;
        }

        match result {
            Ok(prediction) => {
                let prediction_id = prediction.prediction_id;
                state.prediction = prediction;
                state.corrected_fen = None;
                state.status = SwitchStatus::Settled;
                drop(state);

                self.submission.reset();
                info!(prediction_id, "Fresh prediction received");
                self.events.emit_lossy(ChessEyeEvent::PredictionReplaced {
                    prediction_id,
                    timestamp: Utc::now(),
                });
                RepredictOutcome::Replaced
            }
            Err(e) => {
                let message = e.to_string();
                state.status = SwitchStatus::Failed(message.clone());
                drop(state);

                warn!(error = %message, "Failed to get fresh prediction");
                self.events.emit_lossy(ChessEyeEvent::RepredictionFailed {
                    message,
                    timestamp: Utc::now(),
                });
                RepredictOutcome::Failed
            }
        }
    }

    /// Switch the backend to `service_type`, then re-predict
    ///
    /// A rejected switch marks the status failed without touching the
    /// prediction, unless a re-prediction is still pending.
    pub async fn switch_and_repredict<G>(&self, gateway: &G, service_type: &str) -> RepredictOutcome
    where
        G: PredictionGateway + ?Sized,
    {
        let switched = match gateway.switch_service(service_type).await {
            Ok(response) if response.success => Ok(response),
            Ok(response) => Err(GatewayError::Api {
                status: 200,
                message: response.message,
            }),
            Err(e) => Err(e),
        };

        match switched {
            Ok(response) => {
                info!(
                    previous = %response.previous_service,
                    new = %response.new_service,
                    "Inference service switched"
                );
                self.events.emit_lossy(ChessEyeEvent::ServiceSwitched {
                    previous_service: response.previous_service,
                    new_service: response.new_service,
                    timestamp: Utc::now(),
                });
                self.on_service_switched(gateway).await
            }
            Err(e) => {
                warn!(service_type, error = %e, "Service switch failed");
                let mut state = self.lock();
                // An in-flight re-prediction owns the status until it lands
                if state.status != SwitchStatus::Pending {
                    state.status = SwitchStatus::Failed(e.to_string());
                }
                RepredictOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_status_display() {
        assert_eq!(
            SwitchStatus::Pending.to_string(),
            "Getting prediction from new service..."
        );
        assert_eq!(
            SwitchStatus::Failed("timeout".to_string()).to_string(),
            "Failed to get new prediction: timeout"
        );
        assert_eq!(SwitchStatus::default(), SwitchStatus::Settled);
    }

    #[tokio::test]
    async fn test_corrected_fen_and_evaluation() {
        let prediction = PredictionResponse {
            success: true,
            prediction_id: Some(1),
            fen: Some("4k3/8/8/8/8/8/8/4K3 w - - 0 1".to_string()),
            confidence_score: Some(0.8),
            ..PredictionResponse::default()
        };
        let session = PredictionSession::new(
            ImageRef::from_path("board.jpg"),
            prediction,
            EventBus::new(8),
        );

        assert_eq!(session.corrected_fen(), None);
        session.set_corrected_fen("4k3/8/8/8/8/8/8/8 w - - 0 1");

        let evaluation = session.evaluation(&EvaluationThresholds::default());
        assert_eq!(
            session.evaluation(&EvaluationThresholds::default()),
            evaluation
        );
        assert_eq!(
            evaluation.position_validation_error.map(|e| e.to_string()),
            Some("White king missing".to_string())
        );
        assert!(evaluation.has_valid_prediction);
    }
}
