//! Shared test helpers
//!
//! In-memory [`PredictionGateway`] with scripted responses and delays.

#![allow(dead_code)]

use async_trait::async_trait;
use chesseye_client::services::{GatewayError, ImageRef, PredictionGateway};
use chesseye_common::api::{
    CorrectionRequest, CorrectionResponse, CurrentServiceResponse, PredictionResponse,
    ServiceSwitchResponse,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const ITALIAN_FEN: &str =
    "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";
pub const KINGS_ONLY_FEN: &str = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";

/// Successful prediction with the given id and FEN
pub fn prediction(id: i64, fen: &str, confidence: f64) -> PredictionResponse {
    PredictionResponse {
        success: true,
        prediction_id: Some(id),
        fen: Some(fen.to_string()),
        confidence_score: Some(confidence),
        board_detected: Some(true),
        message: Some("Success".to_string()),
        ..PredictionResponse::default()
    }
}

/// Let spawned tasks and fired timers run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

struct ScriptedPrediction {
    delay: Duration,
    result: Result<PredictionResponse, String>,
}

/// Scripted gateway
///
/// Predictions are served from a queue in call order; each waits for its
/// own delay before answering. Corrections and switches succeed unless a
/// failure message is set.
#[derive(Default)]
pub struct MockGateway {
    predictions: Mutex<VecDeque<ScriptedPrediction>>,
    correction_failure: Mutex<Option<String>>,
    correction_delay: Mutex<Duration>,
    switch_failure: Mutex<Option<String>>,
    corrections: Mutex<Vec<CorrectionRequest>>,
    switches: Mutex<Vec<String>>,
    predict_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prediction(self, prediction: PredictionResponse, delay: Duration) -> Self {
        self.predictions.lock().unwrap().push_back(ScriptedPrediction {
            delay,
            result: Ok(prediction),
        });
        self
    }

    pub fn with_prediction_error(self, message: &str, delay: Duration) -> Self {
        self.predictions.lock().unwrap().push_back(ScriptedPrediction {
            delay,
            result: Err(message.to_string()),
        });
        self
    }

    pub fn with_correction_delay(self, delay: Duration) -> Self {
        *self.correction_delay.lock().unwrap() = delay;
        self
    }

    pub fn fail_corrections(&self, message: &str) {
        *self.correction_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn accept_corrections(&self) {
        *self.correction_failure.lock().unwrap() = None;
    }

    pub fn fail_switches(&self, message: &str) {
        *self.switch_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn corrections(&self) -> Vec<CorrectionRequest> {
        self.corrections.lock().unwrap().clone()
    }

    pub fn switches(&self) -> Vec<String> {
        self.switches.lock().unwrap().clone()
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionGateway for MockGateway {
    async fn predict_position(&self, _image: &ImageRef) -> Result<PredictionResponse, GatewayError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.predictions.lock().unwrap().pop_front();

        match scripted {
            Some(scripted) => {
                tokio::time::sleep(scripted.delay).await;
                scripted.result.map_err(GatewayError::Network)
            }
            None => Err(GatewayError::Network("no prediction scripted".to_string())),
        }
    }

    async fn submit_correction(
        &self,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResponse, GatewayError> {
        self.corrections.lock().unwrap().push(request.clone());
        let delay = *self.correction_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = self.correction_failure.lock().unwrap().clone();
        match failure {
            Some(message) => Err(GatewayError::Api {
                status: 500,
                message,
            }),
            None => Ok(CorrectionResponse {
                success: true,
                message: "Correction saved".to_string(),
                prediction_id: Some(request.prediction_id),
                corrected_fen: Some(request.corrected_fen.clone()),
            }),
        }
    }

    async fn switch_service(
        &self,
        service_type: &str,
    ) -> Result<ServiceSwitchResponse, GatewayError> {
        self.switches.lock().unwrap().push(service_type.to_string());

        let failure = self.switch_failure.lock().unwrap().clone();
        match failure {
            Some(message) => Err(GatewayError::Api {
                status: 400,
                message,
            }),
            None => Ok(ServiceSwitchResponse {
                success: true,
                message: format!("Switched to {}", service_type),
                previous_service: "end_to_end".to_string(),
                new_service: service_type.to_string(),
                timestamp: "2026-01-01T00:00:00Z".to_string(),
            }),
        }
    }

    async fn current_service(&self) -> Result<CurrentServiceResponse, GatewayError> {
        Ok(CurrentServiceResponse {
            service_type: Some("end_to_end".to_string()),
            service_loaded: true,
            service_info: None,
            available_services: vec![
                "end_to_end".to_string(),
                "multi_model_pipeline".to_string(),
            ],
            message: String::new(),
        })
    }
}
