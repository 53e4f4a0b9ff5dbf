//! Board recognition API client
//!
//! reqwest implementation of [`PredictionGateway`] plus the read-only
//! endpoints (stats, health, corrections) used by the CLI.

use async_trait::async_trait;
use chesseye_common::api::{
    ConfigInfoResponse, CorrectionRequest, CorrectionResponse, CurrentServiceResponse,
    FenValidationResponse, HealthResponse, PredictionDetailResponse, PredictionResponse,
    RecentCorrectionsResponse, RetrainingStatusResponse, ServiceSwitchRequest,
    ServiceSwitchResponse, StatsResponse,
};
use chesseye_common::config::TomlConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::gateway::{GatewayError, ImageRef, PredictionGateway};

const USER_AGENT: &str = concat!("ChessEye/", env!("CARGO_PKG_VERSION"));
const UPLOAD_FIELD: &str = "file";
const UPLOAD_MIME: &str = "image/jpeg";

/// Number of corrections requested when the caller does not say
pub const DEFAULT_RECENT_CORRECTIONS_LIMIT: u32 = 10;

/// Board recognition API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TomlConfig) -> Result<Self, GatewayError> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Look up a stored prediction
    pub async fn prediction_detail(
        &self,
        prediction_id: i64,
    ) -> Result<PredictionDetailResponse, GatewayError> {
        self.get_json(&format!("/predict/{}", prediction_id), &[])
            .await
    }

    pub async fn stats(&self) -> Result<StatsResponse, GatewayError> {
        self.get_json("/stats", &[]).await
    }

    pub async fn recent_corrections(
        &self,
        limit: u32,
    ) -> Result<RecentCorrectionsResponse, GatewayError> {
        self.get_json("/corrections/recent", &[("limit", limit.to_string())])
            .await
    }

    /// Corrections collected since the last model and the retrain threshold
    pub async fn retraining_status(&self) -> Result<RetrainingStatusResponse, GatewayError> {
        self.get_json("/corrections/count", &[]).await
    }

    pub async fn health(&self) -> Result<HealthResponse, GatewayError> {
        self.get_json("/health", &[]).await
    }

    pub async fn config_info(&self) -> Result<ConfigInfoResponse, GatewayError> {
        self.get_json("/config/info", &[]).await
    }

    /// Server-side FEN validation and matrix conversion
    pub async fn validate_fen(&self, fen: &str) -> Result<FenValidationResponse, GatewayError> {
        self.get_json("/validate/fen", &[("fen", fen.to_string())])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        tracing::debug!(path, "GET");

        let response = self
            .http_client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(path, "POST");

        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        read_json(response).await
    }
}

/// Check the status and decode the body
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    response
        .json()
        .await
        .map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Pull `detail` out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl PredictionGateway for ApiClient {
    async fn predict_position(&self, image: &ImageRef) -> Result<PredictionResponse, GatewayError> {
        let bytes = tokio::fs::read(&image.path).await?;

        tracing::debug!(
            file = %image.file_name,
            size_bytes = bytes.len(),
            "Uploading board image"
        );

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(image.file_name.clone())
            .mime_str(UPLOAD_MIME)
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http_client
            .post(self.url("/predict"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let prediction: PredictionResponse = read_json(response).await.map_err(|e| {
            tracing::error!(error = %e, "Prediction request failed");
            e
        })?;

        tracing::info!(
            prediction_id = prediction.prediction_id,
            success = prediction.success,
            confidence = prediction.confidence_score,
            "Prediction received"
        );

        Ok(prediction)
    }

    async fn submit_correction(
        &self,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResponse, GatewayError> {
        self.post_json("/predict/correct", request).await
    }

    async fn switch_service(
        &self,
        service_type: &str,
    ) -> Result<ServiceSwitchResponse, GatewayError> {
        let request = ServiceSwitchRequest {
            service_type: service_type.to_string(),
        };
        self.post_json("/service/switch", &request).await
    }

    async fn current_service(&self) -> Result<CurrentServiceResponse, GatewayError> {
        self.get_json("/service/current", &[]).await
    }
}
