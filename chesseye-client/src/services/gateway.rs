//! Prediction gateway abstraction
//!
//! Everything the core needs from the remote board recognition service sits
//! behind [`PredictionGateway`], so the submission flow and the session can
//! be driven by the reqwest client in production and by in-memory fakes in
//! tests.

use async_trait::async_trait;
use chesseye_common::api::{
    CorrectionRequest, CorrectionResponse, CurrentServiceResponse, PredictionResponse,
    ServiceSwitchResponse,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upload name used when the image path has no usable file name
pub const DEFAULT_IMAGE_FILE_NAME: &str = "board_image.jpg";

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Image read error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// HTTP status code, when the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Source image of a prediction
///
/// Kept by the session so the same photo can be re-submitted after the
/// inference backend changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_name: file_name.into(),
        }
    }

    /// Image reference named after the last path component
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_IMAGE_FILE_NAME)
            .to_string();
        Self::new(path, file_name)
    }
}

/// Operations the core consumes from the board recognition service
#[async_trait]
pub trait PredictionGateway: Send + Sync {
    /// Run board recognition on an image
    async fn predict_position(&self, image: &ImageRef) -> Result<PredictionResponse, GatewayError>;

    /// Record a user correction for an earlier prediction
    async fn submit_correction(
        &self,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResponse, GatewayError>;

    /// Make `service_type` the active inference backend
    async fn switch_service(&self, service_type: &str)
        -> Result<ServiceSwitchResponse, GatewayError>;

    /// Active inference backend and the ones available
    async fn current_service(&self) -> Result<CurrentServiceResponse, GatewayError>;
}
