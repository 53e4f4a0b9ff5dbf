//! API types for the board recognition service
//!
//! Request/response shapes of the remote HTTP API. The wire format is JSON
//! with snake_case field names; every optional field tolerates being absent.

pub mod types;

pub use types::{
    ConfigInfoResponse, CorrectionRequest, CorrectionResponse, CurrentServiceResponse,
    FenValidationResponse, HealthResponse, PredictionDetailResponse, PredictionResponse,
    RecentCorrection, RecentCorrectionsResponse, RetrainingStatusResponse, ServiceSwitchRequest,
    ServiceSwitchResponse, StatsResponse,
};
