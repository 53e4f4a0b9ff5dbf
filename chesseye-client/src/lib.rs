//! chesseye-client library interface
//!
//! Prediction gateway, result evaluation, correction submission and the
//! service-switch coordinator used by the `chesseye` binary.

pub mod connection_check;
pub mod editor_export;
pub mod error;
pub mod error_filter;
pub mod prediction;
pub mod services;
pub mod submission;

pub use crate::error::{Error, Result};
pub use crate::prediction::evaluator::{evaluate, EvaluationThresholds, PositionValidationResult};
pub use crate::prediction::session::{PredictionSession, SwitchStatus};
pub use crate::services::api_client::ApiClient;
pub use crate::services::gateway::{GatewayError, ImageRef, PredictionGateway};
pub use crate::submission::{SubmissionFlow, SubmitOutcome, SUCCESS_MESSAGE_DURATION};
