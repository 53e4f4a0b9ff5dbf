//! Startup reachability probe for the board recognition API

use chesseye_common::api::HealthResponse;
use tracing::{info, warn};

use crate::services::api_client::ApiClient;

/// Outcome of [`check_connection`]
#[derive(Debug, Clone)]
pub enum ConnectionStatus {
    Connected(HealthResponse),
    Unreachable(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected(_))
    }

    /// Text to show the user when the API cannot be reached
    pub fn user_message(&self) -> Option<String> {
        match self {
            ConnectionStatus::Connected(_) => None,
            ConnectionStatus::Unreachable(error) => Some(format!(
                "Cannot reach API server.\n\nPlease check:\n1. Network connection\n2. API base URL setting\n\nError: {}",
                error
            )),
        }
    }
}

/// Probe `/health` once
///
/// Never fails: an unreachable API is logged and reported as
/// [`ConnectionStatus::Unreachable`].
pub async fn check_connection(client: &ApiClient) -> ConnectionStatus {
    info!(base_url = %client.base_url(), "Testing API connection");

    match client.health().await {
        Ok(health) => {
            info!(
                status = %health.status,
                model_ready = health.model_ready,
                database_ready = health.database_ready,
                "API connection successful"
            );
            ConnectionStatus::Connected(health)
        }
        Err(e) => {
            warn!(error = %e, "API connection failed");
            ConnectionStatus::Unreachable(e.to_string())
        }
    }
}
