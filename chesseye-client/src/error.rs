//! Error types for chesseye-client

use thiserror::Error;

use crate::editor_export::EditorError;
use crate::services::gateway::GatewayError;

/// Client error type
#[derive(Debug, Error)]
pub enum Error {
    /// Remote inference service failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Editor export failure
    #[error("Editor export error: {0}")]
    Editor(#[from] EditorError),

    /// chesseye-common error (config, IO, logging)
    #[error("Common error: {0}")]
    Common(#[from] chesseye_common::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_source_message() {
        let err: Error = GatewayError::Api {
            status: 503,
            message: "model loading".to_string(),
        }
        .into();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model loading"));

        let err: Error = EditorError::EmptyFen.into();
        assert!(matches!(err, Error::Editor(EditorError::EmptyFen)));

        let err: Error = chesseye_common::Error::Config("bad url".to_string()).into();
        assert!(err.to_string().contains("bad url"));
    }
}
