//! Remote board recognition service access

pub mod api_client;
pub mod gateway;
pub mod service_selector;

pub use api_client::ApiClient;
pub use gateway::{GatewayError, ImageRef, PredictionGateway};
pub use service_selector::{next_service, service_display_name, service_identifier};
