//! Inference backend naming and rotation
//!
//! The backend reports its active service either as a class name
//! (`EndToEndPipelineService`) or as the identifier the switch endpoint
//! accepts (`end_to_end`). Both map to the same display name.

use chesseye_common::api::CurrentServiceResponse;

const KNOWN_SERVICES: &[(&str, &str, &str)] = &[
    ("EndToEndPipelineService", "end_to_end", "End-to-End"),
    ("end_to_end", "end_to_end", "End-to-End"),
    ("MultiModelPipelineService", "multi_model_pipeline", "Pipeline"),
    ("multi_model_pipeline", "multi_model_pipeline", "Pipeline"),
];

/// Human-readable name; unknown services are shown as reported
pub fn service_display_name(service_type: Option<&str>) -> &str {
    match service_type {
        None => "Unknown",
        Some(name) => KNOWN_SERVICES
            .iter()
            .find(|(reported, _, _)| *reported == name)
            .map(|(_, _, display)| *display)
            .unwrap_or(name),
    }
}

/// Identifier accepted by the switch endpoint
pub fn service_identifier(service_type: &str) -> &str {
    KNOWN_SERVICES
        .iter()
        .find(|(reported, _, _)| *reported == service_type)
        .map(|(_, id, _)| *id)
        .unwrap_or(service_type)
}

/// Service to switch to from `current`, cycling through `available`
///
/// `None` when there is nothing to switch between or the active service is
/// unknown. A current service missing from the list rotates to the first
/// entry.
pub fn next_service<'a>(current: Option<&str>, available: &'a [String]) -> Option<&'a str> {
    if available.len() <= 1 {
        return None;
    }
    let current = service_identifier(current?);

    let next_index = available
        .iter()
        .position(|s| s == current)
        .map(|i| (i + 1) % available.len())
        .unwrap_or(0);

    available.get(next_index).map(String::as_str)
}

/// Next service for a `/service/current` response
pub fn next_service_for(response: &CurrentServiceResponse) -> Option<&str> {
    next_service(
        response.effective_service_type(),
        &response.available_services,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn services(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_display_names() {
        assert_eq!(service_display_name(Some("EndToEndPipelineService")), "End-to-End");
        assert_eq!(service_display_name(Some("end_to_end")), "End-to-End");
        assert_eq!(service_display_name(Some("MultiModelPipelineService")), "Pipeline");
        assert_eq!(service_display_name(Some("multi_model_pipeline")), "Pipeline");
        assert_eq!(service_display_name(Some("experimental")), "experimental");
        assert_eq!(service_display_name(None), "Unknown");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(service_identifier("EndToEndPipelineService"), "end_to_end");
        assert_eq!(service_identifier("MultiModelPipelineService"), "multi_model_pipeline");
        assert_eq!(service_identifier("experimental"), "experimental");
    }

    #[test]
    fn test_next_service_cycles() {
        let available = services(&["end_to_end", "multi_model_pipeline"]);
        assert_eq!(
            next_service(Some("end_to_end"), &available),
            Some("multi_model_pipeline")
        );
        assert_eq!(
            next_service(Some("MultiModelPipelineService"), &available),
            Some("end_to_end")
        );
        assert_eq!(next_service(Some("experimental"), &available), Some("end_to_end"));
        assert_eq!(next_service(None, &available), None);
    }

    #[test]
    fn test_no_toggle_with_single_service() {
        assert_eq!(next_service(Some("end_to_end"), &services(&["end_to_end"])), None);
        assert_eq!(next_service(Some("end_to_end"), &[]), None);
    }

    #[test]
    fn test_next_service_uses_service_info_fallback() {
        let response = CurrentServiceResponse {
            service_type: Some(String::new()),
            service_loaded: true,
            service_info: Some(json!({"service_type": "EndToEndPipelineService"})),
            available_services: services(&["end_to_end", "multi_model_pipeline"]),
            message: String::new(),
        };
        assert_eq!(next_service_for(&response), Some("multi_model_pipeline"));
    }
}
