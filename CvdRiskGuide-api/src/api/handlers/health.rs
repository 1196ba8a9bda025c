use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use std::time::{SystemTime, UNIX_EPOCH};
use std::sync::{Arc, Once};
use once_cell::sync::OnceCell;

// Use the trait from domain layer
use cvd_risk_guide_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthServiceTrait, SystemHealth, SystemStatus,
    CALCULATOR_COMPONENT, SESSION_STORE_COMPONENT,
};

use crate::config::AppConfig;

/// Health check response model
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Details about various components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Risk model self-check
    pub calculator: ComponentHealthStatus,
    /// Session store status
    pub session_store: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Track the time when the server started using a thread-safe OnceCell
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

// Initialize the server start time
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = SERVER_START_TIME.set(start_time);
    });
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service, config))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait + Send + Sync>>,
    Extension(config): Extension<Arc<AppConfig>>,
) -> impl IntoResponse {
    info!("Health check requested");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Calculate uptime if server start time is available
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;

    let (status_code, overall_status) = match system_health.status {
        SystemStatus::Healthy => (StatusCode::OK, "ok"),
        SystemStatus::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        SystemStatus::Unhealthy => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            calculator: component_health(&system_health, CALCULATOR_COMPONENT),
            session_store: component_health(&system_health, SESSION_STORE_COMPONENT),
        },
        environment: config.environment.clone(),
    };

    (status_code, Json(response))
}

fn component_health(health: &SystemHealth, name: &str) -> ComponentHealthStatus {
    match health.components.get(name) {
        Some(component) => ComponentHealthStatus {
            status: map_component_status(&component.status),
            message: component.details.clone(),
        },
        None => ComponentHealthStatus {
            status: map_component_status(&DomainComponentStatus::Healthy),
            message: None,
        },
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvd_risk_guide_domain::testing::{create_mock_health_service, MockHealthService};

    async fn status_for(service: Arc<dyn HealthServiceTrait + Send + Sync>) -> StatusCode {
        initialize_server_start_time();
        let config = Arc::new(AppConfig::default());

        health_check(Extension(service), Extension(config))
            .await
            .into_response()
            .status()
    }

    #[tokio::test]
    async fn test_health_check_response() {
        let service = Arc::new(create_mock_health_service()) as Arc<dyn HealthServiceTrait + Send + Sync>;
        assert_eq!(status_for(service).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unhealthy_system_returns_500() {
        let service = Arc::new(
            MockHealthService::new()
                .with_unhealthy_session_store()
                .with_system_status(SystemStatus::Unhealthy),
        ) as Arc<dyn HealthServiceTrait + Send + Sync>;
        assert_eq!(status_for(service).await, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_component_details_are_reported() {
        let service = Arc::new(
            MockHealthService::new()
                .with_component(
                    CALCULATOR_COMPONENT,
                    DomainComponentStatus::Degraded,
                    Some("Reference estimate drifted".to_string()),
                )
                .with_system_status(SystemStatus::Degraded),
        ) as Arc<dyn HealthServiceTrait + Send + Sync>;
        let config = Arc::new(AppConfig::default());

        let response = health_check(Extension(service), Extension(config))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["components"]["calculator"]["status"], "degraded");
        assert_eq!(body["components"]["calculator"]["message"], "Reference estimate drifted");
        assert_eq!(body["components"]["session_store"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_degraded_system_returns_503() {
        let service = Arc::new(
            MockHealthService::new().with_system_status(SystemStatus::Degraded),
        ) as Arc<dyn HealthServiceTrait + Send + Sync>;
        assert_eq!(status_for(service).await, StatusCode::SERVICE_UNAVAILABLE);
    }
}
