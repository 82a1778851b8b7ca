use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use patient_manager_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthComponent, HealthServiceTrait, SystemStatus,
};

/// Health service type for dependency injection
pub type HealthServiceHandle = Arc<dyn HealthServiceTrait>;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// RFC 3339 time the response was generated
    pub timestamp: String,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// Details about various components of the system
    pub components: ComponentStatus,
    /// Deployment environment (APP_ENV)
    pub environment: String,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Patient store status
    pub database: ComponentHealthStatus,
    /// API status
    pub api: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Time the server started, for uptime reporting
static SERVER_START_TIME: OnceCell<DateTime<Utc>> = OnceCell::new();

/// Record the server start time. Later calls keep the first value.
pub fn initialize_server_start_time() {
    SERVER_START_TIME.get_or_init(Utc::now);
}

/// Health check endpoint to verify the API and its store are reachable
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
#[instrument(skip(health_service))]
pub async fn health_check(Extension(health_service): Extension<HealthServiceHandle>) -> impl IntoResponse {
    info!("Health check requested");

    let now = Utc::now();
    let uptime = SERVER_START_TIME
        .get()
        .map(|start| (now - *start).num_seconds());

    let system_health = health_service.get_system_health().await;

    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let components = ComponentStatus {
        database: map_component(system_health.components.get("database")),
        api: map_component(system_health.components.get("api")),
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now.to_rfc3339(),
        uptime,
        components,
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    let status = match system_health.status {
        SystemStatus::Healthy => StatusCode::OK,
        SystemStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        SystemStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(response))
}

/// Map a domain component to its API representation; a missing component counts as healthy
fn map_component(component: Option<&HealthComponent>) -> ComponentHealthStatus {
    let status = component
        .map(|c| c.status.clone())
        .unwrap_or(DomainComponentStatus::Healthy);

    ComponentHealthStatus {
        status: map_component_status(&status),
        message: component.and_then(|c| c.details.clone()),
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use patient_manager_domain::testing::MockHealthService;

    async fn call(service: MockHealthService) -> (StatusCode, HealthResponse) {
        initialize_server_start_time();
        let handle: HealthServiceHandle = Arc::new(service);
        let response = health_check(Extension(handle)).await.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_response() {
        let (status, body) = call(MockHealthService::new()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.components.database.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
        assert!(body.uptime.is_some());
    }

    #[tokio::test]
    async fn test_degraded_database_returns_503() {
        let (status, body) = call(MockHealthService::new().with_degraded_database()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.components.api.status, "ok");
    }

    #[tokio::test]
    async fn test_unhealthy_database_returns_500() {
        let (status, body) = call(MockHealthService::new().with_unhealthy_database()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.components.database.status, "error");
        assert_eq!(
            body.components.database.message.as_deref(),
            Some("Database connection failed")
        );
    }
}
