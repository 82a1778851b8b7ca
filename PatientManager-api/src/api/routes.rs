use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use patient_manager_data::repository::{create_repository, RepositoryError};
use patient_manager_domain::health::HealthService;
use patient_manager_domain::services::PatientService;

use crate::api::handlers::{self, health::HealthServiceHandle, PatientServiceHandle};
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

/// Create the application router around ready-made services
pub fn create_app(patient_service: PatientServiceHandle, health_service: HealthServiceHandle) -> Router {
    debug!("Creating application router");

    let patient_routes = Router::new()
        .route("/create-patient", post(handlers::create_patient))
        .route("/view-all-patients", get(handlers::list_patients))
        .route("/view-all-patients/", get(handlers::list_patients))
        .route("/view-patient/:patient_id", get(handlers::get_patient))
        .route("/sort-patients", get(handlers::sort_patients))
        .route("/sort-patients/", get(handlers::sort_patients))
        .route("/update-patient/:patient_id", put(handlers::update_patient))
        .route("/delete-patient/:patient_id", delete(handlers::delete_patient))
        .with_state(patient_service);

    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health_check))
        .layer(Extension(health_service));

    debug!("Patient and public routes configured");

    // Initialize health check service startup time
    handlers::health::initialize_server_start_time();

    Router::new()
        .merge(public_routes)
        .merge(patient_routes)
        .merge(configure_swagger_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Build the storage backend and services from configuration, then the router
pub fn create_application(config: &AppConfig) -> Result<Router, RepositoryError> {
    let repository = create_repository(&config.database)?;

    let patient_service: PatientServiceHandle = Arc::new(PatientService::with_sort_config(
        repository.clone(),
        config.sort.clone(),
    ));
    let health_service: HealthServiceHandle = Arc::new(HealthService::new(repository));

    Ok(create_app(patient_service, health_service))
}
