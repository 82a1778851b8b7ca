use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // System endpoints
        crate::api::handlers::root::root,
        crate::api::handlers::root::about,
        crate::api::handlers::health::health_check,

        // Patient endpoints
        crate::api::handlers::patient::create_patient,
        crate::api::handlers::patient::list_patients,
        crate::api::handlers::patient::get_patient,
        crate::api::handlers::patient::sort_patients,
        crate::api::handlers::patient::update_patient,
        crate::api::handlers::patient::delete_patient
    ),
    components(
        schemas(
            // Entities
            crate::entities::patient::Patient,
            crate::entities::patient::PatientEnvelope,
            crate::entities::patient::PatientListResponse,
            crate::entities::patient::PatientMutationResponse,
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::common::AboutResponse,

            // Request payloads
            patient_manager_domain::entities::CreatePatientRequest,
            patient_manager_domain::entities::UpdatePatientRequest,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "system", description = "Service information"),
        (name = "health", description = "Health check endpoint"),
        (name = "patients", description = "Patient record management endpoints")
    ),
    info(
        title = "Patient Manager API",
        version = "0.1.0",
        description = "API for managing patient records with derived BMI and weight verdicts",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Patient Manager API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "patients"));
        assert!(tags.iter().any(|tag| tag.name == "health"));

        let paths = &openapi.paths.paths;
        for path in [
            "/",
            "/about",
            "/health",
            "/create-patient",
            "/view-all-patients",
            "/view-patient/{patient_id}",
            "/sort-patients",
            "/update-patient/{patient_id}",
            "/delete-patient/{patient_id}",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_schemas_registered() {
        let openapi = ApiDoc::openapi();
        let schemas = &openapi.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("Patient"));
        assert!(schemas.contains_key("CreatePatientRequest"));
        assert!(schemas.contains_key("ErrorResponse"));
    }
}
