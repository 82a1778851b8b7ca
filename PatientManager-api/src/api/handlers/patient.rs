use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use patient_manager_domain::entities::{CreatePatientRequest, UpdatePatientRequest};
use patient_manager_domain::services::PatientServiceTrait;

use crate::entities::common::{ErrorResponse, MessageResponse};
use crate::entities::patient::{
    Patient, PatientEnvelope, PatientListResponse, PatientMutationResponse, SortQueryParams,
};

/// Service type for dependency injection
pub type PatientServiceHandle = Arc<dyn PatientServiceTrait>;

const DEFAULT_SORT_FIELD: &str = "age";
const DEFAULT_SORT_ORDER: &str = "asc";

/// Create a new patient
#[utoipa::path(
    post,
    path = "/create-patient",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientMutationResponse),
        (status = 400, description = "Invalid patient data", body = ErrorResponse),
        (status = 409, description = "Patient id already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, payload))]
pub async fn create_patient(
    State(service): State<PatientServiceHandle>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload?;
    info!("Creating patient {:?}", request.patient_id);

    let record = service.create_patient(request).await?;
    let body = PatientMutationResponse {
        message: "Patient created successfully".to_string(),
        patient: Patient::from(record),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// List every patient in storage order
#[utoipa::path(
    get,
    path = "/view-all-patients",
    responses(
        (status = 200, description = "All patients", body = PatientListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn list_patients(
    State(service): State<PatientServiceHandle>,
) -> Result<Json<PatientListResponse>, ErrorResponse> {
    let records = service.list_patients().await?;
    info!("Listing {} patients", records.len());
    Ok(Json(PatientListResponse::from(records)))
}

/// Get a single patient by id
#[utoipa::path(
    get,
    path = "/view-patient/{patient_id}",
    params(
        ("patient_id" = String, Path, description = "Patient identifier, e.g. P001")
    ),
    responses(
        (status = 200, description = "Patient found", body = PatientEnvelope),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn get_patient(
    State(service): State<PatientServiceHandle>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientEnvelope>, ErrorResponse> {
    let record = service.get_patient(&patient_id).await?;
    Ok(Json(PatientEnvelope {
        patient: Patient::from(record),
    }))
}

/// List patients ordered by an allowed field
#[utoipa::path(
    get,
    path = "/sort-patients",
    params(SortQueryParams),
    responses(
        (status = 200, description = "Sorted patients", body = PatientListResponse),
        (status = 400, description = "Invalid sort field or order", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, query))]
pub async fn sort_patients(
    State(service): State<PatientServiceHandle>,
    query: Result<Query<SortQueryParams>, QueryRejection>,
) -> Result<Json<PatientListResponse>, ErrorResponse> {
    let Query(params) = query?;
    let sort_by = params.sort_by.as_deref().unwrap_or(DEFAULT_SORT_FIELD);
    let order = params.order.as_deref().unwrap_or(DEFAULT_SORT_ORDER);
    info!("Sorting patients by {} {}", sort_by, order);

    let records = service.sort_patients(sort_by, order).await?;
    Ok(Json(PatientListResponse::from(records)))
}

/// Partially update a patient; bmi and verdict are recomputed
#[utoipa::path(
    put,
    path = "/update-patient/{patient_id}",
    params(
        ("patient_id" = String, Path, description = "Patient identifier, e.g. P001")
    ),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientMutationResponse),
        (status = 400, description = "Invalid patient data", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, payload))]
pub async fn update_patient(
    State(service): State<PatientServiceHandle>,
    Path(patient_id): Path<String>,
    payload: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> Result<Json<PatientMutationResponse>, ErrorResponse> {
    let Json(request) = payload?;

    let record = service.update_patient(&patient_id, request).await?;
    Ok(Json(PatientMutationResponse {
        message: "Patient updated successfully".to_string(),
        patient: Patient::from(record),
    }))
}

/// Delete a patient
#[utoipa::path(
    delete,
    path = "/delete-patient/{patient_id}",
    params(
        ("patient_id" = String, Path, description = "Patient identifier, e.g. P001")
    ),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn delete_patient(
    State(service): State<PatientServiceHandle>,
    Path(patient_id): Path<String>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    service.delete_patient(&patient_id).await?;
    Ok(Json(MessageResponse {
        message: "Patient deleted successfully".to_string(),
    }))
}
