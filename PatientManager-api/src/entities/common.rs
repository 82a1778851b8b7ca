use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;

use patient_manager_domain::services::{PatientServiceError, ValidationError};

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(patient_id: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("Patient not found: {}", patient_id),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a duplicate key error response
    pub fn duplicate_key(patient_id: &str) -> Self {
        Self {
            error: "duplicate_key".to_string(),
            message: format!("Patient already exists: {}", patient_id),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "bad_request" => StatusCode::BAD_REQUEST,
            "duplicate_key" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

fn validation_details(err: &ValidationError) -> serde_json::Value {
    match err {
        ValidationError::InvalidEnum { field, value } => json!({ "field": field, "value": value }),
        ValidationError::InvalidRange { field, value } => json!({ "field": field, "value": value }),
        other => json!({ "field": other.field() }),
    }
}

impl From<PatientServiceError> for ErrorResponse {
    fn from(err: PatientServiceError) -> Self {
        match err {
            PatientServiceError::Validation(e) => {
                warn!("Rejected patient payload: {}", e);
                ErrorResponse::validation_error(&e.to_string(), Some(validation_details(&e)))
            },
            PatientServiceError::DuplicateKey(id) => ErrorResponse::duplicate_key(&id),
            PatientServiceError::NotFound(id) => ErrorResponse::not_found(&id),
            PatientServiceError::InvalidArgument(message) => ErrorResponse::bad_request(&message),
            PatientServiceError::Repository(message) => {
                error!("Patient storage failure: {}", message);
                ErrorResponse::internal_error()
            },
        }
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Malformed JSON body: {}", rejection.body_text());
        ErrorResponse::validation_error(&rejection.body_text(), None)
    }
}

impl From<QueryRejection> for ErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        ErrorResponse::bad_request(&rejection.body_text())
    }
}

/// Plain message body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Service description returned by `/about`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AboutResponse {
    pub data: String,
}
