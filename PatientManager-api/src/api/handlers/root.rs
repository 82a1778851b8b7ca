use axum::Json;
use tracing::debug;

use crate::entities::common::{AboutResponse, MessageResponse};

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service name", body = MessageResponse)
    ),
    tag = "system"
)]
pub async fn root() -> Json<MessageResponse> {
    debug!("Root endpoint called");
    Json(MessageResponse {
        message: "Patient Management System API".to_string(),
    })
}

/// Short description of the service
#[utoipa::path(
    get,
    path = "/about",
    responses(
        (status = 200, description = "Service description", body = AboutResponse)
    ),
    tag = "system"
)]
pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        data: "A patient records service that stores demographics and measurements and derives BMI and a weight verdict."
            .to_string(),
    })
}
