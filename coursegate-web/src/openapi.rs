//! OpenAPI specification for the Coursegate API

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{HealthResponse, ValidateRequest, ValidateResponse};

/// OpenAPI specification for the validation API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coursegate API",
        description = "Course code validation for gated static course pages",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::validate_code,
    ),
    components(
        schemas(
            HealthResponse,
            ValidateRequest,
            ValidateResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Access", description = "Course access validation"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
