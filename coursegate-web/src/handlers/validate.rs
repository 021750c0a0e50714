//! Course code validation handler
//!
//! Stateless request/response: method check, configuration check, payload
//! shape check, store lookup. Every outcome is a JSON `{message, ...}` body
//! and none of the failure messages reveal more than the status implies.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use coursegate_core::{
    performance::measure_async, validation::is_plausible_email, GateError, ValidateRequest,
    ValidateResponse,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Reasons a validation request does not produce a grant
#[derive(thiserror::Error, Debug)]
pub enum ValidateError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing database configuration.")]
    MissingConfig,

    #[error("Invalid email format.")]
    InvalidEmail,

    #[error("Course code is required.")]
    MissingCourseCode,

    #[error("Invalid course code.")]
    InvalidCourseCode,

    #[error("Unexpected error validating course code.")]
    Unexpected(#[from] GateError),

    #[error("Unexpected error validating course code.")]
    UnreadableBody(#[from] BytesRejection),
}

impl ValidateError {
    pub fn status(&self) -> StatusCode {
        match self {
            ValidateError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ValidateError::InvalidEmail | ValidateError::MissingCourseCode => {
                StatusCode::BAD_REQUEST
            }
            ValidateError::InvalidCourseCode => StatusCode::UNAUTHORIZED,
            ValidateError::MissingConfig
            | ValidateError::Unexpected(_)
            | ValidateError::UnreadableBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ValidateError {
    fn into_response(self) -> Response {
        match &self {
            ValidateError::Unexpected(err) => err.log(),
            ValidateError::MissingConfig => {
                warn!("Validation requested but COURSEGATE_DATABASE_URL is not set")
            }
            ValidateError::UnreadableBody(rejection) => {
                warn!(
                    status = %rejection.status(),
                    "Failed to read request body: {}",
                    rejection.body_text()
                )
            }
            _ => {}
        }

        json_reply(self.status(), ValidateResponse::message(self.to_string()))
    }
}

/// JSON body that must never be cached
fn json_reply(status: StatusCode, body: ValidateResponse) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

/// Validate a course code and return where to send the browser
#[utoipa::path(
    post,
    path = "/api/validate-code",
    tag = "Access",
    summary = "Validate course code",
    description = "Check an email and course code and return the redirect target and its access root",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Access granted", body = ValidateResponse),
        (status = 400, description = "Malformed email or empty course code", body = ValidateResponse),
        (status = 401, description = "Unknown or inactive course code", body = ValidateResponse),
        (status = 405, description = "Method other than POST", body = ValidateResponse),
        (status = 500, description = "Store not configured or unexpected failure", body = ValidateResponse)
    )
)]
pub async fn validate_code(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ValidateError> {
    if !state.store_configured() {
        return Err(ValidateError::MissingConfig);
    }

    let body = body?;
    let request = parse_request(&body)?;

    if !is_plausible_email(&request.email) {
        debug!("Rejected malformed email");
        return Err(ValidateError::InvalidEmail);
    }

    if request.course_code.is_empty() {
        return Err(ValidateError::MissingCourseCode);
    }

    let store = state.course_store().await?;
    let record = measure_async("course_lookup", store.find_active(&request.course_code)).await?;

    let Some(record) = record else {
        debug!(course_code = %request.course_code, "Unknown or inactive course code");
        return Err(ValidateError::InvalidCourseCode);
    };

    let response = ValidateResponse::granted(record.next_path());
    info!(
        course_code = %record.code,
        next_path = ?response.next_path,
        access_root = ?response.access_root,
        "Access granted"
    );

    Ok(json_reply(StatusCode::OK, response))
}

/// Any method other than POST on the validation path
pub async fn method_not_allowed() -> ValidateError {
    ValidateError::MethodNotAllowed
}

/// Read `{email, courseCode}` leniently.
///
/// An empty body counts as `{}` and so does JSON that is not an object.
/// Only unparseable JSON is an error.
fn parse_request(body: &[u8]) -> Result<ValidateRequest, ValidateError> {
    let payload: Value = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body).map_err(GateError::from)?
    };

    Ok(ValidateRequest {
        email: field_text(payload.get("email")).trim().to_string(),
        course_code: field_text(payload.get("courseCode")).trim().to_string(),
    })
}

/// Text of a payload field. Falsy values and containers read as empty.
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}
