/// Error handling for the API server
///
/// All handlers return [`ApiResult`]. Errors render as the board's JSON error
/// body (see [`ErrorBody`]):
///
/// ```json
/// { "error": "Validation failed", "fieldErrors": { "title": "Title must be 1-255 characters" } }
/// ```
///
/// # Status Codes
///
/// - `400` malformed id, malformed body, or validation failure
/// - `404` unknown task or user
/// - `409` duplicate email, user with assigned tasks, stale task version
/// - `500` missing status column or storage failure

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use taskboard_shared::error::{BoardError, ErrorBody, FieldErrors};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): unparseable id or body
    BadRequest(String),

    /// Bad request (400): per-field validation failures
    ValidationError(FieldErrors),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), body carries the details
    Conflict(ErrorBody),

    /// Board columns do not match the status set (500, message shown)
    Misconfigured(String),

    /// Internal server error (500, message logged only)
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(body) => write!(f, "Conflict: {}", body.error),
            ApiError::Misconfigured(msg) => write!(f, "Misconfigured: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::message(msg)),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    field_errors: Some(errors),
                    ..ErrorBody::message("Validation failed")
                },
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::message(msg)),
            ApiError::Conflict(body) => (StatusCode::CONFLICT, body),
            ApiError::Misconfigured(msg) => {
                tracing::error!("Board misconfigured: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(msg))
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convert board errors to API errors
impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Validation(fields) => ApiError::ValidationError(fields),
            BoardError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            BoardError::DuplicateEmail
            | BoardError::HasAssignedTasks { .. }
            | BoardError::StaleWrite { .. } => ApiError::Conflict(ErrorBody::from(&err)),
            BoardError::Configuration(inner) => ApiError::Misconfigured(inner.to_string()),
            BoardError::Persistence(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert body extraction failures to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Parses a numeric path id
///
/// `entity` names the resource in the error message ("Invalid task ID").
pub fn parse_id(raw: &str, entity: &str) -> ApiResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", entity)))
}
