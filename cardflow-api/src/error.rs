/// Error handling for the API server
///
/// A unified error type that maps service failures to HTTP responses.
/// Handlers return `Result<T, ApiError>` which converts automatically:
///
/// - `Forbidden` → 403, `NotFound` → 404 (not unified; board-scoped
///   reads deny non-members without confirming existence either way)
/// - `Conflict` → 409, retryable by the client
/// - `InvariantViolation` and storage failures → 500, logged for
///   operator attention, details withheld from clients

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardflow_shared::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - missing or invalid credentials
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden,

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - retryable contention or duplicate member
    Conflict(String),

    /// Request payload validation failed (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// A single field validation failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// The field that failed validation
    pub field: String,

    /// Why it failed
    pub message: String,
}

/// Converts `validator` errors to the API's validation error shape
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let details = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(details)
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "forbidden", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(details) => {
                write!(f, "Validation failed: {} field(s)", details.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Operation not permitted".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::ValidationError(details) => {
                let message = details
                    .iter()
                    .map(|d| format!("{}: {}", d.field, d.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Convert service errors to API errors, preserving failure kinds
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        cardflow_shared::service::log_if_invariant_violation(&err);
        match err {
            ServiceError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            ServiceError::Forbidden => ApiError::Forbidden,
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::InvariantViolation(detail) => ApiError::InternalError(detail),
            ServiceError::Database(e) => ApiError::InternalError(format!("database error: {}", e)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<cardflow_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: cardflow_shared::auth::jwt::JwtError) -> Self {
        match err {
            cardflow_shared::auth::jwt::JwtError::Expired => {
                ApiError::Unauthorized("Token expired".to_string())
            }
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("board not found".to_string());
        assert_eq!(err.to_string(), "Not found: board not found");
    }

    #[test]
    fn test_service_error_mapping() {
        assert!(matches!(
            ApiError::from(ServiceError::Forbidden),
            ApiError::Forbidden
        ));
        assert!(matches!(
            ApiError::from(ServiceError::NotFound("task")),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(ServiceError::Conflict("contention".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(ServiceError::InvariantViolation("dup".into())),
            ApiError::InternalError(_)
        ));
    }
}
