/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. All handlers return
/// `Result<T, ApiError>` which converts to an appropriate status code and a
/// JSON body of the form `{ "error": "...", "message": "..." }`.
///
/// Mapping of the domain taxonomy:
///
/// | domain error | variant | status |
/// |---|---|---|
/// | missing credential | `Unauthorized` | 401 |
/// | invalid/inactive credential | `Forbidden` | 403 |
/// | malformed topic | `BadRequest` | 400 |
/// | malformed email field | `ValidationError` | 422 |
/// | duplicate email | `Conflict` | 409 |
/// | quota exhausted | `QuotaExceeded` | 429 |
/// | unknown or foreign job | `NotFound` | 404 |
///
/// Pipeline failures never appear here: they are recorded on the job and
/// observed via the poll endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use draftmill_shared::admission::AdmissionError;
use draftmill_shared::auth::gate::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - no credential supplied
    Unauthorized(String),

    /// Forbidden (403) - credential does not map to an active account
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Unprocessable entity (422) - field-level validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Too many requests (429) - monthly allowance exhausted
    QuotaExceeded(String),

    /// Too many requests (429) - per-IP request rate exceeded
    RateLimitExceeded {
        retry_after: u64,
        message: String,
    },

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "quota_exceeded", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::QuotaExceeded(msg) => write!(f, "Quota exceeded: {}", msg),
            ApiError::RateLimitExceeded { message, .. } => {
                write!(f, "Rate limit exceeded: {}", message)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Handle the per-IP limiter separately to add a Retry-After header
        if let ApiError::RateLimitExceeded {
            retry_after,
            message,
        } = &self
        {
            let body = Json(ErrorResponse {
                error: "rate_limit_exceeded".to_string(),
                message: message.clone(),
                details: None,
            });

            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            if let Ok(value) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
            return response;
        }

        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::QuotaExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded", msg, None)
            }
            ApiError::RateLimitExceeded { message, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                message,
                None,
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already registered".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth gate errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => ApiError::Unauthorized("API key required".to_string()),
            AuthError::InvalidCredential => ApiError::Forbidden("Invalid API key".to_string()),
            AuthError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert admission errors to API errors
impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::EmptyTopic | AdmissionError::TopicTooLong { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            AdmissionError::QuotaExceeded { limit } => ApiError::QuotaExceeded(format!(
                "Monthly limit reached ({} requests). Upgrade your plan.",
                limit
            )),
            AdmissionError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert validator failures to field-level API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {}", field)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("empty topic".to_string());
        assert_eq!(err.to_string(), "Bad request: empty topic");

        let err = ApiError::NotFound("Job not found".to_string());
        assert_eq!(err.to_string(), "Not found: Job not found");
    }

    #[test]
    fn test_auth_error_status_mapping() {
        let missing: ApiError = AuthError::MissingCredential.into();
        assert!(matches!(missing, ApiError::Unauthorized(_)));

        let invalid: ApiError = AuthError::InvalidCredential.into();
        assert!(matches!(invalid, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_admission_error_mapping() {
        let empty: ApiError = AdmissionError::EmptyTopic.into();
        assert!(matches!(empty, ApiError::BadRequest(_)));

        let long: ApiError = AdmissionError::TopicTooLong { max: 200 }.into();
        assert!(matches!(long, ApiError::BadRequest(_)));

        let quota: ApiError = AdmissionError::QuotaExceeded { limit: 10 }.into();
        match quota {
            ApiError::QuotaExceeded(msg) => {
                assert!(msg.contains("10"));
                assert!(msg.contains("Upgrade"));
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_quota_exceeded_is_429() {
        let response =
            ApiError::QuotaExceeded("Monthly limit reached (10 requests)".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_rate_limit_response_has_retry_after() {
        let response = ApiError::RateLimitExceeded {
            retry_after: 42,
            message: "Too many submissions".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "42");
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }
}
