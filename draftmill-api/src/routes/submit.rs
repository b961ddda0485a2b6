/// Submit endpoint
///
/// Admits a new content-generation job. The response returns as soon as the
/// job is recorded and queued; generation happens in the executor pool and
/// is observed via the status endpoint.
///
/// # Endpoint
///
/// `POST /generate`
///
/// # Authentication
///
/// Requires an API key in the `X-API-Key` header. The submit path is also
/// behind the per-IP rate limiter.
///
/// # Example Request
///
/// ```json
/// {
///   "topic": "Future of Quantum Computing",
///   "notify_email": "notify@example.com"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "job_id": "550e8400-e29b-41d4-a716-446655440000",
///   "status": "processing",
///   "usage": "1/10"
/// }
/// ```

use crate::app::AppState;
use crate::error::ApiError;
use axum::{extract::State, Extension, Json};
use draftmill_shared::models::account::Account;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Submit request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitRequest {
    /// Subject to research and write about
    ///
    /// Emptiness and length are checked by admission, after trimming.
    pub topic: String,

    /// Optional notification address, recorded with the submission
    #[validate(email(message = "Invalid notification email"))]
    pub notify_email: Option<String>,
}

/// Submit response
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    /// Identifier to poll with
    pub job_id: Uuid,

    /// Always "processing" at this point
    pub status: String,

    /// Post-admission usage, e.g. "1/10"
    pub usage: String,
}

/// Submit endpoint handler
///
/// Validation and quota enforcement happen inside the admission service;
/// a rejected submission consumes nothing.
///
/// # Errors
///
/// - 400 Bad Request: empty or over-long topic
/// - 401/403: missing or invalid API key
/// - 422 Unprocessable Entity: malformed notify_email
/// - 429 Too Many Requests: monthly quota exhausted (or IP rate limit)
pub async fn submit_job(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    request.validate()?;

    let admitted = state.admission.admit(&account, &request.topic).await?;

    if let Some(notify_email) = &request.notify_email {
        tracing::info!(
            job_id = %admitted.job.job_id,
            notify_email = %notify_email,
            "completion notification requested"
        );
    }

    Ok(Json(SubmitResponse {
        job_id: admitted.job.job_id,
        status: admitted.job.status,
        usage: admitted.usage.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_validation() {
        let valid = SubmitRequest {
            topic: "Quantum Computing".to_string(),
            notify_email: None,
        };
        assert!(valid.validate().is_ok());

        let with_email = SubmitRequest {
            topic: "Quantum Computing".to_string(),
            notify_email: Some("notify@example.com".to_string()),
        };
        assert!(with_email.validate().is_ok());

        let bad_email = SubmitRequest {
            topic: "Quantum Computing".to_string(),
            notify_email: Some("nope".to_string()),
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_submit_request_topic_not_checked_here() {
        // Topic rules live in admission, which sees the request after body
        // validation; an empty topic passes the derive-level checks.
        let empty_topic = SubmitRequest {
            topic: String::new(),
            notify_email: None,
        };
        assert!(empty_topic.validate().is_ok());
    }

    #[test]
    fn test_submit_response_serialization() {
        let response = SubmitResponse {
            job_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            status: "processing".to_string(),
            usage: "1/10".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("550e8400-e29b-41d4-a716-446655440000"));
        assert!(json.contains("\"status\":\"processing\""));
        assert!(json.contains("\"usage\":\"1/10\""));
    }
}
