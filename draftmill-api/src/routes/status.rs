/// Job status endpoint
///
/// Returns the current snapshot of a job owned by the caller. Safe to poll
/// any number of times; reads whatever state the executor has committed.
///
/// # Endpoint
///
/// `GET /status/:job_id`
///
/// # Example Response
///
/// ```json
/// {
///   "job_id": "550e8400-e29b-41d4-a716-446655440000",
///   "status": "completed",
///   "topic": "Future of Quantum Computing",
///   "created_at": "2025-06-01T12:00:00Z",
///   "completed_at": "2025-06-01T12:02:10Z",
///   "result": {
///     "report": "output/strategic_report_550e8400-e29b-41d4-a716-446655440000.md",
///     "blog": "output/blog_post_550e8400-e29b-41d4-a716-446655440000.md"
///   }
/// }
/// ```

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use draftmill_shared::models::account::Account;
use draftmill_shared::models::job::{Job, JobStatus};
use serde::Serialize;
use uuid::Uuid;

/// Generated artifact locations, present only on completed jobs
#[derive(Debug, Clone, Serialize)]
pub struct JobArtifacts {
    /// Strategic report location
    pub report: String,

    /// Blog post location
    pub blog: String,
}

/// Job status response
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    /// Job ID
    pub job_id: Uuid,

    /// Current state: processing, completed, or failed
    pub status: String,

    /// Submitted topic
    pub topic: String,

    /// When the job was admitted
    pub created_at: DateTime<Utc>,

    /// When the job reached its terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Artifact locations (completed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobArtifacts>,

    /// Failure message (failed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatusResponse {
    /// Builds the response from a job record
    fn from_job(job: Job) -> Self {
        let result = if job.job_status() == Some(JobStatus::Completed) {
            Some(JobArtifacts {
                report: job.report_path.clone().unwrap_or_default(),
                blog: job.blog_path.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        JobStatusResponse {
            job_id: job.job_id,
            status: job.status,
            topic: job.topic,
            created_at: job.created_at,
            completed_at: job.completed_at,
            result,
            error: job.error_message,
        }
    }
}

/// Job status endpoint handler
///
/// A job that does not exist and a job owned by someone else produce the
/// same 404, so job ids cannot be probed across accounts.
///
/// # Errors
///
/// - 401/403: missing or invalid API key
/// - 404 Not Found: no such job for this account
pub async fn job_status(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    tracing::debug!(job_id = %job_id, owner_id = %account.id, "status poll");

    let job = Job::find_by_id_and_owner(&state.db, job_id, account.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    Ok(Json(JobStatusResponse::from_job(job)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_job(status: JobStatus) -> Job {
        Job {
            job_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            owner_id: Uuid::new_v4(),
            topic: "Quantum Computing".to_string(),
            status: status.as_str().to_string(),
            created_at: Utc::now(),
            completed_at: None,
            report_path: None,
            blog_path: None,
            error_message: None,
            execution_time: None,
            tokens_used: None,
            estimated_cost: None,
        }
    }

    #[test]
    fn test_response_for_processing_job() {
        let response = JobStatusResponse::from_job(base_job(JobStatus::Processing));

        assert_eq!(response.status, "processing");
        assert!(response.result.is_none());
        assert!(response.error.is_none());

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("completed_at"));
        assert!(!json.contains("result"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_response_for_completed_job() {
        let mut job = base_job(JobStatus::Completed);
        job.completed_at = Some(Utc::now());
        job.report_path = Some("output/strategic_report_x.md".to_string());
        job.blog_path = Some("output/blog_post_x.md".to_string());

        let response = JobStatusResponse::from_job(job);

        let result = response.result.as_ref().expect("completed job has result");
        assert_eq!(result.report, "output/strategic_report_x.md");
        assert_eq!(result.blog, "output/blog_post_x.md");
        assert!(response.error.is_none());
    }

    #[test]
    fn test_response_for_failed_job() {
        let mut job = base_job(JobStatus::Failed);
        job.completed_at = Some(Utc::now());
        job.error_message = Some("generation timed out after 1800s".to_string());

        let response = JobStatusResponse::from_job(job);

        assert_eq!(response.status, "failed");
        assert!(response.result.is_none());
        assert_eq!(
            response.error.as_deref(),
            Some("generation timed out after 1800s")
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("failed"));
        assert!(!json.contains("result"));
    }
}
