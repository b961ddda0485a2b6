/// Health check endpoint
///
/// Public probe reporting service and database status, plus the success
/// rate over the most recent jobs as a quick quality signal.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "timestamp": "2025-06-01T12:00:00Z",
///   "version": "0.1.0",
///   "recent_success_rate": "90.0%"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use draftmill_shared::db::pool;
use draftmill_shared::models::job::{Job, JobStatus};
use serde::{Deserialize, Serialize};

/// How many recent jobs feed the success-rate figure
const RECENT_JOB_WINDOW: i64 = 10;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    /// Database status
    pub database: String,

    /// Probe time
    pub timestamp: DateTime<Utc>,

    /// Application version
    pub version: String,

    /// Success rate over the recent job window (absent when unavailable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_success_rate: Option<String>,
}

/// Success rate over a set of recent job statuses
fn recent_success_rate(statuses: &[String]) -> String {
    if statuses.is_empty() {
        return "0%".to_string();
    }

    let completed = statuses
        .iter()
        .filter(|s| s.as_str() == JobStatus::Completed.as_str())
        .count();

    format!("{:.1}%", completed as f64 / statuses.len() as f64 * 100.0)
}

/// Health check handler
///
/// Never fails: a broken database turns the status into "degraded" rather
/// than an error response.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_connected = pool::health_check(&state.db).await.is_ok();

    let recent = if database_connected {
        Job::recent_statuses(&state.db, RECENT_JOB_WINDOW)
            .await
            .ok()
            .map(|statuses| recent_success_rate(&statuses))
    } else {
        None
    };

    Ok(Json(HealthResponse {
        status: if database_connected {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        database: if database_connected {
            "connected".to_string()
        } else {
            "disconnected".to_string()
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        recent_success_rate: recent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_success_rate_empty() {
        assert_eq!(recent_success_rate(&[]), "0%");
    }

    #[test]
    fn test_recent_success_rate_mixed() {
        let statuses = vec![
            "completed".to_string(),
            "completed".to_string(),
            "failed".to_string(),
            "processing".to_string(),
        ];
        assert_eq!(recent_success_rate(&statuses), "50.0%");
    }

    #[test]
    fn test_recent_success_rate_all_completed() {
        let statuses = vec!["completed".to_string(); 10];
        assert_eq!(recent_success_rate(&statuses), "100.0%");
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            timestamp: Utc::now(),
            version: "0.1.0".to_string(),
            recent_success_rate: Some("90.0%".to_string()),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("connected"));
        assert!(json.contains("90.0%"));
    }
}
