/// Admin reporting endpoints
///
/// Aggregate counters over the account and job stores. All three endpoints
/// sit behind the admin bearer token layer; without a configured token they
/// are unavailable.
///
/// # Endpoints
///
/// - `GET /admin/stats` - platform-wide counters and success rate
/// - `GET /admin/users` - account listing with tier and usage
/// - `GET /admin/costs` - cost aggregates over completed jobs

use crate::app::AppState;
use crate::error::ApiError;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use draftmill_shared::models::account::Account;
use draftmill_shared::models::job::{Job, JobStatus};
use serde::Serialize;
use uuid::Uuid;

/// Platform statistics response
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    /// All registered accounts
    pub total_accounts: i64,

    /// Accounts able to authenticate
    pub active_accounts: i64,

    /// All jobs ever admitted
    pub total_jobs: i64,

    /// Jobs that reached completed
    pub completed_jobs: i64,

    /// completed/total as a percentage string, "0%" with no jobs
    pub success_rate: String,
}

/// One row of the account listing
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    /// Account ID
    pub id: Uuid,

    /// Account email
    pub email: String,

    /// Subscription tier
    pub tier: String,

    /// Usage as "used/limit"
    pub usage: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Cost analytics response
#[derive(Debug, Clone, Serialize)]
pub struct CostReport {
    /// Completed jobs with recorded costs
    pub total_jobs: i64,

    /// Sum of estimated costs, formatted as USD
    pub total_cost: String,

    /// Mean cost per completed job, formatted as USD
    pub avg_cost_per_job: String,

    /// Projection assuming the current total is a daily rate
    pub estimated_monthly: String,
}

/// Formats a completed/total ratio as a percentage string
fn format_success_rate(completed: i64, total: i64) -> String {
    if total > 0 {
        format!("{:.1}%", completed as f64 / total as f64 * 100.0)
    } else {
        "0%".to_string()
    }
}

/// Platform statistics handler
pub async fn platform_stats(
    State(state): State<AppState>,
) -> Result<Json<PlatformStats>, ApiError> {
    let total_accounts = Account::count_all(&state.db).await?;
    let active_accounts = Account::count_active(&state.db).await?;
    let total_jobs = Job::count_all(&state.db).await?;
    let completed_jobs = Job::count_by_status(&state.db, JobStatus::Completed).await?;

    Ok(Json(PlatformStats {
        total_accounts,
        active_accounts,
        total_jobs,
        completed_jobs,
        success_rate: format_success_rate(completed_jobs, total_jobs),
    }))
}

/// Account listing handler
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    let accounts = Account::list_all(&state.db).await?;

    let summaries = accounts
        .into_iter()
        .map(|account| AccountSummary {
            id: account.id,
            email: account.email,
            tier: account.tier,
            usage: format!("{}/{}", account.usage_count, account.monthly_limit),
            created_at: account.created_at,
        })
        .collect();

    Ok(Json(summaries))
}

/// Cost analytics handler
pub async fn cost_report(State(state): State<AppState>) -> Result<Json<CostReport>, ApiError> {
    let (total_jobs, total_cost) = Job::completed_cost_totals(&state.db).await?;

    let avg_cost = if total_jobs > 0 {
        total_cost / total_jobs as f64
    } else {
        0.0
    };

    Ok(Json(CostReport {
        total_jobs,
        total_cost: format!("${:.2}", total_cost),
        avg_cost_per_job: format!("${:.4}", avg_cost),
        estimated_monthly: format!("${:.2}", total_cost * 30.0),
    }))
}
