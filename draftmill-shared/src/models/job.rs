/// Job model and database operations
///
/// A job is one unit of requested content generation. Jobs are created by
/// the admission path and mutated exactly once, when the executor records
/// the terminal outcome. After that the record is immutable history.
///
/// # State Machine
///
/// ```text
/// processing → completed
///            → failed
/// ```
///
/// Terminal states never transition. The guarded `WHERE status =
/// 'processing'` clause on the terminal updates is what enforces this at
/// the store level: a second terminal write matches zero rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE jobs (
///     job_id UUID PRIMARY KEY,
///     owner_id UUID NOT NULL REFERENCES accounts(id),
///     topic VARCHAR(200) NOT NULL,
///     status VARCHAR(20) NOT NULL DEFAULT 'processing',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ,
///     report_path VARCHAR(512),
///     blog_path VARCHAR(512),
///     error_message TEXT,
///     execution_time INTEGER,
///     tokens_used INTEGER,
///     estimated_cost DOUBLE PRECISION
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use draftmill_shared::models::job::{CreateJob, Job};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let job = Job::create(&pool, CreateJob {
///     job_id: Uuid::new_v4(),
///     owner_id,
///     topic: "Future of Quantum Computing".to_string(),
/// }).await?;
///
/// assert_eq!(job.status, "processing");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Admitted and queued or executing; the only non-terminal state
    Processing,

    /// Generation finished, artifacts recorded
    Completed,

    /// Generation failed, error message recorded
    Failed,
}

impl JobStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Checks if the state is terminal (job has finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Checks if transition to target state is valid
    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        match (self, target) {
            (JobStatus::Processing, JobStatus::Completed) => true,
            (JobStatus::Processing, JobStatus::Failed) => true,
            // Terminal states cannot transition
            _ => false,
        }
    }

    /// Parses a stored status string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// Job model representing one content-generation request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    /// Externally visible unique job ID, generated at admission
    pub job_id: Uuid,

    /// Account that submitted the job
    pub owner_id: Uuid,

    /// The validated topic string
    pub topic: String,

    /// Current lifecycle state
    pub status: String,

    /// When the job was admitted
    pub created_at: DateTime<Utc>,

    /// When the terminal state was written (None while processing)
    pub completed_at: Option<DateTime<Utc>>,

    /// Location of the generated report (completed only)
    pub report_path: Option<String>,

    /// Location of the generated blog post (completed only)
    pub blog_path: Option<String>,

    /// Failure message (failed only)
    pub error_message: Option<String>,

    /// Wall-clock execution time in seconds (completed only)
    pub execution_time: Option<i32>,

    /// Tokens consumed by the pipeline (completed only)
    pub tokens_used: Option<i32>,

    /// Estimated cost in USD (completed only)
    pub estimated_cost: Option<f64>,
}

/// Input for creating a new job
#[derive(Debug, Clone)]
pub struct CreateJob {
    /// Fresh job ID generated by admission
    pub job_id: Uuid,

    /// Owning account
    pub owner_id: Uuid,

    /// Validated topic
    pub topic: String,
}

/// Metrics and artifact locations recorded on successful completion
#[derive(Debug, Clone)]
pub struct JobCompletion {
    /// Location of the generated report
    pub report_path: String,

    /// Location of the generated blog post
    pub blog_path: String,

    /// Wall-clock execution time in seconds
    pub execution_time: i32,

    /// Tokens consumed by the pipeline
    pub tokens_used: i32,

    /// Estimated cost in USD
    pub estimated_cost: f64,
}

impl Job {
    /// Creates a new job in processing state
    ///
    /// Takes any executor so admission can run it inside the same
    /// transaction as the quota increment.
    pub async fn create<'e, E>(executor: E, data: CreateJob) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (job_id, owner_id, topic)
            VALUES ($1, $2, $3)
            RETURNING job_id, owner_id, topic, status, created_at, completed_at,
                      report_path, blog_path, error_message,
                      execution_time, tokens_used, estimated_cost
            "#,
        )
        .bind(data.job_id)
        .bind(data.owner_id)
        .bind(data.topic)
        .fetch_one(executor)
        .await?;

        Ok(job)
    }

    /// Finds a job by ID with ownership isolation
    ///
    /// Returns `None` both when the job does not exist and when it belongs
    /// to a different account, so callers cannot enumerate foreign job ids.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        job_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT job_id, owner_id, topic, status, created_at, completed_at,
                   report_path, blog_path, error_message,
                   execution_time, tokens_used, estimated_cost
            FROM jobs
            WHERE job_id = $1 AND owner_id = $2
            "#,
        )
        .bind(job_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Transitions a job to completed, recording artifacts and metrics
    ///
    /// Sets `completed_at`. The guard on the current status makes this the
    /// job's single terminal write: a job already terminal matches zero
    /// rows and `None` is returned.
    pub async fn complete(
        pool: &PgPool,
        job_id: Uuid,
        outcome: JobCompletion,
    ) -> Result<Option<Self>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'completed',
                completed_at = NOW(),
                report_path = $2,
                blog_path = $3,
                execution_time = $4,
                tokens_used = $5,
                estimated_cost = $6
            WHERE job_id = $1 AND status = 'processing'
            RETURNING job_id, owner_id, topic, status, created_at, completed_at,
                      report_path, blog_path, error_message,
                      execution_time, tokens_used, estimated_cost
            "#,
        )
        .bind(job_id)
        .bind(outcome.report_path)
        .bind(outcome.blog_path)
        .bind(outcome.execution_time)
        .bind(outcome.tokens_used)
        .bind(outcome.estimated_cost)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Transitions a job to failed, recording the error message
    ///
    /// Sets `completed_at`. Same single-write guard as [`Job::complete`].
    pub async fn fail(
        pool: &PgPool,
        job_id: Uuid,
        error_message: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'failed',
                completed_at = NOW(),
                error_message = $2
            WHERE job_id = $1 AND status = 'processing'
            RETURNING job_id, owner_id, topic, status, created_at, completed_at,
                      report_path, blog_path, error_message,
                      execution_time, tokens_used, estimated_cost
            "#,
        )
        .bind(job_id)
        .bind(error_message)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Counts all jobs
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts jobs in a given state
    pub async fn count_by_status(pool: &PgPool, status: JobStatus) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Returns the statuses of the most recently created jobs
    ///
    /// Used by the health probe to compute a recent success rate.
    pub async fn recent_statuses(pool: &PgPool, limit: i64) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT status
            FROM jobs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// Sums recorded costs over completed jobs
    ///
    /// Returns `(completed_count, total_cost)`.
    pub async fn completed_cost_totals(pool: &PgPool) -> Result<(i64, f64), sqlx::Error> {
        let (count, total): (i64, f64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(estimated_cost), 0.0)
            FROM jobs
            WHERE status = 'completed'
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok((count, total))
    }

    /// Parses the stored status string
    pub fn job_status(&self) -> Option<JobStatus> {
        JobStatus::parse(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_as_str() {
        assert_eq!(JobStatus::Processing.as_str(), "processing");
        assert_eq!(JobStatus::Completed.as_str(), "completed");
        assert_eq!(JobStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_job_status_is_terminal() {
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_job_status_transitions() {
        // Processing can reach either terminal state
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));

        // No transition leaves a terminal state
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Processing));

        // Self-transitions are invalid too
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn test_job_status_parse() {
        assert_eq!(JobStatus::parse("processing"), Some(JobStatus::Processing));
        assert_eq!(JobStatus::parse("completed"), Some(JobStatus::Completed));
        assert_eq!(JobStatus::parse("failed"), Some(JobStatus::Failed));
        assert_eq!(JobStatus::parse("pending"), None);
        assert_eq!(JobStatus::parse(""), None);
    }
}
