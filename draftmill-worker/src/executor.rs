/// Executor pool
///
/// A fixed pool of workers that consumes admitted jobs from the work queue,
/// drives the content pipeline for each, and performs the single terminal
/// write on the job record.
///
/// # Architecture
///
/// ```text
/// ExecutorPool
///   ├─> WorkReceiver: shared channel of (job_id, topic, owner_id) items
///   ├─> ContentPipeline: opaque generation call, bounded by a timeout
///   └─> Job store: exactly one terminal write per job
/// ```
///
/// # Concurrency
///
/// Each worker is an independent Tokio task; jobs complete in whatever
/// order their pipeline runs finish. Within one job the sequence
/// start → outcome → terminal write is strictly ordered, and the guarded
/// update in the job store means a second write can never overwrite a
/// terminal state.
///
/// A terminal write that fails (or matches no row) is reported via
/// `tracing::error!`. That job's outcome is lost and the operator must
/// know, so it is never swallowed.
///
/// # Example
///
/// ```no_run
/// use draftmill_shared::queue::work_queue;
/// use draftmill_worker::executor::{ExecutorConfig, ExecutorPool};
/// use draftmill_worker::pipeline::MockPipeline;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example(pool: PgPool) {
/// let (queue, receiver) = work_queue();
/// let executors = ExecutorPool::spawn(
///     ExecutorConfig::default(),
///     pool,
///     Arc::new(MockPipeline::new()),
///     receiver,
/// );
///
/// // Hand `queue` to the admission service; jobs flow to the pool.
/// # drop(queue);
/// # executors.join().await;
/// # }
/// ```

use crate::cost::{estimate_cost, DEFAULT_TOKENS_PER_JOB};
use crate::pipeline::{ContentPipeline, PipelineError, PipelineOutput};
use draftmill_shared::models::job::{Job, JobCompletion};
use draftmill_shared::queue::{WorkItem, WorkReceiver};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use uuid::Uuid;

/// Executor pool configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of concurrent workers
    pub workers: usize,

    /// Upper bound on a single pipeline run
    ///
    /// Expiry marks the job failed; there is no unbounded mode.
    pub pipeline_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            workers: 5,
            pipeline_timeout: Duration::from_secs(1800),
        }
    }
}

/// Executor failure
///
/// Raised only for terminal-write problems; pipeline failures are data, not
/// errors, and land on the job record.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Job store write failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The guarded update matched no row: the job is missing or already
    /// terminal, and this outcome was not recorded
    #[error("job {0} not in processing state, outcome not recorded")]
    StaleTransition(Uuid),
}

/// Reduced pipeline outcome, ready for the terminal write
#[derive(Debug)]
enum JobOutcome {
    Completed(JobCompletion),
    Failed(String),
}

/// Maps a pipeline result onto the terminal record contents
///
/// Success derives tokens (pipeline-reported or the flat estimate) and the
/// cost; failure carries the message through unchanged.
fn reduce_outcome(result: Result<PipelineOutput, PipelineError>, execution_time: i32) -> JobOutcome {
    match result {
        Ok(output) => {
            let tokens_used = output.tokens_used.unwrap_or(DEFAULT_TOKENS_PER_JOB);
            JobOutcome::Completed(JobCompletion {
                report_path: output.report_path,
                blog_path: output.blog_path,
                execution_time,
                tokens_used,
                estimated_cost: estimate_cost(tokens_used),
            })
        }
        Err(e) => JobOutcome::Failed(e.to_string()),
    }
}

/// Executes a single work item end to end
///
/// Records a start time, runs the pipeline under the configured bound, and
/// performs exactly one terminal write.
async fn execute_job(
    db: &PgPool,
    pipeline: &dyn ContentPipeline,
    pipeline_timeout: Duration,
    item: WorkItem,
) -> Result<(), ExecutorError> {
    let started = Instant::now();

    tracing::info!(
        job_id = %item.job_id,
        owner_id = %item.owner_id,
        topic = %item.topic,
        pipeline = %pipeline.name(),
        "generation started"
    );

    let result = match timeout(pipeline_timeout, pipeline.generate(item.job_id, &item.topic)).await
    {
        Ok(result) => result,
        Err(_) => Err(PipelineError::Generation(format!(
            "generation timed out after {}s",
            pipeline_timeout.as_secs()
        ))),
    };

    let execution_time = started.elapsed().as_secs().min(i32::MAX as u64) as i32;

    match reduce_outcome(result, execution_time) {
        JobOutcome::Completed(completion) => {
            let tokens_used = completion.tokens_used;
            let estimated_cost = completion.estimated_cost;

            Job::complete(db, item.job_id, completion)
                .await?
                .ok_or(ExecutorError::StaleTransition(item.job_id))?;

            tracing::info!(
                job_id = %item.job_id,
                execution_time,
                tokens_used,
                cost = %format!("${:.4}", estimated_cost),
                "generation completed"
            );
        }
        JobOutcome::Failed(message) => {
            Job::fail(db, item.job_id, &message)
                .await?
                .ok_or(ExecutorError::StaleTransition(item.job_id))?;

            tracing::warn!(
                job_id = %item.job_id,
                execution_time,
                error = %message,
                "generation failed"
            );
        }
    }

    Ok(())
}

/// Fixed pool of executor workers
pub struct ExecutorPool {
    handles: Vec<JoinHandle<()>>,
}

impl ExecutorPool {
    /// Spawns the worker pool
    ///
    /// Each worker loops on the shared receiver until the queue closes, so
    /// every enqueued item is consumed by exactly one worker.
    pub fn spawn(
        config: ExecutorConfig,
        db: PgPool,
        pipeline: Arc<dyn ContentPipeline>,
        receiver: WorkReceiver,
    ) -> Self {
        tracing::info!(
            workers = config.workers,
            pipeline_timeout_seconds = config.pipeline_timeout.as_secs(),
            pipeline = %pipeline.name(),
            "starting executor pool"
        );

        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..config.workers)
            .map(|worker_id| {
                let db = db.clone();
                let pipeline = pipeline.clone();
                let receiver = receiver.clone();
                let pipeline_timeout = config.pipeline_timeout;

                tokio::spawn(async move {
                    tracing::debug!(worker_id, "executor worker started");

                    loop {
                        // Hold the lock only across the recv; one worker
                        // wakes per item.
                        let item = receiver.lock().await.recv().await;

                        let Some(item) = item else {
                            break;
                        };

                        if let Err(e) =
                            execute_job(&db, pipeline.as_ref(), pipeline_timeout, item).await
                        {
                            tracing::error!(worker_id, error = %e, "failed to record job outcome");
                        }
                    }

                    tracing::debug!(worker_id, "executor worker stopped");
                })
            })
            .collect();

        ExecutorPool { handles }
    }

    /// Waits for all workers to drain and exit
    ///
    /// Workers exit once every queue sender has been dropped and the
    /// remaining items are processed.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "executor worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_config_default() {
        let config = ExecutorConfig::default();
        assert_eq!(config.workers, 5);
        assert_eq!(config.pipeline_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_reduce_outcome_success_with_reported_tokens() {
        let result = Ok(PipelineOutput {
            report_path: "output/strategic_report_x.md".to_string(),
            blog_path: "output/blog_post_x.md".to_string(),
            tokens_used: Some(20_000),
        });

        match reduce_outcome(result, 95) {
            JobOutcome::Completed(completion) => {
                assert_eq!(completion.report_path, "output/strategic_report_x.md");
                assert_eq!(completion.blog_path, "output/blog_post_x.md");
                assert_eq!(completion.execution_time, 95);
                assert_eq!(completion.tokens_used, 20_000);
                assert!((completion.estimated_cost - 0.9).abs() < 1e-9);
            }
            JobOutcome::Failed(message) => panic!("expected completion, got failure: {message}"),
        }
    }

    #[test]
    fn test_reduce_outcome_success_falls_back_to_flat_estimate() {
        let result = Ok(PipelineOutput {
            report_path: "r".to_string(),
            blog_path: "b".to_string(),
            tokens_used: None,
        });

        match reduce_outcome(result, 60) {
            JobOutcome::Completed(completion) => {
                assert_eq!(completion.tokens_used, DEFAULT_TOKENS_PER_JOB);
                assert!((completion.estimated_cost - 0.675).abs() < 1e-9);
            }
            JobOutcome::Failed(message) => panic!("expected completion, got failure: {message}"),
        }
    }

    #[test]
    fn test_reduce_outcome_failure_keeps_message() {
        let result = Err(PipelineError::Generation(
            "search provider unavailable".to_string(),
        ));

        match reduce_outcome(result, 5) {
            JobOutcome::Failed(message) => assert_eq!(message, "search provider unavailable"),
            JobOutcome::Completed(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_stale_transition_display() {
        let id = Uuid::nil();
        let err = ExecutorError::StaleTransition(id);
        assert!(err.to_string().contains("not in processing state"));
    }
}
