/// Job admission
///
/// The synchronous gate between an authenticated submission and the
/// executor pool. Admission validates the topic, consumes one unit of the
/// account's monthly allowance, creates the job record, and hands the work
/// item to the queue, then returns without waiting on generation.
///
/// The quota increment and the job insert run in one transaction: a
/// submission is never counted without a job record, and a job record is
/// never created without its increment. The limit check rides inside the
/// increment's `WHERE` clause, so two racing submissions for the same
/// account cannot overshoot the limit.
///
/// Validation order: empty topic, then topic length, then quota. A request
/// rejected for any of these mutates nothing.
///
/// # Example
///
/// ```no_run
/// use draftmill_shared::admission::AdmissionService;
/// use draftmill_shared::models::account::Account;
/// use draftmill_shared::queue::work_queue;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, account: Account) -> anyhow::Result<()> {
/// let (queue, _receiver) = work_queue();
/// let admission = AdmissionService::new(pool, queue);
///
/// let admitted = admission.admit(&account, "Rust in embedded systems").await?;
/// println!("job {} accepted, usage {}", admitted.job.job_id, admitted.usage);
/// # Ok(())
/// # }
/// ```

use crate::models::account::Account;
use crate::models::job::{CreateJob, Job};
use crate::queue::{JobQueue, WorkItem};
use crate::quota::QuotaSnapshot;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Default ceiling on topic length, in characters
pub const DEFAULT_MAX_TOPIC_LENGTH: usize = 200;

/// Admission failure
///
/// None of these variants leave any state behind.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Topic is empty after trimming
    #[error("empty topic")]
    EmptyTopic,

    /// Topic exceeds the configured maximum length
    #[error("topic too long (max {max} characters)")]
    TopicTooLong {
        /// The configured ceiling
        max: usize,
    },

    /// Account has exhausted its monthly allowance
    #[error("monthly limit reached ({limit} requests)")]
    QuotaExceeded {
        /// The account's limit, for display
        limit: i32,
    },

    /// Store operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A successfully admitted job
#[derive(Debug)]
pub struct AdmittedJob {
    /// The freshly created job record (status `processing`)
    pub job: Job,

    /// Post-increment usage snapshot
    pub usage: QuotaSnapshot,
}

/// Validates and normalizes a submitted topic
///
/// Returns the trimmed topic. Length is measured in characters, not bytes.
pub fn validate_topic(topic: &str, max_length: usize) -> Result<&str, AdmissionError> {
    let trimmed = topic.trim();

    if trimmed.is_empty() {
        return Err(AdmissionError::EmptyTopic);
    }

    if trimmed.chars().count() > max_length {
        return Err(AdmissionError::TopicTooLong { max: max_length });
    }

    Ok(trimmed)
}

/// Admission service
///
/// Constructed once at startup with the pool and the queue sender, then
/// shared by handle with the request layer.
#[derive(Clone)]
pub struct AdmissionService {
    db: PgPool,
    queue: JobQueue,
    max_topic_length: usize,
}

impl AdmissionService {
    /// Creates an admission service with the default topic length limit
    pub fn new(db: PgPool, queue: JobQueue) -> Self {
        AdmissionService {
            db,
            queue,
            max_topic_length: DEFAULT_MAX_TOPIC_LENGTH,
        }
    }

    /// Creates an admission service with a custom topic length limit
    pub fn with_max_topic_length(db: PgPool, queue: JobQueue, max_topic_length: usize) -> Self {
        AdmissionService {
            db,
            queue,
            max_topic_length,
        }
    }

    /// Validates a submission and, if valid, admits it
    ///
    /// On success the job exists in the store with status `processing`, the
    /// account's usage is incremented, and the work item is queued. The
    /// returned snapshot reflects the post-increment counter.
    ///
    /// # Errors
    ///
    /// See [`AdmissionError`]; rejection never mutates the stores.
    pub async fn admit(
        &self,
        account: &Account,
        topic: &str,
    ) -> Result<AdmittedJob, AdmissionError> {
        let topic = validate_topic(topic, self.max_topic_length)?;

        let mut tx = self.db.begin().await?;

        // Limit check and increment in one statement; zero rows means the
        // account is at its ceiling and the transaction rolls back untouched.
        let Some((used, limit)) = Account::consume_quota(&mut *tx, account.id).await? else {
            return Err(AdmissionError::QuotaExceeded {
                limit: account.monthly_limit,
            });
        };

        let job = Job::create(
            &mut *tx,
            CreateJob {
                job_id: Uuid::new_v4(),
                owner_id: account.id,
                topic: topic.to_string(),
            },
        )
        .await?;

        tx.commit().await?;

        // Hand-off happens only after the commit; the send cannot block.
        self.queue.enqueue(WorkItem {
            job_id: job.job_id,
            topic: job.topic.clone(),
            owner_id: job.owner_id,
        });

        tracing::info!(
            job_id = %job.job_id,
            owner_id = %job.owner_id,
            usage = %format!("{}/{}", used, limit),
            "job admitted"
        );

        Ok(AdmittedJob {
            job,
            usage: QuotaSnapshot::new(used, limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_topic_trims() {
        assert_eq!(validate_topic("  Quantum Computing  ", 200).unwrap(), "Quantum Computing");
    }

    #[test]
    fn test_validate_topic_rejects_empty() {
        assert!(matches!(validate_topic("", 200), Err(AdmissionError::EmptyTopic)));
        assert!(matches!(validate_topic("   ", 200), Err(AdmissionError::EmptyTopic)));
        assert!(matches!(validate_topic("\t\n", 200), Err(AdmissionError::EmptyTopic)));
    }

    #[test]
    fn test_validate_topic_length_boundary() {
        let at_limit = "a".repeat(200);
        assert!(validate_topic(&at_limit, 200).is_ok());

        let over_limit = "a".repeat(201);
        assert!(matches!(
            validate_topic(&over_limit, 200),
            Err(AdmissionError::TopicTooLong { max: 200 })
        ));
    }

    #[test]
    fn test_validate_topic_counts_chars_not_bytes() {
        // 10 three-byte characters are still 10 characters
        let topic = "字".repeat(10);
        assert!(validate_topic(&topic, 10).is_ok());
        assert!(validate_topic(&topic, 9).is_err());
    }

    #[test]
    fn test_validate_topic_length_checked_after_trim() {
        let padded = format!("  {}  ", "a".repeat(200));
        assert!(validate_topic(&padded, 200).is_ok());
    }

    #[test]
    fn test_admission_error_display() {
        assert_eq!(AdmissionError::EmptyTopic.to_string(), "empty topic");
        assert_eq!(
            AdmissionError::TopicTooLong { max: 200 }.to_string(),
            "topic too long (max 200 characters)"
        );
        assert_eq!(
            AdmissionError::QuotaExceeded { limit: 10 }.to_string(),
            "monthly limit reached (10 requests)"
        );
    }
}
