/// Content pipeline boundary
///
/// The generation crew that turns a topic into a report and a blog post is
/// an external collaborator: a single opaque, long-running call that either
/// yields two artifact locations or fails. This module defines that
/// boundary; the executor never looks inside it.
///
/// # Pipeline Contract
///
/// All pipelines must:
/// 1. Implement the [`ContentPipeline`] trait (async, object safe)
/// 2. Produce both artifact locations on success
/// 3. Report failure through [`PipelineError`], never panic for expected
///    generation failures
///
/// Duration bounding is the executor's job, not the pipeline's.
///
/// # Example
///
/// ```no_run
/// use draftmill_worker::pipeline::{ContentPipeline, PipelineError, PipelineOutput};
/// use async_trait::async_trait;
/// use uuid::Uuid;
///
/// struct CrewPipeline;
///
/// #[async_trait]
/// impl ContentPipeline for CrewPipeline {
///     fn name(&self) -> &str {
///         "crew"
///     }
///
///     async fn generate(&self, job_id: Uuid, topic: &str) -> Result<PipelineOutput, PipelineError> {
///         // Drive the external generation crew...
///         Ok(PipelineOutput {
///             report_path: format!("output/strategic_report_{}.md", job_id),
///             blog_path: format!("output/blog_post_{}.md", job_id),
///             tokens_used: Some(12_400),
///         })
///     }
/// }
/// ```

pub mod mock;

pub use mock::MockPipeline;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Pipeline failure
///
/// The message ends up verbatim on the failed job record, so it should be
/// something a polling client can act on.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The generation run failed
    #[error("{0}")]
    Generation(String),
}

/// Successful pipeline output
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Location of the generated strategic report
    pub report_path: String,

    /// Location of the generated blog post
    pub blog_path: String,

    /// Tokens consumed, if the pipeline reports usage
    ///
    /// `None` falls back to the flat estimate in [`crate::cost`].
    pub tokens_used: Option<i32>,
}

/// The opaque content-generation operation
#[async_trait]
pub trait ContentPipeline: Send + Sync {
    /// Pipeline name, for logging
    fn name(&self) -> &str;

    /// Generates both artifacts for a topic
    ///
    /// May take minutes. The job id is provided so artifact locations can
    /// be made unique per job.
    async fn generate(&self, job_id: Uuid, topic: &str) -> Result<PipelineOutput, PipelineError>;
}
