/// Mock pipeline for testing and demos
///
/// Simulates the generation crew with a configurable delay and an optional
/// forced failure. Useful for:
/// - Exercising the executor pool without the real crew
/// - Integration-style tests of the admit → execute → poll flow
/// - Load testing
///
/// # Example
///
/// ```
/// use draftmill_worker::pipeline::{ContentPipeline, MockPipeline};
/// use uuid::Uuid;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pipeline = MockPipeline::new();
/// let output = pipeline.generate(Uuid::new_v4(), "Rust web services").await.unwrap();
/// assert!(output.report_path.starts_with("output/strategic_report_"));
/// # }
/// ```

use crate::pipeline::{ContentPipeline, PipelineError, PipelineOutput};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

/// Mock pipeline implementation
pub struct MockPipeline {
    /// Simulated generation time
    delay: Duration,

    /// When set, every run fails with this message
    fail_with: Option<String>,
}

impl MockPipeline {
    /// Creates a mock pipeline that succeeds immediately
    pub fn new() -> Self {
        MockPipeline {
            delay: Duration::ZERO,
            fail_with: None,
        }
    }

    /// Creates a mock pipeline with a simulated generation delay
    pub fn with_delay(delay: Duration) -> Self {
        MockPipeline {
            delay,
            fail_with: None,
        }
    }

    /// Creates a mock pipeline that always fails
    pub fn failing(message: impl Into<String>) -> Self {
        MockPipeline {
            delay: Duration::ZERO,
            fail_with: Some(message.into()),
        }
    }
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentPipeline for MockPipeline {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, job_id: Uuid, topic: &str) -> Result<PipelineOutput, PipelineError> {
        tracing::debug!(job_id = %job_id, topic = %topic, "mock pipeline running");

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(message) = &self.fail_with {
            return Err(PipelineError::Generation(message.clone()));
        }

        Ok(PipelineOutput {
            report_path: format!("output/strategic_report_{}.md", job_id),
            blog_path: format!("output/blog_post_{}.md", job_id),
            tokens_used: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_pipeline_succeeds() {
        let pipeline = MockPipeline::new();
        let job_id = Uuid::new_v4();

        let output = pipeline.generate(job_id, "Quantum Computing").await.unwrap();

        assert_eq!(
            output.report_path,
            format!("output/strategic_report_{}.md", job_id)
        );
        assert_eq!(output.blog_path, format!("output/blog_post_{}.md", job_id));
        assert_eq!(output.tokens_used, None);
    }

    #[tokio::test]
    async fn test_mock_pipeline_failure() {
        let pipeline = MockPipeline::failing("search provider unavailable");

        let err = pipeline
            .generate(Uuid::new_v4(), "Quantum Computing")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "search provider unavailable");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_pipeline_delay() {
        let pipeline = MockPipeline::with_delay(Duration::from_secs(90));

        let started = tokio::time::Instant::now();
        pipeline.generate(Uuid::new_v4(), "topic").await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(90));
    }

    #[test]
    fn test_mock_pipeline_name() {
        assert_eq!(MockPipeline::new().name(), "mock");
    }
}
