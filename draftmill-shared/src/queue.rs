/// Work queue hand-off between admission and the executor pool
///
/// Admission must return to the caller without waiting on generation, so
/// accepted jobs are handed to the executors over an in-process channel.
/// The sender side lives in the admission service; the receiver side is
/// consumed by the executor pool in `draftmill-worker`.
///
/// The channel is unbounded: enqueueing never blocks the request path, and
/// every item sent before shutdown is delivered to exactly one executor.
///
/// # Example
///
/// ```
/// use draftmill_shared::queue::{work_queue, WorkItem};
/// use uuid::Uuid;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (queue, mut receiver) = work_queue();
///
/// queue.enqueue(WorkItem {
///     job_id: Uuid::new_v4(),
///     owner_id: Uuid::new_v4(),
///     topic: "Rust async runtimes".to_string(),
/// });
///
/// let item = receiver.recv().await.unwrap();
/// assert_eq!(item.topic, "Rust async runtimes");
/// # }
/// ```

use tokio::sync::mpsc;
use uuid::Uuid;

/// One unit of queued work, created by admission for each accepted job
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Job to finalize
    pub job_id: Uuid,

    /// Topic to generate content for
    pub topic: String,

    /// Account that submitted the job
    pub owner_id: Uuid,
}

/// Receiving end of the work queue, held by the executor pool
pub type WorkReceiver = mpsc::UnboundedReceiver<WorkItem>;

/// Sending handle of the work queue
///
/// Cheap to clone; one clone lives inside the admission service.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<WorkItem>,
}

impl JobQueue {
    /// Enqueues a work item without blocking
    ///
    /// A send only fails when the executor pool has shut down and dropped
    /// the receiver; at that point the process is exiting and the job will
    /// surface as stuck-processing rather than silently vanish, so the
    /// failure is logged instead of propagated.
    pub fn enqueue(&self, item: WorkItem) {
        let job_id = item.job_id;
        if self.tx.send(item).is_err() {
            tracing::error!(job_id = %job_id, "work queue closed, job will not execute");
        }
    }
}

/// Creates the work queue, returning the sender handle and the receiver
pub fn work_queue() -> (JobQueue, WorkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (JobQueue { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_delivers_in_order() {
        let (queue, mut rx) = work_queue();

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let owner = Uuid::new_v4();

        queue.enqueue(WorkItem {
            job_id: first,
            topic: "a".to_string(),
            owner_id: owner,
        });
        queue.enqueue(WorkItem {
            job_id: second,
            topic: "b".to_string(),
            owner_id: owner,
        });

        assert_eq!(rx.recv().await.unwrap().job_id, first);
        assert_eq!(rx.recv().await.unwrap().job_id, second);
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped_does_not_panic() {
        let (queue, rx) = work_queue();
        drop(rx);

        queue.enqueue(WorkItem {
            job_id: Uuid::new_v4(),
            topic: "orphan".to_string(),
            owner_id: Uuid::new_v4(),
        });
    }

    #[tokio::test]
    async fn test_cloned_senders_feed_one_receiver() {
        let (queue, mut rx) = work_queue();
        let other = queue.clone();

        other.enqueue(WorkItem {
            job_id: Uuid::new_v4(),
            topic: "from clone".to_string(),
            owner_id: Uuid::new_v4(),
        });

        assert_eq!(rx.recv().await.unwrap().topic, "from clone");
    }
}
