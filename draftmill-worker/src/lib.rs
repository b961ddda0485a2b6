//! # Draftmill Worker Library
//!
//! Background execution for admitted jobs: a fixed executor pool consumes
//! the work queue, drives the content pipeline, and records each job's
//! terminal outcome.
//!
//! ## Modules
//!
//! - `executor`: worker pool and per-job execution
//! - `pipeline`: the opaque generation boundary and its mock
//! - `cost`: token-to-USD estimation
//!
//! ## Example
//!
//! ```no_run
//! use draftmill_shared::queue::work_queue;
//! use draftmill_worker::executor::{ExecutorConfig, ExecutorPool};
//! use draftmill_worker::pipeline::MockPipeline;
//! use sqlx::PgPool;
//! use std::sync::Arc;
//!
//! # async fn example(pool: PgPool) {
//! let (queue, receiver) = work_queue();
//! let executors = ExecutorPool::spawn(
//!     ExecutorConfig::default(),
//!     pool,
//!     Arc::new(MockPipeline::new()),
//!     receiver,
//! );
//! # drop(queue);
//! # executors.join().await;
//! # }
//! ```

pub mod cost;
pub mod executor;
pub mod pipeline;
