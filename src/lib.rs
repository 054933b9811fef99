//! # Taskforge
//!
//! Bounded concurrent task execution primitives.
//!
//! This library generalizes the worker-pool and fan-out/fan-in patterns into
//! a small, reusable core: a bounded task queue, a fixed-size worker pool, a
//! bounded result queue closed exactly once by a completion coordinator, and
//! the synchronization helpers those pieces are built from.
//!
//! ## Data flow
//!
//! Producer → task queue → worker pool (N concurrent consumers) → result
//! queue → consumer. The producer closes the task queue when done enqueueing;
//! each worker exits when the task queue is drained and closed; the
//! coordinator waits for all workers and then closes the result queue, which
//! terminates the consumer's drain loop.
//!
//! ## Pooled execution
//!
//! ```
//! use taskforge::config::PoolConfig;
//! use taskforge::core::{Pool, Task, TaskError};
//!
//! let pool = Pool::new(
//!     PoolConfig::new().with_worker_count(3).with_task_capacity(5),
//!     |task: &Task<u64>| -> Result<u64, TaskError> { Ok(task.payload * 2) },
//! )
//! .unwrap();
//!
//! for n in 1..=5 {
//!     pool.submit(n).unwrap();
//! }
//! pool.close_submission();
//!
//! // Order across workers is unspecified; only the multiset is guaranteed.
//! let mut doubled: Vec<u64> = pool.drain().map(|r| r.outcome.unwrap()).collect();
//! doubled.sort_unstable();
//! assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
//! ```
//!
//! ## Fan-out/fan-in
//!
//! When the item count is known and small, [`core::fan_out`] spawns one
//! execution unit per item instead of pooling:
//!
//! ```
//! use taskforge::core::{fan_out, Task, TaskError};
//!
//! let results: Vec<_> = fan_out(
//!     vec!["alpha", "beta", "gamma"],
//!     |task: &Task<&str>| -> Result<usize, TaskError> { Ok(task.payload.len()) },
//! )
//! .collect();
//! assert_eq!(results.len(), 3);
//! ```
//!
//! ## Error model
//!
//! Task-level failures are captured into [`core::TaskResult::outcome`] and
//! surfaced to the consumer; they never terminate a worker. Submitting after
//! closure fails with [`core::PoolError::QueueClosed`]. Protocol violations
//! (double close, double drain) are programming errors and panic.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Builders to construct executor components from configuration.
pub mod builders;
/// Configuration models for pools and the executor.
pub mod config;
/// Core task-execution abstractions.
pub mod core;
/// Synchronization helpers.
pub mod sync;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    fan_out, BoundedQueue, Drain, Pool, PoolError, PoolStats, Task, TaskError, TaskResult,
    Transform, WaitGroup,
};
pub use config::PoolConfig;
