//! Error types for executor components.

use thiserror::Error;

/// Errors produced by queue and pool operations.
///
/// Only structural, caller-recoverable conditions are modeled here. Protocol
/// violations (double-close of a queue, draining a pool twice, wait-group
/// underflow) are caller logic bugs and panic instead of returning a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Enqueue or submit attempted after the submission side was closed.
    /// The caller must stop submitting; already-accepted tasks still run.
    #[error("queue closed: no further submissions are accepted")]
    QueueClosed,
    /// Configuration validation failed at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A failure produced while executing a single task.
///
/// Task-level failures are always captured into the task's result and
/// surfaced to the consumer of the result stream. They never terminate a
/// worker and never propagate up the call stack.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The transform returned an error for this task.
    #[error("task failed: {0}")]
    Failed(String),
    /// The transform panicked; the panic was contained to this task.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Build a [`TaskError::Failed`] from any displayable error.
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_error_display() {
        assert_eq!(
            PoolError::QueueClosed.to_string(),
            "queue closed: no further submissions are accepted"
        );
        assert_eq!(
            PoolError::InvalidConfig("worker_count must be greater than 0".into()).to_string(),
            "invalid configuration: worker_count must be greater than 0"
        );
    }

    #[test]
    fn task_error_display() {
        assert_eq!(TaskError::failed("boom").to_string(), "task failed: boom");
        assert_eq!(
            TaskError::Panicked("oops".into()).to_string(),
            "task panicked: oops"
        );
    }
}
