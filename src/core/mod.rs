//! Core task-execution abstractions: queues, worker pools, fan-out, and the
//! completion barrier.

pub mod completion;
pub mod error;
pub mod fanout;
pub mod pool;
pub mod queue;

pub use completion::WaitGroup;
pub use error::{AppResult, PoolError, TaskError};
pub use fanout::{fan_out, FAN_OUT_WARN_THRESHOLD};
pub use pool::{Drain, Pool, PoolStats, Task, TaskResult, Transform};
pub use queue::BoundedQueue;
