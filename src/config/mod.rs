//! Configuration models for pools and the executor.

pub mod pool;

pub use pool::{ExecutorConfig, PoolConfig};
