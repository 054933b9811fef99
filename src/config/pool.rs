//! Pool and executor configuration structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default capacity for the task queue when none is configured.
const DEFAULT_TASK_CAPACITY: usize = 64;

/// Default capacity for the result queue when none is configured.
const DEFAULT_RESULT_CAPACITY: usize = 64;

/// Configuration for a single worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Task queue capacity. 0 makes submission a synchronous handoff.
    pub task_capacity: usize,
    /// Result queue capacity. Must be at least 1; the consumer drains
    /// concurrently with the workers, so it need not cover the task count.
    pub result_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            task_capacity: DEFAULT_TASK_CAPACITY,
            result_capacity: DEFAULT_RESULT_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Configuration with platform-derived worker count and default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the task queue capacity (0 = synchronous handoff).
    #[must_use]
    pub const fn with_task_capacity(mut self, task_capacity: usize) -> Self {
        self.task_capacity = task_capacity;
        self
    }

    /// Set the result queue capacity.
    #[must_use]
    pub const fn with_result_capacity(mut self, result_capacity: usize) -> Self {
        self.result_capacity = result_capacity;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.result_capacity == 0 {
            return Err("result_capacity must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root executor configuration: a set of named pools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, PoolConfig>,
}

impl ExecutorConfig {
    /// Validate all pools and ensure at least one pool exists.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid pool.
    pub fn validate(&self) -> Result<(), String> {
        if self.pools.is_empty() {
            return Err("at least one pool must be defined".into());
        }
        for (name, pool) in &self.pools {
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse executor configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
