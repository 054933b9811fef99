//! Fan-out/fan-in: one execution unit per input item, no shared task queue.
//!
//! An alternate shape to the pooled executor: each input item gets its own
//! thread, every thread pushes exactly one result into a result queue sized
//! to the item count, and a coordinator waits for all of them before closing
//! the queue. Task assignment is 1:1 with spawn, not pull-based.
//!
//! Use this only when the item count is known and small: concurrency is
//! unbounded, so a large input risks resource exhaustion. Inputs above
//! [`FAN_OUT_WARN_THRESHOLD`] log a warning; a production caller that needs
//! more should bound the work with a [`Pool`](super::pool::Pool) instead.

use std::thread;

use crossbeam_channel::bounded;
use tracing::{debug, warn};

use super::completion::WaitGroup;
use super::pool::{run_transform, Drain, Task, TaskResult, Transform};

/// Item count above which [`fan_out`] logs a warning about unbounded spawn.
pub const FAN_OUT_WARN_THRESHOLD: usize = 256;

/// Execute the transform once per item, each on its own thread, and return
/// the result stream.
///
/// The result queue is sized to the item count, so every unit can push its
/// result without blocking even if the caller delays iterating. Iteration
/// terminates after exactly one result per item; results carry the
/// originating task id (the item's index in `items`). Order is whatever the
/// thread interleaving produces.
///
/// Transform failures and panics are contained per item, exactly as in the
/// pooled executor.
pub fn fan_out<T, U, F, I>(items: I, transform: F) -> Drain<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Transform<T, U>,
    I: IntoIterator<Item = T>,
{
    let tasks: Vec<Task<T>> = items
        .into_iter()
        .enumerate()
        .map(|(idx, payload)| Task {
            id: idx as u64,
            payload,
        })
        .collect();

    if tasks.len() > FAN_OUT_WARN_THRESHOLD {
        warn!(
            item_count = tasks.len(),
            threshold = FAN_OUT_WARN_THRESHOLD,
            "fan-out spawns one thread per item; consider a bounded pool"
        );
    }

    let (result_tx, result_rx) = bounded(tasks.len());
    let wait_group = WaitGroup::new(tasks.len());

    let mut units = Vec::with_capacity(tasks.len());
    for task in tasks {
        let result_tx = result_tx.clone();
        let wait_group = wait_group.clone();
        let transform = transform.clone();
        let unit = thread::Builder::new()
            .name(format!("tf-fanout-{}", task.id))
            .spawn(move || {
                let task_id = task.id;
                debug!(task_id, "fan-out unit started");
                let outcome = run_transform(&transform, &task);
                // The queue holds one slot per item, so this never blocks.
                let _ = result_tx.send(TaskResult {
                    task_id,
                    worker: task_id as usize,
                    outcome,
                });
                wait_group.done();
            })
            .expect("failed to spawn fan-out thread");
        units.push(unit);
    }

    // The coordinator retains the last sender: the result queue closes only
    // after every unit has finished, never from inside a unit.
    thread::Builder::new()
        .name("tf-fanout-coordinator".into())
        .spawn(move || {
            wait_group.wait();
            for unit in units {
                let _ = unit.join();
            }
            drop(result_tx);
            debug!("all fan-out units finished, result queue closed");
        })
        .expect("failed to spawn fan-out coordinator");

    Drain::new(result_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TaskError;

    #[test]
    fn empty_input_terminates() {
        let results: Vec<TaskResult<u32>> = fan_out(
            Vec::<u32>::new(),
            |task: &Task<u32>| -> Result<u32, TaskError> { Ok(task.payload) },
        )
        .collect();
        assert!(results.is_empty());
    }

    #[test]
    fn one_result_per_item_with_originating_id() {
        let results: Vec<TaskResult<String>> = fan_out(
            vec!["a", "b", "c"],
            |task: &Task<&str>| -> Result<String, TaskError> {
                Ok(format!("{}:{}", task.id, task.payload))
            },
        )
        .collect();

        assert_eq!(results.len(), 3);
        let mut pairs: Vec<(u64, String)> = results
            .into_iter()
            .map(|r| (r.task_id, r.outcome.unwrap()))
            .collect();
        pairs.sort_unstable();
        assert_eq!(
            pairs,
            vec![
                (0, "0:a".to_string()),
                (1, "1:b".to_string()),
                (2, "2:c".to_string()),
            ]
        );
    }
}
