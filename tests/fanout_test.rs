//! Integration tests for the fan-out/fan-in variant.

use std::thread;
use std::time::Duration;

use rand::Rng;
use taskforge::core::{fan_out, Task, TaskError, TaskResult};

#[test]
fn three_items_with_buffer_of_three_terminate() {
    // Result buffer is sized to the item count inside fan_out, so every
    // unit can finish without a concurrent drain; this must not deadlock.
    let endpoints = vec!["alpha.example", "beta.example", "gamma.example"];

    let results: Vec<TaskResult<String>> = fan_out(
        endpoints,
        |task: &Task<&str>| -> Result<String, TaskError> {
            // Simulated variable latency, as a remote fetch would have.
            let delay = rand::rng().random_range(1..20);
            thread::sleep(Duration::from_millis(delay));
            Ok(task.payload.to_uppercase())
        },
    )
    .collect();

    assert_eq!(results.len(), 3);
    let mut ids: Vec<u64> = results.iter().map(|r| r.task_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2], "each result carries its originating id");
}

#[test]
fn simulated_failures_are_reported_not_dropped() {
    // Every even item fails; the consumer must see a mix of successes and
    // failures, never a silent drop.
    let results: Vec<TaskResult<u32>> = fan_out(
        0..10u32,
        |task: &Task<u32>| -> Result<u32, TaskError> {
            if task.payload % 2 == 0 {
                Err(TaskError::failed(format!("unreachable: {}", task.payload)))
            } else {
                Ok(task.payload)
            }
        },
    )
    .collect();

    assert_eq!(results.len(), 10);
    assert_eq!(results.iter().filter(|r| r.is_success()).count(), 5);
    assert_eq!(results.iter().filter(|r| !r.is_success()).count(), 5);
}

#[test]
fn panicking_unit_is_contained() {
    let results: Vec<TaskResult<u32>> = fan_out(
        vec![1u32, 2, 3],
        |task: &Task<u32>| -> Result<u32, TaskError> {
            assert!(task.payload != 2, "unit blew up");
            Ok(task.payload)
        },
    )
    .collect();

    assert_eq!(results.len(), 3);
    let panicked: Vec<_> = results
        .iter()
        .filter(|r| matches!(r.outcome, Err(TaskError::Panicked(_))))
        .collect();
    assert_eq!(panicked.len(), 1);
    assert_eq!(panicked[0].task_id, 1);
}

#[test]
fn larger_fan_out_yields_one_result_per_item() {
    let results: Vec<TaskResult<u64>> = fan_out(
        0..64u64,
        |task: &Task<u64>| -> Result<u64, TaskError> { Ok(task.payload * task.payload) },
    )
    .collect();

    assert_eq!(results.len(), 64);
    let mut values: Vec<u64> = results.into_iter().map(|r| r.outcome.unwrap()).collect();
    values.sort_unstable();
    assert_eq!(values, (0..64u64).map(|n| n * n).collect::<Vec<u64>>());
}
