//! Fixed-size worker pool pulling tasks from a shared bounded queue.
//!
//! A [`Pool`] owns a bounded task queue, a fixed set of worker threads, a
//! bounded result queue, and a completion coordinator. The producer submits
//! tasks and closes submission; workers drain the task queue concurrently and
//! push one result per task; the coordinator waits for every worker to exit
//! and then closes the result queue, which terminates the consumer's
//! [`Pool::drain`] loop.
//!
//! # Ordering
//!
//! There is no guarantee about which worker processes which task, nor about
//! result order relative to submission order. With a single worker the pool
//! degenerates to sequential processing and order is preserved; with more
//! workers only multiset equality of task ids holds.
//!
//! # Failure containment
//!
//! A transform error (or panic) is captured into the task's result and the
//! worker moves on to the next task. A task failure never terminates a
//! worker or the pool.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;

use super::completion::WaitGroup;
use super::error::{PoolError, TaskError};
use super::queue::BoundedQueue;

/// An opaque unit of work. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<T> {
    /// Pool-assigned identifier, unique within the pool's lifetime.
    pub id: u64,
    /// Caller-supplied payload.
    pub payload: T,
}

/// The outcome of executing one task. Produced exactly once per accepted task.
#[derive(Debug, Clone)]
pub struct TaskResult<U> {
    /// Identifier of the task this result belongs to.
    pub task_id: u64,
    /// Worker that executed the task. Observability only; carries no
    /// ordering meaning.
    pub worker: usize,
    /// Success value or the captured task-level failure.
    pub outcome: Result<U, TaskError>,
}

impl<U> TaskResult<U> {
    /// Whether the task completed without error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A user-supplied transform applied to each task by the workers.
///
/// Implementations must be cloneable so each worker thread can own a copy.
/// Closures of the matching shape implement this automatically:
///
/// ```
/// use taskforge::core::{Task, TaskError};
///
/// let double = |task: &Task<i32>| -> Result<i32, TaskError> { Ok(task.payload * 2) };
/// # let _ = double;
/// ```
pub trait Transform<T, U>: Send + Sync + Clone + 'static {
    /// Execute one task, returning its value or a task-level failure.
    ///
    /// Errors returned here are captured into [`TaskResult::outcome`]; they
    /// never propagate past the worker loop.
    fn apply(&self, task: &Task<T>) -> Result<U, TaskError>;
}

impl<T, U, F> Transform<T, U> for F
where
    F: Fn(&Task<T>) -> Result<U, TaskError> + Send + Sync + Clone + 'static,
{
    fn apply(&self, task: &Task<T>) -> Result<U, TaskError> {
        self(task)
    }
}

/// Statistics about pool throughput.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Tasks accepted by `submit`.
    pub submitted_tasks: u64,
    /// Tasks buffered in the task queue, not yet picked up.
    pub queued_tasks: u64,
    /// Tasks currently executing.
    pub active_tasks: u64,
    /// Tasks that completed successfully.
    pub completed_tasks: u64,
    /// Tasks whose transform failed or panicked.
    pub failed_tasks: u64,
}

/// Internal counters for pool statistics (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted_tasks: AtomicU64,
    pub queued_tasks: AtomicU64,
    pub active_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub failed_tasks: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize) -> PoolStats {
        PoolStats {
            worker_count,
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
            queued_tasks: self.queued_tasks.load(Ordering::Relaxed),
            active_tasks: self.active_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
        }
    }
}

/// Blocking iterator over a pool's (or fan-out's) results.
///
/// Terminates when the completion coordinator has closed the result queue
/// and all buffered results have been yielded.
pub struct Drain<U> {
    inner: crossbeam_channel::IntoIter<TaskResult<U>>,
}

impl<U> Drain<U> {
    pub(crate) fn new(rx: Receiver<TaskResult<U>>) -> Self {
        Self {
            inner: rx.into_iter(),
        }
    }
}

impl<U> Iterator for Drain<U> {
    type Item = TaskResult<U>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A bounded concurrent task executor with a fixed worker count.
///
/// See the [module docs](self) for the data- and control-flow contract.
///
/// # Example
///
/// ```
/// use taskforge::config::PoolConfig;
/// use taskforge::core::{Pool, Task, TaskError};
///
/// let pool = Pool::new(
///     PoolConfig::new().with_worker_count(2).with_task_capacity(8),
///     |task: &Task<u32>| -> Result<u32, TaskError> { Ok(task.payload * 2) },
/// )
/// .unwrap();
///
/// for n in 1..=5 {
///     pool.submit(n).unwrap();
/// }
/// pool.close_submission();
///
/// let mut values: Vec<u32> = pool
///     .drain()
///     .map(|r| r.outcome.unwrap())
///     .collect();
/// values.sort_unstable();
/// assert_eq!(values, vec![2, 4, 6, 8, 10]);
/// ```
pub struct Pool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    tasks: Arc<BoundedQueue<Task<T>>>,
    /// Result receiver; taken exactly once by `drain`.
    results: Mutex<Option<Receiver<TaskResult<U>>>>,
    counters: Arc<PoolCounters>,
    worker_count: usize,
    next_task_id: AtomicU64,
    /// Coordinator handle; taken by `join`.
    coordinator: Mutex<Option<JoinHandle<()>>>,
}

impl<T, U> Pool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    /// Create a pool and start its workers and completion coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new<F>(config: PoolConfig, transform: F) -> Result<Self, PoolError>
    where
        F: Transform<T, U>,
    {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let tasks = Arc::new(BoundedQueue::new(config.task_capacity));
        let (result_tx, result_rx) = bounded(config.result_capacity);
        let counters = Arc::new(PoolCounters::default());
        let wait_group = WaitGroup::new(config.worker_count);

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            workers.push(spawn_worker(
                worker_id,
                tasks.receiver(),
                result_tx.clone(),
                Arc::clone(&counters),
                wait_group.clone(),
                transform.clone(),
            ));
        }

        // The coordinator holds the last result sender; the result queue
        // closes only once it observes all workers exited.
        let coordinator = spawn_coordinator(wait_group, workers, result_tx);

        info!(
            worker_count = config.worker_count,
            task_capacity = config.task_capacity,
            result_capacity = config.result_capacity,
            "pool started"
        );

        Ok(Self {
            tasks,
            results: Mutex::new(Some(result_rx)),
            counters,
            worker_count: config.worker_count,
            next_task_id: AtomicU64::new(0),
            coordinator: Mutex::new(Some(coordinator)),
        })
    }

    /// Create a pool with `worker_count` workers and default capacities.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `worker_count` is zero.
    pub fn with_workers<F>(worker_count: usize, transform: F) -> Result<Self, PoolError>
    where
        F: Transform<T, U>,
    {
        Self::new(PoolConfig::new().with_worker_count(worker_count), transform)
    }

    /// Submit a task, blocking while the task queue is at capacity.
    ///
    /// Returns the pool-assigned task id, which reappears in the matching
    /// [`TaskResult::task_id`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::QueueClosed`] once [`Pool::close_submission`]
    /// has been called.
    pub fn submit(&self, payload: T) -> Result<u64, PoolError> {
        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        self.counters.queued_tasks.fetch_add(1, Ordering::Relaxed);

        match self.tasks.enqueue(Task { id, payload }) {
            Ok(()) => {
                self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
                debug!(task_id = id, "task submitted");
                Ok(id)
            }
            Err(err) => {
                self.counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Signal that no more tasks will be submitted. Workers finish the
    /// buffered tasks and then exit.
    ///
    /// # Panics
    ///
    /// Panics if called more than once.
    pub fn close_submission(&self) {
        self.tasks.close();
        debug!("submission closed");
    }

    /// Whether submission has been closed.
    pub fn is_submission_closed(&self) -> bool {
        self.tasks.is_closed()
    }

    /// Take the result stream. Iteration blocks until results arrive and
    /// terminates once the coordinator has closed the result queue.
    ///
    /// Draining runs concurrently with the workers, so a result queue
    /// smaller than the task count does not deadlock as long as the
    /// consumer keeps iterating.
    ///
    /// # Panics
    ///
    /// Panics if called more than once; the result stream is single-consumer.
    pub fn drain(&self) -> Drain<U> {
        let rx = self
            .results
            .lock()
            .take()
            .expect("Pool::drain called twice");
        Drain::new(rx)
    }

    /// Block until the coordinator has observed every worker exit and
    /// closed the result queue.
    ///
    /// Only meaningful after [`Pool::close_submission`]; typically called
    /// after draining when deterministic [`Pool::stats`] are wanted.
    pub fn join(&self) {
        if let Some(handle) = self.coordinator.lock().take() {
            let _ = handle.join();
        }
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.worker_count)
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }
}

impl<T, U> Drop for Pool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn drop(&mut self) {
        // Close submission if the caller never did, so workers can exit.
        // Never join threads here; an undrained pool must not hang drop.
        if !self.tasks.is_closed() {
            self.tasks.close();
            debug!("pool dropped with submission still open, closing");
        }
        drop(self.coordinator.lock().take());
    }
}

/// Spawn one worker thread running the pull-execute-report loop.
fn spawn_worker<T, U, F>(
    worker_id: usize,
    task_rx: Receiver<Task<T>>,
    results: Sender<TaskResult<U>>,
    counters: Arc<PoolCounters>,
    wait_group: WaitGroup,
    transform: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Transform<T, U>,
{
    thread::Builder::new()
        .name(format!("tf-worker-{worker_id}"))
        .spawn(move || {
            debug!(worker_id, "worker started");

            // Blocking recv; iteration ends when the task queue is closed
            // and drained.
            for task in task_rx.iter() {
                counters.queued_tasks.fetch_sub(1, Ordering::Relaxed);
                counters.active_tasks.fetch_add(1, Ordering::Relaxed);

                let task_id = task.id;
                debug!(worker_id, task_id, "worker executing task");

                let outcome = run_transform(&transform, &task);
                counters.active_tasks.fetch_sub(1, Ordering::Relaxed);
                match &outcome {
                    Ok(_) => {
                        counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        counters.failed_tasks.fetch_add(1, Ordering::Relaxed);
                        warn!(worker_id, task_id, error = %err, "task failed, worker continues");
                    }
                }

                let result = TaskResult {
                    task_id,
                    worker: worker_id,
                    outcome,
                };
                if results.send(result).is_err() {
                    // Consumer dropped the result stream; nothing left to
                    // deliver to.
                    warn!(worker_id, "result queue disconnected, worker exiting");
                    break;
                }
            }

            debug!(worker_id, "worker exiting");
            wait_group.done();
        })
        .expect("failed to spawn worker thread")
}

/// Apply the transform to one task, containing panics as task failures.
pub(crate) fn run_transform<T, U, F>(transform: &F, task: &Task<T>) -> Result<U, TaskError>
where
    F: Transform<T, U>,
    T: Send + 'static,
    U: Send + 'static,
{
    match panic::catch_unwind(AssertUnwindSafe(|| transform.apply(task))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// Spawn the completion coordinator: wait for every worker to exit, join
/// the handles, then drop the final result sender to close the result queue.
fn spawn_coordinator<U>(
    wait_group: WaitGroup,
    workers: Vec<JoinHandle<()>>,
    result_tx: Sender<TaskResult<U>>,
) -> JoinHandle<()>
where
    U: Send + 'static,
{
    thread::Builder::new()
        .name("tf-coordinator".into())
        .spawn(move || {
            wait_group.wait();
            for (worker_id, handle) in workers.into_iter().enumerate() {
                if handle.join().is_err() {
                    error!(worker_id, "worker thread panicked outside task execution");
                }
            }
            // Closes the result queue exactly once: workers dropped their
            // senders on exit, this is the last one.
            drop(result_tx);
            debug!("all workers exited, result queue closed");
        })
        .expect("failed to spawn coordinator thread")
}
