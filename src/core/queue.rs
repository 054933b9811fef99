//! Bounded, closable FIFO queue built on `crossbeam-channel`.
//!
//! This is the substrate both the task queue and the result queue are built
//! from: a bounded channel with an explicit, one-way submission-side closure.
//! Consumers see a lazy, finite sequence of items that terminates once the
//! queue is both closed and drained.
//!
//! # Design
//!
//! - **Backpressure, not rejection**: `enqueue` blocks while the queue is at
//!   capacity. Capacity 0 is a rendezvous queue (synchronous handoff).
//! - **One-way closure**: after `close()`, `enqueue` fails with
//!   [`PoolError::QueueClosed`]. Closing twice is a programming error and
//!   panics.
//! - **No lock held while blocking**: the producer handle is cloned out of a
//!   brief mutex before the (potentially blocking) send.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::debug;

use super::error::PoolError;

/// A bounded FIFO queue with blocking enqueue and one-way closure.
///
/// Cloning is not provided; share the queue behind an `Arc` and hand out
/// consumer-side [`Receiver`]s via [`BoundedQueue::receiver`].
pub struct BoundedQueue<T> {
    /// Producer handle. `None` once closed; taking it is the closure.
    tx: Mutex<Option<Sender<T>>>,
    rx: Receiver<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue with the given capacity.
    ///
    /// A capacity of 0 creates a rendezvous queue: every `enqueue` blocks
    /// until a consumer is ready to receive the item.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
            capacity,
        }
    }

    /// Enqueue an item, blocking while the queue is at capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::QueueClosed`] if the queue was closed before this
    /// call. An enqueue that was already blocked when `close()` ran still
    /// completes: closure stops future submissions, it does not revoke
    /// in-flight ones.
    pub fn enqueue(&self, item: T) -> Result<(), PoolError> {
        // Clone the sender out so the blocking send happens outside the lock.
        let tx = {
            let guard = self.tx.lock();
            match guard.as_ref() {
                Some(tx) => tx.clone(),
                None => return Err(PoolError::QueueClosed),
            }
        };
        // All receivers are owned by the queue or its workers, so the channel
        // cannot disconnect while `self.rx` is alive.
        tx.send(item).map_err(|_| PoolError::QueueClosed)
    }

    /// Close the submission side. Consumers keep draining buffered items;
    /// iteration ends once the queue is empty.
    ///
    /// # Panics
    ///
    /// Panics if called more than once. Double-close indicates a caller
    /// logic bug, not a runtime condition.
    pub fn close(&self) {
        let prev = self.tx.lock().take();
        assert!(prev.is_some(), "BoundedQueue::close called twice");
        debug!(capacity = self.capacity, "queue closed for submission");
    }

    /// Whether the submission side has been closed.
    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Number of items currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the buffer is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// The configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// A consumer-side handle. Receivers share the queue: each item is
    /// delivered to exactly one receiver, and `recv` unblocks with an error
    /// once the queue is closed and drained.
    #[must_use]
    pub fn receiver(&self) -> Receiver<T> {
        self.rx.clone()
    }

    /// Blocking iterator over the queue's items, terminating when the queue
    /// is both closed and empty.
    pub fn iter(&self) -> crossbeam_channel::IntoIter<T> {
        self.rx.clone().into_iter()
    }
}
