//! Join barrier used to detect that every worker has permanently exited.
//!
//! The completion coordinator owns the only legal closure of a result queue:
//! it waits on this barrier until all workers are done, then closes the
//! queue. Individual workers never close shared queues.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// A counting join barrier, initialized to the number of participants.
///
/// Each participant calls [`WaitGroup::done`] exactly once on exit
/// (including failure-containment paths, since workers only ever exit on
/// queue closure). [`WaitGroup::wait`] blocks until the count reaches zero.
///
/// Cloning shares the same barrier.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<WaitGroupState>,
}

struct WaitGroupState {
    remaining: Mutex<usize>,
    zero: Condvar,
}

impl WaitGroup {
    /// Create a barrier expecting `count` participants.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(WaitGroupState {
                remaining: Mutex::new(count),
                zero: Condvar::new(),
            }),
        }
    }

    /// Mark one participant as finished.
    ///
    /// # Panics
    ///
    /// Panics if called more times than the participant count. Underflow is
    /// an unsynchronized-exit bug in the caller, never a runtime condition.
    pub fn done(&self) {
        let mut remaining = self.inner.remaining.lock();
        assert!(*remaining > 0, "WaitGroup::done called more times than participants");
        *remaining -= 1;
        if *remaining == 0 {
            self.inner.zero.notify_all();
        }
    }

    /// Block until every participant has called [`WaitGroup::done`].
    pub fn wait(&self) {
        let mut remaining = self.inner.remaining.lock();
        while *remaining > 0 {
            self.inner.zero.wait(&mut remaining);
        }
    }

    /// Number of participants that have not yet finished.
    #[must_use]
    pub fn remaining(&self) -> usize {
        *self.inner.remaining.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_releases_at_zero() {
        let wg = WaitGroup::new(3);
        for _ in 0..3 {
            let wg = wg.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                wg.done();
            });
        }
        wg.wait();
        assert_eq!(wg.remaining(), 0);
    }

    #[test]
    fn zero_participants_wait_returns_immediately() {
        let wg = WaitGroup::new(0);
        wg.wait();
    }

    #[test]
    #[should_panic(expected = "more times than participants")]
    fn underflow_panics() {
        let wg = WaitGroup::new(1);
        wg.done();
        wg.done();
    }
}
