//! One-time initialization with an observable state machine.
//!
//! [`InitCell`] guards a single initialization behind an explicit
//! `Uninitialized -> Initializing -> Ready` transition driven by an atomic
//! compare-and-set. Exactly one caller runs the initializer; concurrent
//! callers arriving before `Ready` block on a condvar, and callers arriving
//! after short-circuit to the stored value.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

/// Observable lifecycle of an [`InitCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// No caller has started initialization.
    Uninitialized,
    /// Exactly one caller is running the initializer.
    Initializing,
    /// The value is stored; all callers short-circuit to it.
    Ready,
}

/// A cell initialized at most once, safe to race from any number of threads.
///
/// The stored value is handed out as an `Arc<T>` so concurrent readers never
/// contend once the cell is `Ready`.
pub struct InitCell<T> {
    state: AtomicU8,
    slot: Mutex<Option<Arc<T>>>,
    ready: Condvar,
}

impl<T> Default for InitCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InitCell<T> {
    /// Create an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> InitState {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => InitState::Uninitialized,
            INITIALIZING => InitState::Initializing,
            _ => InitState::Ready,
        }
    }

    /// The stored value, if initialization has completed.
    pub fn get(&self) -> Option<Arc<T>> {
        if self.state.load(Ordering::Acquire) == READY {
            self.slot.lock().clone()
        } else {
            None
        }
    }

    /// Return the stored value, running `init` first if this caller wins the
    /// transition out of `Uninitialized`.
    ///
    /// Losers of the race block until the winner publishes the value; once
    /// the cell is `Ready` every call is a cheap short-circuit.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        match self.state.compare_exchange(
            UNINITIALIZED,
            INITIALIZING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                debug!("init cell: running one-time initializer");
                let value = Arc::new(init());
                let mut slot = self.slot.lock();
                *slot = Some(Arc::clone(&value));
                // Publish Ready while holding the lock so waiters cannot
                // miss the notification.
                self.state.store(READY, Ordering::Release);
                self.ready.notify_all();
                value
            }
            Err(READY) => self
                .slot
                .lock()
                .clone()
                .expect("InitCell marked Ready with empty slot"),
            Err(_) => {
                // Initialization in flight on another thread.
                let mut slot = self.slot.lock();
                while self.state.load(Ordering::Acquire) != READY {
                    self.ready.wait(&mut slot);
                }
                slot.clone().expect("InitCell marked Ready with empty slot")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn runs_initializer_once() {
        let cell = InitCell::new();
        assert_eq!(cell.state(), InitState::Uninitialized);
        assert!(cell.get().is_none());

        let first = cell.get_or_init(|| 42);
        let second = cell.get_or_init(|| 99);

        assert_eq!(*first, 42);
        assert_eq!(*second, 42);
        assert_eq!(cell.state(), InitState::Ready);
        assert_eq!(cell.get().as_deref(), Some(&42));
    }

    #[test]
    fn concurrent_callers_observe_single_init() {
        let cell = Arc::new(InitCell::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let runs = Arc::clone(&runs);
                thread::spawn(move || {
                    let value = cell.get_or_init(|| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        "configured".to_string()
                    });
                    value.as_str().to_owned()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "configured");
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
