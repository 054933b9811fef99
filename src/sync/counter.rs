//! Mutex-guarded shared counter.
//!
//! The explicit, ownership-clear replacement for an ambient global counter:
//! construct one, clone the handle into every thread that needs it. The
//! `parking_lot` guard releases the lock on every exit path, including
//! early returns and panics.

use std::sync::Arc;

use parking_lot::Mutex;

/// A thread-safe counter shared by cloning.
///
/// # Example
///
/// ```
/// use std::thread;
/// use taskforge::sync::SharedCounter;
///
/// let counter = SharedCounter::new();
/// let handles: Vec<_> = (0..100)
///     .map(|_| {
///         let counter = counter.clone();
///         thread::spawn(move || counter.increment())
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(counter.get(), 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedCounter {
    value: Arc<Mutex<u64>>,
}

impl SharedCounter {
    /// Create a counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter starting at `value`.
    #[must_use]
    pub fn with_value(value: u64) -> Self {
        Self {
            value: Arc::new(Mutex::new(value)),
        }
    }

    /// Increment by one.
    pub fn increment(&self) {
        *self.value.lock() += 1;
    }

    /// Add `n` to the counter.
    pub fn add(&self, n: u64) {
        *self.value.lock() += n;
    }

    /// Read the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        *self.value.lock()
    }
}
