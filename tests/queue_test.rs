//! Contract tests for the bounded closable queue.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use taskforge::core::{BoundedQueue, PoolError};

#[test]
fn iteration_ends_on_close_plus_drain() {
    let q = BoundedQueue::new(4);
    for n in 0..4 {
        q.enqueue(n).unwrap();
    }
    q.close();
    assert_eq!(q.iter().collect::<Vec<i32>>(), vec![0, 1, 2, 3]);
}

#[test]
fn enqueue_after_close_is_recoverable() {
    let q = BoundedQueue::new(2);
    q.enqueue(1).unwrap();
    q.close();

    // Caller-recoverable: the error tells the producer to stop, buffered
    // items are still delivered.
    assert_eq!(q.enqueue(2), Err(PoolError::QueueClosed));
    assert_eq!(q.iter().collect::<Vec<i32>>(), vec![1]);
}

#[test]
fn producer_blocks_at_capacity() {
    let q = Arc::new(BoundedQueue::new(2));
    q.enqueue(0).unwrap();
    q.enqueue(1).unwrap();

    let producer = {
        let q = Arc::clone(&q);
        thread::spawn(move || {
            let start = Instant::now();
            q.enqueue(2).unwrap();
            q.close();
            start.elapsed()
        })
    };

    // Give the producer time to hit the full queue.
    thread::sleep(Duration::from_millis(50));
    let drained: Vec<i32> = q.iter().collect();
    assert_eq!(drained, vec![0, 1, 2]);

    let blocked_for = producer.join().unwrap();
    assert!(
        blocked_for >= Duration::from_millis(30),
        "third enqueue should have blocked on the full queue"
    );
}

#[test]
fn receivers_share_items_without_duplication() {
    let q = Arc::new(BoundedQueue::new(32));
    for n in 0..32 {
        q.enqueue(n).unwrap();
    }
    q.close();

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let rx = q.receiver();
            thread::spawn(move || rx.iter().collect::<Vec<i32>>())
        })
        .collect();

    let mut all: Vec<i32> = consumers
        .into_iter()
        .flat_map(|c| c.join().unwrap())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..32).collect::<Vec<i32>>());
}

#[test]
fn capacity_and_len_are_observable() {
    let q = BoundedQueue::new(8);
    assert_eq!(q.capacity(), 8);
    assert!(q.is_empty());
    q.enqueue(()).unwrap();
    assert_eq!(q.len(), 1);
    assert!(!q.is_closed());
    q.close();
    assert!(q.is_closed());
}
