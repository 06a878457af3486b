//! Worker Pool Tests
//!
//! These tests verify:
//! - Every queued job runs exactly once
//! - A full queue hands the job back instead of blocking
//! - Dropping the pool drains queued jobs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel;
use litcontest::network::WorkerPool;

#[test]
fn test_zero_workers_is_rejected() {
    assert!(WorkerPool::<u32>::new(0, 4, |_| {}).is_err());
}

#[test]
fn test_all_jobs_run() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let counter = Arc::clone(&counter);
        let pool = WorkerPool::new(4, 64, move |n: usize| {
            counter.fetch_add(n, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(pool.worker_count(), 4);
        assert_eq!(pool.queue_capacity(), 64);

        for _ in 0..50 {
            pool.try_submit(1).unwrap();
        }
    }

    assert_eq!(counter.load(Ordering::SeqCst), 50);
}

#[test]
fn test_full_queue_hands_job_back() {
    let (started_tx, started_rx) = channel::unbounded::<u32>();
    let (release_tx, release_rx) = channel::unbounded::<()>();
    let done = Arc::new(AtomicUsize::new(0));

    let pool = {
        let done = Arc::clone(&done);
        WorkerPool::new(1, 1, move |job: u32| {
            started_tx.send(job).unwrap();
            release_rx.recv().unwrap();
            done.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
    };

    // First job occupies the only worker
    pool.try_submit(1).unwrap();
    assert_eq!(started_rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);

    // Second job fills the queue, third has nowhere to go
    pool.try_submit(2).unwrap();
    assert_eq!(pool.queued(), 1);
    assert_eq!(pool.try_submit(3), Err(3));

    release_tx.send(()).unwrap();
    release_tx.send(()).unwrap();
    drop(pool);

    assert_eq!(done.load(Ordering::SeqCst), 2);
}
