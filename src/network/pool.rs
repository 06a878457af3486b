//! Bounded Worker Pool
//!
//! A fixed set of worker threads fed from a bounded queue. Submitting never
//! blocks: when the queue is full the job is handed back to the caller, which
//! decides how to refuse it.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender, TrySendError};

use crate::error::{ContestError, Result};

/// Fixed-size pool of worker threads over a bounded job queue
///
/// Each job is processed by exactly one worker through `handler`. Dropping
/// the pool closes the queue, lets workers drain what is already queued and
/// joins them.
pub struct WorkerPool<J: Send + 'static> {
    sender: Option<Sender<J>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl<J: Send + 'static> WorkerPool<J> {
    /// Start `workers` threads sharing a queue of `queue_capacity` pending jobs
    pub fn new<F>(workers: usize, queue_capacity: usize, handler: F) -> Result<Self>
    where
        F: Fn(J) + Send + Sync + Clone + 'static,
    {
        if workers == 0 {
            return Err(ContestError::Config("worker pool needs at least one worker".to_string()));
        }

        let (sender, receiver) = channel::bounded::<J>(queue_capacity);
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let receiver = receiver.clone();
            let handler = handler.clone();
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || {
                    for job in receiver.iter() {
                        handler(job);
                    }
                    tracing::trace!("Worker {} exiting", id);
                })?;
            handles.push(handle);
        }

        tracing::debug!(
            "Worker pool started: {} workers, queue capacity {}",
            workers,
            queue_capacity
        );

        Ok(Self {
            sender: Some(sender),
            workers: handles,
            capacity: queue_capacity,
        })
    }

    /// Queue a job without blocking
    ///
    /// Returns the job back in `Err` when every worker is busy and the queue is
    /// full, or when the pool is shutting down.
    pub fn try_submit(&self, job: J) -> std::result::Result<(), J> {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => return Err(job),
        };
        match sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) | Err(TrySendError::Disconnected(job)) => Err(job),
        }
    }

    /// Jobs waiting for a worker
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    pub fn queue_capacity(&self) -> usize {
        self.capacity
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<J: Send + 'static> Drop for WorkerPool<J> {
    fn drop(&mut self) {
        // Closing the channel ends each worker's receive loop
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked during shutdown");
            }
        }
    }
}
