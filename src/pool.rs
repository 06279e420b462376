//! Fixed-size worker pool executing submitted units of work.
//!
//! Scheduling is FIFO over a single shared queue; workers block on a condvar
//! when the queue is empty. A unit that panics has its panic caught and
//! delivered through the unit's [`Completion`] instead of tearing down the
//! worker, mirroring the promise/exception propagation of the original
//! thread pool this crate is modeled on.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() + Send>;

struct State {
    queue: VecDeque<Job>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    condvar: Condvar,
}

impl Shared {
    /// Waits for the next job, or returns `None` once shutdown has begun.
    /// Shutdown and the queue are checked under one lock so a job cannot be
    /// popped after shutdown has already been observed.
    fn wait_for_job(&self) -> Option<Job> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(job) = state.queue.pop_front() {
                return Some(job);
            }
            state = self.condvar.wait(state).unwrap();
        }
    }
}

/// A handle to the eventual result of a unit submitted to a [`TaskPool`].
///
/// Dropping a `Completion` without waiting on it is harmless: the unit still
/// runs to completion (or is cancelled at shutdown), its result is simply
/// discarded.
pub struct Completion<T> {
    receiver: Receiver<std::thread::Result<T>>,
}

impl<T> Completion<T> {
    /// Blocks until the unit completes, returning its value, the error it
    /// panicked with, or [`Error::Cancelled`] if the pool discarded the unit
    /// at shutdown before a worker picked it up.
    pub fn wait(self) -> Result<T> {
        match self.receiver.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(Error::from_panic(payload)),
            Err(_) => Err(Error::Cancelled),
        }
    }
}

/// A fixed-size set of worker threads executing submitted units on a single
/// FIFO queue.
pub struct TaskPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Creates a pool with `worker_count` workers, clamped to a minimum of
    /// one: re-entrant submission (a running unit submitting and awaiting
    /// further units, as the sorter does) requires at least one worker to
    /// make progress.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
        });
        let workers = (0..worker_count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    while let Some(job) = shared.wait_for_job() {
                        job();
                    }
                })
            })
            .collect();
        log::debug!("task pool started with {worker_count} workers");
        TaskPool { shared, workers }
    }

    /// Creates a pool sized to the host's hardware parallelism.
    pub fn with_default_workers() -> Self {
        Self::new(num_cpus::get())
    }

    /// The number of worker threads this pool was constructed with.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues `unit`, returning a [`Completion`] for its eventual result.
    /// Wakes one idle worker.
    pub fn submit<T, F>(&self, unit: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver): (Sender<std::thread::Result<T>>, _) = bounded(1);
        let job: Job = Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(unit));
            // The receiver may already have been dropped (caller discarded
            // the Completion); the send failing is not an error for us.
            let _ = sender.send(result);
        });
        {
            let mut state = self.shared.state.lock().unwrap();
            state.queue.push_back(job);
        }
        self.shared.condvar.notify_one();
        Completion { receiver }
    }

    /// Blocks until every handle in `handles` has completed, returning each
    /// unit's outcome in submission order.
    pub fn wait_all<T>(&self, handles: Vec<Completion<T>>) -> Vec<Result<T>> {
        handles.into_iter().map(Completion::wait).collect()
    }
}

impl Drop for TaskPool {
    /// Signals shutdown and discards whatever is still queued: the dropped
    /// jobs carry their completion sender with them, so waiting handles
    /// observe [`Error::Cancelled`]. Joins every worker thread before
    /// returning.
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.shutdown = true;
            state.queue.clear();
        }
        self.shared.condvar.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn fifo_fan_out_appends_in_chunks() {
        let pool = TaskPool::new(4);
        let shared = Arc::new(StdMutex::new(Vec::new()));
        let handles: Vec<_> = (0..100)
            .map(|_| {
                let shared = Arc::clone(&shared);
                pool.submit(move || {
                    shared.lock().unwrap().extend_from_slice(&[0, 1, 2, 3, 4]);
                })
            })
            .collect();
        for result in pool.wait_all(handles) {
            result.unwrap();
        }
        let data = shared.lock().unwrap();
        assert_eq!(data.len(), 500);
        for chunk in data.chunks(5) {
            assert_eq!(chunk, &[0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn worker_count_defaults_to_at_least_one() {
        let pool = TaskPool::new(0);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn completion_reports_value() {
        let pool = TaskPool::new(2);
        let handle = pool.submit(|| 41 + 1);
        assert_eq!(handle.wait().unwrap(), 42);
    }

    #[test]
    fn panicking_unit_surfaces_as_failure() {
        let pool = TaskPool::new(2);
        let handle = pool.submit(|| -> i32 { panic!("boom") });
        match handle.wait() {
            Err(Error::Failure(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[test]
    fn queued_units_are_cancelled_on_shutdown() {
        let pool = TaskPool::new(1);
        let (gate_tx, gate_rx) = bounded::<()>(0);
        let block = pool.submit(move || {
            let _ = gate_rx.recv();
        });
        let queued = pool.submit(|| 1);
        let releaser = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            let _ = gate_tx.send(());
        });
        drop(pool);
        releaser.join().unwrap();
        block.wait().unwrap();
        assert!(matches!(queued.wait(), Err(Error::Cancelled)));
    }
}
