//! Fixed-size pool of worker threads that drain a [`WorkQueue`]
//!
//! Each worker loops: pop one item, or exit when the queue reports empty;
//! run the job on it; repeat. The caller blocks in [`WorkerPool::drain`]
//! until every worker has been joined, so the job closure and the queue
//! can be borrowed from the caller's stack.

use std::io;
use std::thread;
use thiserror::Error;

use super::work_queue::WorkQueue;

/// Errors raised while running a pool
#[derive(Error, Debug)]
pub enum PoolError {
    /// A pool needs at least one worker
    #[error("worker pool needs at least one thread")]
    ZeroWorkers,

    /// The operating system refused to start a worker thread
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        /// Index of the worker that could not be started
        worker: usize,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

/// Outcome of draining a queue
#[derive(Debug)]
pub struct PoolReport<E> {
    /// Number of items whose job returned (successfully or not)
    pub processed: usize,
    /// Per-item failures, in no particular order
    pub failures: Vec<E>,
    /// Workers that panicked; the item each was holding is lost
    pub panicked_workers: usize,
}

impl<E> PoolReport<E> {
    /// True when every item succeeded and no worker panicked
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.panicked_workers == 0
    }

    fn absorb(&mut self, outcome: WorkerOutcome<E>) {
        self.processed += outcome.processed;
        self.failures.extend(outcome.failures);
    }
}

impl<E> Default for PoolReport<E> {
    fn default() -> Self {
        Self {
            processed: 0,
            failures: Vec::new(),
            panicked_workers: 0,
        }
    }
}

struct WorkerOutcome<E> {
    processed: usize,
    failures: Vec<E>,
}

/// Bounded set of worker threads used for scene construction
#[derive(Debug, Clone)]
pub struct WorkerPool {
    thread_count: usize,
    name: String,
}

impl WorkerPool {
    /// Create a pool that will run `thread_count` workers per drain
    pub fn new(thread_count: usize) -> Result<Self, PoolError> {
        if thread_count == 0 {
            return Err(PoolError::ZeroWorkers);
        }
        Ok(Self {
            thread_count,
            name: "worker".to_string(),
        })
    }

    /// Prefix used for the OS thread names (`<name>-<index>`)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of workers spawned per drain
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Spawn the workers, let them empty `queue`, and join them all
    ///
    /// A failing item is recorded in the report and does not stop the
    /// other workers. If a worker cannot be spawned, the workers already
    /// running still finish the queue and the spawn error is returned.
    pub fn drain<T, E, F>(&self, queue: &WorkQueue<T>, job: F) -> Result<PoolReport<E>, PoolError>
    where
        T: Send,
        E: Send,
        F: Fn(T) -> Result<(), E> + Sync,
    {
        let job = &job;
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.thread_count);
            let mut spawn_error = None;

            for worker in 0..self.thread_count {
                let spawned = thread::Builder::new()
                    .name(format!("{}-{}", self.name, worker))
                    .spawn_scoped(scope, move || run_worker(worker, queue, job));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        log::error!("Failed to spawn {}-{}: {}", self.name, worker, source);
                        spawn_error = Some(PoolError::Spawn { worker, source });
                        break;
                    }
                }
            }

            let mut report = PoolReport::default();
            for handle in handles {
                match handle.join() {
                    Ok(outcome) => report.absorb(outcome),
                    Err(_) => {
                        log::error!("A {} thread panicked while processing an item", self.name);
                        report.panicked_workers += 1;
                    }
                }
            }

            match spawn_error {
                Some(error) => Err(error),
                None => Ok(report),
            }
        })
    }
}

fn run_worker<T, E, F>(worker: usize, queue: &WorkQueue<T>, job: &F) -> WorkerOutcome<E>
where
    F: Fn(T) -> Result<(), E>,
{
    let mut outcome = WorkerOutcome {
        processed: 0,
        failures: Vec::new(),
    };

    while let Some(item) = queue.try_pop() {
        if let Err(error) = job(item) {
            outcome.failures.push(error);
        }
        outcome.processed += 1;
    }

    log::debug!(
        "Worker {} exiting after {} item(s), {} failed",
        worker,
        outcome.processed,
        outcome.failures.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(PoolError::ZeroWorkers)));
    }

    #[test]
    fn test_every_item_processed_once() {
        let queue = WorkQueue::new();
        for i in 0..200 {
            queue.push(i).unwrap();
        }
        let seen = Mutex::new(HashSet::new());

        let pool = WorkerPool::new(4).unwrap();
        let report = pool
            .drain(&queue, |item: i32| -> Result<(), ()> {
                assert!(seen.lock().unwrap().insert(item));
                Ok(())
            })
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.processed, 200);
        assert_eq!(seen.into_inner().unwrap().len(), 200);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_failures_do_not_stop_siblings() {
        let queue = WorkQueue::new();
        for i in 0..50 {
            queue.push(i).unwrap();
        }

        let pool = WorkerPool::new(3).unwrap().with_name("loader");
        let report = pool
            .drain(&queue, |item: u32| if item % 10 == 0 { Err(item) } else { Ok(()) })
            .unwrap();

        assert_eq!(report.processed, 50);
        let mut failures = report.failures;
        failures.sort_unstable();
        assert_eq!(failures, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_empty_queue_returns_immediately() {
        let queue: WorkQueue<u8> = WorkQueue::new();
        let pool = WorkerPool::new(8).unwrap();
        let report = pool.drain(&queue, |_| -> Result<(), ()> { Ok(()) }).unwrap();
        assert_eq!(report.processed, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_panicking_worker_is_reported() {
        let queue = WorkQueue::new();
        for i in 0..20 {
            queue.push(i).unwrap();
        }
        let pool = WorkerPool::new(2).unwrap();
        let report = pool
            .drain(&queue, |item: i32| -> Result<(), ()> {
                if item == 5 {
                    panic!("bad item");
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(report.panicked_workers, 1);
        assert!(!report.is_clean());
        assert!(queue.is_empty());
    }
}
