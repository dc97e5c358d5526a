//! Mutex-guarded FIFO of pending work items
//!
//! A [`WorkQueue`] is shared by reference between the thread that fills it
//! and the threads that drain it. Popping never blocks: an empty queue is
//! reported as `None` so that a worker can decide to exit, and a per-frame
//! phase can treat "nothing to do" as success.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors raised by [`WorkQueue::push`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue already holds `capacity` items
    #[error("work queue is full (capacity {capacity})")]
    Full {
        /// Configured bound of the queue
        capacity: usize,
    },
}

/// Thread-safe bounded FIFO with non-blocking pop
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> WorkQueue<T> {
    /// Create an unbounded queue
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: usize::MAX,
        }
    }

    /// Create a queue that rejects pushes beyond `capacity` items
    pub fn bounded(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Maximum number of items the queue accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an item at the tail
    pub fn push(&self, item: T) -> Result<(), QueueError> {
        let mut items = self.lock();
        if items.len() >= self.capacity {
            return Err(QueueError::Full { capacity: self.capacity });
        }
        items.push_back(item);
        Ok(())
    }

    /// Remove and return the head, or `None` when the queue is empty
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Remove every pending item, returning how many were discarded
    ///
    /// Called before a queue is refilled so a new batch never sees leftovers
    /// from the previous one.
    pub fn drain(&self) -> usize {
        let mut items = self.lock();
        let count = items.len();
        items.clear();
        count
    }

    /// Replace the queue contents with a fresh batch
    ///
    /// The old contents are discarded and the batch is appended under a
    /// single lock acquisition. Fails without modifying the queue if the
    /// batch exceeds the capacity.
    pub fn refill<I>(&self, batch: I) -> Result<usize, QueueError>
    where
        I: IntoIterator<Item = T>,
    {
        let batch: Vec<T> = batch.into_iter().collect();
        if batch.len() > self.capacity {
            return Err(QueueError::Full { capacity: self.capacity });
        }
        let mut items = self.lock();
        let discarded = items.len();
        items.clear();
        items.extend(batch);
        Ok(discarded)
    }

    /// Number of pending items
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no items are pending
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section leaves the deque consistent, so a poisoned
    // lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
