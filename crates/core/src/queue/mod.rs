//! Concurrent FIFO Queue
//!
//! Hands ownership of work items from producer threads to worker threads.
//!
//! - `push` never blocks on capacity and wakes one waiting consumer.
//! - `pop` blocks for at most the given timeout and wakes early on push or shutdown.
//! - `shutdown` is one-way and wakes every waiter.
//!
//! Items pending at shutdown stay poppable without blocking until drained; once
//! the queue is both shut down and empty, every pop returns immediately.

mod error;
mod outcome;

pub use error::{AllocationError, QueueError};
pub use outcome::{Pop, PushOutcome, QueueStats};

use crate::domain::Request;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Queue of pending requests (the dispatch pipeline's hand-off point)
pub type RequestQueue = Queue<Request>;

/// Everything guarded by the queue lock
struct State<T> {
    items: VecDeque<T>,
    running: bool,
    pushed: u64,
    popped: u64,
    rejected: u64,
}

impl<T> State<T> {
    fn with_items(items: VecDeque<T>) -> Self {
        Self {
            items,
            running: true,
            pushed: 0,
            popped: 0,
            rejected: 0,
        }
    }

    fn take_front(&mut self) -> Option<T> {
        let item = self.items.pop_front()?;
        self.popped += 1;
        Some(item)
    }
}

/// Thread-safe, unbounded FIFO with bounded-wait pop
///
/// Share it between threads with `Arc<Queue<T>>`.
pub struct Queue<T> {
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T> Queue<T> {
    /// Create an empty, running queue
    pub fn new() -> Self {
        Self::from_items(VecDeque::new())
    }

    /// Create an empty, running queue with room for `capacity` items up front
    ///
    /// # Errors
    /// - QueueError::Allocation if the storage cannot be reserved
    pub fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
        let mut items = VecDeque::new();
        items
            .try_reserve(capacity)
            .map_err(|source| QueueError::Allocation {
                requested: capacity,
                source,
            })?;
        Ok(Self::from_items(items))
    }

    fn from_items(items: VecDeque<T>) -> Self {
        Self {
            state: Mutex::new(State::with_items(items)),
            available: Condvar::new(),
        }
    }

    /// Append an item at the tail
    ///
    /// After shutdown the item is handed back as `PushOutcome::Rejected`
    /// and the queue is left untouched.
    ///
    /// # Errors
    /// - AllocationError if storage cannot grow; the item is inside the error
    pub fn push(&self, item: T) -> Result<PushOutcome<T>, AllocationError<T>> {
        let mut state = self.state.lock();

        if !state.running {
            state.rejected += 1;
            debug!(rejected = state.rejected, "Push ignored: queue is shut down");
            return Ok(PushOutcome::Rejected(item));
        }

        if let Err(source) = state.items.try_reserve(1) {
            return Err(AllocationError::new(item, source));
        }

        state.items.push_back(item);
        state.pushed += 1;
        let pending = state.items.len();
        drop(state);

        self.available.notify_one();
        trace!(pending, "Item enqueued");
        Ok(PushOutcome::Enqueued)
    }

    /// Remove the oldest item, waiting up to `timeout` for one to arrive
    ///
    /// Returns `None` on timeout, or immediately when the queue is shut
    /// down and empty.
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        self.pop_with_cause(timeout).into_item()
    }

    /// Non-blocking pop
    pub fn try_pop(&self) -> Option<T> {
        self.pop(Duration::ZERO)
    }

    /// Like [`Queue::pop`], but reports why no item was returned
    pub fn pop_with_cause(&self, timeout: Duration) -> Pop<T> {
        // None: timeout too large to represent, wait without a deadline
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();

        loop {
            if let Some(item) = state.take_front() {
                trace!(pending = state.items.len(), "Item dequeued");
                return Pop::Item(item);
            }

            if !state.running {
                return Pop::Shutdown;
            }

            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Pop::TimedOut;
                    }
                    // Spurious and stolen wakeups fall through to the re-check above
                    self.available.wait_until(&mut state, deadline);
                }
                None => self.available.wait(&mut state),
            }
        }
    }

    /// Stop accepting items and wake every blocked `pop`
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn shutdown(&self) -> bool {
        let mut state = self.state.lock();
        if !state.running {
            return false;
        }
        state.running = false;
        let pending = state.items.len();
        drop(state);

        self.available.notify_all();
        info!(pending, "Queue shut down");
        true
    }

    /// Remove every pending item, oldest first
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        let drained: Vec<T> = state.items.drain(..).collect();
        state.popped += drained.len() as u64;
        if !drained.is_empty() {
            debug!(count = drained.len(), "Queue drained");
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            pending: state.items.len(),
            pushed: state.pushed,
            popped: state.popped,
            rejected: state.rejected,
            running: state.running,
        }
    }

    /// Tear the queue down, handing any pending items back to the caller
    ///
    /// Taking `self` by value means no other thread can still reach the
    /// queue (an `Arc` must be unwrapped first).
    pub fn delete(self) -> Vec<T> {
        let state = self.state.into_inner();
        if !state.items.is_empty() {
            debug!(pending = state.items.len(), "Queue deleted with pending items");
        }
        state.items.into()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("stats", &self.stats()).finish()
    }
}
