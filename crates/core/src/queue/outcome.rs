// Push/Pop outcomes and queue statistics

use serde::Serialize;

/// Result of a push that did not fail to allocate
#[must_use = "a rejected item is handed back to the caller"]
#[derive(Debug)]
pub enum PushOutcome<T> {
    /// Item appended at the tail; the queue owns it now
    Enqueued,
    /// Queue is shut down; the item was not stored and is returned
    Rejected(T),
}

impl<T> PushOutcome<T> {
    pub fn is_enqueued(&self) -> bool {
        matches!(self, PushOutcome::Enqueued)
    }

    pub fn into_rejected(self) -> Option<T> {
        match self {
            PushOutcome::Enqueued => None,
            PushOutcome::Rejected(item) => Some(item),
        }
    }
}

/// Result of a bounded-wait pop, classified by cause
#[derive(Debug)]
pub enum Pop<T> {
    /// Oldest pending item; ownership moves to the caller
    Item(T),
    /// Queue stayed empty and running until the deadline
    TimedOut,
    /// Queue is shut down and has nothing left to deliver
    Shutdown,
}

impl<T> Pop<T> {
    pub fn into_item(self) -> Option<T> {
        match self {
            Pop::Item(item) => Some(item),
            Pop::TimedOut | Pop::Shutdown => None,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Pop::Shutdown)
    }
}

/// Point-in-time snapshot of queue counters (taken under the lock)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Items currently waiting
    pub pending: usize,
    /// Successful pushes since creation
    pub pushed: u64,
    /// Items removed by pop or drain
    pub popped: u64,
    /// Pushes refused after shutdown
    pub rejected: u64,
    pub running: bool,
}
