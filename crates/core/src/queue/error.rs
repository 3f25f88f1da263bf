// Queue Error Types

use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum QueueError {
    #[error("Queue allocation failed ({requested} slots): {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Storage could not grow to hold a pushed item.
///
/// The item was not enqueued; ownership is handed back through
/// [`AllocationError::into_inner`].
#[derive(Error)]
#[error("Queue storage allocation failed: {source}")]
pub struct AllocationError<T> {
    item: T,
    #[source]
    source: TryReserveError,
}

impl<T> AllocationError<T> {
    pub(crate) fn new(item: T, source: TryReserveError) -> Self {
        Self { item, source }
    }

    /// Recover the item that could not be enqueued
    pub fn into_inner(self) -> T {
        self.item
    }
}

// No `T: Debug` bound, same as std's `SendError`
impl<T> fmt::Debug for AllocationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationError")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

// Drops the item; use `into_inner` first when it must be kept
impl<T> From<AllocationError<T>> for QueueError {
    fn from(err: AllocationError<T>) -> Self {
        QueueError::Allocation {
            requested: 1,
            source: err.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Request;

    fn reserve_failure() -> TryReserveError {
        let mut v: Vec<u64> = Vec::new();
        v.try_reserve(usize::MAX).unwrap_err()
    }

    #[test]
    fn test_allocation_error_returns_item() {
        let request = Request::new("m0", "u0", Some(b"b0".to_vec())).unwrap();
        let id = request.id().clone();

        let err = AllocationError::new(request, reserve_failure());
        assert!(err.to_string().contains("allocation failed"));

        let recovered = err.into_inner();
        assert_eq!(recovered.id(), &id);
        assert_eq!(recovered.payload(), Some(&b"b0"[..]));
    }

    #[test]
    fn test_allocation_error_debug_without_item_debug() {
        struct Opaque;
        let err = AllocationError::new(Opaque, reserve_failure());
        assert!(format!("{:?}", err).starts_with("AllocationError"));
    }

    #[test]
    fn test_allocation_error_into_queue_error() {
        let err: QueueError = AllocationError::new(1u32, reserve_failure()).into();
        let QueueError::Allocation { requested, .. } = err;
        assert_eq!(requested, 1);
    }
}
