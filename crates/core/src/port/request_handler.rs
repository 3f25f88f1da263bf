// Request Handler Port
// What a worker does with a popped request (protocol handling lives outside core)

use crate::domain::Request;
use thiserror::Error;

/// Handler errors
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

/// Request Handler trait
///
/// Called from worker threads; takes ownership of the request, so the
/// handler decides when its payload is released.
pub trait RequestHandler: Send + Sync {
    /// Process one request
    ///
    /// # Errors
    /// - HandlerError::Upstream if the downstream collaborator failed
    fn handle(&self, request: Request) -> Result<(), HandlerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::RequestId;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Mock handler behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Succeed after sleeping
        Slow(Duration),
    }

    /// Mock Request Handler: records every request ID it receives
    pub struct MockRequestHandler {
        behavior: Mutex<MockBehavior>,
        seen: Mutex<Vec<RequestId>>,
    }

    impl MockRequestHandler {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                seen: Mutex::new(Vec::new()),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }
        pub fn new_slow(delay: Duration) -> Self {
            Self::new(MockBehavior::Slow(delay))
        }
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock() = behavior;
        }
        pub fn call_count(&self) -> usize {
            self.seen.lock().len()
        }
        /// IDs in the order the handler saw them
        pub fn seen_ids(&self) -> Vec<RequestId> {
            self.seen.lock().clone()
        }
    }

    impl RequestHandler for MockRequestHandler {
        fn handle(&self, request: Request) -> Result<(), HandlerError> {
            // Behavior is fixed before the call becomes visible in `seen`
            let behavior = self.behavior.lock().clone();
            self.seen.lock().push(request.id().clone());

            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(HandlerError::Upstream(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Slow(delay) => {
                    std::thread::sleep(delay);
                    Ok(())
                }
            }
        }
    }
}
