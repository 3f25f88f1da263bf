// Panic isolation for worker threads
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed (the handler's own result is inside)
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// A panicking handler is reported as `PanicGuardResult::Panicked` instead
/// of unwinding through the worker loop, so one bad request cannot take a
/// worker thread down.
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "Request handler panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}
