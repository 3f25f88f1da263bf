// Dispatcher constants (no magic values)
use std::time::Duration;

/// Worker threads started when no count is configured
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound on worker threads
pub const MAX_WORKERS: usize = 256;

/// How long a worker blocks in `pop` before re-checking (100ms)
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Shortest accepted poll timeout; anything lower turns the idle wait into a spin
pub const MIN_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Worker thread name prefix (`smq-worker-0`, `smq-worker-1`, ...)
pub const WORKER_THREAD_PREFIX: &str = "smq-worker";
