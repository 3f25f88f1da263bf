// Dispatcher - worker pool draining the request queue

pub mod constants;
mod panic_guard;

use constants::*;
pub use panic_guard::{execute_guarded, PanicGuardResult};

use crate::domain::Request;
use crate::error::{AppError, Result};
use crate::port::RequestHandler;
use crate::queue::{Pop, RequestQueue};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Worker pool settings
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub workers: usize,
    pub poll_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl DispatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(AppError::Config("workers must be at least 1".to_string()));
        }
        if self.workers > MAX_WORKERS {
            return Err(AppError::Config(format!(
                "workers out of range: {} > {}",
                self.workers, MAX_WORKERS
            )));
        }
        if self.poll_timeout < MIN_POLL_TIMEOUT {
            return Err(AppError::Config(format!(
                "poll timeout too short: {:?} < {:?}",
                self.poll_timeout, MIN_POLL_TIMEOUT
            )));
        }
        Ok(())
    }
}

/// Per-outcome totals across all workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub handled: u64,
    pub failed: u64,
    pub panicked: u64,
}

impl DispatchReport {
    pub fn total(&self) -> u64 {
        self.handled + self.failed + self.panicked
    }
}

#[derive(Default)]
struct Counters {
    handled: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatchReport {
        DispatchReport {
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}

/// Dispatcher pops requests and hands each to a `RequestHandler`
pub struct Dispatcher {
    queue: Arc<RequestQueue>,
    handler: Arc<dyn RequestHandler>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<RequestQueue>,
        handler: Arc<dyn RequestHandler>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            queue,
            handler,
            config,
        }
    }

    /// Spawn the worker threads
    ///
    /// Workers run until the queue is shut down and drained. If a thread
    /// cannot be spawned, the queue is shut down, already-started workers
    /// are joined, and the spawn error is returned.
    pub fn start(self) -> Result<DispatcherHandle> {
        self.config.validate()?;

        let counters = Arc::new(Counters::default());
        let mut workers = Vec::with_capacity(self.config.workers);

        for worker_id in 0..self.config.workers {
            let worker = WorkerLoop {
                worker_id,
                queue: Arc::clone(&self.queue),
                handler: Arc::clone(&self.handler),
                poll_timeout: self.config.poll_timeout,
                counters: Arc::clone(&counters),
            };

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", WORKER_THREAD_PREFIX, worker_id))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    self.queue.shutdown();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(AppError::Io(e));
                }
            }
        }

        info!(
            workers = self.config.workers,
            poll_timeout_ms = self.config.poll_timeout.as_millis() as u64,
            "Dispatcher started"
        );

        Ok(DispatcherHandle {
            queue: self.queue,
            workers,
            counters,
        })
    }
}

/// Running worker pool
pub struct DispatcherHandle {
    queue: Arc<RequestQueue>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl DispatcherHandle {
    /// Shut the queue down; workers finish pending requests and exit
    pub fn shutdown(&self) -> bool {
        self.queue.shutdown()
    }

    /// Totals so far (workers may still be running)
    pub fn report(&self) -> DispatchReport {
        self.counters.snapshot()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to exit
    ///
    /// Blocks until the queue is shut down (by this handle or any other
    /// holder) and drained.
    pub fn join(self) -> Result<DispatchReport> {
        let mut lost = 0;
        for handle in self.workers {
            if handle.join().is_err() {
                lost += 1;
            }
        }
        if lost > 0 {
            return Err(AppError::Internal(format!("{} worker thread(s) panicked", lost)));
        }

        let report = self.counters.snapshot();
        info!(
            handled = report.handled,
            failed = report.failed,
            panicked = report.panicked,
            "Dispatcher stopped"
        );
        Ok(report)
    }
}

struct WorkerLoop {
    worker_id: usize,
    queue: Arc<RequestQueue>,
    handler: Arc<dyn RequestHandler>,
    poll_timeout: Duration,
    counters: Arc<Counters>,
}

impl WorkerLoop {
    fn run(self) {
        debug!(worker_id = self.worker_id, "Worker started");
        loop {
            match self.queue.pop_with_cause(self.poll_timeout) {
                Pop::Item(request) => self.process(request),
                Pop::TimedOut => continue,
                Pop::Shutdown => break,
            }
        }
        debug!(worker_id = self.worker_id, "Worker stopped");
    }

    fn process(&self, request: Request) {
        let request_id = request.id().clone();
        let handler = &self.handler;

        // The request moves into the handler; nothing of it is observed after a panic
        match execute_guarded(AssertUnwindSafe(|| handler.handle(request))) {
            PanicGuardResult::Success(Ok(())) => {
                self.counters.handled.fetch_add(1, Ordering::Relaxed);
                debug!(worker_id = self.worker_id, request_id = %request_id, "Request handled");
            }
            PanicGuardResult::Success(Err(e)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    worker_id = self.worker_id,
                    request_id = %request_id,
                    error = %e,
                    "Request handler failed"
                );
            }
            PanicGuardResult::Panicked(_) => {
                self.counters.panicked.fetch_add(1, Ordering::Relaxed);
                warn!(worker_id = self.worker_id, request_id = %request_id, "Request dropped after panic");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::request_handler::mocks::MockRequestHandler;
    use crate::queue::Queue;

    fn request(i: usize) -> Request {
        Request::new("GET", format!("/item/{}", i), None).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(DispatcherConfig::default().validate().is_ok());

        let zero = DispatcherConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(AppError::Config(_))));

        let too_many = DispatcherConfig {
            workers: MAX_WORKERS + 1,
            ..Default::default()
        };
        assert!(too_many.validate().unwrap_err().to_string().contains("out of range"));

        let no_wait = DispatcherConfig {
            poll_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(no_wait.validate().unwrap_err().to_string().contains("too short"));

        let floor = DispatcherConfig {
            poll_timeout: MIN_POLL_TIMEOUT,
            ..Default::default()
        };
        assert!(floor.validate().is_ok());
    }

    #[test]
    fn test_start_rejects_zero_poll_timeout() {
        let queue: Arc<RequestQueue> = Arc::new(Queue::new());
        let handler = Arc::new(MockRequestHandler::new_success());
        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            handler,
            DispatcherConfig {
                workers: 2,
                poll_timeout: Duration::ZERO,
            },
        );

        assert!(matches!(dispatcher.start(), Err(AppError::Config(_))));
        // No workers were spawned, so the queue was left running
        assert!(queue.is_running());
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let queue = Arc::new(Queue::new());
        let handler = Arc::new(MockRequestHandler::new_success());
        let dispatcher = Dispatcher::new(
            queue,
            handler,
            DispatcherConfig {
                workers: 0,
                ..Default::default()
            },
        );
        assert!(dispatcher.start().is_err());
    }

    #[test]
    fn test_dispatcher_handles_all_then_stops() {
        let queue = Arc::new(Queue::new());
        let handler = Arc::new(MockRequestHandler::new_success());

        let handle = Dispatcher::new(
            Arc::clone(&queue),
            handler.clone(),
            DispatcherConfig {
                workers: 3,
                poll_timeout: Duration::from_millis(20),
            },
        )
        .start()
        .unwrap();
        assert_eq!(handle.worker_count(), 3);

        for i in 0..50 {
            assert!(queue.push(request(i)).unwrap().is_enqueued());
        }

        assert!(handle.shutdown());
        let report = handle.join().unwrap();

        assert_eq!(report.handled, 50);
        assert_eq!(report.total(), 50);
        assert_eq!(handler.call_count(), 50);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dispatcher_counts_failures() {
        let queue = Arc::new(Queue::new());
        let handler = Arc::new(MockRequestHandler::new_fail("upstream down"));
        for i in 0..5 {
            let _ = queue.push(request(i)).unwrap();
        }
        queue.shutdown();

        let report = Dispatcher::new(queue, handler, DispatcherConfig::default())
            .start()
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(report.failed, 5);
        assert_eq!(report.handled, 0);
    }

    #[test]
    fn test_dispatcher_survives_handler_panic() {
        let queue = Arc::new(Queue::new());
        let handler = Arc::new(MockRequestHandler::new_panic_inducing("handler exploded"));
        for i in 0..4 {
            let _ = queue.push(request(i)).unwrap();
        }
        queue.shutdown();

        let report = Dispatcher::new(
            queue,
            handler.clone(),
            DispatcherConfig {
                workers: 1,
                ..Default::default()
            },
        )
        .start()
        .unwrap()
        .join()
        .unwrap();

        // A single worker kept going after every panic
        assert_eq!(report.panicked, 4);
        assert_eq!(handler.call_count(), 4);
    }
}
