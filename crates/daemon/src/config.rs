//! Daemon configuration (flags with environment fallbacks)

use crate::telemetry::LogFormat;
use clap::Parser;
use smq_core::application::dispatcher::constants::DEFAULT_WORKERS;
use smq_core::application::DispatcherConfig;
use std::time::Duration;

const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;
const DEFAULT_INITIAL_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "smq-daemon")]
#[command(about = "SMQ dispatch server: JSON-line requests on stdin, handled by a worker pool", long_about = None)]
#[command(version)]
pub struct DaemonConfig {
    /// Number of worker threads
    #[arg(long, env = "SMQ_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// How long an idle worker waits for a request before re-checking (ms)
    #[arg(
        long,
        env = "SMQ_POLL_TIMEOUT_MS",
        default_value_t = DEFAULT_POLL_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_timeout_ms: u64,

    /// Queue slots reserved at startup
    #[arg(long, env = "SMQ_INITIAL_CAPACITY", default_value_t = DEFAULT_INITIAL_CAPACITY)]
    pub initial_capacity: usize,

    /// Simulated per-request processing time (ms)
    #[arg(long, env = "SMQ_HANDLER_DELAY_MS", default_value_t = 0)]
    pub handler_delay_ms: u64,

    /// Log output format
    #[arg(long, env = "SMQ_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            workers: self.workers,
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }

    pub fn handler_delay(&self) -> Duration {
        Duration::from_millis(self.handler_delay_ms)
    }
}
