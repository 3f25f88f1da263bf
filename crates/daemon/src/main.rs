//! SMQ Dispatch Server - Main Entry Point

mod config;
mod handler;
mod ingest;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use config::DaemonConfig;
use handler::LoggingHandler;
use smq_core::application::Dispatcher;
use smq_core::port::id_provider::UuidProvider;
use smq_core::port::time_provider::SystemTimeProvider;
use smq_core::Queue;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration & initialize logging
    let config = DaemonConfig::parse();
    telemetry::init_logging(config.log_format)?;

    info!("SMQ dispatch server v{} starting...", VERSION);

    // 2. Queue + worker pool
    let queue = Arc::new(
        Queue::try_with_capacity(config.initial_capacity)
            .context("Failed to allocate request queue")?,
    );
    let time_provider = Arc::new(SystemTimeProvider);
    let handler = Arc::new(LoggingHandler::new(
        config.handler_delay(),
        time_provider.clone(),
    ));

    let dispatcher = Dispatcher::new(queue.clone(), handler, config.dispatcher_config())
        .start()
        .context("Failed to start dispatcher")?;

    info!("System ready. Reading requests from stdin (Ctrl+C to stop)");

    // 3. Produce until EOF or Ctrl+C (stdin is read on its own thread)
    let stdin = std::io::BufReader::new(std::io::stdin());
    let ingest_done = ingest::spawn_ingest(
        stdin,
        queue.clone(),
        Arc::new(UuidProvider),
        time_provider.clone(),
    )?;

    tokio::select! {
        result = ingest_done => {
            let stats = result.context("Ingest thread exited without a result")??;
            info!(
                accepted = stats.accepted,
                invalid = stats.invalid,
                rejected = stats.rejected,
                "Input closed"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    // 4. Graceful shutdown: workers finish what is queued, then exit
    queue.shutdown();
    let report = tokio::task::spawn_blocking(move || dispatcher.join())
        .await
        .context("Dispatcher join task failed")??;

    let stats = queue.stats();
    info!(
        handled = report.handled,
        failed = report.failed,
        panicked = report.panicked,
        pushed = stats.pushed,
        rejected = stats.rejected,
        "Shutdown complete."
    );

    Ok(())
}
