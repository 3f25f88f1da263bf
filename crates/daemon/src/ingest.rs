//! Producer side: JSON-line requests from a reader into the queue
//!
//! Reading runs on its own OS thread. A blocked read (an idle stdin pipe)
//! can't be cancelled, and on a runtime blocking thread it would stall
//! runtime shutdown. A plain thread is simply left behind when `main` returns.

use anyhow::{Context, Result};
use smq_core::domain::NewRequest;
use smq_core::port::{IdProvider, TimeProvider};
use smq_core::queue::QueueError;
use smq_core::{PushOutcome, RequestQueue};
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, warn};

const INGEST_THREAD_NAME: &str = "smq-ingest";

/// Line counts for one ingest run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub invalid: u64,
    pub rejected: u64,
}

/// Read requests until EOF
///
/// Malformed lines are logged and skipped. Requests refused by a shut-down
/// queue are counted and dropped.
pub fn ingest<R>(
    reader: R,
    queue: &RequestQueue,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
) -> Result<IngestStats>
where
    R: BufRead,
{
    let mut stats = IngestStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let new_request: NewRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                stats.invalid += 1;
                warn!(line = line_no, error = %e, "Skipping malformed request");
                continue;
            }
        };

        let request = match new_request.into_request(id_provider, time_provider) {
            Ok(r) => r,
            Err(e) => {
                stats.invalid += 1;
                warn!(line = line_no, error = %e, "Skipping invalid request");
                continue;
            }
        };

        let request_id = request.id().clone();
        match queue.push(request).map_err(QueueError::from)? {
            PushOutcome::Enqueued => {
                stats.accepted += 1;
                debug!(line = line_no, request_id = %request_id, "Request queued");
            }
            PushOutcome::Rejected(_) => {
                stats.rejected += 1;
                warn!(line = line_no, request_id = %request_id, "Queue shut down, request dropped");
            }
        }
    }

    Ok(stats)
}

/// Run [`ingest`] on a dedicated thread
///
/// The receiver resolves when the reader hits EOF or fails. Dropping it
/// does not stop the thread.
pub fn spawn_ingest<R>(
    reader: R,
    queue: Arc<RequestQueue>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
) -> Result<oneshot::Receiver<Result<IngestStats>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    thread::Builder::new()
        .name(INGEST_THREAD_NAME.to_string())
        .spawn(move || {
            let result = ingest(reader, &queue, id_provider.as_ref(), time_provider.as_ref());
            // Receiver is gone after Ctrl+C; nobody is waiting for the stats
            let _ = tx.send(result);
        })
        .context("Failed to spawn ingest thread")?;

    Ok(rx)
}
