//! Default request handler: log and (optionally) simulate work

use smq_core::domain::Request;
use smq_core::port::{HandlerError, RequestHandler, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct LoggingHandler {
    delay: Duration,
    time_provider: Arc<dyn TimeProvider>,
}

impl LoggingHandler {
    pub fn new(delay: Duration, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            delay,
            time_provider,
        }
    }
}

impl RequestHandler for LoggingHandler {
    fn handle(&self, request: Request) -> Result<(), HandlerError> {
        let queued_ms = self.time_provider.now_millis() - request.created_at();

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        info!(
            request_id = %request.id(),
            method = %request.method(),
            target = request.target(),
            payload_len = request.payload_len(),
            queued_ms,
            "Request dispatched"
        );
        Ok(())
    }
}
