// SMQ Core - Request model, concurrent queue, dispatcher
// NO async runtime, NO IO (collaborators live in the daemon)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;
pub mod queue;

pub use error::{AppError, Result};
pub use queue::{Pop, PushOutcome, Queue, QueueStats, RequestQueue};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
