// Application Layer - Consumers of the request queue

pub mod dispatcher;

// Re-exports
pub use dispatcher::{DispatchReport, Dispatcher, DispatcherConfig, DispatcherHandle};
