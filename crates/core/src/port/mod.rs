// Port Layer - Interfaces for external collaborators

pub mod id_provider; // For deterministic testing
pub mod request_handler;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use request_handler::{HandlerError, RequestHandler};
pub use time_provider::TimeProvider;
