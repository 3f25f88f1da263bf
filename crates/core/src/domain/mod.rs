// Domain Layer - Units of work

pub mod error;
pub mod request;

// Re-exports
pub use error::DomainError;
pub use request::{Method, NewRequest, Request, RequestId};
