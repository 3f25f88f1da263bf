// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Queue, domain, and handler errors stay in their own types; these are the
/// failures of wiring up and running the worker pool.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
