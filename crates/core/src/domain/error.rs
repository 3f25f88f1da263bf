// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
