//! Allocator error types.

use duet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocatorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Math error: {0}")]
    Math(#[from] CoreError),
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;
