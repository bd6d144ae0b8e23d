//! State error types.

use duet_core::{CoreError, UnixSeconds};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Stale update: reported at {reported_at}, now {now}, tolerance {tolerance_secs}s")]
    StaleUpdate {
        reported_at: UnixSeconds,
        now: UnixSeconds,
        tolerance_secs: u64,
    },

    #[error("Parameter out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Invalid feed sample: {0}")]
    InvalidFeed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Math error: {0}")]
    Math(#[from] CoreError),
}

pub type StateResult<T> = Result<T, StateError>;
