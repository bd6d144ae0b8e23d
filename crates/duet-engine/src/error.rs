//! Engine error types.

use duet_allocator::AllocatorError;
use duet_core::CoreError;
use duet_curve::CurveError;
use duet_state::StateError;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A mutating operation was entered while another one was still running
    /// on the same thread (e.g. from a ledger or observer callback).
    #[error("Reentrant call rejected")]
    Reentrant,

    #[error("Price feed has no sample")]
    FeedUnavailable,

    #[error("External transfer failed: {0}")]
    ExternalTransferFailed(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Allocator(#[from] AllocatorError),

    #[error(transparent)]
    Math(#[from] CoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
