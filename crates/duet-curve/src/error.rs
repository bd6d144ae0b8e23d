//! Pricing curve error types.

use duet_core::{CoreError, Wad};
use thiserror::Error;

/// Quote precondition failures. Each violated precondition has its own kind;
/// trade sizes are never silently clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("Trade size must be positive, got {0}")]
    InvalidTradeSize(Wad),

    #[error("Trade size {size} exceeds max trade size {max}")]
    TradeTooLarge { size: Wad, max: Wad },

    #[error("Oracle is emergency-stale (age {age_secs}s)")]
    OracleEmergencyStale { age_secs: u64 },

    #[error("Oracle deviation is critical (tier {tier}, deviation {deviation})")]
    OracleCriticalDeviation { tier: u8, deviation: Wad },

    #[error("Post-trade inventory {inventory} outside [-{q_max}, {q_max}]")]
    InventoryCapExceeded { inventory: Wad, q_max: Wad },

    #[error("Invalid curve configuration: {0}")]
    InvalidConfig(String),

    #[error("Math error: {0}")]
    Math(#[from] CoreError),
}

pub type CurveResult<T> = Result<T, CurveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CurveError::TradeTooLarge {
            size: Wad::from_int(11),
            max: Wad::from_int(10),
        };
        assert_eq!(err.to_string(), "Trade size 11 exceeds max trade size 10");

        let err = CurveError::OracleEmergencyStale { age_secs: 3_600 };
        assert_eq!(err.to_string(), "Oracle is emergency-stale (age 3600s)");
    }
}
