//! Canonical liquidity state for duet.
//!
//! Owns the keeper-pushed state record, validates incoming updates, scales
//! raw feed samples into WAD observations and derives the oracle tier.

pub mod error;
pub mod feed;
pub mod liquidity;
pub mod tier;

pub use error::{StateError, StateResult};
pub use feed::{FeedConfig, FeedSample, FeedScale, ManualFeed, PriceFeed, PriceObservation};
pub use liquidity::{
    CurveParams, LiquidityState, StateObserver, StateUpdate, StateUpdated, LAMBDA_MAX,
    LAMBDA_MIN, SPREAD_MAX, SPREAD_MIN,
};
pub use tier::{deviation, OracleConfig, OracleTier, TierThresholds, CRITICAL_TIER};
