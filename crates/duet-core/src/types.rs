//! Shared domain enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds on the engine's monotonic clock.
pub type UnixSeconds = u64;

/// Direction of a trade from the counterparty's point of view.
///
/// `Buy` means the counterparty takes base asset out of the engine, so the
/// engine's inventory decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capital destination selected by the allocation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Venue {
    /// Continuous pricing curve.
    Amm,
    /// Discrete resting orders on an external book.
    Orderbook,
    /// Pull capital back from the yield venue.
    YieldRecall,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amm => "AMM",
            Self::Orderbook => "ORDERBOOK",
            Self::YieldRecall => "YIELD_RECALL",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
