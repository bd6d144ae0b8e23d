//! Execution intents and decision records.
//!
//! These are the only outputs of a trigger. The external execution layer
//! consumes them; nothing here moves funds.

use duet_core::{UnixSeconds, Venue, Wad};
use serde::{Deserialize, Serialize};

/// Follow-on action for the execution layer. A zero amount is a valid,
/// observable no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Limit order reducing inventory, priced at the reference price.
    OrderbookOrder {
        is_buy_base: bool,
        amount: Wad,
        limit_price: Wad,
    },
    /// Curve-to-book rebalance marker emitted alongside an orderbook order.
    Rebalance { amount: Wad },
    /// Withdraw quote asset from the yield venue.
    YieldRecall { amount: Wad },
    /// Deposit idle quote asset into the yield venue.
    YieldDeposit { amount: Wad },
}

impl Intent {
    pub fn amount(&self) -> Wad {
        match self {
            Self::OrderbookOrder { amount, .. }
            | Self::Rebalance { amount }
            | Self::YieldRecall { amount }
            | Self::YieldDeposit { amount } => *amount,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.amount().is_zero()
    }

    /// Same intent with a zero amount.
    pub fn zeroed(self) -> Self {
        match self {
            Self::OrderbookOrder {
                is_buy_base,
                limit_price,
                ..
            } => Self::OrderbookOrder {
                is_buy_base,
                amount: Wad::ZERO,
                limit_price,
            },
            Self::Rebalance { .. } => Self::Rebalance { amount: Wad::ZERO },
            Self::YieldRecall { .. } => Self::YieldRecall { amount: Wad::ZERO },
            Self::YieldDeposit { .. } => Self::YieldDeposit { amount: Wad::ZERO },
        }
    }
}

/// Emitted once per trigger, whether or not the venue changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub venue: Venue,
    pub action_score: Wad,
    pub inventory: Wad,
    pub tier: u8,
    pub stale: bool,
    pub emergency_stale: bool,
    pub reference_price: Wad,
    pub effective_spread: Wad,
    /// Intents were zeroed because the cooldown window was still open.
    pub cooled_down: bool,
    pub decided_at: UnixSeconds,
}
