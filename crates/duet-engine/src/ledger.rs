//! Token ledger collaborator.
//!
//! The engine never moves funds itself. It asks the ledger for balances to
//! size intents and hands it a `TradeSettlement` before committing
//! inventory. If settlement fails the trade is abandoned and the canonical
//! state is untouched.

use duet_core::{TradeSide, Wad};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transfer request for one priced trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSettlement {
    pub side: TradeSide,
    /// Base asset moving out of (buy) or into (sell) the pool.
    pub base_amount: Wad,
    /// Quote asset moving into (buy) or out of (sell) the pool.
    pub quote_amount: Wad,
    pub price: Wad,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient {asset} balance: required {required}, available {available}")]
    InsufficientBalance {
        asset: &'static str,
        required: Wad,
        available: Wad,
    },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Balances and transfers held outside the engine.
pub trait Ledger: Send + Sync {
    /// Quote asset idle in the pool.
    fn idle_quote_balance(&self) -> Wad;

    /// Quote asset deployed in the yield venue.
    fn yield_balance(&self) -> Wad;

    /// Move the assets for a trade. Must be all-or-nothing.
    fn settle_trade(&self, settlement: &TradeSettlement) -> Result<(), LedgerError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Balances {
    base: Wad,
    quote: Wad,
    yield_balance: Wad,
}

/// Ledger kept in memory, for simulations and tests.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<Balances>,
    settlements: Mutex<Vec<TradeSettlement>>,
}

impl InMemoryLedger {
    pub fn new(base: Wad, quote: Wad, yield_balance: Wad) -> Self {
        Self {
            balances: Mutex::new(Balances {
                base,
                quote,
                yield_balance,
            }),
            settlements: Mutex::new(Vec::new()),
        }
    }

    pub fn base_balance(&self) -> Wad {
        self.balances.lock().base
    }

    pub fn set_yield_balance(&self, amount: Wad) {
        self.balances.lock().yield_balance = amount;
    }

    /// Settled trades, oldest first.
    pub fn settlements(&self) -> Vec<TradeSettlement> {
        self.settlements.lock().clone()
    }
}

impl Ledger for InMemoryLedger {
    fn idle_quote_balance(&self) -> Wad {
        self.balances.lock().quote
    }

    fn yield_balance(&self) -> Wad {
        self.balances.lock().yield_balance
    }

    fn settle_trade(&self, settlement: &TradeSettlement) -> Result<(), LedgerError> {
        let mut balances = self.balances.lock();
        match settlement.side {
            TradeSide::Buy => {
                if balances.base < settlement.base_amount {
                    return Err(LedgerError::InsufficientBalance {
                        asset: "base",
                        required: settlement.base_amount,
                        available: balances.base,
                    });
                }
                balances.base = balances.base - settlement.base_amount;
                balances.quote = balances.quote + settlement.quote_amount;
            }
            TradeSide::Sell => {
                if balances.quote < settlement.quote_amount {
                    return Err(LedgerError::InsufficientBalance {
                        asset: "quote",
                        required: settlement.quote_amount,
                        available: balances.quote,
                    });
                }
                balances.quote = balances.quote - settlement.quote_amount;
                balances.base = balances.base + settlement.base_amount;
            }
        }
        self.settlements.lock().push(*settlement);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settlement(side: TradeSide, base: i64, quote: i64) -> TradeSettlement {
        TradeSettlement {
            side,
            base_amount: Wad::from_int(base),
            quote_amount: Wad::from_int(quote),
            price: Wad::from_int(2100),
        }
    }

    #[test]
    fn test_buy_moves_base_out_and_quote_in() {
        let ledger = InMemoryLedger::new(Wad::from_int(10), Wad::from_int(1_000), Wad::ZERO);
        ledger
            .settle_trade(&settlement(TradeSide::Buy, 2, 4_200))
            .unwrap();
        assert_eq!(ledger.base_balance(), Wad::from_int(8));
        assert_eq!(ledger.idle_quote_balance(), Wad::from_int(5_200));
        assert_eq!(ledger.settlements().len(), 1);
    }

    #[test]
    fn test_sell_requires_quote() {
        let ledger = InMemoryLedger::new(Wad::ZERO, Wad::from_int(1_000), Wad::ZERO);
        let err = ledger
            .settle_trade(&settlement(TradeSide::Sell, 1, 2_100))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { asset: "quote", .. }
        ));
        // failed settlement changes nothing
        assert_eq!(ledger.idle_quote_balance(), Wad::from_int(1_000));
        assert_eq!(ledger.base_balance(), Wad::ZERO);
        assert!(ledger.settlements().is_empty());
    }

    #[test]
    fn test_yield_balance() {
        let ledger = InMemoryLedger::default();
        assert_eq!(ledger.yield_balance(), Wad::ZERO);
        ledger.set_yield_balance(Wad::from_int(7));
        assert_eq!(ledger.yield_balance(), Wad::from_int(7));
    }
}
