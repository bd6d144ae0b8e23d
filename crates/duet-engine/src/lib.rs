//! The duet engine.
//!
//! Wires the canonical state, pricing curve and allocator behind one owned
//! `Engine`, together with its collaborators:
//!
//! ```text
//! PriceFeed ─┐
//! Clock ─────┼─► Engine ── apply_update ─► LiquidityState ─► StateObserver
//! Ledger ◄───┘            ├─ quote / execute_trade (PricingCurve)
//!                         └─ trigger (AllocationDecisionEngine) ─► intents
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod ledger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, ResolvedConfig, CONFIG_ENV, DEFAULT_CONFIG_PATH};
pub use engine::{Collaborators, Engine, EngineSnapshot, TradeReceipt};
pub use error::{EngineError, EngineResult};
pub use guard::{OperationGuard, OperationPermit};
pub use ledger::{InMemoryLedger, Ledger, LedgerError, TradeSettlement};
