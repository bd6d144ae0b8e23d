//! Venue allocation decisions for duet.
//!
//! Turns risk signals (inventory fraction, oracle tier, emergency staleness,
//! effective spread) into a weighted action score, selects a venue from a
//! fixed priority ladder, and emits sized execution intents gated by a
//! cooldown.

pub mod allocator;
pub mod config;
pub mod error;
pub mod intent;
pub mod score;
pub mod venue;

pub use allocator::{AllocationDecisionEngine, DecisionInputs, TriggerOutcome, VenueBalances};
pub use config::{AllocatorConfig, AllocatorSettings};
pub use error::{AllocatorError, AllocatorResult};
pub use intent::{DecisionRecord, Intent};
pub use score::{compute_action_score, tier_penalty, ActionScore, ScoreInputs};
pub use venue::select_venue;
