//! Venue priority ladder.

use duet_core::{Venue, Wad};

use crate::config::AllocatorSettings;

/// Deterministic ladder, most conservative first:
///
/// 1. emergency-stale, tier >= 2, or `score >= orderbook_threshold` → `ORDERBOOK`
/// 2. `score >= yield_recall_threshold` → `YIELD_RECALL`
/// 3. otherwise `AMM`
///
/// Ties resolve upward because every comparison is inclusive.
pub fn select_venue(
    score: Wad,
    tier: u8,
    emergency_stale: bool,
    settings: &AllocatorSettings,
) -> Venue {
    if emergency_stale || tier >= 2 || score >= settings.orderbook_threshold {
        Venue::Orderbook
    } else if score >= settings.yield_recall_threshold {
        Venue::YieldRecall
    } else {
        Venue::Amm
    }
}
