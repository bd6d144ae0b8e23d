//! Tier-dependent spread ladder.

use duet_core::Wad;

use crate::error::CurveResult;

/// Tier 1 multiplier (1.5x).
pub const TIER1_SPREAD_MULTIPLIER: Wad = Wad::from_raw_u64(1_500_000_000_000_000_000);
/// Tier 2 multiplier (2x).
pub const TIER2_SPREAD_MULTIPLIER: Wad = Wad::from_raw_u64(2_000_000_000_000_000_000);
/// Tier 3+ multiplier (5x).
pub const CRITICAL_SPREAD_MULTIPLIER: Wad = Wad::from_raw_u64(5_000_000_000_000_000_000);

/// Multiplier applied to the base half-spread at the given tier.
///
/// Step function: spread jumps at each band instead of scaling with
/// deviation.
pub fn spread_multiplier(tier: u8) -> Wad {
    match tier {
        0 => Wad::ONE,
        1 => TIER1_SPREAD_MULTIPLIER,
        2 => TIER2_SPREAD_MULTIPLIER,
        _ => CRITICAL_SPREAD_MULTIPLIER,
    }
}

/// Base half-spread widened for the current oracle tier.
pub fn effective_spread(base_spread: Wad, tier: u8) -> CurveResult<Wad> {
    Ok(base_spread.mul_wad(spread_multiplier(tier))?)
}
