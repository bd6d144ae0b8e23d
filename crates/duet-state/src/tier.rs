//! Oracle deviation tiering and staleness classification.
//!
//! A tier is never cached: it is recomputed from the canonical state and the
//! live observation on every read. Tier (deviation severity) and the two
//! staleness flags are independent; callers must check both.

use duet_core::{UnixSeconds, Wad};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};
use crate::feed::PriceObservation;
use crate::liquidity::LiquidityState;

/// Tier at which trading halts.
pub const CRITICAL_TIER: u8 = 3;

/// Oracle freshness and deviation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Maximum age (seconds) of a keeper update's reported timestamp.
    #[serde(default = "default_update_tolerance_secs")]
    pub update_tolerance_secs: u64,
    /// State older than this is flagged stale.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    /// State older than this is flagged emergency-stale; trading halts.
    #[serde(default = "default_emergency_stale_after_secs")]
    pub emergency_stale_after_secs: u64,
    /// Deviation at which tier 1 starts.
    #[serde(default = "default_tier1_deviation")]
    pub tier1_deviation: Decimal,
    /// Deviation at which tier 2 starts.
    #[serde(default = "default_tier2_deviation")]
    pub tier2_deviation: Decimal,
    /// Deviation at which tier 3 (critical) starts.
    #[serde(default = "default_tier3_deviation")]
    pub tier3_deviation: Decimal,
}

fn default_update_tolerance_secs() -> u64 {
    30
}
fn default_stale_after_secs() -> u64 {
    60
}
fn default_emergency_stale_after_secs() -> u64 {
    120
}
fn default_tier1_deviation() -> Decimal {
    Decimal::new(5, 3) // 0.5%
}
fn default_tier2_deviation() -> Decimal {
    Decimal::new(2, 2) // 2%
}
fn default_tier3_deviation() -> Decimal {
    Decimal::new(5, 2) // 5%
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            update_tolerance_secs: default_update_tolerance_secs(),
            stale_after_secs: default_stale_after_secs(),
            emergency_stale_after_secs: default_emergency_stale_after_secs(),
            tier1_deviation: default_tier1_deviation(),
            tier2_deviation: default_tier2_deviation(),
            tier3_deviation: default_tier3_deviation(),
        }
    }
}

impl OracleConfig {
    /// Validate configuration values.
    ///
    /// Requires `0 < tier1 < tier2 < tier3` and
    /// `stale_after_secs <= emergency_stale_after_secs`.
    pub fn validate(&self) -> StateResult<()> {
        if self.tier1_deviation <= Decimal::ZERO {
            return Err(StateError::InvalidConfig(format!(
                "tier1_deviation ({}) must be positive",
                self.tier1_deviation
            )));
        }
        if self.tier1_deviation >= self.tier2_deviation
            || self.tier2_deviation >= self.tier3_deviation
        {
            return Err(StateError::InvalidConfig(format!(
                "tier thresholds must be strictly increasing ({} < {} < {})",
                self.tier1_deviation, self.tier2_deviation, self.tier3_deviation
            )));
        }
        if self.stale_after_secs > self.emergency_stale_after_secs {
            return Err(StateError::InvalidConfig(format!(
                "stale_after_secs ({}) must not exceed emergency_stale_after_secs ({})",
                self.stale_after_secs, self.emergency_stale_after_secs
            )));
        }
        Ok(())
    }

    /// Validate and convert to engine units.
    pub fn thresholds(&self) -> StateResult<TierThresholds> {
        self.validate()?;
        Ok(TierThresholds {
            tier1: Wad::from_decimal(self.tier1_deviation)?,
            tier2: Wad::from_decimal(self.tier2_deviation)?,
            tier3: Wad::from_decimal(self.tier3_deviation)?,
            stale_after_secs: self.stale_after_secs,
            emergency_stale_after_secs: self.emergency_stale_after_secs,
        })
    }
}

/// Resolved tier ladder in WAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThresholds {
    pub tier1: Wad,
    pub tier2: Wad,
    pub tier3: Wad,
    pub stale_after_secs: u64,
    pub emergency_stale_after_secs: u64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            tier1: Wad::from_raw_u64(5_000_000_000_000_000),
            tier2: Wad::from_raw_u64(20_000_000_000_000_000),
            tier3: Wad::from_raw_u64(50_000_000_000_000_000),
            stale_after_secs: default_stale_after_secs(),
            emergency_stale_after_secs: default_emergency_stale_after_secs(),
        }
    }
}

impl TierThresholds {
    /// Strict ladder: `d < tier1` → 0, `d < tier2` → 1, `d < tier3` → 2, else 3.
    pub fn classify(&self, deviation: Wad) -> u8 {
        if deviation < self.tier1 {
            0
        } else if deviation < self.tier2 {
            1
        } else if deviation < self.tier3 {
            2
        } else {
            CRITICAL_TIER
        }
    }
}

/// Derived oracle status, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleTier {
    pub live_price: Wad,
    pub confidence: Wad,
    /// `|live / reference - 1|`.
    pub deviation: Wad,
    pub tier: u8,
    pub stale: bool,
    pub emergency_stale: bool,
    /// Seconds since the last accepted update.
    pub age_secs: u64,
}

impl OracleTier {
    pub fn is_critical(&self) -> bool {
        self.tier >= CRITICAL_TIER
    }
}

/// `|live / reference - 1|` in WAD.
///
/// A cheap surrogate for `|ln(live / reference)|`; only ordinal correctness
/// matters for tiering, so the drift at large deviations is acceptable.
pub fn deviation(live_price: Wad, reference_price: Wad) -> StateResult<Wad> {
    let ratio = live_price.div_wad(reference_price)?;
    Ok((ratio - Wad::ONE).abs())
}

impl LiquidityState {
    /// Classify the live observation against this state at `now`.
    pub fn tier(
        &self,
        observation: &PriceObservation,
        now: UnixSeconds,
        thresholds: &TierThresholds,
    ) -> StateResult<OracleTier> {
        let deviation = deviation(observation.price, self.reference_price())?;
        let age_secs = self.age(now);
        Ok(OracleTier {
            live_price: observation.price,
            confidence: observation.confidence,
            deviation,
            tier: thresholds.classify(deviation),
            stale: age_secs > thresholds.stale_after_secs,
            emergency_stale: age_secs > thresholds.emergency_stale_after_secs,
            age_secs,
        })
    }
}
