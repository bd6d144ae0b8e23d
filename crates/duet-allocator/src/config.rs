//! Allocator configuration.

use duet_core::{UnixSeconds, Wad};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AllocatorError, AllocatorResult};

/// Configuration for the venue allocation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Weight of the inventory fraction `|q| / q_max` (alpha).
    #[serde(default = "default_inventory_weight")]
    pub inventory_weight: Decimal,
    /// Weight of the tier penalty (beta).
    #[serde(default = "default_tier_weight")]
    pub tier_weight: Decimal,
    /// Weight of the emergency staleness penalty (gamma).
    #[serde(default = "default_stale_weight")]
    pub stale_weight: Decimal,
    /// Weight of the spread term (zeta).
    #[serde(default = "default_spread_weight")]
    pub spread_weight: Decimal,

    /// Tier penalty at tier 1.
    #[serde(default = "default_tier1_penalty")]
    pub tier1_penalty: Decimal,
    /// Tier penalty at tier 2 and above.
    #[serde(default = "default_max_tier_penalty")]
    pub max_tier_penalty: Decimal,
    /// Effective spread that maps to a full spread term.
    #[serde(default = "default_spread_normalizer")]
    pub spread_normalizer: Decimal,

    /// Score at or above which the orderbook is selected.
    #[serde(default = "default_orderbook_threshold")]
    pub orderbook_threshold: Decimal,
    /// Score at or above which yield is recalled.
    #[serde(default = "default_yield_recall_threshold")]
    pub yield_recall_threshold: Decimal,

    /// Minimum seconds between non-trivial actions.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Emergency staleness ignores the cooldown.
    #[serde(default = "default_true")]
    pub cooldown_bypass_on_emergency: bool,

    /// Largest orderbook order, in base units.
    #[serde(default = "default_orderbook_fixed_cap")]
    pub orderbook_fixed_cap: Decimal,
    /// Quote amount requested per yield recall.
    #[serde(default = "default_yield_recall_amount")]
    pub yield_recall_amount: Decimal,
}

fn default_inventory_weight() -> Decimal {
    Decimal::new(4, 1)
}
fn default_tier_weight() -> Decimal {
    Decimal::new(3, 1)
}
fn default_stale_weight() -> Decimal {
    Decimal::new(2, 1)
}
fn default_spread_weight() -> Decimal {
    Decimal::new(1, 1)
}
fn default_tier1_penalty() -> Decimal {
    Decimal::new(5, 1)
}
fn default_max_tier_penalty() -> Decimal {
    Decimal::ONE
}
fn default_spread_normalizer() -> Decimal {
    Decimal::new(5, 2)
}
fn default_orderbook_threshold() -> Decimal {
    Decimal::new(7, 1)
}
fn default_yield_recall_threshold() -> Decimal {
    Decimal::new(4, 1)
}
fn default_cooldown_secs() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_orderbook_fixed_cap() -> Decimal {
    Decimal::from(10)
}
fn default_yield_recall_amount() -> Decimal {
    Decimal::from(10_000)
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            inventory_weight: default_inventory_weight(),
            tier_weight: default_tier_weight(),
            stale_weight: default_stale_weight(),
            spread_weight: default_spread_weight(),
            tier1_penalty: default_tier1_penalty(),
            max_tier_penalty: default_max_tier_penalty(),
            spread_normalizer: default_spread_normalizer(),
            orderbook_threshold: default_orderbook_threshold(),
            yield_recall_threshold: default_yield_recall_threshold(),
            cooldown_secs: default_cooldown_secs(),
            cooldown_bypass_on_emergency: true,
            orderbook_fixed_cap: default_orderbook_fixed_cap(),
            yield_recall_amount: default_yield_recall_amount(),
        }
    }
}

impl AllocatorConfig {
    /// Validate configuration values.
    ///
    /// Weights are taken as given; only the shape of the ladder and the
    /// normalizers are checked.
    pub fn validate(&self) -> AllocatorResult<()> {
        if self.spread_normalizer <= Decimal::ZERO {
            return Err(AllocatorError::ConfigError(format!(
                "spread_normalizer ({}) must be positive",
                self.spread_normalizer
            )));
        }
        if self.yield_recall_threshold > self.orderbook_threshold {
            return Err(AllocatorError::ConfigError(format!(
                "yield_recall_threshold ({}) must not exceed orderbook_threshold ({})",
                self.yield_recall_threshold, self.orderbook_threshold
            )));
        }
        if self.tier1_penalty > self.max_tier_penalty {
            return Err(AllocatorError::ConfigError(format!(
                "tier1_penalty ({}) must not exceed max_tier_penalty ({})",
                self.tier1_penalty, self.max_tier_penalty
            )));
        }
        if self.orderbook_fixed_cap.is_sign_negative() || self.yield_recall_amount.is_sign_negative()
        {
            return Err(AllocatorError::ConfigError(
                "orderbook_fixed_cap and yield_recall_amount must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and convert to WAD settings.
    pub fn resolve(&self) -> AllocatorResult<AllocatorSettings> {
        self.validate()?;
        Ok(AllocatorSettings {
            inventory_weight: Wad::from_decimal(self.inventory_weight)?,
            tier_weight: Wad::from_decimal(self.tier_weight)?,
            stale_weight: Wad::from_decimal(self.stale_weight)?,
            spread_weight: Wad::from_decimal(self.spread_weight)?,
            tier1_penalty: Wad::from_decimal(self.tier1_penalty)?,
            max_tier_penalty: Wad::from_decimal(self.max_tier_penalty)?,
            spread_normalizer: Wad::from_decimal(self.spread_normalizer)?,
            orderbook_threshold: Wad::from_decimal(self.orderbook_threshold)?,
            yield_recall_threshold: Wad::from_decimal(self.yield_recall_threshold)?,
            cooldown_secs: self.cooldown_secs,
            cooldown_bypass_on_emergency: self.cooldown_bypass_on_emergency,
            orderbook_fixed_cap: Wad::from_decimal(self.orderbook_fixed_cap)?,
            yield_recall_amount: Wad::from_decimal(self.yield_recall_amount)?,
        })
    }
}

/// Allocator settings in WAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorSettings {
    pub inventory_weight: Wad,
    pub tier_weight: Wad,
    pub stale_weight: Wad,
    pub spread_weight: Wad,
    pub tier1_penalty: Wad,
    pub max_tier_penalty: Wad,
    pub spread_normalizer: Wad,
    pub orderbook_threshold: Wad,
    pub yield_recall_threshold: Wad,
    pub cooldown_secs: UnixSeconds,
    pub cooldown_bypass_on_emergency: bool,
    pub orderbook_fixed_cap: Wad,
    pub yield_recall_amount: Wad,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        const TENTH: u64 = 100_000_000_000_000_000;
        Self {
            inventory_weight: Wad::from_raw_u64(4 * TENTH),
            tier_weight: Wad::from_raw_u64(3 * TENTH),
            stale_weight: Wad::from_raw_u64(2 * TENTH),
            spread_weight: Wad::from_raw_u64(TENTH),
            tier1_penalty: Wad::HALF,
            max_tier_penalty: Wad::ONE,
            spread_normalizer: Wad::from_raw_u64(50_000_000_000_000_000),
            orderbook_threshold: Wad::from_raw_u64(7 * TENTH),
            yield_recall_threshold: Wad::from_raw_u64(4 * TENTH),
            cooldown_secs: default_cooldown_secs(),
            cooldown_bypass_on_emergency: true,
            orderbook_fixed_cap: Wad::from_int(10),
            yield_recall_amount: Wad::from_int(10_000),
        }
    }
}
