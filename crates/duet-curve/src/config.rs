//! Pricing curve configuration.

use duet_core::Wad;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Pricing curve configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Inventory scale of the tanh term (`tanh(q / eta)`), in base units.
    #[serde(default = "default_eta")]
    pub eta: Decimal,

    /// Absolute inventory cap, in base units.
    #[serde(default = "default_q_max")]
    pub q_max: Decimal,

    /// Largest single trade, in base units.
    #[serde(default = "default_max_trade_size")]
    pub max_trade_size: Decimal,

    /// Hard bound on the curve offset from the reference price.
    #[serde(default = "default_delta_cap")]
    pub delta_cap: Decimal,
}

fn default_eta() -> Decimal {
    Decimal::from(1000)
}
fn default_q_max() -> Decimal {
    Decimal::from(100)
}
fn default_max_trade_size() -> Decimal {
    Decimal::from(10)
}
fn default_delta_cap() -> Decimal {
    Decimal::new(5, 1)
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            eta: default_eta(),
            q_max: default_q_max(),
            max_trade_size: default_max_trade_size(),
            delta_cap: default_delta_cap(),
        }
    }
}

impl CurveConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> CurveResult<()> {
        if self.eta <= Decimal::ZERO {
            return Err(CurveError::InvalidConfig(format!(
                "eta ({}) must be positive",
                self.eta
            )));
        }
        if self.q_max <= Decimal::ZERO {
            return Err(CurveError::InvalidConfig(format!(
                "q_max ({}) must be positive",
                self.q_max
            )));
        }
        if self.max_trade_size <= Decimal::ZERO {
            return Err(CurveError::InvalidConfig(format!(
                "max_trade_size ({}) must be positive",
                self.max_trade_size
            )));
        }
        // 1 - delta_cap must stay positive so the mid price never reaches zero
        if self.delta_cap <= Decimal::ZERO || self.delta_cap >= Decimal::ONE {
            return Err(CurveError::InvalidConfig(format!(
                "delta_cap ({}) must be in (0, 1)",
                self.delta_cap
            )));
        }
        Ok(())
    }

    /// Validate and convert to WAD settings.
    pub fn resolve(&self) -> CurveResult<CurveSettings> {
        self.validate()?;
        Ok(CurveSettings {
            eta: Wad::from_decimal(self.eta)?,
            q_max: Wad::from_decimal(self.q_max)?,
            max_trade_size: Wad::from_decimal(self.max_trade_size)?,
            delta_cap: Wad::from_decimal(self.delta_cap)?,
        })
    }
}

/// Curve settings in WAD, resolved once at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSettings {
    pub eta: Wad,
    pub q_max: Wad,
    pub max_trade_size: Wad,
    pub delta_cap: Wad,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            eta: Wad::from_int(1000),
            q_max: Wad::from_int(100),
            max_trade_size: Wad::from_int(10),
            delta_cap: Wad::HALF,
        }
    }
}
