//! Mid price and trade quotes.
//!
//! The curve offsets the reference price by
//! `delta(q) = lambda * q + tanh(q / eta)`, bounded to `[-cap, cap]`.
//! Trade quotes evaluate the curve at the midpoint inventory of the trade and
//! then apply the tier-widened spread multiplicatively.

use duet_core::{tanh_wad, TradeSide, Wad};
use duet_state::{LiquidityState, OracleTier};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CurveSettings;
use crate::error::{CurveError, CurveResult};
use crate::spread::effective_spread;

/// A priced trade. `price` is per unit of base; `quote_amount` is the quote
/// asset owed (buy) or paid out (sell) for `base_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub side: TradeSide,
    pub base_delta: Wad,
    /// Inventory before the trade.
    pub inventory_before: Wad,
    /// Inventory after the trade settles.
    pub inventory_after: Wad,
    /// Inventory the curve was evaluated at.
    pub mid_inventory: Wad,
    pub mid_price: Wad,
    pub effective_spread: Wad,
    pub price: Wad,
    pub quote_amount: Wad,
    pub tier: u8,
}

/// Stateless pricing curve over a `LiquidityState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCurve {
    settings: CurveSettings,
}

impl PricingCurve {
    pub fn new(settings: CurveSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CurveSettings {
        &self.settings
    }

    /// Curve offset from the reference price at `inventory`, clamped to the
    /// configured cap.
    pub fn curve_delta(&self, state: &LiquidityState, inventory: Wad) -> CurveResult<Wad> {
        let linear = state.curve_params().lambda.mul_wad(inventory)?;
        let shape = tanh_wad(inventory.div_wad(self.settings.eta)?);
        let cap = self.settings.delta_cap;
        Ok((linear + shape).clamp_to(-cap, cap))
    }

    /// `reference_price * (1 + delta(inventory))`.
    pub fn mid_price(&self, state: &LiquidityState, inventory: Wad) -> CurveResult<Wad> {
        let delta = self.curve_delta(state, inventory)?;
        Ok(state.reference_price().mul_wad(Wad::ONE + delta)?)
    }

    /// Price a trade of `base_delta` base units.
    ///
    /// `TradeSide::Buy` means the counterparty buys base from the pool, so
    /// inventory falls by `base_delta`. Preconditions are checked in order:
    /// size, oracle emergency staleness, critical tier, inventory cap.
    pub fn quote_for_delta(
        &self,
        state: &LiquidityState,
        oracle: &OracleTier,
        side: TradeSide,
        base_delta: Wad,
    ) -> CurveResult<Quote> {
        if !base_delta.is_positive() {
            return Err(CurveError::InvalidTradeSize(base_delta));
        }
        if base_delta > self.settings.max_trade_size {
            return Err(CurveError::TradeTooLarge {
                size: base_delta,
                max: self.settings.max_trade_size,
            });
        }
        if oracle.emergency_stale {
            return Err(CurveError::OracleEmergencyStale {
                age_secs: oracle.age_secs,
            });
        }
        if oracle.is_critical() {
            return Err(CurveError::OracleCriticalDeviation {
                tier: oracle.tier,
                deviation: oracle.deviation,
            });
        }

        let q0 = state.inventory();
        let q1 = match side {
            TradeSide::Buy => q0 - base_delta,
            TradeSide::Sell => q0 + base_delta,
        };
        if q1.abs() > self.settings.q_max {
            return Err(CurveError::InventoryCapExceeded {
                inventory: q1,
                q_max: self.settings.q_max,
            });
        }

        let q_mid = Wad::midpoint(q0, q1);
        let mid_price = self.mid_price(state, q_mid)?;
        let spread = effective_spread(state.curve_params().spread, oracle.tier)?;
        let price = match side {
            TradeSide::Buy => mid_price.mul_wad(Wad::ONE + spread)?,
            TradeSide::Sell => mid_price.mul_wad(Wad::ONE - spread)?,
        };
        let quote_amount = price.mul_wad(base_delta)?;

        debug!(
            side = %side,
            base_delta = %base_delta,
            q_mid = %q_mid,
            mid_price = %mid_price,
            spread = %spread,
            price = %price,
            "Quote computed"
        );

        Ok(Quote {
            side,
            base_delta,
            inventory_before: q0,
            inventory_after: q1,
            mid_inventory: q_mid,
            mid_price,
            effective_spread: spread,
            price,
            quote_amount,
            tier: oracle.tier,
        })
    }
}

impl Default for PricingCurve {
    fn default() -> Self {
        Self::new(CurveSettings::default())
    }
}
