//! Canonical liquidity state.
//!
//! One `LiquidityState` exists per engine. It is created from an initial
//! snapshot and afterwards mutated only through `apply_update` (keeper
//! parameters) and `commit_inventory` (settled trades). Both are
//! all-or-nothing: a rejected update leaves every field untouched.

use duet_core::{UnixSeconds, Wad};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StateError, StateResult};

/// Lower bound for the linear impact coefficient (0.001).
pub const LAMBDA_MIN: Wad = Wad::from_raw_u64(1_000_000_000_000_000);
/// Upper bound for the linear impact coefficient (0.1).
pub const LAMBDA_MAX: Wad = Wad::from_raw_u64(100_000_000_000_000_000);
/// Lower bound for the base half-spread (0.0005).
pub const SPREAD_MIN: Wad = Wad::from_raw_u64(500_000_000_000_000);
/// Upper bound for the base half-spread (0.05).
pub const SPREAD_MAX: Wad = Wad::from_raw_u64(50_000_000_000_000_000);

/// Curve parameters reported by the keeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveParams {
    /// `ln(reference_price)` in WAD, carried for the execution layer.
    pub c: Wad,
    /// Linear impact coefficient.
    pub lambda: Wad,
    /// Base half-spread.
    pub spread: Wad,
}

impl CurveParams {
    /// Check lambda and spread against their hard bounds (inclusive).
    pub fn validate(&self) -> StateResult<()> {
        if self.lambda < LAMBDA_MIN || self.lambda > LAMBDA_MAX {
            return Err(StateError::OutOfBounds(format!(
                "lambda {} outside [{LAMBDA_MIN}, {LAMBDA_MAX}]",
                self.lambda
            )));
        }
        if self.spread < SPREAD_MIN || self.spread > SPREAD_MAX {
            return Err(StateError::OutOfBounds(format!(
                "spread {} outside [{SPREAD_MIN}, {SPREAD_MAX}]",
                self.spread
            )));
        }
        Ok(())
    }
}

/// Keeper-submitted state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub reference_price: Wad,
    pub curve_params: CurveParams,
    pub volatility: Wad,
    pub imbalance: Wad,
    /// Timestamp the keeper attached to the update.
    pub reported_at: UnixSeconds,
}

impl StateUpdate {
    /// Validate freshness and bounds against the engine's `now`.
    ///
    /// An update is stale when its reported timestamp is more than
    /// `tolerance_secs` older than `now`. Timestamps ahead of `now` are
    /// accepted.
    pub fn validate(&self, now: UnixSeconds, tolerance_secs: u64) -> StateResult<()> {
        if now.saturating_sub(self.reported_at) > tolerance_secs {
            return Err(StateError::StaleUpdate {
                reported_at: self.reported_at,
                now,
                tolerance_secs,
            });
        }
        if !self.reference_price.is_positive() {
            return Err(StateError::OutOfBounds(format!(
                "reference price {} must be positive",
                self.reference_price
            )));
        }
        self.curve_params.validate()?;
        if self.volatility.is_negative() {
            return Err(StateError::OutOfBounds(format!(
                "volatility {} must be non-negative",
                self.volatility
            )));
        }
        Ok(())
    }
}

/// Record of an accepted update, handed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdated {
    pub previous_reference_price: Wad,
    pub reference_price: Wad,
    pub curve_params: CurveParams,
    pub volatility: Wad,
    pub imbalance: Wad,
    pub reported_at: UnixSeconds,
    pub updated_at: UnixSeconds,
}

/// Receives a notification after every accepted update.
pub trait StateObserver: Send + Sync {
    fn on_state_updated(&self, event: &StateUpdated);
}

/// Canonical liquidity state of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityState {
    inventory: Wad,
    reference_price: Wad,
    curve_params: CurveParams,
    volatility: Wad,
    imbalance: Wad,
    last_update_time: UnixSeconds,
}

impl LiquidityState {
    /// Build the state from an initial snapshot, validated like any update.
    pub fn new(
        initial: &StateUpdate,
        inventory: Wad,
        now: UnixSeconds,
        tolerance_secs: u64,
    ) -> StateResult<Self> {
        initial.validate(now, tolerance_secs)?;
        Ok(Self {
            inventory,
            reference_price: initial.reference_price,
            curve_params: initial.curve_params,
            volatility: initial.volatility,
            imbalance: initial.imbalance,
            last_update_time: now,
        })
    }

    /// Replace price, curve parameters and risk signals atomically.
    ///
    /// `last_update_time` becomes the engine's `now`, never the reported
    /// timestamp, and never moves backwards.
    pub fn apply_update(
        &mut self,
        update: &StateUpdate,
        now: UnixSeconds,
        tolerance_secs: u64,
    ) -> StateResult<StateUpdated> {
        update.validate(now, tolerance_secs)?;

        let previous_reference_price = self.reference_price;
        self.reference_price = update.reference_price;
        self.curve_params = update.curve_params;
        self.volatility = update.volatility;
        self.imbalance = update.imbalance;
        self.last_update_time = self.last_update_time.max(now);

        debug!(
            reference_price = %self.reference_price,
            lambda = %self.curve_params.lambda,
            spread = %self.curve_params.spread,
            updated_at = self.last_update_time,
            "Liquidity state updated"
        );

        Ok(StateUpdated {
            previous_reference_price,
            reference_price: self.reference_price,
            curve_params: self.curve_params,
            volatility: self.volatility,
            imbalance: self.imbalance,
            reported_at: update.reported_at,
            updated_at: self.last_update_time,
        })
    }

    /// Record the post-trade inventory once settlement has succeeded.
    pub fn commit_inventory(&mut self, inventory: Wad) {
        self.inventory = inventory;
    }

    /// Seconds since the last accepted update.
    pub fn age(&self, now: UnixSeconds) -> u64 {
        now.saturating_sub(self.last_update_time)
    }

    pub fn inventory(&self) -> Wad {
        self.inventory
    }

    pub fn reference_price(&self) -> Wad {
        self.reference_price
    }

    pub fn curve_params(&self) -> &CurveParams {
        &self.curve_params
    }

    pub fn volatility(&self) -> Wad {
        self.volatility
    }

    pub fn imbalance(&self) -> Wad {
        self.imbalance
    }

    pub fn last_update_time(&self) -> UnixSeconds {
        self.last_update_time
    }
}
