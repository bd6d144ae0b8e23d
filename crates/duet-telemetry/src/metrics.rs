//! Prometheus metrics for the duet engine.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use duet_core::Wad;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_int_gauge, CounterVec, Encoder, Gauge,
    IntGauge, TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;

use crate::error::{TelemetryError, TelemetryResult};

/// Keeper state updates by outcome.
/// Labels: result (accepted/stale/out_of_bounds/invalid)
pub static STATE_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "duet_state_updates_total",
        "Total keeper state updates by result",
        &["result"]
    )
    .unwrap()
});

/// Oracle tier at the last read (0-3).
pub static ORACLE_TIER: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("duet_oracle_tier", "Oracle deviation tier at last read").unwrap()
});

/// Oracle deviation `|live / reference - 1|` at the last read.
pub static ORACLE_DEVIATION: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "duet_oracle_deviation",
        "Relative deviation of live price from reference price"
    )
    .unwrap()
});

/// Staleness at the last read (0 = fresh, 1 = stale, 2 = emergency-stale).
pub static ORACLE_STALE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "duet_oracle_stale",
        "Oracle staleness (0=fresh, 1=stale, 2=emergency)"
    )
    .unwrap()
});

/// Allocation decisions.
/// Labels: venue, cooled_down
pub static DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "duet_decisions_total",
        "Total allocation decisions by venue",
        &["venue", "cooled_down"]
    )
    .unwrap()
});

/// Action score of the last decision.
pub static ACTION_SCORE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("duet_action_score", "Action score of the last decision").unwrap()
});

/// Trade attempts.
/// Labels: side (buy/sell), result (filled/rejected/transfer_failed)
pub static TRADES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "duet_trades_total",
        "Total trade attempts by side and result",
        &["side", "result"]
    )
    .unwrap()
});

/// Net inventory in base units.
pub static INVENTORY: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("duet_inventory", "Net inventory in base units").unwrap()
});

/// Lossy conversion for gauges. Values outside the `Decimal` range read as NaN.
fn wad_to_f64(value: Wad) -> f64 {
    value
        .to_decimal()
        .and_then(|d| d.to_f64())
        .unwrap_or(f64::NAN)
}

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a keeper update outcome.
    pub fn state_update(result: &str) {
        STATE_UPDATES_TOTAL.with_label_values(&[result]).inc();
    }

    /// Record a tier read.
    pub fn oracle_tier(tier: u8, deviation: Wad, stale: bool, emergency_stale: bool) {
        ORACLE_TIER.set(i64::from(tier));
        ORACLE_DEVIATION.set(wad_to_f64(deviation));
        let staleness = if emergency_stale {
            2
        } else if stale {
            1
        } else {
            0
        };
        ORACLE_STALE.set(staleness);
    }

    /// Record an allocation decision.
    pub fn decision(venue: &str, cooled_down: bool, score: Wad) {
        let cooled = if cooled_down { "true" } else { "false" };
        DECISIONS_TOTAL.with_label_values(&[venue, cooled]).inc();
        ACTION_SCORE.set(wad_to_f64(score));
    }

    /// Record a trade attempt.
    pub fn trade(side: &str, result: &str) {
        TRADES_TOTAL.with_label_values(&[side, result]).inc();
    }

    /// Set the inventory gauge.
    pub fn inventory(inventory: Wad) {
        INVENTORY.set(wad_to_f64(inventory));
    }

    /// Render the default registry in the Prometheus text format, for the
    /// embedding process's scrape endpoint.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
