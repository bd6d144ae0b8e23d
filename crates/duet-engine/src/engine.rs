//! The engine object.
//!
//! One `Engine` owns one canonical `LiquidityState`. Mutating operations
//! (`apply_update`, `execute_trade`, `trigger`) run under a single-flight
//! guard and are all-or-nothing. The state lock is never held across a call
//! into a collaborator, so read-only queries stay available from inside
//! ledger and observer callbacks.

use std::sync::Arc;

use duet_allocator::{AllocationDecisionEngine, DecisionInputs, TriggerOutcome, VenueBalances};
use duet_core::{TradeSide, UnixSeconds, Wad};
use duet_curve::{effective_spread, CurveError, PricingCurve, Quote};
use duet_state::{
    LiquidityState, OracleTier, PriceFeed, PriceObservation, StateError, StateObserver,
    StateUpdate, StateUpdated,
};
use duet_telemetry::Metrics;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{EngineConfig, ResolvedConfig};
use crate::error::{EngineError, EngineResult};
use crate::guard::OperationGuard;
use crate::ledger::{Ledger, TradeSettlement};

/// External collaborators of an engine.
#[derive(Clone)]
pub struct Collaborators {
    pub feed: Arc<dyn PriceFeed>,
    pub ledger: Arc<dyn Ledger>,
    pub clock: Arc<dyn Clock>,
}

/// Result of a settled trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub quote: Quote,
    pub inventory_after: Wad,
    pub settled_at: UnixSeconds,
}

/// Point-in-time view for keepers and dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: LiquidityState,
    /// `None` while the feed has no usable sample.
    pub oracle: Option<OracleTier>,
    pub last_action_at: Option<UnixSeconds>,
    pub taken_at: UnixSeconds,
}

struct Core {
    state: LiquidityState,
    allocator: AllocationDecisionEngine,
}

pub struct Engine {
    config: ResolvedConfig,
    curve: PricingCurve,
    core: Mutex<Core>,
    guard: OperationGuard,
    observers: RwLock<Vec<Arc<dyn StateObserver>>>,
    feed: Arc<dyn PriceFeed>,
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Build an engine from configuration and an initial state snapshot.
    ///
    /// The snapshot is validated like any keeper update, and the initial
    /// inventory must respect the inventory cap.
    pub fn new(
        config: &EngineConfig,
        initial: &StateUpdate,
        inventory: Wad,
        collaborators: Collaborators,
    ) -> EngineResult<Self> {
        let resolved = config.resolve()?;
        if inventory.abs() > resolved.curve.q_max {
            return Err(CurveError::InventoryCapExceeded {
                inventory,
                q_max: resolved.curve.q_max,
            }
            .into());
        }

        let now = collaborators.clock.now_secs();
        let state = LiquidityState::new(initial, inventory, now, resolved.update_tolerance_secs)?;

        info!(
            reference_price = %state.reference_price(),
            inventory = %inventory,
            q_max = %resolved.curve.q_max,
            "Engine initialized"
        );

        Ok(Self {
            config: resolved,
            curve: PricingCurve::new(resolved.curve),
            core: Mutex::new(Core {
                state,
                allocator: AllocationDecisionEngine::new(resolved.allocator),
            }),
            guard: OperationGuard::new(),
            observers: RwLock::new(Vec::new()),
            feed: collaborators.feed,
            ledger: collaborators.ledger,
            clock: collaborators.clock,
        })
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Receive every accepted state update from now on.
    pub fn register_observer(&self, observer: Arc<dyn StateObserver>) {
        self.observers.write().push(observer);
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Apply a keeper update. Rejected updates leave the state untouched and
    /// notify nobody.
    pub fn apply_update(&self, update: &StateUpdate) -> EngineResult<StateUpdated> {
        let _permit = self.guard.enter()?;
        let now = self.clock.now_secs();

        let result =
            self.core
                .lock()
                .state
                .apply_update(update, now, self.config.update_tolerance_secs);
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                Metrics::state_update(rejection_label(&e));
                warn!(
                    error = %e,
                    reported_at = update.reported_at,
                    now,
                    "State update rejected"
                );
                return Err(e.into());
            }
        };

        Metrics::state_update("accepted");
        info!(
            reference_price = %event.reference_price,
            lambda = %event.curve_params.lambda,
            spread = %event.curve_params.spread,
            volatility = %event.volatility,
            imbalance = %event.imbalance,
            "State update accepted"
        );

        let observers = self.observers.read().clone();
        for observer in &observers {
            observer.on_state_updated(&event);
        }
        Ok(event)
    }

    /// Quote, settle through the ledger, then commit the inventory change.
    ///
    /// Inventory moves only after settlement succeeds; any failure before
    /// that point leaves the state exactly as it was.
    pub fn execute_trade(&self, side: TradeSide, base_delta: Wad) -> EngineResult<TradeReceipt> {
        let _permit = self.guard.enter()?;
        let now = self.clock.now_secs();

        let quote = match self.price_trade(side, base_delta, now) {
            Ok(quote) => quote,
            Err(e) => {
                Metrics::trade(side.as_str(), "rejected");
                warn!(side = %side, base_delta = %base_delta, error = %e, "Trade rejected");
                return Err(e);
            }
        };

        let settlement = TradeSettlement {
            side,
            base_amount: base_delta,
            quote_amount: quote.quote_amount,
            price: quote.price,
        };
        if let Err(e) = self.ledger.settle_trade(&settlement) {
            Metrics::trade(side.as_str(), "transfer_failed");
            warn!(side = %side, base_delta = %base_delta, error = %e, "Trade settlement failed");
            return Err(EngineError::ExternalTransferFailed(e));
        }

        // No other mutation can run while the permit is held, so the
        // inventory is still `quote.inventory_before`.
        debug_assert!(self.guard.is_held_by_current_thread());
        let inventory_after = {
            let mut core = self.core.lock();
            core.state.commit_inventory(quote.inventory_after);
            core.state.inventory()
        };

        Metrics::trade(side.as_str(), "filled");
        Metrics::inventory(inventory_after);
        info!(
            side = %side,
            base_delta = %base_delta,
            price = %quote.price,
            quote_amount = %quote.quote_amount,
            inventory = %inventory_after,
            tier = quote.tier,
            "Trade filled"
        );

        Ok(TradeReceipt {
            quote,
            inventory_after,
            settled_at: now,
        })
    }

    /// Run one allocation decision. Always returns a decision record; the
    /// intents are the only instructions for the execution layer.
    pub fn trigger(&self) -> EngineResult<TriggerOutcome> {
        let _permit = self.guard.enter()?;
        let now = self.clock.now_secs();
        let observation = self.observe()?;
        let balances = VenueBalances {
            idle_quote: self.ledger.idle_quote_balance(),
            yield_balance: self.ledger.yield_balance(),
        };

        let outcome = {
            let mut core = self.core.lock();
            let oracle = self.classify(&core.state, &observation, now)?;
            let inputs = DecisionInputs {
                inventory: core.state.inventory(),
                q_max: self.config.curve.q_max,
                reference_price: core.state.reference_price(),
                tier: oracle.tier,
                stale: oracle.stale,
                emergency_stale: oracle.emergency_stale,
                effective_spread: effective_spread(core.state.curve_params().spread, oracle.tier)?,
            };
            core.allocator.trigger(&inputs, &balances, now)?
        };

        Metrics::decision(
            outcome.decision.venue.as_str(),
            outcome.decision.cooled_down,
            outcome.decision.action_score,
        );
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current oracle tier, recomputed from the live feed.
    pub fn tier(&self) -> EngineResult<OracleTier> {
        let now = self.clock.now_secs();
        let observation = self.observe()?;
        let core = self.core.lock();
        self.classify(&core.state, &observation, now)
    }

    /// Mid price at an arbitrary inventory.
    pub fn mid_price(&self, inventory: Wad) -> EngineResult<Wad> {
        let core = self.core.lock();
        Ok(self.curve.mid_price(&core.state, inventory)?)
    }

    /// Quote a signed base delta: positive when the caller buys base,
    /// negative when the caller sells. Zero is an invalid size.
    pub fn quote(&self, signed_delta: Wad) -> EngineResult<Quote> {
        if signed_delta.is_zero() {
            return Err(CurveError::InvalidTradeSize(signed_delta).into());
        }
        let side = TradeSide::from_is_buy(signed_delta.is_positive());
        self.quote_for_delta(side, signed_delta.abs())
    }

    /// Quote a trade without executing it.
    pub fn quote_for_delta(&self, side: TradeSide, base_delta: Wad) -> EngineResult<Quote> {
        let now = self.clock.now_secs();
        self.price_trade(side, base_delta, now)
    }

    /// Copy of the canonical state.
    pub fn state(&self) -> LiquidityState {
        self.core.lock().state.clone()
    }

    pub fn inventory(&self) -> Wad {
        self.core.lock().state.inventory()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.clock.now_secs();
        let observation = self.observe().ok();
        let core = self.core.lock();
        let oracle = observation.and_then(|obs| {
            core.state
                .tier(&obs, now, &self.config.thresholds)
                .ok()
        });
        EngineSnapshot {
            state: core.state.clone(),
            oracle,
            last_action_at: core.allocator.last_action_at(),
            taken_at: now,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn observe(&self) -> EngineResult<PriceObservation> {
        let sample = self.feed.latest().ok_or(EngineError::FeedUnavailable)?;
        Ok(self.config.feed_scale.ingest(&sample)?)
    }

    fn classify(
        &self,
        state: &LiquidityState,
        observation: &PriceObservation,
        now: UnixSeconds,
    ) -> EngineResult<OracleTier> {
        let oracle = state.tier(observation, now, &self.config.thresholds)?;
        Metrics::oracle_tier(
            oracle.tier,
            oracle.deviation,
            oracle.stale,
            oracle.emergency_stale,
        );
        if oracle.emergency_stale {
            debug!(age_secs = oracle.age_secs, "Oracle emergency-stale");
        }
        Ok(oracle)
    }

    fn price_trade(
        &self,
        side: TradeSide,
        base_delta: Wad,
        now: UnixSeconds,
    ) -> EngineResult<Quote> {
        let observation = self.observe()?;
        let core = self.core.lock();
        let oracle = self.classify(&core.state, &observation, now)?;
        Ok(self
            .curve
            .quote_for_delta(&core.state, &oracle, side, base_delta)?)
    }
}

fn rejection_label(error: &StateError) -> &'static str {
    match error {
        StateError::StaleUpdate { .. } => "stale",
        StateError::OutOfBounds(_) => "out_of_bounds",
        _ => "invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledger::InMemoryLedger;
    use duet_state::{CurveParams, FeedSample, ManualFeed};

    const T0: u64 = 1_700_000_000;

    fn update(reported_at: u64) -> StateUpdate {
        StateUpdate {
            reference_price: Wad::from_int(2100),
            curve_params: CurveParams {
                c: Wad::ZERO,
                lambda: Wad::from_raw_u64(10_000_000_000_000_000),
                spread: Wad::from_raw_u64(1_000_000_000_000_000),
            },
            volatility: Wad::ZERO,
            imbalance: Wad::ZERO,
            reported_at,
        }
    }

    fn engine(feed: Arc<ManualFeed>) -> Engine {
        let collaborators = Collaborators {
            feed,
            ledger: Arc::new(InMemoryLedger::new(
                Wad::from_int(100),
                Wad::from_int(1_000_000),
                Wad::ZERO,
            )),
            clock: Arc::new(ManualClock::new(T0)),
        };
        Engine::new(&EngineConfig::default(), &update(T0), Wad::ZERO, collaborators).unwrap()
    }

    fn feed_at_2100() -> Arc<ManualFeed> {
        Arc::new(ManualFeed::with_sample(FeedSample {
            price: 210_000_000_000,
            confidence: 100_000_000,
            fetched_at: T0,
        }))
    }

    #[test]
    fn test_new_rejects_inventory_above_cap() {
        let collaborators = Collaborators {
            feed: feed_at_2100(),
            ledger: Arc::new(InMemoryLedger::default()),
            clock: Arc::new(ManualClock::new(T0)),
        };
        let result = Engine::new(
            &EngineConfig::default(),
            &update(T0),
            Wad::from_int(101),
            collaborators,
        );
        assert!(matches!(
            result,
            Err(EngineError::Curve(CurveError::InventoryCapExceeded { .. }))
        ));
    }

    #[test]
    fn test_new_rejects_stale_snapshot() {
        let collaborators = Collaborators {
            feed: feed_at_2100(),
            ledger: Arc::new(InMemoryLedger::default()),
            clock: Arc::new(ManualClock::new(T0)),
        };
        let result = Engine::new(
            &EngineConfig::default(),
            &update(T0 - 31),
            Wad::ZERO,
            collaborators,
        );
        assert!(matches!(
            result,
            Err(EngineError::State(StateError::StaleUpdate { .. }))
        ));
    }

    #[test]
    fn test_signed_quote_sides() {
        let engine = engine(feed_at_2100());
        let buy = engine.quote(Wad::from_raw_u64(5_000_000_000_000_000)).unwrap();
        assert_eq!(buy.side, TradeSide::Buy);
        assert_eq!(buy.price, Wad::from_raw_i128(2_102_042_192_250_000_010_510));

        let sell = engine
            .quote(-Wad::from_raw_u64(5_000_000_000_000_000))
            .unwrap();
        assert_eq!(sell.side, TradeSide::Sell);
        assert_eq!(sell.price, Wad::from_raw_i128(2_097_957_692_249_999_989_510));

        assert!(matches!(
            engine.quote(Wad::ZERO),
            Err(EngineError::Curve(CurveError::InvalidTradeSize(_)))
        ));
        // quotes never move inventory
        assert_eq!(engine.inventory(), Wad::ZERO);
    }

    #[test]
    fn test_feed_unavailable() {
        let feed = feed_at_2100();
        let engine = engine(Arc::clone(&feed));
        feed.clear();
        assert!(matches!(engine.tier(), Err(EngineError::FeedUnavailable)));
        assert!(matches!(
            engine.execute_trade(TradeSide::Buy, Wad::ONE),
            Err(EngineError::FeedUnavailable)
        ));
        assert!(matches!(engine.trigger(), Err(EngineError::FeedUnavailable)));
        // mid price needs no feed
        assert_eq!(engine.mid_price(Wad::ZERO).unwrap(), Wad::from_int(2100));

        let snapshot = engine.snapshot();
        assert!(snapshot.oracle.is_none());
        assert_eq!(snapshot.taken_at, T0);
    }

    #[test]
    fn test_rejection_labels() {
        assert_eq!(
            rejection_label(&StateError::StaleUpdate {
                reported_at: 0,
                now: 100,
                tolerance_secs: 30
            }),
            "stale"
        );
        assert_eq!(
            rejection_label(&StateError::OutOfBounds("lambda".to_string())),
            "out_of_bounds"
        );
        assert_eq!(
            rejection_label(&StateError::InvalidFeed("zero".to_string())),
            "invalid"
        );
    }
}
