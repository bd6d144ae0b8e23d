//! Threshold-gated venue allocation.
//!
//! `trigger` scores the current risk signals, walks the venue ladder, and
//! returns one decision record plus its follow-on intents. The only state
//! kept between triggers is the time of the last non-trivial action, which
//! drives the cooldown.

use duet_core::{UnixSeconds, Venue, Wad};
use tracing::{debug, info};

use crate::config::AllocatorSettings;
use crate::error::AllocatorResult;
use crate::intent::{DecisionRecord, Intent};
use crate::score::{compute_action_score, ActionScore, ScoreInputs};
use crate::venue::select_venue;

/// Signals read from the canonical state and oracle for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInputs {
    pub inventory: Wad,
    pub q_max: Wad,
    pub reference_price: Wad,
    pub tier: u8,
    pub stale: bool,
    pub emergency_stale: bool,
    pub effective_spread: Wad,
}

/// Balances the intents are sized against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VenueBalances {
    /// Quote asset sitting idle in the pool.
    pub idle_quote: Wad,
    /// Quote asset deployed in the yield venue.
    pub yield_balance: Wad,
}

/// Everything a trigger produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub decision: DecisionRecord,
    pub score: ActionScore,
    pub intents: Vec<Intent>,
}

impl TriggerOutcome {
    /// True when at least one intent moves a non-zero amount.
    pub fn is_actionable(&self) -> bool {
        self.intents.iter().any(|intent| !intent.is_noop())
    }
}

/// Discrete venue allocation policy with cooldown.
#[derive(Debug, Clone)]
pub struct AllocationDecisionEngine {
    settings: AllocatorSettings,
    last_action_at: Option<UnixSeconds>,
}

impl AllocationDecisionEngine {
    pub fn new(settings: AllocatorSettings) -> Self {
        Self {
            settings,
            last_action_at: None,
        }
    }

    pub fn settings(&self) -> &AllocatorSettings {
        &self.settings
    }

    /// Time of the last trigger that emitted a non-zero intent.
    pub fn last_action_at(&self) -> Option<UnixSeconds> {
        self.last_action_at
    }

    /// Whether the cooldown window is open at `now`.
    pub fn in_cooldown(&self, now: UnixSeconds, emergency_stale: bool) -> bool {
        if emergency_stale && self.settings.cooldown_bypass_on_emergency {
            return false;
        }
        match self.last_action_at {
            Some(last) => now < last.saturating_add(self.settings.cooldown_secs),
            None => false,
        }
    }

    /// Pure decision for `inputs`: score, venue and sized intents. Does not
    /// consult or advance the cooldown.
    pub fn decide(
        &self,
        inputs: &DecisionInputs,
        balances: &VenueBalances,
        now: UnixSeconds,
    ) -> AllocatorResult<TriggerOutcome> {
        let score = compute_action_score(
            &ScoreInputs {
                inventory: inputs.inventory,
                q_max: inputs.q_max,
                tier: inputs.tier,
                emergency_stale: inputs.emergency_stale,
                effective_spread: inputs.effective_spread,
            },
            &self.settings,
        )?;
        let venue = select_venue(
            score.score,
            inputs.tier,
            inputs.emergency_stale,
            &self.settings,
        );
        let intents = self.intents_for(venue, inputs, balances)?;

        Ok(TriggerOutcome {
            decision: DecisionRecord {
                venue,
                action_score: score.score,
                inventory: inputs.inventory,
                tier: inputs.tier,
                stale: inputs.stale,
                emergency_stale: inputs.emergency_stale,
                reference_price: inputs.reference_price,
                effective_spread: inputs.effective_spread,
                cooled_down: false,
                decided_at: now,
            },
            score,
            intents,
        })
    }

    /// Decide, apply the cooldown, and record the action time.
    ///
    /// Always returns a decision. Inside the cooldown window the record is
    /// flagged `cooled_down` and every intent is zeroed.
    pub fn trigger(
        &mut self,
        inputs: &DecisionInputs,
        balances: &VenueBalances,
        now: UnixSeconds,
    ) -> AllocatorResult<TriggerOutcome> {
        let mut outcome = self.decide(inputs, balances, now)?;

        if self.in_cooldown(now, inputs.emergency_stale) {
            outcome.decision.cooled_down = true;
            outcome.intents = outcome.intents.into_iter().map(Intent::zeroed).collect();
            debug!(
                venue = %outcome.decision.venue,
                last_action_at = ?self.last_action_at,
                cooldown_secs = self.settings.cooldown_secs,
                "Trigger inside cooldown, intents zeroed"
            );
        } else if outcome.is_actionable() {
            self.last_action_at = Some(now);
        }

        info!(
            venue = %outcome.decision.venue,
            score = %outcome.decision.action_score,
            tier = outcome.decision.tier,
            emergency_stale = outcome.decision.emergency_stale,
            cooled_down = outcome.decision.cooled_down,
            intents = outcome.intents.len(),
            "Allocation decision"
        );

        Ok(outcome)
    }

    fn intents_for(
        &self,
        venue: Venue,
        inputs: &DecisionInputs,
        balances: &VenueBalances,
    ) -> AllocatorResult<Vec<Intent>> {
        let intents = match venue {
            Venue::Orderbook => {
                let amount =
                    std::cmp::min(inputs.inventory.abs(), self.settings.orderbook_fixed_cap);
                vec![
                    Intent::OrderbookOrder {
                        is_buy_base: inputs.inventory.is_negative(),
                        amount,
                        limit_price: inputs.reference_price,
                    },
                    Intent::Rebalance { amount: Wad::ZERO },
                ]
            }
            Venue::YieldRecall => {
                let available = std::cmp::max(balances.yield_balance, Wad::ZERO);
                let amount = std::cmp::min(self.settings.yield_recall_amount, available);
                vec![Intent::YieldRecall { amount }]
            }
            Venue::Amm => {
                let idle = std::cmp::max(balances.idle_quote, Wad::ZERO);
                vec![Intent::YieldDeposit {
                    amount: idle.mul_wad(Wad::HALF)?,
                }]
            }
        };
        Ok(intents)
    }
}

impl Default for AllocationDecisionEngine {
    fn default() -> Self {
        Self::new(AllocatorSettings::default())
    }
}
