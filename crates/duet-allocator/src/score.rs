//! Action score: a weighted sum of four normalized risk terms.

use duet_core::Wad;
use serde::{Deserialize, Serialize};

use crate::config::AllocatorSettings;
use crate::error::AllocatorResult;

/// Risk signals feeding the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInputs {
    pub inventory: Wad,
    pub q_max: Wad,
    pub tier: u8,
    pub emergency_stale: bool,
    pub effective_spread: Wad,
}

/// Score with its unweighted terms, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionScore {
    pub inventory_term: Wad,
    pub tier_term: Wad,
    pub stale_term: Wad,
    pub spread_term: Wad,
    pub score: Wad,
}

/// 0 at tier 0, `tier1_penalty` at tier 1, `max_tier_penalty` from tier 2 on.
pub fn tier_penalty(tier: u8, settings: &AllocatorSettings) -> Wad {
    match tier {
        0 => Wad::ZERO,
        1 => settings.tier1_penalty,
        _ => settings.max_tier_penalty,
    }
}

/// `alpha*|q|/q_max + beta*tier_penalty + gamma*stale + zeta*spread/normalizer`.
///
/// Fails with `DivisionByZero` when `q_max` is zero.
pub fn compute_action_score(
    inputs: &ScoreInputs,
    settings: &AllocatorSettings,
) -> AllocatorResult<ActionScore> {
    let inventory_term = inputs
        .inventory
        .abs()
        .div_wad(inputs.q_max.abs())?
        .clamp_to(Wad::ZERO, Wad::ONE);
    let tier_term = tier_penalty(inputs.tier, settings);
    let stale_term = if inputs.emergency_stale {
        Wad::ONE
    } else {
        Wad::ZERO
    };
    let spread_term = inputs
        .effective_spread
        .div_wad(settings.spread_normalizer)?
        .clamp_to(Wad::ZERO, Wad::ONE);

    let score = settings.inventory_weight.mul_wad(inventory_term)?
        + settings.tier_weight.mul_wad(tier_term)?
        + settings.stale_weight.mul_wad(stale_term)?
        + settings.spread_weight.mul_wad(spread_term)?;

    Ok(ActionScore {
        inventory_term,
        tier_term,
        stale_term,
        spread_term,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocatorError;
    use duet_core::CoreError;

    fn permille(v: u64) -> Wad {
        Wad::from_raw_u64(v * 1_000_000_000_000_000)
    }

    fn inputs(inventory: i64, tier: u8, emergency_stale: bool, spread: Wad) -> ScoreInputs {
        ScoreInputs {
            inventory: Wad::from_int(inventory),
            q_max: Wad::from_int(100),
            tier,
            emergency_stale,
            effective_spread: spread,
        }
    }

    #[test]
    fn test_calm_state_scores_spread_only() {
        let s = compute_action_score(
            &inputs(0, 0, false, permille(1)),
            &AllocatorSettings::default(),
        )
        .unwrap();
        assert_eq!(s.inventory_term, Wad::ZERO);
        assert_eq!(s.spread_term, permille(20));
        // 0.1 * 0.02
        assert_eq!(s.score, permille(2));
    }

    #[test]
    fn test_weighted_sum() {
        // 0.4 * 0.5 + 0.3 * 0.5 + 0 + 0.1 * 0.03 = 0.353
        let s = compute_action_score(
            &inputs(-50, 1, false, Wad::from_raw_u64(1_500_000_000_000_000)),
            &AllocatorSettings::default(),
        )
        .unwrap();
        assert_eq!(s.inventory_term, Wad::HALF);
        assert_eq!(s.tier_term, Wad::HALF);
        assert_eq!(s.stale_term, Wad::ZERO);
        assert_eq!(s.spread_term, permille(30));
        assert_eq!(s.score, permille(353));
    }

    #[test]
    fn test_terms_are_capped() {
        // inventory beyond q_max, tier 3, emergency, spread above normalizer
        let s = compute_action_score(
            &inputs(150, 3, true, permille(250)),
            &AllocatorSettings::default(),
        )
        .unwrap();
        assert_eq!(s.inventory_term, Wad::ONE);
        assert_eq!(s.tier_term, Wad::ONE);
        assert_eq!(s.stale_term, Wad::ONE);
        assert_eq!(s.spread_term, Wad::ONE);
        assert_eq!(s.score, Wad::ONE);
    }

    #[test]
    fn test_tier_penalty_shape() {
        let settings = AllocatorSettings::default();
        assert_eq!(tier_penalty(0, &settings), Wad::ZERO);
        assert_eq!(tier_penalty(1, &settings), Wad::HALF);
        assert_eq!(tier_penalty(2, &settings), Wad::ONE);
        assert_eq!(tier_penalty(3, &settings), Wad::ONE);
    }

    #[test]
    fn test_zero_q_max_fails() {
        let mut i = inputs(1, 0, false, Wad::ZERO);
        i.q_max = Wad::ZERO;
        assert_eq!(
            compute_action_score(&i, &AllocatorSettings::default()),
            Err(AllocatorError::Math(CoreError::DivisionByZero))
        );
    }
}
