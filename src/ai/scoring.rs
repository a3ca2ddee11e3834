//! Utility scoring and selection

use ordered_float::OrderedFloat;
use rand::Rng;

use super::candidates::{Candidate, UtilityTerms};
use super::personality::{AiProfile, UtilityWeights};

/// Weighted sum of the utility terms
pub fn raw_utility(terms: &UtilityTerms, weights: &UtilityWeights) -> f64 {
    weights.victory * terms.victory_delta
        + weights.economy * terms.economy_gain
        + weights.defense * terms.defense_gain
        + weights.risk * terms.risk_penalty
        + weights.synergy * terms.domain_synergy
}

/// Apply a family multiplier so that a boost always makes a candidate more attractive
pub fn apply_multiplier(utility: f64, multiplier: f64) -> f64 {
    if multiplier <= 0.0 {
        return utility;
    }
    if utility >= 0.0 {
        utility * multiplier
    } else {
        utility / multiplier
    }
}

/// Score every candidate and order them best first
///
/// The sort is stable, so equal scores keep generation order.
pub fn rank<R: Rng>(candidates: Vec<Candidate>, profile: &AiProfile, jitter: f64, rng: &mut R) -> Vec<(Candidate, f64)> {
    let mut scored: Vec<(Candidate, f64)> = candidates
        .into_iter()
        .map(|candidate| {
            let noise = if jitter > 0.0 { rng.gen_range(-jitter..=jitter) } else { 0.0 };
            let utility = raw_utility(&candidate.terms, &profile.weights) + noise;
            let score = apply_multiplier(utility, profile.multipliers.get(candidate.family));
            (candidate, score)
        })
        .collect();
    scored.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));
    scored
}

pub fn select_best<R: Rng>(candidates: Vec<Candidate>, profile: &AiProfile, jitter: f64, rng: &mut R) -> Option<Candidate> {
    rank(candidates, profile, jitter, rng).into_iter().next().map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::personality::{Family, Personality};
    use crate::core::types::{Resources, TileKey};
    use crate::state::ActionKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn candidate(family: Family, action: ActionKind, terms: UtilityTerms) -> Candidate {
        Candidate {
            family,
            action,
            cost: Resources::divinity(2),
            terms,
        }
    }

    fn fortify_and_capture(terms: UtilityTerms) -> Vec<Candidate> {
        vec![
            candidate(Family::Fortify, ActionKind::Fortify { tile: TileKey::new(0, 0) }, terms),
            candidate(Family::Capture, ActionKind::Capture { tile: TileKey::new(1, 0) }, terms),
        ]
    }

    fn equal_terms() -> UtilityTerms {
        UtilityTerms {
            victory_delta: 1.0,
            economy_gain: 0.5,
            defense_gain: 0.5,
            risk_penalty: 0.0,
            domain_synergy: 0.0,
        }
    }

    #[test]
    fn test_aggressive_prefers_capture_on_equal_utility() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let profile = AiProfile::for_personality(Personality::Aggressive);
        let best = select_best(fortify_and_capture(equal_terms()), &profile, 0.0, &mut rng).unwrap();
        assert_eq!(best.family, Family::Capture);
    }

    #[test]
    fn test_defensive_prefers_fortify_on_equal_utility() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let profile = AiProfile::for_personality(Personality::Defensive);
        let best = select_best(fortify_and_capture(equal_terms()), &profile, 0.0, &mut rng).unwrap();
        assert_eq!(best.family, Family::Fortify);
    }

    #[test]
    fn test_ties_keep_generation_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let profile = AiProfile::for_personality(Personality::Balanced);
        let best = select_best(fortify_and_capture(equal_terms()), &profile, 0.0, &mut rng).unwrap();
        assert_eq!(best.family, Family::Fortify);
    }

    #[test]
    fn test_boost_helps_negative_utility() {
        assert_eq!(apply_multiplier(-3.0, 1.5), -2.0);
        assert_eq!(apply_multiplier(2.0, 1.5), 3.0);
    }

    #[test]
    fn test_aggressive_prefers_capture_even_when_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let profile = AiProfile::for_personality(Personality::Aggressive);
        let terms = UtilityTerms {
            economy_gain: -2.0,
            ..UtilityTerms::default()
        };
        let best = select_best(fortify_and_capture(terms), &profile, 0.0, &mut rng).unwrap();
        assert_eq!(best.family, Family::Capture);
    }
}
