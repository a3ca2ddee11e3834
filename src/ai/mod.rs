//! Utility-based AI
//!
//! One decision per call: generate candidates against the current budget,
//! score them with the player's profile and hand back the best action. The
//! engine applies it through the normal action path and asks again until
//! nothing is left to do.

pub mod candidates;
pub mod personality;
pub mod scoring;

use rand::Rng;

pub use candidates::{generate_candidates, Candidate, UtilityTerms};
pub use personality::{load_named_profile, load_profile, AiProfile, Family, FamilyMultipliers, Personality, UtilityWeights};
pub use scoring::{apply_multiplier, rank, raw_utility, select_best};

use crate::content::ContentRegistry;
use crate::core::config::GameConfig;
use crate::core::types::{PlayerId, Resources};
use crate::state::GameState;

/// Pick the next action for `player` given an estimated `budget`
pub fn plan_next<R: Rng>(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    profile: &AiProfile,
    player: PlayerId,
    budget: &Resources,
    rng: &mut R,
) -> Option<Candidate> {
    let candidates = generate_candidates(state, content, config, player, budget);
    if candidates.is_empty() {
        return None;
    }
    let count = candidates.len();
    let best = select_best(candidates, profile, config.ai.jitter, rng)?;
    tracing::debug!(%player, candidates = count, family = ?best.family, action = best.action.name(), "AI decision");
    Some(best)
}
