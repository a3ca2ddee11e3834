//! Win and loss evaluation

use serde::{Deserialize, Serialize};

use crate::content::ContentRegistry;
use crate::core::config::{GameConfig, VictoryCondition, VictoryKind};
use crate::core::types::PlayerId;
use crate::state::{GameState, Phase, PlayerState, Winner};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Victory { player: PlayerId, kind: VictoryKind },
    /// The Shadow holds enough of the map; every player loses
    ShadowTriumph,
}

/// Raw measure a condition compares against its threshold
pub fn condition_value(state: &GameState, content: &ContentRegistry, player: &PlayerState, kind: VictoryKind) -> f64 {
    match kind {
        // Measured against everything any player has revealed so far
        VictoryKind::Conquest => {
            if state.revealed.is_empty() {
                0.0
            } else {
                player.owned_tiles.len() as f64 / state.revealed.len() as f64
            }
        }
        VictoryKind::Sanctifier => player
            .sanctified_tiles
            .iter()
            .filter(|k| state.tile(k).is_some_and(|t| t.is_holy_site()))
            .count() as f64,
        VictoryKind::ShadowAccord => player.alignment,
        VictoryKind::RelicAscension => player
            .relics
            .iter()
            .filter(|id| content.relic(id).is_some_and(|r| r.counts_for_ascension()))
            .count() as f64,
    }
}

/// Progress toward a condition as a percentage in [0, 100]
pub fn progress(value: f64, condition: &VictoryCondition) -> f64 {
    if condition.threshold <= 0.0 {
        return 100.0;
    }
    (value / condition.threshold * 100.0).clamp(0.0, 100.0)
}

/// Refresh every player's progress and report the first condition met
///
/// The Shadow check runs first. Players are checked in table order and
/// conditions in configured order.
pub fn evaluate(state: &mut GameState, content: &ContentRegistry, config: &GameConfig) -> Option<MatchOutcome> {
    let conditions = state.settings.victory_conditions.clone();
    let mut updates = Vec::with_capacity(state.players.len());
    let mut outcome = None;

    for player in &state.players {
        let mut entries = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            let value = condition_value(state, content, player, condition.kind);
            entries.push((condition.kind, progress(value, condition)));
            if outcome.is_none() && value >= condition.threshold {
                outcome = Some(MatchOutcome::Victory {
                    player: player.id,
                    kind: condition.kind,
                });
            }
        }
        updates.push(entries);
    }

    for (player, entries) in state.players.iter_mut().zip(updates) {
        player.victory_progress.extend(entries);
    }

    if state.shadow_share() >= config.shadow_defeat_share {
        return Some(MatchOutcome::ShadowTriumph);
    }
    outcome
}

/// Move the match into its terminal phase
pub fn apply_outcome(state: &mut GameState, outcome: MatchOutcome) {
    match outcome {
        MatchOutcome::Victory { player, kind } => {
            state.phase = Phase::Victory;
            state.winner = Some(Winner::Player(player));
            tracing::info!(%player, ?kind, turn = state.turn, "victory");
        }
        MatchOutcome::ShadowTriumph => {
            state.phase = Phase::Defeat;
            state.winner = Some(Winner::Shadow);
            tracing::info!(turn = state.turn, share = state.shadow_share(), "the Shadow has consumed the land");
        }
    }
}
