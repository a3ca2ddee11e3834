//! Candidate action generation for the AI
//!
//! Families are produced in a fixed order (capture, sanctify, fortify,
//! explore, summon) and tiles in row-major order, so a stable sort on score
//! breaks ties by generation order.

use ahash::AHashSet;

use super::personality::Family;
use crate::content::ContentRegistry;
use crate::core::config::GameConfig;
use crate::core::types::{PlayerId, Resources, TileKey, ALL_CURRENCIES};
use crate::state::{ActionKind, GameState, PlayerState, Visibility};
use crate::systems::{capture, ledger, visibility};

/// Raw inputs of the utility formula
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UtilityTerms {
    pub victory_delta: f64,
    pub economy_gain: f64,
    pub defense_gain: f64,
    /// Zero or negative
    pub risk_penalty: f64,
    pub domain_synergy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub family: Family,
    pub action: ActionKind,
    pub cost: Resources,
    pub terms: UtilityTerms,
}

/// Spending weight of a cost in the economy term
const COST_WEIGHT: f64 = 0.2;

fn cost_penalty(cost: &Resources) -> f64 {
    ALL_CURRENCIES.iter().map(|c| cost.get(*c) as f64).sum::<f64>() * COST_WEIGHT
}

fn shadow_neighbors(state: &GameState, key: &TileKey) -> usize {
    state
        .map
        .neighbors(key)
        .filter(|n| state.tile(n).is_some_and(|t| t.owner.is_shadow() || t.is_corrupted()))
        .count()
}

fn synergy(state: &GameState, content: &ContentRegistry, player: &PlayerState, key: &TileKey) -> f64 {
    let Some(tile) = state.tile(key) else {
        return 0.0;
    };
    let affine = content
        .domain(player.domain)
        .is_some_and(|d| d.affinity_terrain.contains(&tile.terrain));
    if affine {
        1.0
    } else {
        0.0
    }
}

/// Every affordable candidate for `player_id` against `budget`, in generation order
pub fn generate_candidates(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player_id: PlayerId,
    budget: &Resources,
) -> Vec<Candidate> {
    let Some(player) = state.player(player_id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    capture_candidates(state, content, config, player, budget, &mut out);
    sanctify_candidates(state, content, config, player, budget, &mut out);
    fortify_candidates(state, config, player, budget, &mut out);
    explore_candidates(state, content, player, &mut out);
    summon_candidates(state, content, config, player, budget, &mut out);
    out
}

fn capture_candidates(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player: &PlayerState,
    budget: &Resources,
    out: &mut Vec<Candidate>,
) {
    let mut frontier: Vec<TileKey> = player
        .owned_tiles
        .iter()
        .flat_map(|k| state.map.neighbors(k).collect::<Vec<_>>())
        .filter(|k| !player.owns(k))
        .collect::<AHashSet<_>>()
        .into_iter()
        .collect();
    frontier.sort_by_key(|k| (k.y, k.x));

    for key in frontier {
        let Ok(cost) = capture::capture_cost(state, content, config, player.id, key) else {
            continue;
        };
        let cost = Resources::divinity(cost);
        if !ledger::can_afford(budget, &cost) {
            continue;
        }
        let Some(tile) = state.tile(&key) else {
            continue;
        };
        let owned_neighbors = key.neighbors().iter().filter(|n| player.owns(n)).count();
        let feature_value = if tile.feature.is_some() && !tile.event_triggered { 1.0 } else { 0.0 };
        out.push(Candidate {
            family: Family::Capture,
            action: ActionKind::Capture { tile: key },
            cost,
            terms: UtilityTerms {
                victory_delta: 1.0 + if tile.is_holy_site() { 1.0 } else { 0.0 },
                economy_gain: (tile.divinity_yield + tile.faith_yield) as f64 + feature_value - cost_penalty(&cost),
                defense_gain: owned_neighbors as f64 * 0.25,
                risk_penalty: -(tile.corruption as f64 * 0.5 + shadow_neighbors(state, &key) as f64 * 0.3),
                domain_synergy: synergy(state, content, player, &key),
            },
        });
    }
}

fn sanctify_candidates(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player: &PlayerState,
    budget: &Resources,
    out: &mut Vec<Candidate>,
) {
    let cost = config.costs.sanctify;
    if !ledger::can_afford(budget, &cost) {
        return;
    }
    for key in player.owned_sorted() {
        let Some(tile) = state.tile(&key) else {
            continue;
        };
        if tile.sanctified || tile.is_corrupted() {
            continue;
        }
        out.push(Candidate {
            family: Family::Sanctify,
            action: ActionKind::Sanctify { tile: key },
            cost,
            terms: UtilityTerms {
                victory_delta: if tile.is_holy_site() { 2.0 } else { 0.5 },
                economy_gain: 1.0 - cost_penalty(&cost),
                defense_gain: 0.5,
                risk_penalty: -(shadow_neighbors(state, &key) as f64 * 0.3),
                domain_synergy: synergy(state, content, player, &key),
            },
        });
    }
}

fn fortify_candidates(
    state: &GameState,
    config: &GameConfig,
    player: &PlayerState,
    budget: &Resources,
    out: &mut Vec<Candidate>,
) {
    let cost = config.costs.fortify;
    if !ledger::can_afford(budget, &cost) {
        return;
    }
    let threshold = config.ai.fortify_threshold;
    for key in player.owned_sorted() {
        let Some(tile) = state.tile(&key) else {
            continue;
        };
        if tile.stability >= threshold {
            continue;
        }
        out.push(Candidate {
            family: Family::Fortify,
            action: ActionKind::Fortify { tile: key },
            cost,
            terms: UtilityTerms {
                victory_delta: 0.0,
                economy_gain: -cost_penalty(&cost),
                defense_gain: (threshold - tile.stability) as f64 * 0.5 + shadow_neighbors(state, &key) as f64 * 0.5,
                risk_penalty: 0.0,
                domain_synergy: 0.0,
            },
        });
    }
}

fn explore_candidates(state: &GameState, content: &ContentRegistry, player: &PlayerState, out: &mut Vec<Candidate>) {
    for unit in state.units_of(player.id) {
        if unit.movement == 0 {
            continue;
        }
        let reach = state
            .map
            .reachable(unit.position, unit.movement, |k| *k != unit.position && state.is_occupied(k));
        let mut destinations: Vec<TileKey> = reach.keys().copied().filter(|k| *k != unit.position).collect();
        destinations.sort_by_key(|k| (k.y, k.x));

        let radius = visibility::unit_perception(state, content, unit);
        let mut best: Option<(TileKey, usize)> = None;
        for dest in destinations {
            let hidden = state
                .map
                .within(dest, radius)
                .iter()
                .filter(|k| visibility::visibility_for(state, player.id, k) == Visibility::Hidden)
                .count();
            if hidden > 0 && best.map_or(true, |(_, h)| hidden > h) {
                best = Some((dest, hidden));
            }
        }

        if let Some((dest, hidden)) = best {
            out.push(Candidate {
                family: Family::Explore,
                action: ActionKind::Move { unit: unit.id, to: dest },
                cost: Resources::ZERO,
                terms: UtilityTerms {
                    victory_delta: hidden as f64 * 0.15,
                    economy_gain: 0.0,
                    defense_gain: 0.0,
                    risk_penalty: -(shadow_neighbors(state, &dest) as f64 * 0.3),
                    domain_synergy: 0.0,
                },
            });
        }
    }
}

fn summon_candidates(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player: &PlayerState,
    budget: &Resources,
    out: &mut Vec<Candidate>,
) {
    if player.units.len() >= config.costs.unit_cap {
        return;
    }
    let Some(spawn) = player.owned_sorted().into_iter().find(|k| {
        state.tile(k).is_some_and(|t| !t.impassable) && !state.is_occupied(k)
    }) else {
        return;
    };
    let threatened = player
        .owned_tiles
        .iter()
        .filter(|k| shadow_neighbors(state, k) > 0)
        .count() as f64;

    for def in &content.units {
        if !def.summonable {
            continue;
        }
        if def.domain_requirement.is_some_and(|d| d != player.domain) {
            continue;
        }
        if !ledger::can_afford(budget, &def.summon_cost) {
            continue;
        }
        let defense = def.defense as f64 * 0.3 + if def.defender { threatened * 0.2 } else { 0.0 };
        out.push(Candidate {
            family: Family::Summon,
            action: ActionKind::Summon { kind: def.kind, tile: spawn },
            cost: def.summon_cost,
            terms: UtilityTerms {
                victory_delta: 0.0,
                economy_gain: -cost_penalty(&def.summon_cost),
                defense_gain: defense,
                risk_penalty: -(def.alignment_shift * 0.05),
                domain_synergy: if def.support { 0.5 } else { 0.0 },
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Domain, Owner};
    use crate::map::GameMap;
    use crate::state::{Controller, MatchSettings};
    use crate::ai::Personality;

    fn state() -> GameState {
        let players = vec![PlayerState::new(
            PlayerId(1),
            "Aster",
            Domain::Light,
            Controller::Ai(Personality::Balanced),
        )];
        let mut state = GameState::new(MatchSettings::default(), GameMap::new(5, 5), players);
        state.transfer_tile(TileKey::new(2, 2), Owner::Player(PlayerId(1))).unwrap();
        state
    }

    #[test]
    fn test_capture_candidates_are_frontier_and_affordable() {
        let content = ContentRegistry::standard();
        let config = GameConfig::default();
        let state = state();
        let budget = Resources::divinity(30);
        let captures: Vec<_> = generate_candidates(&state, &content, &config, PlayerId(1), &budget)
            .into_iter()
            .filter(|c| c.family == Family::Capture)
            .collect();
        assert_eq!(captures.len(), 4);
        assert!(captures.iter().all(|c| matches!(c.action, ActionKind::Capture { tile } if tile.is_adjacent(&TileKey::new(2, 2)))));

        let broke = generate_candidates(&state, &content, &config, PlayerId(1), &Resources::ZERO);
        assert!(broke.iter().all(|c| c.cost.is_zero()));
    }

    #[test]
    fn test_families_in_generation_order() {
        let content = ContentRegistry::standard();
        let config = GameConfig::default();
        let state = state();
        let budget = Resources { divinity: 30, faith: 20, ..Resources::ZERO };
        let families: Vec<Family> = generate_candidates(&state, &content, &config, PlayerId(1), &budget)
            .iter()
            .map(|c| c.family)
            .collect();
        let mut sorted = families.clone();
        sorted.sort();
        assert_eq!(families, sorted);
        assert!(families.contains(&Family::Summon));
    }

    #[test]
    fn test_elemental_avatar_requires_elements() {
        let content = ContentRegistry::standard();
        let config = GameConfig::default();
        let state = state();
        let budget = Resources { divinity: 30, faith: 20, ..Resources::ZERO };
        let summons_avatar = generate_candidates(&state, &content, &config, PlayerId(1), &budget)
            .iter()
            .any(|c| matches!(c.action, ActionKind::Summon { kind: crate::core::types::UnitKind::ElementalAvatar, .. }));
        assert!(!summons_avatar);
    }
}
