//! Corruption spread automaton
//!
//! Runs once per round over the whole grid. Every corrupted or Shadow-owned
//! tile rolls once against each orthogonal neighbor; increments are gathered
//! during the scan and applied afterwards so a tile corrupted this pass does
//! not itself spread until the next round.

use ahash::AHashMap;
use rand::Rng;

use crate::content::{ContentRegistry, EventModifier};
use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{Domain, Owner, TileKey};
use crate::map::MAX_CORRUPTION;
use crate::state::GameState;

/// What one spread pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadReport {
    pub rolls: u32,
    pub increments: u32,
    pub conversions: Vec<TileKey>,
}

/// Product of the spread multipliers of all active events
pub fn event_spread_multiplier(state: &GameState, content: &ContentRegistry) -> f64 {
    state
        .active_events
        .iter()
        .filter_map(|active| content.event(&active.id))
        .flat_map(|event| event.modifiers.iter())
        .map(|modifier| match modifier {
            EventModifier::SpreadMultiplier(m) => *m,
            EventModifier::Income { .. } => 1.0,
        })
        .product()
}

/// Chance that one source raises the corruption of `candidate` this pass
pub fn spread_probability(state: &GameState, content: &ContentRegistry, config: &GameConfig, candidate: TileKey) -> f64 {
    let spread = &config.spread;
    let mut corrupted = 0u32;
    let mut sanctified = 0u32;
    for neighbor in state.map.neighbors(&candidate) {
        if let Some(tile) = state.tile(&neighbor) {
            if tile.is_corrupted() || tile.owner.is_shadow() {
                corrupted += 1;
            }
            if tile.sanctified {
                sanctified += 1;
            }
        }
    }

    let mut p = spread.base
        + spread.per_corrupted_neighbor * corrupted as f64
        + spread.per_sanctified_neighbor * sanctified as f64;

    let defender_adjacent = state
        .map
        .neighbors(&candidate)
        .chain(std::iter::once(candidate))
        .filter_map(|k| state.unit_at(&k))
        .any(|u| content.unit(u.kind).is_some_and(|def| def.defender));
    if defender_adjacent {
        p += spread.warden_adjacent_bonus;
    }

    let owner_domain = state
        .tile(&candidate)
        .and_then(|t| t.owner.player())
        .and_then(|id| state.player(id))
        .map(|p| p.domain);
    if owner_domain == Some(Domain::Order) {
        p += spread.order_owner_bonus;
    }

    p *= state.settings.aggression.spread_multiplier();
    p *= event_spread_multiplier(state, content);
    p.clamp(spread.min_probability, spread.max_probability)
}

/// Set a tile's corruption, converting ownership at the extremes
///
/// Reaching the maximum hands the tile to the Shadow (stability reset,
/// influence +1). A Shadow tile cleansed to zero reverts to Neutral.
/// Returns true when the tile was converted to Shadow.
pub fn set_corruption_level(state: &mut GameState, config: &GameConfig, key: TileKey, level: i32) -> Result<bool> {
    let Some(tile) = state.map.get_mut(&key) else {
        return Ok(false);
    };
    tile.set_corruption(level);
    let corruption = tile.corruption;
    let owner = tile.owner;

    if corruption >= MAX_CORRUPTION && !owner.is_shadow() {
        state.transfer_tile(key, Owner::Shadow)?;
        if let Some(tile) = state.map.get_mut(&key) {
            tile.stability = config.spread.converted_stability;
        }
        state.adjust_influence(1.0);
        tracing::debug!(tile = %key, "tile fell to the Shadow");
        return Ok(true);
    }
    if corruption == 0 && owner.is_shadow() {
        state.transfer_tile(key, Owner::Neutral)?;
        tracing::debug!(tile = %key, "tile released from the Shadow");
    }
    Ok(false)
}

/// One full spread pass over the grid
pub fn run_spread<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    rng: &mut R,
) -> Result<SpreadReport> {
    let mut report = SpreadReport::default();
    let mut increments: AHashMap<TileKey, i32> = AHashMap::new();

    let sources: Vec<TileKey> = state
        .map
        .keys_in_order()
        .filter(|k| state.tile(k).is_some_and(|t| t.is_corrupted() || t.owner.is_shadow()))
        .collect();

    for source in sources {
        let candidates: Vec<TileKey> = state.map.neighbors(&source).collect();
        for candidate in candidates {
            let Some(tile) = state.tile(&candidate) else {
                continue;
            };
            if tile.impassable || (tile.owner.is_shadow() && tile.corruption >= MAX_CORRUPTION) {
                continue;
            }
            let p = spread_probability(state, content, config, candidate);
            report.rolls += 1;
            if rng.gen_bool(p) {
                *increments.entry(candidate).or_insert(0) += 1;
            }
        }
    }

    let mut keys: Vec<TileKey> = increments.keys().copied().collect();
    keys.sort_by_key(|k| (k.y, k.x));
    for key in keys {
        let delta = increments[&key];
        let current = state.tile(&key).map_or(0, |t| t.corruption as i32);
        report.increments += delta as u32;
        if set_corruption_level(state, config, key, current + delta)? {
            report.conversions.push(key);
        }
    }

    tracing::debug!(
        rolls = report.rolls,
        increments = report.increments,
        conversions = report.conversions.len(),
        influence = state.shadow_influence,
        "corruption spread pass"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::map::GameMap;
    use crate::state::{Controller, MatchSettings, PlayerState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn certain_spread() -> GameConfig {
        let mut config = GameConfig::default();
        config.spread.min_probability = 1.0;
        config.spread.max_probability = 1.0;
        config
    }

    fn strip_state() -> GameState {
        let players = vec![PlayerState::new(PlayerId(1), "Aster", Domain::Light, Controller::Human)];
        GameState::new(MatchSettings::default(), GameMap::new(3, 1), players)
    }

    #[test]
    fn test_corruption_one_converts_in_single_pass() {
        let config = certain_spread();
        let content = ContentRegistry::standard();
        let mut state = strip_state();
        {
            let seed = state.map.get_mut(&TileKey::new(0, 0)).unwrap();
            seed.owner = Owner::Shadow;
            seed.corruption = 2;
        }
        state.map.get_mut(&TileKey::new(1, 0)).unwrap().corruption = 1;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let report = run_spread(&mut state, &content, &config, &mut rng).unwrap();
        let target = state.tile(&TileKey::new(1, 0)).unwrap();
        assert_eq!(target.corruption, 2);
        assert_eq!(target.owner, Owner::Shadow);
        assert_eq!(target.stability, config.spread.converted_stability);
        assert_eq!(report.conversions, vec![TileKey::new(1, 0)]);
        assert_eq!(state.shadow_influence, 1.0);
        // The far tile only got one roll from the corrupted middle tile
        assert_eq!(state.tile(&TileKey::new(2, 0)).unwrap().corruption, 1);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_conversion_removes_from_owner_sets() {
        let config = certain_spread();
        let content = ContentRegistry::standard();
        let mut state = strip_state();
        state.map.get_mut(&TileKey::new(0, 0)).unwrap().corruption = 1;
        state.transfer_tile(TileKey::new(1, 0), Owner::Player(PlayerId(1))).unwrap();
        state.map.get_mut(&TileKey::new(1, 0)).unwrap().corruption = 1;
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        run_spread(&mut state, &content, &config, &mut rng).unwrap();
        assert!(state.player(PlayerId(1)).unwrap().owned_tiles.is_empty());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_probability_resisted_by_sanctified_neighbors() {
        let config = GameConfig::default();
        let content = ContentRegistry::standard();
        let mut state = strip_state();
        let plain = spread_probability(&state, &content, &config, TileKey::new(1, 0));

        state.transfer_tile(TileKey::new(2, 0), Owner::Player(PlayerId(1))).unwrap();
        state.map.get_mut(&TileKey::new(2, 0)).unwrap().sanctify(Domain::Light);
        let resisted = spread_probability(&state, &content, &config, TileKey::new(1, 0));
        assert!(resisted < plain);
        assert!(resisted >= config.spread.min_probability);
    }

    #[test]
    fn test_probability_scaled_by_aggression() {
        let config = GameConfig::default();
        let content = ContentRegistry::standard();
        let mut state = strip_state();
        let normal = spread_probability(&state, &content, &config, TileKey::new(1, 0));
        state.settings.aggression = crate::core::config::Aggression::High;
        let high = spread_probability(&state, &content, &config, TileKey::new(1, 0));
        assert!((high - normal * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_cleansed_shadow_tile_reverts_to_neutral() {
        let config = GameConfig::default();
        let mut state = strip_state();
        {
            let tile = state.map.get_mut(&TileKey::new(0, 0)).unwrap();
            tile.owner = Owner::Shadow;
            tile.corruption = 1;
        }
        let converted = set_corruption_level(&mut state, &config, TileKey::new(0, 0), 0).unwrap();
        assert!(!converted);
        assert_eq!(state.tile(&TileKey::new(0, 0)).unwrap().owner, Owner::Neutral);
    }
}
