//! Fog of war
//!
//! Sight comes from owned tiles, units (Manhattan radius of their
//! perception) and sanctified tiles (self plus orthogonal neighbors).
//! Recomputing downgrades Visible to Seen before marking the new reach, so
//! a tile once seen never returns to Hidden.

use ahash::AHashSet;

use crate::content::{ContentRegistry, RelicEffect};
use crate::core::error::Result;
use crate::core::types::{PlayerId, TileKey};
use crate::state::{GameState, Unit, Visibility};

/// Effective sight radius of a unit, never below 1
pub fn unit_perception(state: &GameState, content: &ContentRegistry, unit: &Unit) -> u32 {
    let terrain = state
        .tile(&unit.position)
        .map_or(0, |t| t.terrain.perception_modifier());
    let mut bonus = 0i32;
    if let Some(player) = state.player(unit.owner) {
        if let Some(domain) = content.domain(player.domain) {
            bonus += domain.perception_bonus as i32;
        }
        for effect in content.relic_effects(&player.relics) {
            if let RelicEffect::PerceptionBonus(amount) = effect {
                bonus += *amount as i32;
            }
        }
    }
    (unit.perception as i32 + terrain + bonus).max(1) as u32
}

/// Every tile `player` currently sees
pub fn compute_reach(state: &GameState, content: &ContentRegistry, player_id: PlayerId) -> AHashSet<TileKey> {
    let mut reach = AHashSet::new();
    let Some(player) = state.player(player_id) else {
        return reach;
    };

    reach.extend(player.owned_tiles.iter().copied());

    for unit in state.units_of(player_id) {
        let radius = unit_perception(state, content, unit);
        reach.extend(state.map.within(unit.position, radius));
    }

    for key in &player.sanctified_tiles {
        reach.insert(*key);
        reach.extend(state.map.neighbors(key));
    }

    reach
}

/// Recompute sight for `player` and fold it into the fog layer and revealed sets
pub fn update_visibility(state: &mut GameState, content: &ContentRegistry, player_id: PlayerId) -> Result<usize> {
    let reach = compute_reach(state, content, player_id);

    for vis in state.visibility.values_mut() {
        if *vis == Visibility::Visible {
            *vis = Visibility::Seen;
        }
    }
    for key in &reach {
        state.visibility.insert(*key, Visibility::Visible);
    }
    state.revealed.extend(reach.iter().copied());

    let player = state.require_player_mut(player_id)?;
    let newly_revealed = reach.iter().filter(|k| !player.revealed.contains(*k)).count();
    player.revealed.extend(reach.iter().copied());
    player.visible = reach;
    Ok(newly_revealed)
}

/// Reveal a diamond of tiles for `player` outside the normal sight rules
pub fn reveal_area(state: &mut GameState, player_id: PlayerId, center: TileKey, radius: u32) -> Result<()> {
    let keys = state.map.within(center, radius);
    for key in &keys {
        state.visibility.insert(*key, Visibility::Visible);
    }
    state.revealed.extend(keys.iter().copied());
    let player = state.require_player_mut(player_id)?;
    player.revealed.extend(keys.iter().copied());
    player.visible.extend(keys);
    Ok(())
}

/// Fog state of `key` from the point of view of `player`
pub fn visibility_for(state: &GameState, player_id: PlayerId, key: &TileKey) -> Visibility {
    let Some(player) = state.player(player_id) else {
        return Visibility::Hidden;
    };
    if player.owns(key) || player.visible.contains(key) {
        Visibility::Visible
    } else if player.revealed.contains(key) {
        Visibility::Seen
    } else {
        Visibility::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::standard_units;
    use crate::core::types::{Domain, Owner, UnitKind};
    use crate::map::{GameMap, TerrainKind};
    use crate::state::{Controller, MatchSettings, PlayerState};

    fn state_with_explorer(domain: Domain, terrain: TerrainKind) -> (GameState, crate::core::types::UnitId) {
        let players = vec![PlayerState::new(PlayerId(1), "Aster", domain, Controller::Human)];
        let mut state = GameState::new(MatchSettings::default(), GameMap::new(12, 12), players);
        state.map.get_mut(&TileKey::new(5, 5)).unwrap().set_terrain(terrain);
        let def = standard_units().into_iter().find(|u| u.kind == UnitKind::Explorer).unwrap();
        let id = state.spawn_unit(PlayerId(1), &def, TileKey::new(5, 5)).unwrap();
        (state, id)
    }

    #[test]
    fn test_perception_terrain_and_domain() {
        let content = ContentRegistry::standard();
        let (state, id) = state_with_explorer(Domain::Light, TerrainKind::Hills);
        assert_eq!(unit_perception(&state, &content, state.unit(id).unwrap()), 4);

        let (state, id) = state_with_explorer(Domain::Wisdom, TerrainKind::Forest);
        assert_eq!(unit_perception(&state, &content, state.unit(id).unwrap()), 3);
    }

    #[test]
    fn test_moving_away_leaves_seen_not_hidden() {
        let content = ContentRegistry::standard();
        let (mut state, id) = state_with_explorer(Domain::Light, TerrainKind::Plains);
        update_visibility(&mut state, &content, PlayerId(1)).unwrap();
        assert_eq!(visibility_for(&state, PlayerId(1), &TileKey::new(2, 5)), Visibility::Visible);

        state.units.get_mut(&id).unwrap().position = TileKey::new(10, 10);
        update_visibility(&mut state, &content, PlayerId(1)).unwrap();
        assert_eq!(visibility_for(&state, PlayerId(1), &TileKey::new(2, 5)), Visibility::Seen);
        assert_eq!(state.visibility[&TileKey::new(2, 5)], Visibility::Seen);
        assert_eq!(visibility_for(&state, PlayerId(1), &TileKey::new(0, 0)), Visibility::Hidden);
    }

    #[test]
    fn test_sanctified_tile_reveals_neighbors() {
        let content = ContentRegistry::standard();
        let players = vec![PlayerState::new(PlayerId(1), "Aster", Domain::Light, Controller::Human)];
        let mut state = GameState::new(MatchSettings::default(), GameMap::new(6, 6), players);
        let key = TileKey::new(2, 2);
        state.transfer_tile(key, Owner::Player(PlayerId(1))).unwrap();
        state.map.get_mut(&key).unwrap().sanctify(Domain::Light);
        state.player_mut(PlayerId(1)).unwrap().sanctified_tiles.insert(key);

        let reach = compute_reach(&state, &content, PlayerId(1));
        assert_eq!(reach.len(), 5);
        assert!(reach.contains(&TileKey::new(2, 3)));
    }
}
