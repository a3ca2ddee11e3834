//! The match aggregate
//!
//! `GameState` is owned by the engine and handed to resolvers as `&mut` for
//! one call at a time. The unit table and each player's unit list, and the
//! tile owners and each player's owned set, are only changed through the
//! helpers here so the two sides never drift apart.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use super::action::GameAction;
use super::player::PlayerState;
use super::unit::Unit;
use crate::content::UnitKindDef;
use crate::core::config::{Aggression, Difficulty, Richness, VictoryCondition};
use crate::core::error::{GameError, Result};
use crate::core::types::{MatchId, Owner, PlayerId, TileKey, UnitId};
use crate::map::{GameMap, Tile, MAX_CORRUPTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Playing,
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(PlayerId),
    Shadow,
}

/// Attitude of unaligned villages, derived from Shadow influence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Disposition {
    Hostile,
    Neutral,
    #[default]
    Friendly,
}

impl Disposition {
    pub fn from_influence(influence: f64) -> Self {
        if influence > 60.0 {
            Self::Hostile
        } else if influence > 30.0 {
            Self::Neutral
        } else {
            Self::Friendly
        }
    }
}

/// Fog-of-war state of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Seen,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub id: String,
    /// Turn starts left before the event ends
    pub remaining: u32,
}

/// Settings fixed at initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSettings {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub difficulty: Difficulty,
    pub aggression: Aggression,
    pub richness: Richness,
    /// Evaluated in this order; the first one met wins
    pub victory_conditions: Vec<VictoryCondition>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 0,
            height: 0,
            difficulty: Difficulty::default(),
            aggression: Aggression::default(),
            richness: Richness::default(),
            victory_conditions: VictoryCondition::standard_set(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub match_id: MatchId,
    /// Round counter, starting at 1
    pub turn: u32,
    pub phase: Phase,
    pub winner: Option<Winner>,
    /// Index into `players`
    pub current_player: usize,
    pub map: GameMap,
    pub units: AHashMap<UnitId, Unit>,
    /// Table order is turn order and victory evaluation order
    pub players: Vec<PlayerState>,
    /// Global Shadow influence, 0 to 100
    pub shadow_influence: f64,
    pub disposition: Disposition,
    pub active_events: Vec<ActiveEvent>,
    pub settings: MatchSettings,
    /// Shared fog layer as last computed for the acting player
    pub visibility: AHashMap<TileKey, Visibility>,
    /// Every tile any player has revealed
    pub revealed: AHashSet<TileKey>,
    pub history: Vec<GameAction>,
    pub next_unit_id: u32,
}

impl GameState {
    pub fn new(settings: MatchSettings, map: GameMap, players: Vec<PlayerState>) -> Self {
        Self {
            match_id: MatchId::new(),
            turn: 1,
            phase: Phase::Setup,
            winner: None,
            current_player: 0,
            map,
            units: AHashMap::new(),
            players,
            shadow_influence: 0.0,
            disposition: Disposition::default(),
            active_events: Vec::new(),
            settings,
            visibility: AHashMap::new(),
            revealed: AHashSet::new(),
            history: Vec::new(),
            next_unit_id: 1,
        }
    }

    /// An empty placeholder used before initialization
    pub fn empty() -> Self {
        Self::new(MatchSettings::default(), GameMap::new(0, 0), Vec::new())
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Like `player_mut`, but a missing player is a consistency violation
    pub fn require_player_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState> {
        self.player_mut(id)
            .ok_or_else(|| GameError::Consistency(format!("player {} is not in the player table", id)))
    }

    pub fn require_player(&self, id: PlayerId) -> Result<&PlayerState> {
        self.player(id)
            .ok_or_else(|| GameError::Consistency(format!("player {} is not in the player table", id)))
    }

    pub fn current(&self) -> Option<&PlayerState> {
        self.players.get(self.current_player)
    }

    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.current().map(|p| p.id)
    }

    pub fn tile(&self, key: &TileKey) -> Option<&Tile> {
        self.map.get(key)
    }

    /// Tile lookup that reports a missing tile as an illegal target
    pub fn target_tile(&self, key: &TileKey) -> Result<&Tile> {
        self.map
            .get(key)
            .ok_or_else(|| GameError::IllegalTarget(format!("tile {} does not exist", key)))
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_at(&self, key: &TileKey) -> Option<&Unit> {
        self.units.values().find(|u| u.position == *key)
    }

    pub fn is_occupied(&self, key: &TileKey) -> bool {
        self.unit_at(key).is_some()
    }

    /// Units of `owner` in id order
    pub fn units_of(&self, owner: PlayerId) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.units.values().filter(|u| u.owner == owner).collect();
        units.sort_by_key(|u| u.id);
        units
    }

    /// Create a unit and register it with its owner
    pub fn spawn_unit(&mut self, owner: PlayerId, def: &UnitKindDef, position: TileKey) -> Result<UnitId> {
        let id = UnitId(self.next_unit_id);
        let player = self.require_player_mut(owner)?;
        player.units.push(id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::from_def(id, def, owner, position));
        Ok(id)
    }

    /// Remove a unit from the table and from its owner's list
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some(player) = self.player_mut(unit.owner) {
            player.units.retain(|u| *u != id);
        }
        Some(unit)
    }

    /// Hand a tile to `owner`, keeping owned and sanctified sets in sync
    ///
    /// Sanctification never survives a change of hands.
    pub fn transfer_tile(&mut self, key: TileKey, owner: Owner) -> Result<()> {
        if let Owner::Player(id) = owner {
            self.require_player(id)?;
        }
        let tile = self
            .map
            .get_mut(&key)
            .ok_or_else(|| GameError::Consistency(format!("transfer of missing tile {}", key)))?;
        let previous = tile.owner;
        tile.owner = owner;
        tile.clear_sanctification();

        if let Owner::Player(prev) = previous {
            let player = self.require_player_mut(prev)?;
            player.owned_tiles.remove(&key);
            player.sanctified_tiles.remove(&key);
        }
        if let Owner::Player(next) = owner {
            self.require_player_mut(next)?.owned_tiles.insert(key);
        }
        Ok(())
    }

    pub fn adjust_influence(&mut self, delta: f64) {
        self.shadow_influence = (self.shadow_influence + delta).clamp(0.0, 100.0);
        self.disposition = Disposition::from_influence(self.shadow_influence);
    }

    /// Fraction of passable tiles held by the Shadow
    pub fn shadow_share(&self) -> f64 {
        let passable = self.map.passable_count();
        if passable == 0 {
            return 0.0;
        }
        let shadow = self
            .map
            .tiles
            .values()
            .filter(|t| !t.impassable && t.owner.is_shadow())
            .count();
        shadow as f64 / passable as f64
    }

    /// Verify the cross-references between tiles, players and units
    pub fn check_invariants(&self) -> Result<()> {
        for (key, tile) in &self.map.tiles {
            if tile.corruption >= MAX_CORRUPTION && !tile.owner.is_shadow() {
                return Err(GameError::Consistency(format!(
                    "tile {} has corruption {} but owner {:?}",
                    key, tile.corruption, tile.owner
                )));
            }
            if let Owner::Player(id) = tile.owner {
                let player = self.require_player(id)?;
                if !player.owned_tiles.contains(key) {
                    return Err(GameError::Consistency(format!("tile {} owned by {} missing from its set", key, id)));
                }
            }
            if tile.sanctified && (tile.owner.player().is_none() || tile.attunement.is_none()) {
                return Err(GameError::Consistency(format!(
                    "tile {} is sanctified without a player owner and attunement",
                    key
                )));
            }
        }

        for player in &self.players {
            for key in &player.owned_tiles {
                let owner = self.map.get(key).map(|t| t.owner);
                if owner != Some(Owner::Player(player.id)) {
                    return Err(GameError::Consistency(format!(
                        "{} lists tile {} but its owner is {:?}",
                        player.id, key, owner
                    )));
                }
            }
            for key in &player.sanctified_tiles {
                if !player.owned_tiles.contains(key) || !self.map.get(key).is_some_and(|t| t.sanctified) {
                    return Err(GameError::Consistency(format!(
                        "{} lists sanctified tile {} it does not hold sanctified",
                        player.id, key
                    )));
                }
            }
            for id in &player.units {
                if self.units.get(id).map(|u| u.owner) != Some(player.id) {
                    return Err(GameError::Consistency(format!("{} lists unit {} it does not own", player.id, id)));
                }
            }
        }

        for unit in self.units.values() {
            let player = self.require_player(unit.owner)?;
            if !player.units.contains(&unit.id) {
                return Err(GameError::Consistency(format!("unit {} missing from {}'s list", unit.id, unit.owner)));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let state: GameState = serde_json::from_str(json)?;
        state.check_invariants()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::standard_units;
    use crate::core::types::{Domain, UnitKind};
    use crate::state::player::Controller;

    fn two_player_state() -> GameState {
        let players = vec![
            PlayerState::new(PlayerId(1), "Aster", Domain::Light, Controller::Human),
            PlayerState::new(PlayerId(2), "Brann", Domain::War, Controller::Human),
        ];
        GameState::new(MatchSettings::default(), GameMap::new(4, 4), players)
    }

    #[test]
    fn test_transfer_keeps_sets_in_sync() {
        let mut state = two_player_state();
        let key = TileKey::new(1, 1);
        state.transfer_tile(key, Owner::Player(PlayerId(1))).unwrap();
        state.map.get_mut(&key).unwrap().sanctify(Domain::Light);
        state.player_mut(PlayerId(1)).unwrap().sanctified_tiles.insert(key);
        assert!(state.check_invariants().is_ok());

        state.transfer_tile(key, Owner::Player(PlayerId(2))).unwrap();
        assert!(!state.player(PlayerId(1)).unwrap().owns(&key));
        assert!(state.player(PlayerId(1)).unwrap().sanctified_tiles.is_empty());
        assert!(state.player(PlayerId(2)).unwrap().owns(&key));
        assert!(!state.tile(&key).unwrap().sanctified);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_transfer_to_unknown_player_is_consistency_error() {
        let mut state = two_player_state();
        let result = state.transfer_tile(TileKey::new(0, 0), Owner::Player(PlayerId(9)));
        assert!(matches!(result, Err(GameError::Consistency(_))));
        assert_eq!(state.tile(&TileKey::new(0, 0)).unwrap().owner, Owner::Neutral);
    }

    #[test]
    fn test_spawn_and_remove_unit_sync() {
        let mut state = two_player_state();
        let def = standard_units().into_iter().find(|u| u.kind == UnitKind::Explorer).unwrap();
        let id = state.spawn_unit(PlayerId(2), &def, TileKey::new(3, 3)).unwrap();
        assert_eq!(state.player(PlayerId(2)).unwrap().units, vec![id]);
        assert!(state.is_occupied(&TileKey::new(3, 3)));
        assert!(state.check_invariants().is_ok());

        state.remove_unit(id);
        assert!(state.player(PlayerId(2)).unwrap().units.is_empty());
        assert!(state.units.is_empty());
    }

    #[test]
    fn test_invariant_catches_unlisted_owner() {
        let mut state = two_player_state();
        state.map.get_mut(&TileKey::new(0, 0)).unwrap().owner = Owner::Player(PlayerId(1));
        assert!(matches!(state.check_invariants(), Err(GameError::Consistency(_))));
    }

    #[test]
    fn test_disposition_thresholds() {
        assert_eq!(Disposition::from_influence(61.0), Disposition::Hostile);
        assert_eq!(Disposition::from_influence(60.0), Disposition::Neutral);
        assert_eq!(Disposition::from_influence(30.0), Disposition::Friendly);
    }
}
