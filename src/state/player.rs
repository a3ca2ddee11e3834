//! Per-player records

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::ai::Personality;
use crate::content::{MiracleId, RelicId};
use crate::core::config::VictoryKind;
use crate::core::types::{Domain, PlayerId, Resources, TileKey, UnitId};

/// Who issues a player's actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai(Personality),
}

/// Counters reset at every turn start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCounters {
    pub captures: u32,
    pub sanctifications: u32,
    pub actions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub domain: Domain,
    pub controller: Controller,
    pub wallet: Resources,
    pub owned_tiles: AHashSet<TileKey>,
    /// Always a subset of `owned_tiles`
    pub sanctified_tiles: AHashSet<TileKey>,
    pub units: Vec<UnitId>,
    pub relics: Vec<RelicId>,
    pub miracles: Vec<MiracleId>,
    /// Ruins captured this turn, resolved at the next turn start
    pub pending_ruins: Vec<TileKey>,
    /// Shadow alignment, 0 to 100
    pub alignment: f64,
    /// Percent progress toward each enabled victory condition
    pub victory_progress: AHashMap<VictoryKind, f64>,
    pub counters: TurnCounters,
    /// Tiles this player has ever seen
    pub revealed: AHashSet<TileKey>,
    /// Tiles in this player's current sight
    pub visible: AHashSet<TileKey>,
    pub total_captures: u32,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>, domain: Domain, controller: Controller) -> Self {
        Self {
            id,
            name: name.into(),
            domain,
            controller,
            wallet: Resources::ZERO,
            owned_tiles: AHashSet::new(),
            sanctified_tiles: AHashSet::new(),
            units: Vec::new(),
            relics: Vec::new(),
            miracles: Vec::new(),
            pending_ruins: Vec::new(),
            alignment: 0.0,
            victory_progress: AHashMap::new(),
            counters: TurnCounters::default(),
            revealed: AHashSet::new(),
            visible: AHashSet::new(),
            total_captures: 0,
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.controller, Controller::Ai(_))
    }

    pub fn personality(&self) -> Option<Personality> {
        match self.controller {
            Controller::Ai(p) => Some(p),
            Controller::Human => None,
        }
    }

    /// A player with neither territory nor units is skipped in rotation
    pub fn is_alive(&self) -> bool {
        !self.owned_tiles.is_empty() || !self.units.is_empty()
    }

    pub fn owns(&self, key: &TileKey) -> bool {
        self.owned_tiles.contains(key)
    }

    pub fn adjust_alignment(&mut self, delta: f64) {
        self.alignment = (self.alignment + delta).clamp(0.0, 100.0);
    }

    /// Whether `key` is owned or orthogonally next to an owned tile
    pub fn borders(&self, key: &TileKey) -> bool {
        self.owns(key) || key.neighbors().iter().any(|n| self.owns(n))
    }

    /// Owned tiles in a stable order
    pub fn owned_sorted(&self) -> Vec<TileKey> {
        let mut keys: Vec<TileKey> = self.owned_tiles.iter().copied().collect();
        keys.sort_by_key(|k| (k.y, k.x));
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_clamped() {
        let mut player = PlayerState::new(PlayerId(1), "Solenne", Domain::Light, Controller::Human);
        player.adjust_alignment(150.0);
        assert_eq!(player.alignment, 100.0);
        player.adjust_alignment(-500.0);
        assert_eq!(player.alignment, 0.0);
    }

    #[test]
    fn test_borders_includes_neighbors() {
        let mut player = PlayerState::new(PlayerId(1), "Solenne", Domain::Light, Controller::Human);
        player.owned_tiles.insert(TileKey::new(2, 2));
        assert!(player.borders(&TileKey::new(2, 3)));
        assert!(!player.borders(&TileKey::new(3, 3)));
        assert!(player.is_alive());
    }
}
