//! Units on the map

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::content::{AbilityId, UnitKindDef};
use crate::core::types::{PlayerId, TileKey, UnitId, UnitKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub position: TileKey,
    pub movement: u32,
    pub max_movement: u32,
    pub perception: u32,
    /// Turns remaining before each ability is usable again
    #[serde(default)]
    pub cooldowns: AHashMap<AbilityId, u32>,
    /// Owner turn starts survived
    pub age: u32,
    pub ephemeral: bool,
}

impl Unit {
    pub fn from_def(id: UnitId, def: &UnitKindDef, owner: PlayerId, position: TileKey) -> Self {
        Self {
            id,
            kind: def.kind,
            owner,
            position,
            movement: def.max_movement,
            max_movement: def.max_movement,
            perception: def.perception,
            cooldowns: AHashMap::new(),
            age: 0,
            ephemeral: def.ephemeral,
        }
    }

    /// Per-turn upkeep run once at the owner's turn start
    ///
    /// Restores movement, counts cooldowns down and ages the unit.
    /// Returns false when an ephemeral unit has expired.
    pub fn tick(&mut self) -> bool {
        self.movement = self.max_movement;
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
        self.age += 1;
        !(self.ephemeral && self.age >= 1)
    }

    pub fn ability_ready(&self, ability: &AbilityId) -> bool {
        self.cooldowns.get(ability).map_or(true, |&turns| turns == 0)
    }

    pub fn start_cooldown(&mut self, ability: &AbilityId, turns: u32) {
        if turns > 0 {
            self.cooldowns.insert(ability.clone(), turns);
        }
    }
}
