//! Relics and miracles

use serde::{Deserialize, Serialize};

use super::effect::{Effect, RelicEffect};
use super::{MiracleId, RelicId};
use crate::core::types::{Currency, Resources, UnitKind};
use crate::map::TerrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Mythic,
}

impl Rarity {
    /// Relative weight when ruins roll a relic
    pub fn weight(&self) -> u32 {
        match self {
            Self::Common => 6,
            Self::Rare => 3,
            Self::Mythic => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicDef {
    pub id: RelicId,
    pub name: String,
    pub rarity: Rarity,
    /// Counts toward Relic Ascension when mythic
    pub victory_eligible: bool,
    pub effects: Vec<RelicEffect>,
}

impl RelicDef {
    pub fn counts_for_ascension(&self) -> bool {
        self.rarity == Rarity::Mythic && self.victory_eligible
    }
}

/// A faith-powered spell available to a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiracleDef {
    pub id: MiracleId,
    pub name: String,
    pub cost: Resources,
    pub effects: Vec<Effect>,
}

fn relic(id: &str, name: &str, rarity: Rarity, victory_eligible: bool, effects: Vec<RelicEffect>) -> RelicDef {
    RelicDef {
        id: RelicId::new(id),
        name: name.to_string(),
        rarity,
        victory_eligible,
        effects,
    }
}

pub fn standard_relics() -> Vec<RelicDef> {
    vec![
        relic("pilgrims_chalice", "Pilgrim's Chalice", Rarity::Common, false, vec![
            RelicEffect::EndOfTurn { currency: Currency::Faith, amount: 1 },
        ]),
        relic("ironbound_tome", "Ironbound Tome", Rarity::Common, false, vec![
            RelicEffect::CaptureCostDelta(-0.5),
        ]),
        relic("seers_eye", "Seer's Eye", Rarity::Rare, false, vec![RelicEffect::PerceptionBonus(1)]),
        relic("aegis_shard", "Aegis Shard", Rarity::Rare, false, vec![
            RelicEffect::EndOfTurn { currency: Currency::Aegis, amount: 2 },
        ]),
        relic("crown_of_dawn", "Crown of Dawn", Rarity::Mythic, true, vec![
            RelicEffect::Income { currency: Currency::Divinity, amount: 1 },
        ]),
        relic("shard_of_eternity", "Shard of Eternity", Rarity::Mythic, true, vec![
            RelicEffect::CaptureCostDelta(-1.0),
        ]),
        relic("heart_of_the_world", "Heart of the World", Rarity::Mythic, true, vec![
            RelicEffect::Income { currency: Currency::Faith, amount: 1 },
        ]),
        relic("shadow_reliquary", "Shadow Reliquary", Rarity::Mythic, false, vec![
            RelicEffect::Income { currency: Currency::ShadowEnergy, amount: 2 },
        ]),
    ]
}

fn miracle(id: &str, name: &str, faith: u32, effects: Vec<Effect>) -> MiracleDef {
    MiracleDef {
        id: MiracleId::new(id),
        name: name.to_string(),
        cost: Resources::faith(faith),
        effects,
    }
}

pub fn standard_miracles() -> Vec<MiracleDef> {
    vec![
        miracle("dawn_blessing", "Dawn Blessing", 4, vec![Effect::Stability { delta: 2, radius: 1, own_only: true }]),
        miracle("purging_light", "Purging Light", 5, vec![Effect::Corruption { delta: -1, radius: 1 }]),
        miracle("bulwark", "Bulwark", 4, vec![Effect::Stability { delta: 3, radius: 0, own_only: true }]),
        miracle("verdant_growth", "Verdant Growth", 3, vec![Effect::TerrainChange { terrain: TerrainKind::Forest }]),
        miracle("war_cry", "War Cry", 3, vec![Effect::Grant { currency: Currency::Divinity, amount: 4 }]),
        miracle("raise_dead", "Raise Dead", 3, vec![Effect::Spawn { kind: UnitKind::Wight }]),
        miracle("farsight", "Farsight", 2, vec![Effect::Reveal { radius: 3 }]),
        miracle("earthshaping", "Earthshaping", 4, vec![Effect::TerrainChange { terrain: TerrainKind::Plains }]),
        miracle("veil_step", "Veil Step", 3, vec![Effect::Teleport]),
    ]
}
