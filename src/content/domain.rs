//! Domain definitions

use serde::{Deserialize, Serialize};

use super::effect::{Effect, TriggeredEffect};
use super::MiracleId;
use crate::core::types::{Currency, Domain, Resources, UnitKind};
use crate::map::TerrainKind;

/// Passive and active traits of one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDef {
    pub domain: Domain,
    pub name: String,
    /// Capture-cost adjustment on `cheap_terrain` tiles
    #[serde(default)]
    pub terrain_capture_modifier: f64,
    #[serde(default)]
    pub cheap_terrain: Vec<TerrainKind>,
    /// Capture-cost adjustment on every tile
    #[serde(default)]
    pub flat_capture_modifier: f64,
    /// Effects rolled after each successful capture
    #[serde(default)]
    pub capture_effects: Vec<TriggeredEffect>,
    /// Extra income every turn
    #[serde(default)]
    pub income_bonus: Resources,
    #[serde(default)]
    pub perception_bonus: u32,
    #[serde(default)]
    pub attack_bonus: u32,
    /// Terrain the AI treats as synergistic
    #[serde(default)]
    pub affinity_terrain: Vec<TerrainKind>,
    #[serde(default)]
    pub starting_miracles: Vec<MiracleId>,
}

impl DomainDef {
    fn base(domain: Domain, name: &str) -> Self {
        Self {
            domain,
            name: name.to_string(),
            terrain_capture_modifier: 0.0,
            cheap_terrain: Vec::new(),
            flat_capture_modifier: 0.0,
            capture_effects: Vec::new(),
            income_bonus: Resources::ZERO,
            perception_bonus: 0,
            attack_bonus: 0,
            affinity_terrain: Vec::new(),
            starting_miracles: Vec::new(),
        }
    }

    /// Domain term of the capture cost formula for a tile of `terrain`
    pub fn capture_modifier(&self, terrain: TerrainKind) -> f64 {
        let terrain_term = if self.cheap_terrain.contains(&terrain) {
            self.terrain_capture_modifier
        } else {
            0.0
        };
        terrain_term + self.flat_capture_modifier
    }
}

fn miracles(ids: &[&str]) -> Vec<MiracleId> {
    ids.iter().map(|id| MiracleId::new(id)).collect()
}

/// The eight standard domains
pub fn standard_domains() -> Vec<DomainDef> {
    let light = DomainDef {
        capture_effects: vec![TriggeredEffect::always(Effect::Grant { currency: Currency::Faith, amount: 1 })],
        income_bonus: Resources::faith(1),
        affinity_terrain: vec![TerrainKind::Plains, TerrainKind::Grove],
        starting_miracles: miracles(&["dawn_blessing", "purging_light"]),
        ..DomainDef::base(Domain::Light, "Light")
    };
    let order = DomainDef {
        capture_effects: vec![TriggeredEffect::always(Effect::Stability { delta: 1, radius: 0, own_only: true })],
        affinity_terrain: vec![TerrainKind::Plains, TerrainKind::Hills],
        starting_miracles: miracles(&["bulwark"]),
        ..DomainDef::base(Domain::Order, "Order")
    };
    let nature = DomainDef {
        terrain_capture_modifier: -1.0,
        cheap_terrain: vec![TerrainKind::Forest, TerrainKind::Swamp, TerrainKind::Grove],
        capture_effects: vec![TriggeredEffect::always(Effect::Corruption { delta: -1, radius: 0 })],
        income_bonus: Resources::divinity(1),
        affinity_terrain: vec![TerrainKind::Forest, TerrainKind::Grove, TerrainKind::Swamp],
        starting_miracles: miracles(&["verdant_growth"]),
        ..DomainDef::base(Domain::Nature, "Nature")
    };
    let war = DomainDef {
        capture_effects: vec![TriggeredEffect::always(Effect::Grant { currency: Currency::Aegis, amount: 1 })],
        attack_bonus: 1,
        affinity_terrain: vec![TerrainKind::Hills, TerrainKind::Desert],
        starting_miracles: miracles(&["war_cry"]),
        ..DomainDef::base(Domain::War, "War")
    };
    let death = DomainDef {
        capture_effects: vec![TriggeredEffect::always(Effect::Spawn { kind: UnitKind::Wight })],
        affinity_terrain: vec![TerrainKind::Swamp, TerrainKind::Desert],
        starting_miracles: miracles(&["raise_dead"]),
        ..DomainDef::base(Domain::Death, "Death")
    };
    let wisdom = DomainDef {
        capture_effects: vec![TriggeredEffect::with_chance(
            0.15,
            Effect::Grant { currency: Currency::Faith, amount: 3 },
        )],
        perception_bonus: 1,
        affinity_terrain: vec![TerrainKind::Grove, TerrainKind::Hills],
        starting_miracles: miracles(&["farsight"]),
        ..DomainDef::base(Domain::Wisdom, "Wisdom")
    };
    let elements = DomainDef {
        capture_effects: vec![TriggeredEffect::with_chance(
            0.3,
            Effect::Grant { currency: Currency::Divinity, amount: 1 },
        )],
        affinity_terrain: vec![TerrainKind::Coast, TerrainKind::Hills, TerrainKind::Desert],
        starting_miracles: miracles(&["earthshaping"]),
        ..DomainDef::base(Domain::Elements, "Elements")
    };
    let trickery = DomainDef {
        flat_capture_modifier: -0.5,
        capture_effects: vec![TriggeredEffect::always(Effect::Grant {
            currency: Currency::ShadowEnergy,
            amount: 1,
        })],
        income_bonus: Resources::shadow_energy(1),
        affinity_terrain: vec![TerrainKind::Swamp, TerrainKind::Forest],
        starting_miracles: miracles(&["veil_step"]),
        ..DomainDef::base(Domain::Trickery, "Trickery")
    };
    vec![light, order, nature, war, death, wisdom, elements, trickery]
}
