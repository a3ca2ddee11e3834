//! Unit kinds and their abilities

use serde::{Deserialize, Serialize};

use super::effect::Effect;
use super::AbilityId;
use crate::core::types::{Currency, Domain, Resources, UnitKind};
use crate::map::TerrainKind;

/// Static stats of a unit kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitKindDef {
    pub kind: UnitKind,
    pub max_movement: u32,
    pub perception: u32,
    pub attack: u32,
    pub defense: u32,
    pub summon_cost: Resources,
    pub summonable: bool,
    /// Only players of this domain may summon the kind
    #[serde(default)]
    pub domain_requirement: Option<Domain>,
    /// Lowers capture cost of adjacent tiles
    #[serde(default)]
    pub support: bool,
    /// Resists corruption spread next to it
    #[serde(default)]
    pub defender: bool,
    /// Removed after one full turn of existence
    #[serde(default)]
    pub ephemeral: bool,
    /// Shadow alignment gained by the summoner
    #[serde(default)]
    pub alignment_shift: f64,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

/// An activated unit ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: String,
    pub cost: Resources,
    /// Turns before the ability can be used again
    pub cooldown: u32,
    /// Maximum Manhattan distance from the unit to the target tile
    pub range: u32,
    pub effects: Vec<Effect>,
}

struct Stats {
    movement: u32,
    perception: u32,
    attack: u32,
    defense: u32,
}

fn unit(kind: UnitKind, stats: Stats, summon_cost: Resources, abilities: &[&str]) -> UnitKindDef {
    UnitKindDef {
        kind,
        max_movement: stats.movement,
        perception: stats.perception,
        attack: stats.attack,
        defense: stats.defense,
        summon_cost,
        summonable: true,
        domain_requirement: None,
        support: false,
        defender: false,
        ephemeral: false,
        alignment_shift: 0.0,
        abilities: abilities.iter().map(|a| AbilityId::new(a)).collect(),
    }
}

/// The eight standard unit kinds
pub fn standard_units() -> Vec<UnitKindDef> {
    let explorer = unit(
        UnitKind::Explorer,
        Stats { movement: 3, perception: 3, attack: 1, defense: 1 },
        Resources::divinity(3),
        &["scout"],
    );
    let warden = UnitKindDef {
        support: true,
        defender: true,
        ..unit(
            UnitKind::Warden,
            Stats { movement: 2, perception: 2, attack: 2, defense: 3 },
            Resources { divinity: 4, faith: 1, ..Resources::ZERO },
            &["ward"],
        )
    };
    let cultivator = UnitKindDef {
        support: true,
        ..unit(
            UnitKind::Cultivator,
            Stats { movement: 2, perception: 2, attack: 0, defense: 1 },
            Resources { divinity: 3, faith: 1, ..Resources::ZERO },
            &["bless"],
        )
    };
    let herald = UnitKindDef {
        support: true,
        ..unit(
            UnitKind::Herald,
            Stats { movement: 3, perception: 3, attack: 1, defense: 1 },
            Resources::faith(3),
            &["rally"],
        )
    };
    let guardian = UnitKindDef {
        defender: true,
        ..unit(
            UnitKind::Guardian,
            Stats { movement: 1, perception: 2, attack: 3, defense: 4 },
            Resources::divinity(6),
            &["entrench"],
        )
    };
    let avatar = UnitKindDef {
        domain_requirement: Some(Domain::Elements),
        ..unit(
            UnitKind::ElementalAvatar,
            Stats { movement: 2, perception: 2, attack: 4, defense: 3 },
            Resources { divinity: 5, faith: 3, ..Resources::ZERO },
            &["reshape"],
        )
    };
    let shadowborn = UnitKindDef {
        alignment_shift: 5.0,
        ..unit(
            UnitKind::Shadowborn,
            Stats { movement: 3, perception: 2, attack: 3, defense: 2 },
            Resources::shadow_energy(4),
            &["blight"],
        )
    };
    let wight = UnitKindDef {
        summonable: false,
        ephemeral: true,
        ..unit(
            UnitKind::Wight,
            Stats { movement: 2, perception: 1, attack: 2, defense: 1 },
            Resources::ZERO,
            &[],
        )
    };
    vec![explorer, warden, cultivator, herald, guardian, avatar, shadowborn, wight]
}

fn ability(id: &str, name: &str, cost: Resources, cooldown: u32, range: u32, effects: Vec<Effect>) -> AbilityDef {
    AbilityDef {
        id: AbilityId::new(id),
        name: name.to_string(),
        cost,
        cooldown,
        range,
        effects,
    }
}

pub fn standard_abilities() -> Vec<AbilityDef> {
    vec![
        ability("scout", "Scout", Resources::ZERO, 3, 3, vec![Effect::Reveal { radius: 2 }]),
        ability(
            "ward",
            "Ward",
            Resources::divinity(1),
            2,
            1,
            vec![Effect::Corruption { delta: -1, radius: 0 }],
        ),
        ability(
            "bless",
            "Bless",
            Resources::faith(1),
            2,
            1,
            vec![Effect::Stability { delta: 1, radius: 1, own_only: true }],
        ),
        ability(
            "rally",
            "Rally",
            Resources::ZERO,
            3,
            0,
            vec![Effect::Grant { currency: Currency::Divinity, amount: 2 }],
        ),
        ability(
            "entrench",
            "Entrench",
            Resources::ZERO,
            3,
            0,
            vec![Effect::Stability { delta: 2, radius: 0, own_only: true }],
        ),
        ability(
            "reshape",
            "Reshape",
            Resources::divinity(2),
            4,
            1,
            vec![Effect::TerrainChange { terrain: TerrainKind::Plains }],
        ),
        ability(
            "blight",
            "Blight",
            Resources::shadow_energy(1),
            2,
            1,
            vec![Effect::Corruption { delta: 1, radius: 0 }, Effect::Alignment { delta: 5.0 }],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_wight_is_ephemeral() {
        let units = standard_units();
        let ephemeral: Vec<_> = units.iter().filter(|u| u.ephemeral).map(|u| u.kind).collect();
        assert_eq!(ephemeral, vec![UnitKind::Wight]);
    }

    #[test]
    fn test_every_unit_ability_is_defined() {
        let abilities = standard_abilities();
        for unit in standard_units() {
            for id in &unit.abilities {
                assert!(abilities.iter().any(|a| &a.id == id), "missing ability {:?}", id);
            }
        }
    }
}
