//! Content registry
//!
//! Domains, units, abilities, relics, miracles and global events arrive as
//! already-parsed lookup tables. `ContentRegistry::standard()` provides the
//! built-in ruleset; external loaders can deserialize a replacement.

pub mod domain;
pub mod effect;
pub mod events;
pub mod relics;
pub mod units;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub use domain::DomainDef;
pub use effect::{Effect, EventModifier, RelicEffect, TriggeredEffect};
pub use events::GlobalEventDef;
pub use relics::{MiracleDef, Rarity, RelicDef};
pub use units::{AbilityDef, UnitKindDef};

use crate::core::error::{GameError, Result};
use crate::core::types::{Domain, UnitKind};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: &str) -> Self {
                Self(id.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(AbilityId);
string_id!(RelicId);
string_id!(MiracleId);

/// Lookup tables for all game content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRegistry {
    pub domains: Vec<DomainDef>,
    pub units: Vec<UnitKindDef>,
    pub abilities: Vec<AbilityDef>,
    pub relics: Vec<RelicDef>,
    pub miracles: Vec<MiracleDef>,
    pub events: Vec<GlobalEventDef>,
    #[serde(skip)]
    index: RegistryIndex,
}

#[derive(Debug, Clone, Default)]
struct RegistryIndex {
    domains: AHashMap<Domain, usize>,
    units: AHashMap<UnitKind, usize>,
    abilities: AHashMap<AbilityId, usize>,
    relics: AHashMap<RelicId, usize>,
    miracles: AHashMap<MiracleId, usize>,
}

impl ContentRegistry {
    pub fn new(
        domains: Vec<DomainDef>,
        units: Vec<UnitKindDef>,
        abilities: Vec<AbilityDef>,
        relics: Vec<RelicDef>,
        miracles: Vec<MiracleDef>,
        events: Vec<GlobalEventDef>,
    ) -> Result<Self> {
        let mut registry = Self {
            domains,
            units,
            abilities,
            relics,
            miracles,
            events,
            index: RegistryIndex::default(),
        };
        registry.rebuild_index()?;
        Ok(registry)
    }

    /// The built-in ruleset
    pub fn standard() -> Self {
        let mut registry = Self {
            domains: domain::standard_domains(),
            units: units::standard_units(),
            abilities: units::standard_abilities(),
            relics: relics::standard_relics(),
            miracles: relics::standard_miracles(),
            events: events::standard_events(),
            index: RegistryIndex::default(),
        };
        // Built-in tables are covered by tests; an error here is a programming mistake
        if let Err(e) = registry.rebuild_index() {
            tracing::error!("standard content is inconsistent: {}", e);
        }
        registry
    }

    /// Parse a registry from JSON produced by an external content pipeline
    pub fn from_json(json: &str) -> Result<Self> {
        let mut registry: ContentRegistry = serde_json::from_str(json)?;
        registry.rebuild_index()?;
        Ok(registry)
    }

    fn rebuild_index(&mut self) -> Result<()> {
        let mut index = RegistryIndex::default();
        for (i, d) in self.domains.iter().enumerate() {
            index.domains.insert(d.domain, i);
        }
        for (i, u) in self.units.iter().enumerate() {
            index.units.insert(u.kind, i);
        }
        for (i, a) in self.abilities.iter().enumerate() {
            index.abilities.insert(a.id.clone(), i);
        }
        for (i, r) in self.relics.iter().enumerate() {
            index.relics.insert(r.id.clone(), i);
        }
        for (i, m) in self.miracles.iter().enumerate() {
            index.miracles.insert(m.id.clone(), i);
        }

        for unit in &self.units {
            if let Some(missing) = unit.abilities.iter().find(|a| !index.abilities.contains_key(*a)) {
                return Err(GameError::Config(format!("unit {} references unknown ability {}", unit.kind, missing)));
            }
        }
        for domain in &self.domains {
            if let Some(missing) = domain.starting_miracles.iter().find(|m| !index.miracles.contains_key(*m)) {
                return Err(GameError::Config(format!("domain {} references unknown miracle {}", domain.name, missing)));
            }
        }

        self.index = index;
        Ok(())
    }

    pub fn domain(&self, domain: Domain) -> Option<&DomainDef> {
        self.index.domains.get(&domain).map(|&i| &self.domains[i])
    }

    pub fn unit(&self, kind: UnitKind) -> Option<&UnitKindDef> {
        self.index.units.get(&kind).map(|&i| &self.units[i])
    }

    pub fn ability(&self, id: &AbilityId) -> Option<&AbilityDef> {
        self.index.abilities.get(id).map(|&i| &self.abilities[i])
    }

    pub fn relic(&self, id: &RelicId) -> Option<&RelicDef> {
        self.index.relics.get(id).map(|&i| &self.relics[i])
    }

    pub fn miracle(&self, id: &MiracleId) -> Option<&MiracleDef> {
        self.index.miracles.get(id).map(|&i| &self.miracles[i])
    }

    pub fn event(&self, id: &str) -> Option<&GlobalEventDef> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Relic effects of every relic in `held`
    pub fn relic_effects<'a>(&'a self, held: &'a [RelicId]) -> impl Iterator<Item = &'a RelicEffect> + 'a {
        held.iter().filter_map(|id| self.relic(id)).flat_map(|r| r.effects.iter())
    }
}

impl Default for ContentRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_lookups() {
        let registry = ContentRegistry::standard();
        assert!(registry.domain(Domain::Death).is_some());
        assert_eq!(registry.unit(UnitKind::Explorer).unwrap().max_movement, 3);
        assert!(registry.ability(&AbilityId::new("scout")).is_some());
        assert!(registry.miracle(&MiracleId::new("veil_step")).is_some());
        assert!(registry.relic(&RelicId::new("seers_eye")).is_some());
        assert!(registry.event("eclipse").is_some());
    }

    #[test]
    fn test_registry_json_roundtrip_rebuilds_index() {
        let registry = ContentRegistry::standard();
        let json = serde_json::to_string(&registry).unwrap();
        let back = ContentRegistry::from_json(&json).unwrap();
        assert_eq!(back.unit(UnitKind::Guardian).unwrap().defense, 4);
    }

    #[test]
    fn test_unknown_ability_reference_rejected() {
        let mut units = units::standard_units();
        units[0].abilities.push(AbilityId::new("does_not_exist"));
        let result = ContentRegistry::new(
            domain::standard_domains(),
            units,
            units::standard_abilities(),
            relics::standard_relics(),
            relics::standard_miracles(),
            events::standard_events(),
        );
        assert!(matches!(result, Err(GameError::Config(_))));
    }
}
