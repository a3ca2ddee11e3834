//! Closed effect vocabulary shared by abilities, miracles, relics, domains and events

use serde::{Deserialize, Serialize};

use crate::core::types::{Currency, UnitKind};
use crate::map::TerrainKind;

/// A single state change applied around a target tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Add currency to the acting player (capped)
    Grant { currency: Currency, amount: u32 },
    /// Shift stability of tiles within `radius` of the target
    Stability { delta: i32, radius: u32, own_only: bool },
    /// Shift corruption of tiles within `radius` of the target
    Corruption { delta: i32, radius: u32 },
    /// Create a unit for the acting player on the target tile
    Spawn { kind: UnitKind },
    /// Move the targeted unit to the target tile
    Teleport,
    /// Replace the target tile's terrain
    TerrainChange { terrain: TerrainKind },
    /// Mark tiles within `radius` of the target as visible
    Reveal { radius: u32 },
    /// Shift the acting player's Shadow alignment
    Alignment { delta: f64 },
}

impl Effect {
    /// Whether this effect needs a target tile to apply
    pub fn needs_tile(&self) -> bool {
        !matches!(self, Self::Grant { .. } | Self::Alignment { .. })
    }

    pub fn needs_unit(&self) -> bool {
        matches!(self, Self::Teleport)
    }
}

/// An effect that fires with some probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredEffect {
    pub chance: f64,
    pub effect: Effect,
}

impl TriggeredEffect {
    pub fn always(effect: Effect) -> Self {
        Self { chance: 1.0, effect }
    }

    pub fn with_chance(chance: f64, effect: Effect) -> Self {
        Self { chance, effect }
    }
}

/// Passive modifiers granted by holding a relic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelicEffect {
    /// Added to the capture cost sum (usually negative)
    CaptureCostDelta(f64),
    /// Added to every unit's perception
    PerceptionBonus(u32),
    /// Extra income at turn start
    Income { currency: Currency, amount: u32 },
    /// Granted when the holder ends a turn
    EndOfTurn { currency: Currency, amount: u32 },
}

/// Modifiers carried by an active global event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventModifier {
    /// Multiplies spread probability before clamping
    SpreadMultiplier(f64),
    /// Extra income for every player at turn start
    Income { currency: Currency, amount: u32 },
}
