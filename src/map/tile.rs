//! Tiles and terrain

use serde::{Deserialize, Serialize};

use crate::core::types::{Domain, Owner, TileKey};

pub const MAX_STABILITY: u8 = 10;
pub const MAX_CORRUPTION: u8 = 2;

/// Terrain kinds produced by the height/moisture classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainKind {
    #[default]
    Plains,
    Forest,
    Hills,
    Mountain,
    Water,
    Coast,
    Swamp,
    Desert,
    /// Sacred woodland; counts as a holy site
    Grove,
}

impl TerrainKind {
    /// Movement points spent to enter a tile
    pub fn movement_cost(&self) -> u32 {
        match self {
            Self::Plains | Self::Coast | Self::Desert => 1,
            Self::Forest | Self::Hills | Self::Grove => 2,
            Self::Swamp => 3,
            Self::Mountain | Self::Water => u32::MAX,
        }
    }

    pub fn is_impassable(&self) -> bool {
        matches!(self, Self::Mountain | Self::Water)
    }

    /// (divinity, faith) produced per turn by an owned tile
    pub fn base_yield(&self) -> (u32, u32) {
        match self {
            Self::Plains | Self::Coast => (1, 0),
            Self::Hills => (1, 0),
            Self::Forest => (0, 1),
            Self::Grove => (1, 1),
            Self::Swamp | Self::Desert => (0, 0),
            Self::Mountain | Self::Water => (0, 0),
        }
    }

    /// Starting stability for a freshly generated tile
    pub fn base_stability(&self) -> u8 {
        match self {
            Self::Plains | Self::Coast | Self::Desert => 2,
            Self::Forest | Self::Swamp => 3,
            Self::Hills | Self::Grove => 4,
            Self::Mountain | Self::Water => 5,
        }
    }

    /// Perception modifier for a unit standing here
    pub fn perception_modifier(&self) -> i32 {
        match self {
            Self::Hills => 1,
            Self::Forest | Self::Swamp => -1,
            _ => 0,
        }
    }
}

/// Discrete map features placed by rejection sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileFeature {
    Village,
    SacredWell,
    AncientRuins,
}

impl TileFeature {
    /// Extra (divinity, faith) yield on top of terrain
    pub fn yield_bonus(&self) -> (u32, u32) {
        match self {
            Self::Village => (1, 0),
            Self::SacredWell => (0, 1),
            Self::AncientRuins => (0, 0),
        }
    }
}

/// A single grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub key: TileKey,
    pub terrain: TerrainKind,
    pub feature: Option<TileFeature>,
    pub owner: Owner,
    pub stability: u8,
    pub corruption: u8,
    pub sanctified: bool,
    pub attunement: Option<Domain>,
    pub has_shrine: bool,
    pub movement_cost: u32,
    pub impassable: bool,
    pub divinity_yield: u32,
    pub faith_yield: u32,
    /// One-shot feature event already fired
    pub event_triggered: bool,
}

impl Tile {
    pub fn new(key: TileKey, terrain: TerrainKind) -> Self {
        let (divinity_yield, faith_yield) = terrain.base_yield();
        Self {
            key,
            terrain,
            feature: None,
            owner: Owner::Neutral,
            stability: terrain.base_stability(),
            corruption: 0,
            sanctified: false,
            attunement: None,
            has_shrine: false,
            movement_cost: terrain.movement_cost(),
            impassable: terrain.is_impassable(),
            divinity_yield,
            faith_yield,
            event_triggered: false,
        }
    }

    pub fn with_feature(mut self, feature: TileFeature) -> Self {
        self.set_feature(feature);
        self
    }

    pub fn set_feature(&mut self, feature: TileFeature) {
        let (d, f) = feature.yield_bonus();
        self.divinity_yield += d;
        self.faith_yield += f;
        self.feature = Some(feature);
    }

    /// Replace terrain, keeping accumulated yield bonuses
    pub fn set_terrain(&mut self, terrain: TerrainKind) {
        let (old_d, old_f) = self.terrain.base_yield();
        let (new_d, new_f) = terrain.base_yield();
        self.divinity_yield = (self.divinity_yield.saturating_sub(old_d)) + new_d;
        self.faith_yield = (self.faith_yield.saturating_sub(old_f)) + new_f;
        self.terrain = terrain;
        self.movement_cost = terrain.movement_cost();
        self.impassable = terrain.is_impassable();
    }

    pub fn adjust_stability(&mut self, delta: i32) {
        let value = (self.stability as i32 + delta).clamp(0, MAX_STABILITY as i32);
        self.stability = value as u8;
    }

    pub fn set_corruption(&mut self, level: i32) {
        self.corruption = level.clamp(0, MAX_CORRUPTION as i32) as u8;
    }

    pub fn sanctify(&mut self, domain: Domain) {
        self.sanctified = true;
        self.attunement = Some(domain);
        self.divinity_yield += 1;
    }

    /// Drop sanctification and its yield bonus; no-op when not sanctified
    pub fn clear_sanctification(&mut self) {
        if self.sanctified {
            self.sanctified = false;
            self.attunement = None;
            self.divinity_yield = self.divinity_yield.saturating_sub(1);
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.corruption > 0
    }

    pub fn is_holy_site(&self) -> bool {
        self.terrain == TerrainKind::Grove
            || matches!(self.feature, Some(TileFeature::SacredWell | TileFeature::AncientRuins))
    }
}
