//! Core type definitions used throughout the codebase

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Grid coordinate of a tile; the unique key of the tile map
///
/// Serializes as the string `"x,y"` so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
}

impl TileKey {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Orthogonal neighbors (may lie outside the map)
    pub fn neighbors(&self) -> [TileKey; 4] {
        [
            TileKey::new(self.x + 1, self.y),
            TileKey::new(self.x - 1, self.y),
            TileKey::new(self.x, self.y + 1),
            TileKey::new(self.x, self.y - 1),
        ]
    }

    pub fn manhattan(&self, other: &TileKey) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(&self, other: &TileKey) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for TileKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("tile key '{}' is not of the form x,y", s))?;
        let x = x.trim().parse().map_err(|e| format!("bad x in '{}': {}", s, e))?;
        let y = y.trim().parse().map_err(|e| format!("bad y in '{}': {}", s, e))?;
        Ok(Self { x, y })
    }
}

impl Serialize for TileKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TileKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Player identifier (1-based, at most four players)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unit identifier, allocated sequentially per match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier for a running match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who controls a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Owner {
    #[default]
    Neutral,
    Player(PlayerId),
    Shadow,
}

impl Owner {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::Player(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, Self::Shadow)
    }
}

/// The four player currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Divinity,
    Faith,
    ShadowEnergy,
    Aegis,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Divinity => "divinity",
            Self::Faith => "faith",
            Self::ShadowEnergy => "shadow energy",
            Self::Aegis => "aegis",
        };
        f.write_str(name)
    }
}

/// A bundle of currency amounts (wallet contents, costs, caps)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub divinity: u32,
    #[serde(default)]
    pub faith: u32,
    #[serde(default)]
    pub shadow_energy: u32,
    #[serde(default)]
    pub aegis: u32,
}

impl Resources {
    pub const ZERO: Resources = Resources {
        divinity: 0,
        faith: 0,
        shadow_energy: 0,
        aegis: 0,
    };

    pub fn divinity(amount: u32) -> Self {
        Self { divinity: amount, ..Self::ZERO }
    }

    pub fn faith(amount: u32) -> Self {
        Self { faith: amount, ..Self::ZERO }
    }

    pub fn shadow_energy(amount: u32) -> Self {
        Self { shadow_energy: amount, ..Self::ZERO }
    }

    pub fn get(&self, currency: Currency) -> u32 {
        match currency {
            Currency::Divinity => self.divinity,
            Currency::Faith => self.faith,
            Currency::ShadowEnergy => self.shadow_energy,
            Currency::Aegis => self.aegis,
        }
    }

    pub fn get_mut(&mut self, currency: Currency) -> &mut u32 {
        match currency {
            Currency::Divinity => &mut self.divinity,
            Currency::Faith => &mut self.faith,
            Currency::ShadowEnergy => &mut self.shadow_energy,
            Currency::Aegis => &mut self.aegis,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Iterate non-zero entries in a fixed order
    pub fn entries(&self) -> impl Iterator<Item = (Currency, u32)> + '_ {
        ALL_CURRENCIES
            .iter()
            .map(|&c| (c, self.get(c)))
            .filter(|(_, amount)| *amount > 0)
    }
}

impl std::ops::Add for Resources {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            divinity: self.divinity + rhs.divinity,
            faith: self.faith + rhs.faith,
            shadow_energy: self.shadow_energy + rhs.shadow_energy,
            aegis: self.aegis + rhs.aegis,
        }
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("free");
        }
        let parts: Vec<String> = self
            .entries()
            .map(|(c, amount)| format!("{} {}", amount, c))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

pub const ALL_CURRENCIES: [Currency; 4] = [
    Currency::Divinity,
    Currency::Faith,
    Currency::ShadowEnergy,
    Currency::Aegis,
];

/// Thematic playstyle chosen by each player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Light,
    Order,
    Nature,
    War,
    Death,
    Wisdom,
    Elements,
    Trickery,
}

pub const ALL_DOMAINS: [Domain; 8] = [
    Domain::Light,
    Domain::Order,
    Domain::Nature,
    Domain::War,
    Domain::Death,
    Domain::Wisdom,
    Domain::Elements,
    Domain::Trickery,
];

/// Unit archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Explorer,
    Warden,
    Cultivator,
    Herald,
    Guardian,
    ElementalAvatar,
    Shadowborn,
    Wight,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_key_manhattan() {
        let a = TileKey::new(0, 0);
        let b = TileKey::new(2, -3);
        assert_eq!(a.manhattan(&b), 5);
        assert!(a.is_adjacent(&TileKey::new(0, 1)));
        assert!(!a.is_adjacent(&TileKey::new(1, 1)));
    }

    #[test]
    fn test_tile_key_string_form() {
        let key = TileKey::new(4, 11);
        assert_eq!(key.to_string(), "4,11");
        assert_eq!("4,11".parse::<TileKey>().unwrap(), key);
        assert!("4;11".parse::<TileKey>().is_err());
    }

    #[test]
    fn test_tile_key_as_json_map_key() {
        let mut map = std::collections::HashMap::new();
        map.insert(TileKey::new(1, 2), 3);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1,2":3}"#);
        let back: std::collections::HashMap<TileKey, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&TileKey::new(1, 2)), Some(&3));
    }

    #[test]
    fn test_resources_display() {
        let cost = Resources { divinity: 4, faith: 1, ..Resources::ZERO };
        assert_eq!(cost.to_string(), "4 divinity, 1 faith");
        assert_eq!(Resources::ZERO.to_string(), "free");
    }

    #[test]
    fn test_owner_player_accessor() {
        assert_eq!(Owner::Player(PlayerId(2)).player(), Some(PlayerId(2)));
        assert_eq!(Owner::Shadow.player(), None);
        assert!(Owner::Shadow.is_shadow());
    }
}
