//! Match setup options

use serde::{Deserialize, Serialize};

use crate::core::config::{Aggression, Difficulty, Richness, VictoryCondition};
use crate::core::error::{GameError, Result};
use crate::core::types::Domain;
use crate::state::Controller;

pub const MIN_MAP_SIZE: i32 = 8;
pub const MAX_MAP_SIZE: i32 = 128;
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    pub domain: Domain,
    pub controller: Controller,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>, domain: Domain, controller: Controller) -> Self {
        Self {
            name: name.into(),
            domain,
            controller,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOptions {
    /// Map seed; the same seed always yields the same map
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    /// Turn order follows this list
    pub players: Vec<PlayerSetup>,
    pub difficulty: Difficulty,
    pub aggression: Aggression,
    pub richness: Richness,
    pub victory_conditions: Vec<VictoryCondition>,
    /// Seed for in-match rolls; entropy when absent
    pub gameplay_seed: Option<u64>,
    /// Leave AI turns to an outside driver instead of running them inline
    pub defer_ai_turns: bool,
}

impl GameOptions {
    pub fn new(seed: u64, players: Vec<PlayerSetup>) -> Self {
        Self {
            seed,
            width: 24,
            height: 18,
            players,
            difficulty: Difficulty::default(),
            aggression: Aggression::default(),
            richness: Richness::default(),
            victory_conditions: VictoryCondition::standard_set(),
            gameplay_seed: None,
            defer_ai_turns: false,
        }
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_gameplay_seed(mut self, seed: u64) -> Self {
        self.gameplay_seed = Some(seed);
        self
    }

    pub fn deferred(mut self) -> Self {
        self.defer_ai_turns = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.players.is_empty() || self.players.len() > MAX_PLAYERS {
            return Err(GameError::Config(format!(
                "a match needs 1 to {} players, got {}",
                MAX_PLAYERS,
                self.players.len()
            )));
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&value) {
                return Err(GameError::Config(format!(
                    "map {} must lie in [{}, {}], got {}",
                    name, MIN_MAP_SIZE, MAX_MAP_SIZE, value
                )));
            }
        }
        if self.victory_conditions.iter().any(|c| c.threshold < 0.0) {
            return Err(GameError::Config("victory thresholds must be non-negative".into()));
        }
        Ok(())
    }
}
