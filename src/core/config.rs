//! Rules configuration with documented constants
//!
//! All tunable numbers are collected here. Every section has a `Default`
//! matching the standard ruleset; a TOML file may override any subset.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{GameError, Result};
use crate::core::types::Resources;

/// Match difficulty; AI players receive a flat divinity bonus per turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn ai_income_bonus(&self) -> u32 {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }
}

/// How aggressively the Shadow spreads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Aggression {
    Low,
    #[default]
    Normal,
    High,
}

impl Aggression {
    pub fn spread_multiplier(&self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Normal => 1.0,
            Self::High => 1.5,
        }
    }
}

/// Density of map features (villages, wells, ruins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Richness {
    Sparse,
    #[default]
    Normal,
    Abundant,
}

impl Richness {
    pub fn feature_multiplier(&self) -> f64 {
        match self {
            Self::Sparse => 0.5,
            Self::Normal => 1.0,
            Self::Abundant => 1.75,
        }
    }
}

/// Ways a player can win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VictoryKind {
    /// Owned tiles / revealed tiles
    Conquest,
    /// Sanctified holy sites
    Sanctifier,
    /// Shadow alignment meter
    ShadowAccord,
    /// Mythic, victory-eligible relics held
    RelicAscension,
}

/// An enabled victory condition and its threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VictoryCondition {
    pub kind: VictoryKind,
    pub threshold: f64,
}

impl VictoryCondition {
    pub fn new(kind: VictoryKind, threshold: f64) -> Self {
        Self { kind, threshold }
    }

    pub fn with_default_threshold(kind: VictoryKind) -> Self {
        let threshold = match kind {
            VictoryKind::Conquest => 0.75,
            VictoryKind::Sanctifier => 6.0,
            VictoryKind::ShadowAccord => 100.0,
            VictoryKind::RelicAscension => 3.0,
        };
        Self { kind, threshold }
    }

    /// All four conditions in their standard evaluation order
    pub fn standard_set() -> Vec<VictoryCondition> {
        [
            VictoryKind::Conquest,
            VictoryKind::Sanctifier,
            VictoryKind::ShadowAccord,
            VictoryKind::RelicAscension,
        ]
        .into_iter()
        .map(Self::with_default_threshold)
        .collect()
    }
}

/// Capture cost model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Base term of the cost formula before stability and modifiers
    pub base_cost: f64,
    /// Stability lost by a tile when it changes hands
    pub stability_loss: u8,
    /// Stability never drops below this through capture
    pub min_stability_after_capture: u8,
    /// Shadow alignment at or above which villages turn on the player
    pub village_alignment_threshold: f64,
    pub sacred_well_faith: u32,
    pub village_divinity: u32,
    pub village_faith_penalty: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            base_cost: 4.0,
            stability_loss: 1,
            min_stability_after_capture: 1,
            village_alignment_threshold: 50.0,
            sacred_well_faith: 3,
            village_divinity: 3,
            village_faith_penalty: 2,
        }
    }
}

/// Corruption spread automaton
///
/// Negative terms resist spread. The final probability is scaled by the
/// match aggression and any active event multipliers, then clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    pub base: f64,
    pub per_corrupted_neighbor: f64,
    pub per_sanctified_neighbor: f64,
    /// Added when a defender-type unit stands next to the candidate
    pub warden_adjacent_bonus: f64,
    /// Added when the candidate's owner follows the Order domain
    pub order_owner_bonus: f64,
    pub min_probability: f64,
    pub max_probability: f64,
    /// Stability a tile is reset to when the Shadow takes it
    pub converted_stability: u8,
    /// Shadow-energy trickle per corrupted owned tile at turn start
    pub shadow_energy_per_corrupted_tile: u32,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            base: 0.08,
            per_corrupted_neighbor: 0.04,
            per_sanctified_neighbor: -0.08,
            warden_adjacent_bonus: -0.12,
            order_owner_bonus: -0.05,
            min_probability: 0.01,
            max_probability: 0.6,
            converted_stability: 3,
            shadow_energy_per_corrupted_tile: 1,
        }
    }
}

/// Income and currency caps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub base_divinity_income: u32,
    pub base_faith_income: u32,
    /// Per-currency ceiling; grants never push a wallet above these
    pub caps: Resources,
    /// Wallet contents at match start
    pub starting: Resources,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_divinity_income: 3,
            base_faith_income: 1,
            caps: Resources {
                divinity: 30,
                faith: 20,
                shadow_energy: 20,
                aegis: 25,
            },
            starting: Resources {
                divinity: 0,
                faith: 2,
                shadow_energy: 0,
                aegis: 0,
            },
        }
    }
}

/// Prices and magnitudes of the local action handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    pub fortify: Resources,
    pub fortify_amount: u8,
    pub purify: Resources,
    pub build_shrine: Resources,
    pub sanctify: Resources,
    pub attack: Resources,
    pub shadow_pact: Resources,
    pub shadow_pact_alignment: f64,
    pub shadow_pact_influence: f64,
    /// Aegis spent by a defender to absorb an attack
    pub aegis_block: u32,
    /// Maximum units a single player may field
    pub unit_cap: usize,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            fortify: Resources::divinity(2),
            fortify_amount: 2,
            purify: Resources::divinity(3),
            build_shrine: Resources { divinity: 4, faith: 1, ..Resources::ZERO },
            sanctify: Resources::divinity(3),
            attack: Resources::divinity(1),
            shadow_pact: Resources::shadow_energy(5),
            shadow_pact_alignment: 10.0,
            shadow_pact_influence: 2.0,
            aegis_block: 5,
            unit_cap: 6,
        }
    }
}

/// Timed global events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance of a new event at each turn start
    pub chance_per_turn: f64,
    /// At most this many events run concurrently
    pub max_active: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            chance_per_turn: 0.08,
            max_active: 2,
        }
    }
}

/// AI loop limits and scoring knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Tiles below this stability are fortify candidates
    pub fortify_threshold: u8,
    /// Hard stop for one AI turn
    pub max_actions_per_turn: usize,
    /// Uniform noise added to each utility, in [-jitter, jitter]
    pub jitter: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            fortify_threshold: 5,
            max_actions_per_turn: 48,
            jitter: 0.05,
        }
    }
}

/// Complete rules configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub capture: CaptureConfig,
    pub spread: SpreadConfig,
    pub economy: EconomyConfig,
    pub costs: ActionCosts,
    pub events: EventConfig,
    pub ai: AiConfig,
    /// Shadow-owned share of passable tiles that ends the match in defeat
    pub shadow_defeat_share: f64,
    /// Rounds after which the match ends without a winner
    pub turn_limit: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            spread: SpreadConfig::default(),
            economy: EconomyConfig::default(),
            costs: ActionCosts::default(),
            events: EventConfig::default(),
            ai: AiConfig::default(),
            shadow_defeat_share: 0.6,
            turn_limit: Some(200),
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document on top of the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let spread = &self.spread;
        if spread.min_probability < 0.0 || spread.max_probability > 1.0 {
            return Err(GameError::Config(format!(
                "spread probability bounds must lie in [0,1], got [{}, {}]",
                spread.min_probability, spread.max_probability
            )));
        }
        if spread.min_probability > spread.max_probability {
            return Err(GameError::Config(format!(
                "min_probability ({}) exceeds max_probability ({})",
                spread.min_probability, spread.max_probability
            )));
        }
        if spread.converted_stability > 10 {
            return Err(GameError::Config("converted_stability must be <= 10".into()));
        }
        if self.capture.min_stability_after_capture > 10 {
            return Err(GameError::Config("min_stability_after_capture must be <= 10".into()));
        }
        if !(0.0..=1.0).contains(&self.shadow_defeat_share) {
            return Err(GameError::Config(format!(
                "shadow_defeat_share must lie in [0,1], got {}",
                self.shadow_defeat_share
            )));
        }
        if self.ai.max_actions_per_turn == 0 {
            return Err(GameError::Config("ai.max_actions_per_turn must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::new().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            turn_limit = 50

            [capture]
            base_cost = 5.0

            [spread]
            max_probability = 0.4
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.base_cost, 5.0);
        assert_eq!(config.capture.stability_loss, 1);
        assert_eq!(config.spread.max_probability, 0.4);
        assert_eq!(config.spread.base, SpreadConfig::default().base);
        assert_eq!(config.turn_limit, Some(50));
        assert_eq!(config.shadow_defeat_share, 0.6);
    }

    #[test]
    fn test_inverted_probability_bounds_rejected() {
        let mut config = GameConfig::new();
        config.spread.min_probability = 0.7;
        config.spread.max_probability = 0.2;
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn test_aggression_multipliers() {
        assert_eq!(Aggression::Low.spread_multiplier(), 0.5);
        assert_eq!(Aggression::High.spread_multiplier(), 1.5);
    }

    #[test]
    fn test_standard_victory_set_order() {
        let set = VictoryCondition::standard_set();
        assert_eq!(set[0].kind, VictoryKind::Conquest);
        assert_eq!(set[0].threshold, 0.75);
        assert_eq!(set[3].kind, VictoryKind::RelicAscension);
    }
}
