//! AI personalities and utility weights, loadable from TOML
//!
//! Each personality boosts one or more candidate families. The weights of
//! the utility formula are shared defaults unless a profile overrides them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Personality {
    Aggressive,
    Defensive,
    Opportunist,
    #[default]
    Balanced,
}

impl Personality {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Defensive => "defensive",
            Self::Opportunist => "opportunist",
            Self::Balanced => "balanced",
        }
    }
}

/// Candidate families in generation order; ties go to the earlier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    Capture,
    Sanctify,
    Fortify,
    Explore,
    Summon,
}

/// Weights of the five utility terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityWeights {
    pub victory: f64,
    pub economy: f64,
    pub defense: f64,
    /// Applied to a non-positive risk term
    pub risk: f64,
    pub synergy: f64,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            victory: 1.0,
            economy: 0.8,
            defense: 0.7,
            risk: 0.6,
            synergy: 0.4,
        }
    }
}

/// Per-family multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyMultipliers {
    pub capture: f64,
    pub sanctify: f64,
    pub fortify: f64,
    pub explore: f64,
    pub summon: f64,
}

impl Default for FamilyMultipliers {
    fn default() -> Self {
        Self {
            capture: 1.0,
            sanctify: 1.0,
            fortify: 1.0,
            explore: 1.0,
            summon: 1.0,
        }
    }
}

impl FamilyMultipliers {
    pub fn get(&self, family: Family) -> f64 {
        match family {
            Family::Capture => self.capture,
            Family::Sanctify => self.sanctify,
            Family::Fortify => self.fortify,
            Family::Explore => self.explore,
            Family::Summon => self.summon,
        }
    }
}

/// Complete scoring profile of one AI player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AiProfile {
    /// Name of this profile (set from filename when loaded)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weights: UtilityWeights,
    #[serde(default)]
    pub multipliers: FamilyMultipliers,
}

impl AiProfile {
    /// Built-in profile for a personality
    pub fn for_personality(personality: Personality) -> Self {
        let multipliers = match personality {
            Personality::Aggressive => FamilyMultipliers {
                capture: 1.5,
                ..FamilyMultipliers::default()
            },
            Personality::Defensive => FamilyMultipliers {
                fortify: 1.4,
                sanctify: 1.3,
                ..FamilyMultipliers::default()
            },
            Personality::Opportunist => FamilyMultipliers {
                capture: 1.2,
                sanctify: 1.2,
                ..FamilyMultipliers::default()
            },
            Personality::Balanced => FamilyMultipliers::default(),
        };
        Self {
            name: personality.name().to_string(),
            weights: UtilityWeights::default(),
            multipliers,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Load a profile from a TOML file
pub fn load_profile(path: &Path) -> Result<AiProfile> {
    let contents = fs::read_to_string(path)?;
    let mut profile = AiProfile::from_toml_str(&contents)?;
    if profile.name.is_empty() {
        if let Some(stem) = path.file_stem() {
            profile.name = stem.to_string_lossy().into_owned();
        }
    }
    Ok(profile)
}

/// Load the named profile from `data/ai_personalities/{name}.toml`
pub fn load_named_profile(root: &Path, name: &str) -> Result<AiProfile> {
    let mut profile = load_profile(&profile_path(root, name))?;
    profile.name = name.to_string();
    Ok(profile)
}

fn profile_path(root: &Path, name: &str) -> PathBuf {
    root.join("data/ai_personalities").join(format!("{}.toml", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_root() -> &'static Path {
        Path::new(env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn test_builtin_multipliers() {
        let aggressive = AiProfile::for_personality(Personality::Aggressive);
        assert_eq!(aggressive.multipliers.get(Family::Capture), 1.5);
        assert_eq!(aggressive.multipliers.get(Family::Fortify), 1.0);

        let defensive = AiProfile::for_personality(Personality::Defensive);
        assert_eq!(defensive.multipliers.get(Family::Fortify), 1.4);
        assert_eq!(defensive.multipliers.get(Family::Sanctify), 1.3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let profile = AiProfile::from_toml_str(
            r#"
            [multipliers]
            summon = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(profile.multipliers.summon, 2.0);
        assert_eq!(profile.multipliers.capture, 1.0);
        assert_eq!(profile.weights, UtilityWeights::default());
    }

    #[test]
    fn test_shipped_profiles_match_builtins() {
        for personality in [
            Personality::Aggressive,
            Personality::Defensive,
            Personality::Opportunist,
            Personality::Balanced,
        ] {
            let loaded = load_named_profile(crate_root(), personality.name()).expect("Should load shipped profile");
            assert_eq!(loaded, AiProfile::for_personality(personality));
        }
    }
}
