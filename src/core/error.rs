use thiserror::Error;

use crate::core::types::Currency;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Illegal target: {0}")]
    IllegalTarget(String),

    #[error("Insufficient {currency}: need {needed}, have {available} (short {})", .needed - .available)]
    InsufficientResource {
        currency: Currency,
        needed: u32,
        available: u32,
    },

    #[error("Consistency violation: {0}")]
    Consistency(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl GameError {
    /// Amount missing for an `InsufficientResource` failure, zero otherwise
    pub fn shortfall(&self) -> u32 {
        match self {
            Self::InsufficientResource { needed, available, .. } => needed.saturating_sub(*available),
            _ => 0,
        }
    }

    /// Action failures are recovered locally; everything else is a bug or an environment problem
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidAction(_) | Self::IllegalTarget(_) | Self::InsufficientResource { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
