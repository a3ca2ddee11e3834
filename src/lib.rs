//! Sanctum - rules engine for a turn-based territory-control game
//!
//! Players seat on a procedurally generated grid, capture and sanctify
//! tiles, and hold back a corruption that spreads every round.

pub mod ai;
pub mod content;
pub mod core;
pub mod engine;
pub mod map;
pub mod session;
pub mod state;
pub mod systems;

pub use crate::content::ContentRegistry;
pub use crate::core::config::GameConfig;
pub use crate::core::error::{GameError, Result};
pub use crate::engine::{GameEngine, GameOptions, PlayerSetup, StateObserver};
pub use crate::session::MatchSession;
pub use crate::state::{ActionKind, GameAction, GameState, Phase};
