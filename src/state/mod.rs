//! Match state: tiles, players, units and the action log

pub mod action;
pub mod game;
pub mod player;
pub mod unit;

pub use action::{ActionKind, ActionResult, GameAction};
pub use game::{ActiveEvent, Disposition, GameState, MatchSettings, Phase, Visibility, Winner};
pub use player::{Controller, PlayerState, TurnCounters};
pub use unit::Unit;
