//! Player actions and their recorded results

use serde::{Deserialize, Serialize};

use crate::content::{AbilityId, MiracleId};
use crate::core::types::{PlayerId, Resources, TileKey, UnitId, UnitKind};

/// What an action does, with its targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Capture { tile: TileKey },
    Attack { unit: UnitId, target: UnitId },
    Move { unit: UnitId, to: TileKey },
    Fortify { tile: TileKey },
    Purify { tile: TileKey },
    BuildShrine { tile: TileKey },
    Sanctify { tile: TileKey },
    Summon { kind: UnitKind, tile: TileKey },
    UseAbility { unit: UnitId, ability: AbilityId, target: TileKey },
    CastMiracle {
        miracle: MiracleId,
        target: Option<TileKey>,
        unit: Option<UnitId>,
    },
    ShadowPact,
    EndTurn,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Capture { .. } => "capture",
            Self::Attack { .. } => "attack",
            Self::Move { .. } => "move",
            Self::Fortify { .. } => "fortify",
            Self::Purify { .. } => "purify",
            Self::BuildShrine { .. } => "build_shrine",
            Self::Sanctify { .. } => "sanctify",
            Self::Summon { .. } => "summon",
            Self::UseAbility { .. } => "use_ability",
            Self::CastMiracle { .. } => "cast_miracle",
            Self::ShadowPact => "shadow_pact",
            Self::EndTurn => "end_turn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

/// A submitted action; immutable once resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAction {
    pub player: PlayerId,
    pub kind: ActionKind,
    /// Round in which the action was resolved
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub cost_paid: Resources,
    #[serde(default)]
    pub result: Option<ActionResult>,
}

impl GameAction {
    pub fn new(player: PlayerId, kind: ActionKind) -> Self {
        Self {
            player,
            kind,
            turn: 0,
            cost_paid: Resources::ZERO,
            result: None,
        }
    }

    pub fn capture(player: PlayerId, tile: TileKey) -> Self {
        Self::new(player, ActionKind::Capture { tile })
    }

    pub fn end_turn(player: PlayerId) -> Self {
        Self::new(player, ActionKind::EndTurn)
    }

    pub fn succeeded(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.success)
    }

    pub fn message(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.message.as_str())
    }
}
