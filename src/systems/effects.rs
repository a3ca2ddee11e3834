//! Effect application
//!
//! Abilities, miracles and domain capture bonuses all funnel through
//! `apply_effect`. Callers run `validate_effects` before paying any cost so a
//! rejected target never leaves the state half-changed.

use crate::content::{ContentRegistry, Effect};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Owner, PlayerId, TileKey, UnitId};
use crate::state::GameState;
use crate::systems::{corruption, ledger, visibility};

/// Who applies an effect and where
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectContext {
    pub player: PlayerId,
    pub target: Option<TileKey>,
    pub unit: Option<UnitId>,
}

impl EffectContext {
    pub fn new(player: PlayerId, target: Option<TileKey>, unit: Option<UnitId>) -> Self {
        Self { player, target, unit }
    }

    pub fn at(player: PlayerId, target: TileKey) -> Self {
        Self::new(player, Some(target), None)
    }

    fn require_target(&self) -> Result<TileKey> {
        self.target
            .ok_or_else(|| GameError::InvalidAction("effect needs a target tile".into()))
    }

    fn require_unit(&self) -> Result<UnitId> {
        self.unit
            .ok_or_else(|| GameError::InvalidAction("effect needs a target unit".into()))
    }
}

/// Check that every effect can apply at `ctx` without changing anything
pub fn validate_effects(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    ctx: &EffectContext,
    effects: &[Effect],
) -> Result<()> {
    for effect in effects {
        if effect.needs_tile() {
            let key = ctx.require_target()?;
            state.target_tile(&key)?;
        }
        match effect {
            Effect::Spawn { kind } => {
                let key = ctx.require_target()?;
                let tile = state.target_tile(&key)?;
                if tile.impassable || state.is_occupied(&key) {
                    return Err(GameError::IllegalTarget(format!("cannot place a {} on {}", kind, key)));
                }
                if content.unit(*kind).is_none() {
                    return Err(GameError::InvalidAction(format!("unknown unit kind {}", kind)));
                }
                let player = state.require_player(ctx.player)?;
                if player.units.len() >= config.costs.unit_cap {
                    return Err(GameError::InvalidAction(format!("{} is at the unit cap", ctx.player)));
                }
            }
            Effect::Teleport => {
                let id = ctx.require_unit()?;
                let key = ctx.require_target()?;
                let unit = state
                    .unit(id)
                    .ok_or_else(|| GameError::IllegalTarget(format!("unit {} does not exist", id)))?;
                if unit.owner != ctx.player {
                    return Err(GameError::IllegalTarget(format!("unit {} is not yours", id)));
                }
                if state.target_tile(&key)?.impassable || state.is_occupied(&key) {
                    return Err(GameError::IllegalTarget(format!("cannot teleport onto {}", key)));
                }
            }
            Effect::TerrainChange { terrain } => {
                let key = ctx.require_target()?;
                if terrain.is_impassable() && state.is_occupied(&key) {
                    return Err(GameError::IllegalTarget(format!("a unit stands on {}", key)));
                }
            }
            Effect::Grant { .. }
            | Effect::Stability { .. }
            | Effect::Corruption { .. }
            | Effect::Reveal { .. }
            | Effect::Alignment { .. } => {}
        }
    }
    Ok(())
}

/// Apply one effect; assumes `validate_effects` passed
pub fn apply_effect(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    ctx: &EffectContext,
    effect: &Effect,
) -> Result<()> {
    match effect {
        Effect::Grant { currency, amount } => {
            let player = state.require_player_mut(ctx.player)?;
            ledger::grant(player, *currency, *amount, &config.economy.caps);
        }
        Effect::Stability { delta, radius, own_only } => {
            let center = ctx.require_target()?;
            for key in state.map.within(center, *radius) {
                if let Some(tile) = state.map.get_mut(&key) {
                    if !*own_only || tile.owner == Owner::Player(ctx.player) {
                        tile.adjust_stability(*delta);
                    }
                }
            }
        }
        Effect::Corruption { delta, radius } => {
            let center = ctx.require_target()?;
            for key in state.map.within(center, *radius) {
                let Some(tile) = state.tile(&key) else {
                    continue;
                };
                if tile.impassable {
                    continue;
                }
                let level = tile.corruption as i32 + delta;
                corruption::set_corruption_level(state, config, key, level)?;
            }
        }
        Effect::Spawn { kind } => {
            let key = ctx.require_target()?;
            let def = content
                .unit(*kind)
                .ok_or_else(|| GameError::InvalidAction(format!("unknown unit kind {}", kind)))?;
            let id = state.spawn_unit(ctx.player, def, key)?;
            tracing::debug!(unit = %id, %kind, tile = %key, "unit spawned by effect");
        }
        Effect::Teleport => {
            let id = ctx.require_unit()?;
            let key = ctx.require_target()?;
            if let Some(unit) = state.units.get_mut(&id) {
                unit.position = key;
            }
        }
        Effect::TerrainChange { terrain } => {
            let key = ctx.require_target()?;
            if let Some(tile) = state.map.get_mut(&key) {
                tile.set_terrain(*terrain);
            }
        }
        Effect::Reveal { radius } => {
            let key = ctx.require_target()?;
            visibility::reveal_area(state, ctx.player, key, *radius)?;
        }
        Effect::Alignment { delta } => {
            state.require_player_mut(ctx.player)?.adjust_alignment(*delta);
        }
    }
    Ok(())
}

pub fn apply_effects(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    ctx: &EffectContext,
    effects: &[Effect],
) -> Result<()> {
    for effect in effects {
        apply_effect(state, content, config, ctx, effect)?;
    }
    Ok(())
}
