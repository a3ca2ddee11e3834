//! Adjacent unit combat
//!
//! No damage model: a clash removes exactly one unit unless the defender's
//! owner spends aegis to turn the blow aside.

use crate::content::ContentRegistry;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Owner, PlayerId, UnitId};
use crate::state::GameState;
use crate::systems::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Defender's owner paid aegis; nobody died
    Absorbed,
    DefenderDestroyed,
    AttackerDestroyed,
}

/// Attack strength including the attacker's domain bonus
pub fn attack_strength(state: &GameState, content: &ContentRegistry, unit: UnitId) -> u32 {
    let Some(unit) = state.unit(unit) else {
        return 0;
    };
    let base = content.unit(unit.kind).map_or(0, |d| d.attack);
    let bonus = state
        .player(unit.owner)
        .and_then(|p| content.domain(p.domain))
        .map_or(0, |d| d.attack_bonus);
    base + bonus
}

/// Defense including home-ground bonuses
pub fn defense_strength(state: &GameState, content: &ContentRegistry, unit: UnitId) -> u32 {
    let Some(unit) = state.unit(unit) else {
        return 0;
    };
    let mut defense = content.unit(unit.kind).map_or(0, |d| d.defense);
    if let Some(tile) = state.tile(&unit.position) {
        if tile.owner == Owner::Player(unit.owner) && tile.sanctified {
            defense += 1;
        }
        if tile.stability >= 7 {
            defense += 1;
        }
    }
    defense
}

pub fn resolve_attack(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player_id: PlayerId,
    attacker: UnitId,
    target: UnitId,
) -> Result<CombatOutcome> {
    let atk = state
        .unit(attacker)
        .ok_or_else(|| GameError::IllegalTarget(format!("unit {} does not exist", attacker)))?;
    if atk.owner != player_id {
        return Err(GameError::IllegalTarget(format!("unit {} is not yours", attacker)));
    }
    if atk.movement == 0 {
        return Err(GameError::InvalidAction(format!("unit {} has no movement left", attacker)));
    }
    let def = state
        .unit(target)
        .ok_or_else(|| GameError::IllegalTarget(format!("unit {} does not exist", target)))?;
    if def.owner == player_id {
        return Err(GameError::IllegalTarget(format!("unit {} is your own", target)));
    }
    if !atk.position.is_adjacent(&def.position) {
        return Err(GameError::IllegalTarget(format!(
            "unit {} at {} is not adjacent to {}",
            target, def.position, atk.position
        )));
    }
    let defender_owner = def.owner;

    ledger::spend(state.require_player_mut(player_id)?, &config.costs.attack)?;
    if let Some(unit) = state.units.get_mut(&attacker) {
        unit.movement = 0;
    }

    let block = config.costs.aegis_block;
    let defending_player = state.require_player_mut(defender_owner)?;
    if block > 0 && defending_player.wallet.aegis >= block {
        defending_player.wallet.aegis -= block;
        tracing::debug!(%attacker, %target, "attack absorbed by aegis");
        return Ok(CombatOutcome::Absorbed);
    }

    let outcome = if attack_strength(state, content, attacker) >= defense_strength(state, content, target) {
        state.remove_unit(target);
        CombatOutcome::DefenderDestroyed
    } else {
        state.remove_unit(attacker);
        CombatOutcome::AttackerDestroyed
    };
    tracing::debug!(%attacker, %target, ?outcome, "combat resolved");
    Ok(outcome)
}
