//! Action dispatch and the local handlers
//!
//! Each handler validates everything first, then pays, then mutates.

use std::sync::Arc;

use super::{GameEngine, Resolution};
use crate::content::{AbilityId, MiracleId};
use crate::core::error::{GameError, Result};
use crate::core::types::{Owner, PlayerId, Resources, TileKey, UnitId, UnitKind};
use crate::state::{ActionKind, GameAction, Unit};
use crate::systems::effects::{self, EffectContext};
use crate::systems::{capture, combat, corruption, ledger};

impl GameEngine {
    pub(super) fn dispatch(&mut self, action: &GameAction) -> Result<Resolution> {
        let player = action.player;
        match &action.kind {
            ActionKind::Capture { tile } => self.handle_capture(player, *tile),
            ActionKind::Attack { unit, target } => self.handle_attack(player, *unit, *target),
            ActionKind::Move { unit, to } => self.handle_move(player, *unit, *to),
            ActionKind::Fortify { tile } => self.handle_fortify(player, *tile),
            ActionKind::Purify { tile } => self.handle_purify(player, *tile),
            ActionKind::BuildShrine { tile } => self.handle_build_shrine(player, *tile),
            ActionKind::Sanctify { tile } => self.handle_sanctify(player, *tile),
            ActionKind::Summon { kind, tile } => self.handle_summon(player, *kind, *tile),
            ActionKind::UseAbility { unit, ability, target } => self.handle_ability(player, *unit, ability, *target),
            ActionKind::CastMiracle { miracle, target, unit } => self.handle_miracle(player, miracle, *target, *unit),
            ActionKind::ShadowPact => self.handle_shadow_pact(player),
            ActionKind::EndTurn => self.close_turn(player),
        }
    }

    fn handle_capture(&mut self, player: PlayerId, tile: TileKey) -> Result<Resolution> {
        let content = Arc::clone(&self.content);
        let outcome = capture::resolve_capture(&mut self.state, &content, &self.config, &mut self.rng, player, tile)?;
        let mut message = format!("captured {} for {} divinity", tile, outcome.cost);
        if let Some(event) = outcome.feature_event {
            message.push_str("; ");
            message.push_str(&event);
        }
        Ok(Resolution::new(message, Resources::divinity(outcome.cost)))
    }

    fn handle_attack(&mut self, player: PlayerId, unit: UnitId, target: UnitId) -> Result<Resolution> {
        let content = Arc::clone(&self.content);
        let outcome = combat::resolve_attack(&mut self.state, &content, &self.config, player, unit, target)?;
        let message = match outcome {
            combat::CombatOutcome::Absorbed => format!("attack on {} absorbed by aegis", target),
            combat::CombatOutcome::DefenderDestroyed => format!("{} destroyed {}", unit, target),
            combat::CombatOutcome::AttackerDestroyed => format!("{} fell attacking {}", unit, target),
        };
        Ok(Resolution::new(message, self.config.costs.attack))
    }

    fn owned_unit(&self, player: PlayerId, id: UnitId) -> Result<&Unit> {
        let unit = self
            .state
            .unit(id)
            .ok_or_else(|| GameError::IllegalTarget(format!("unit {} does not exist", id)))?;
        if unit.owner != player {
            return Err(GameError::IllegalTarget(format!("unit {} is not yours", id)));
        }
        Ok(unit)
    }

    fn handle_move(&mut self, player: PlayerId, id: UnitId, to: TileKey) -> Result<Resolution> {
        let unit = self.owned_unit(player, id)?;
        if unit.position == to {
            return Err(GameError::InvalidAction(format!("unit {} is already on {}", id, to)));
        }
        let target = self.state.target_tile(&to)?;
        if target.impassable {
            return Err(GameError::IllegalTarget(format!("tile {} is impassable", to)));
        }
        let state = &self.state;
        let reach = state.map.reachable(unit.position, unit.movement, |k| state.is_occupied(k));
        let spent = *reach.get(&to).ok_or_else(|| {
            GameError::IllegalTarget(format!("{} is out of reach of unit {} ({} movement)", to, id, unit.movement))
        })?;

        if let Some(unit) = self.state.units.get_mut(&id) {
            unit.position = to;
            unit.movement -= spent;
        }
        Ok(Resolution::new(format!("unit {} moved to {}", id, to), Resources::ZERO))
    }

    /// Owned-tile lookup shared by the tile improvement handlers
    fn own_tile(&self, player: PlayerId, key: TileKey) -> Result<&crate::map::Tile> {
        let tile = self.state.target_tile(&key)?;
        if tile.owner != Owner::Player(player) {
            return Err(GameError::IllegalTarget(format!("tile {} is not yours", key)));
        }
        Ok(tile)
    }

    fn handle_fortify(&mut self, player: PlayerId, key: TileKey) -> Result<Resolution> {
        let tile = self.own_tile(player, key)?;
        if tile.stability >= crate::map::MAX_STABILITY {
            return Err(GameError::InvalidAction(format!("tile {} is already at full stability", key)));
        }
        let cost = self.config.costs.fortify;
        ledger::spend(self.state.require_player_mut(player)?, &cost)?;
        let amount = self.config.costs.fortify_amount as i32;
        let mut stability = 0;
        if let Some(tile) = self.state.map.get_mut(&key) {
            tile.adjust_stability(amount);
            stability = tile.stability;
        }
        Ok(Resolution::new(format!("fortified {} to stability {}", key, stability), cost))
    }

    fn handle_purify(&mut self, player: PlayerId, key: TileKey) -> Result<Resolution> {
        let tile = self.state.target_tile(&key)?;
        if !tile.is_corrupted() {
            return Err(GameError::IllegalTarget(format!("tile {} is not corrupted", key)));
        }
        let level = tile.corruption as i32 - 1;
        if !self.state.require_player(player)?.borders(&key) {
            return Err(GameError::IllegalTarget(format!("tile {} is outside your reach", key)));
        }
        let cost = self.config.costs.purify;
        ledger::spend(self.state.require_player_mut(player)?, &cost)?;
        corruption::set_corruption_level(&mut self.state, &self.config, key, level)?;
        Ok(Resolution::new(format!("purified {} to corruption {}", key, level), cost))
    }

    fn handle_build_shrine(&mut self, player: PlayerId, key: TileKey) -> Result<Resolution> {
        let tile = self.own_tile(player, key)?;
        if tile.has_shrine {
            return Err(GameError::InvalidAction(format!("tile {} already has a shrine", key)));
        }
        if tile.is_corrupted() {
            return Err(GameError::IllegalTarget(format!("tile {} is corrupted", key)));
        }
        let cost = self.config.costs.build_shrine;
        ledger::spend(self.state.require_player_mut(player)?, &cost)?;
        if let Some(tile) = self.state.map.get_mut(&key) {
            tile.has_shrine = true;
            tile.faith_yield += 1;
            tile.adjust_stability(1);
        }
        Ok(Resolution::new(format!("shrine raised on {}", key), cost))
    }

    fn handle_sanctify(&mut self, player: PlayerId, key: TileKey) -> Result<Resolution> {
        let tile = self.own_tile(player, key)?;
        if tile.sanctified {
            return Err(GameError::InvalidAction(format!("tile {} is already sanctified", key)));
        }
        if tile.is_corrupted() {
            return Err(GameError::IllegalTarget(format!("tile {} is corrupted", key)));
        }
        let cost = self.config.costs.sanctify;
        let domain = self.state.require_player(player)?.domain;
        let record = self.state.require_player_mut(player)?;
        ledger::spend(record, &cost)?;
        record.sanctified_tiles.insert(key);
        record.counters.sanctifications += 1;
        if let Some(tile) = self.state.map.get_mut(&key) {
            tile.sanctify(domain);
            tile.adjust_stability(1);
        }
        Ok(Resolution::new(format!("sanctified {} to {:?}", key, domain), cost))
    }

    fn handle_summon(&mut self, player: PlayerId, kind: UnitKind, key: TileKey) -> Result<Resolution> {
        let content = Arc::clone(&self.content);
        let def = content
            .unit(kind)
            .ok_or_else(|| GameError::InvalidAction(format!("unknown unit kind {}", kind)))?;
        if !def.summonable {
            return Err(GameError::InvalidAction(format!("{} cannot be summoned", kind)));
        }
        let record = self.state.require_player(player)?;
        if let Some(required) = def.domain_requirement {
            if record.domain != required {
                return Err(GameError::InvalidAction(format!("{} requires the {:?} domain", kind, required)));
            }
        }
        if record.units.len() >= self.config.costs.unit_cap {
            return Err(GameError::InvalidAction(format!(
                "unit cap of {} reached",
                self.config.costs.unit_cap
            )));
        }
        let tile = self.own_tile(player, key)?;
        if tile.impassable || self.state.is_occupied(&key) {
            return Err(GameError::IllegalTarget(format!("cannot place a {} on {}", kind, key)));
        }

        ledger::spend(self.state.require_player_mut(player)?, &def.summon_cost)?;
        let id = self.state.spawn_unit(player, def, key)?;
        if def.alignment_shift != 0.0 {
            self.state.require_player_mut(player)?.adjust_alignment(def.alignment_shift);
        }
        Ok(Resolution::new(format!("summoned {} {} on {}", kind, id, key), def.summon_cost))
    }

    fn handle_ability(&mut self, player: PlayerId, id: UnitId, ability: &AbilityId, target: TileKey) -> Result<Resolution> {
        let content = Arc::clone(&self.content);
        let unit = self.owned_unit(player, id)?;
        let knows = content.unit(unit.kind).is_some_and(|def| def.abilities.contains(ability));
        if !knows {
            return Err(GameError::InvalidAction(format!("{} has no ability {}", unit.kind, ability)));
        }
        let def = content
            .ability(ability)
            .ok_or_else(|| GameError::InvalidAction(format!("unknown ability {}", ability)))?;
        if !unit.ability_ready(ability) {
            return Err(GameError::InvalidAction(format!("{} is cooling down", def.name)));
        }
        if unit.position.manhattan(&target) > def.range {
            return Err(GameError::IllegalTarget(format!(
                "{} is out of range of {} (range {})",
                target, def.name, def.range
            )));
        }
        self.state.target_tile(&target)?;

        let ctx = EffectContext::new(player, Some(target), Some(id));
        effects::validate_effects(&self.state, &content, &self.config, &ctx, &def.effects)?;
        ledger::spend(self.state.require_player_mut(player)?, &def.cost)?;
        effects::apply_effects(&mut self.state, &content, &self.config, &ctx, &def.effects)?;
        if let Some(unit) = self.state.units.get_mut(&id) {
            unit.start_cooldown(ability, def.cooldown);
        }
        Ok(Resolution::new(format!("unit {} used {} on {}", id, def.name, target), def.cost))
    }

    fn handle_miracle(
        &mut self,
        player: PlayerId,
        miracle: &MiracleId,
        target: Option<TileKey>,
        unit: Option<UnitId>,
    ) -> Result<Resolution> {
        let content = Arc::clone(&self.content);
        let record = self.state.require_player(player)?;
        if !record.miracles.contains(miracle) {
            return Err(GameError::InvalidAction(format!("{} does not know {}", player, miracle)));
        }
        let def = content
            .miracle(miracle)
            .ok_or_else(|| GameError::InvalidAction(format!("unknown miracle {}", miracle)))?;
        if let Some(key) = target {
            if !record.revealed.contains(&key) {
                return Err(GameError::IllegalTarget(format!("tile {} has not been revealed", key)));
            }
        }

        let ctx = EffectContext::new(player, target, unit);
        effects::validate_effects(&self.state, &content, &self.config, &ctx, &def.effects)?;
        ledger::spend(self.state.require_player_mut(player)?, &def.cost)?;
        effects::apply_effects(&mut self.state, &content, &self.config, &ctx, &def.effects)?;
        let place = target.map(|k| format!(" on {}", k)).unwrap_or_default();
        Ok(Resolution::new(format!("{} cast{}", def.name, place), def.cost))
    }

    fn handle_shadow_pact(&mut self, player: PlayerId) -> Result<Resolution> {
        let costs = &self.config.costs;
        let cost = costs.shadow_pact;
        let alignment = costs.shadow_pact_alignment;
        let influence = costs.shadow_pact_influence;
        let record = self.state.require_player_mut(player)?;
        ledger::spend(record, &cost)?;
        record.adjust_alignment(alignment);
        let now = record.alignment;
        self.state.adjust_influence(influence);
        Ok(Resolution::new(format!("pact sealed; alignment now {:.0}", now), cost))
    }
}
