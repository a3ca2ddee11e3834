//! Turn transitions: StartTurn upkeep, EndTurn bookkeeping and rotation

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use super::{GameEngine, Resolution};
use crate::content::{RelicDef, RelicId};
use crate::core::error::Result;
use crate::core::types::{Currency, PlayerId, Resources};
use crate::state::{ActiveEvent, Phase, TurnCounters};
use crate::systems::{corruption, ledger, victory, visibility};

impl GameEngine {
    /// Upkeep for the current player; runs the AI when it holds the turn
    pub(super) fn start_turn(&mut self, new_round: bool) {
        if self.state.phase != Phase::Playing {
            return;
        }
        if let Err(err) = self.begin_turn(new_round) {
            self.abort(err);
        }
        self.notify_turn_start();

        if self.awaiting_ai() && !self.defer_ai_turns && !self.in_ai_turn {
            self.drive_ai(false);
        }
    }

    fn begin_turn(&mut self, new_round: bool) -> Result<()> {
        let Some(player_id) = self.state.current_player_id() else {
            return Ok(());
        };
        let content = Arc::clone(&self.content);

        let unit_ids = self.state.require_player_mut(player_id)?.units.clone();
        for id in unit_ids {
            let alive = self.state.units.get_mut(&id).map(|u| u.tick());
            if alive == Some(false) {
                if let Some(unit) = self.state.remove_unit(id) {
                    tracing::debug!(unit = %unit.id, kind = %unit.kind, "ephemeral unit expired");
                }
            }
        }
        self.state.require_player_mut(player_id)?.counters = TurnCounters::default();

        self.resolve_ruins(player_id)?;
        let income = ledger::apply_income(&mut self.state, &content, &self.config, player_id)?;
        self.tick_events();

        if new_round {
            corruption::run_spread(&mut self.state, &content, &self.config, &mut self.rng)?;
        }

        visibility::update_visibility(&mut self.state, &content, player_id)?;
        if let Some(outcome) = victory::evaluate(&mut self.state, &content, &self.config) {
            victory::apply_outcome(&mut self.state, outcome);
        }
        self.state.check_invariants()?;

        tracing::debug!(turn = self.state.turn, player = %player_id, income = %income, "turn started");
        Ok(())
    }

    /// Relics for every ruin taken last turn
    fn resolve_ruins(&mut self, player_id: PlayerId) -> Result<()> {
        let pending = std::mem::take(&mut self.state.require_player_mut(player_id)?.pending_ruins);
        let content = Arc::clone(&self.content);
        for key in pending {
            let held: AHashSet<&RelicId> = self.state.players.iter().flat_map(|p| p.relics.iter()).collect();
            let pool: Vec<&RelicDef> = content.relics.iter().filter(|r| !held.contains(&r.id)).collect();
            let total: u32 = pool.iter().map(|r| r.rarity.weight()).sum();
            let choice = if total == 0 {
                None
            } else {
                let mut roll = self.rng.gen_range(0..total);
                pool.iter()
                    .find(|r| {
                        let weight = r.rarity.weight();
                        if roll < weight {
                            true
                        } else {
                            roll -= weight;
                            false
                        }
                    })
                    .map(|r| r.id.clone())
            };

            let caps = self.config.economy.caps;
            let fallback = self.config.capture.sacred_well_faith;
            let player = self.state.require_player_mut(player_id)?;
            match choice {
                Some(relic) => {
                    tracing::info!(player = %player_id, tile = %key, %relic, "relic recovered from ruins");
                    player.relics.push(relic);
                }
                None => {
                    ledger::grant(player, Currency::Faith, fallback, &caps);
                    tracing::debug!(player = %player_id, tile = %key, "ruins empty; faith granted instead");
                }
            }
        }
        Ok(())
    }

    /// Count active events down and maybe start a new one
    fn tick_events(&mut self) {
        for event in self.state.active_events.iter_mut() {
            event.remaining = event.remaining.saturating_sub(1);
        }
        self.state.active_events.retain(|e| {
            if e.remaining == 0 {
                tracing::info!(event = %e.id, "global event ended");
            }
            e.remaining > 0
        });

        let events = &self.config.events;
        if self.state.active_events.len() >= events.max_active || events.chance_per_turn <= 0.0 {
            return;
        }
        if !self.rng.gen_bool(events.chance_per_turn.min(1.0)) {
            return;
        }
        let content = Arc::clone(&self.content);
        let available: Vec<_> = content
            .events
            .iter()
            .filter(|def| !self.state.active_events.iter().any(|a| a.id == def.id))
            .collect();
        if let Some(def) = available.choose(&mut self.rng) {
            tracing::info!(event = %def.name, duration = def.duration, "global event began");
            self.state.active_events.push(ActiveEvent {
                id: def.id.clone(),
                remaining: def.duration,
            });
        }
    }

    /// Wallet bookkeeping of an EndTurn action
    pub(super) fn close_turn(&mut self, player_id: PlayerId) -> Result<Resolution> {
        let content = Arc::clone(&self.content);
        let caps = self.config.economy.caps;
        let player = self.state.require_player_mut(player_id)?;
        let aegis = ledger::convert_aegis(player, &caps);
        ledger::apply_end_of_turn_relics(player, &content, &caps);
        Ok(Resolution::new(format!("turn ended; {} aegis banked", aegis), Resources::ZERO))
    }

    /// Hand the turn to the next live player
    ///
    /// Wrapping past the end of the table starts a new round, which is the
    /// only place the corruption spread is triggered.
    pub(super) fn advance_turn(&mut self) {
        let count = self.state.players.len();
        let current = self.state.current_player;
        let next = (1..=count)
            .map(|step| (current + step) % count)
            .find(|&i| self.state.players[i].is_alive());

        let Some(next) = next else {
            self.state.phase = Phase::Defeat;
            self.state.winner = Some(crate::state::Winner::Shadow);
            tracing::info!(turn = self.state.turn, "no player remains; the Shadow prevails");
            self.notify_turn_start();
            return;
        };

        let wrapped = next <= current;
        if wrapped {
            self.state.turn += 1;
            if self.config.turn_limit.is_some_and(|limit| self.state.turn > limit) {
                self.state.phase = Phase::Defeat;
                self.state.winner = None;
                tracing::info!(turn = self.state.turn, "turn limit reached without a winner");
                self.notify_turn_start();
                return;
            }
            tracing::debug!(turn = self.state.turn, "new round");
        }
        self.state.current_player = next;
        self.start_turn(wrapped);
    }
}
