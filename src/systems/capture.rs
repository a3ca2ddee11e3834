//! Capture cost and resolution

use rand::Rng;

use crate::content::{ContentRegistry, RelicEffect};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Currency, Owner, PlayerId, Resources, TileKey};
use crate::map::TileFeature;
use crate::state::{Disposition, GameState};
use crate::systems::effects::{self, EffectContext};
use crate::systems::ledger;

/// Individual terms of the capture formula
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    pub base: f64,
    pub stability: f64,
    pub adjacency_bonus: f64,
    pub domain_modifier: f64,
    pub unit_support: f64,
    pub corruption_penalty: f64,
    pub relic_modifier: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> u32 {
        let raw = self.base + self.stability - self.adjacency_bonus + self.domain_modifier - self.unit_support
            + self.corruption_penalty
            + self.relic_modifier;
        raw.floor().max(1.0) as u32
    }
}

/// What a successful capture did
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub cost: u32,
    pub previous_owner: Owner,
    pub feature_event: Option<String>,
}

/// Terms of the capture cost of `key` for `player`, after validating the target
pub fn capture_breakdown(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player_id: PlayerId,
    key: TileKey,
) -> Result<CostBreakdown> {
    let tile = state.target_tile(&key)?;
    if tile.impassable {
        return Err(GameError::IllegalTarget(format!("tile {} is impassable", key)));
    }
    if tile.owner == Owner::Player(player_id) {
        return Err(GameError::IllegalTarget(format!("tile {} is already yours", key)));
    }
    let player = state.require_player(player_id)?;

    let owned_neighbors = key.neighbors().iter().filter(|n| player.owns(n)).count();
    let adjacency_bonus = match owned_neighbors {
        n if n >= 4 => 2.0,
        n if n >= 2 => 1.0,
        _ => 0.0,
    };

    let domain_modifier = content
        .domain(player.domain)
        .map_or(0.0, |d| d.capture_modifier(tile.terrain));

    let unit_support = state
        .units_of(player_id)
        .into_iter()
        .filter(|u| u.position.manhattan(&key) == 1)
        .filter(|u| content.unit(u.kind).is_some_and(|def| def.support))
        .count() as f64;

    let relic_modifier = content
        .relic_effects(&player.relics)
        .map(|effect| match effect {
            RelicEffect::CaptureCostDelta(delta) => *delta,
            _ => 0.0,
        })
        .sum();

    Ok(CostBreakdown {
        base: config.capture.base_cost,
        stability: tile.stability as f64,
        adjacency_bonus,
        domain_modifier,
        unit_support,
        corruption_penalty: if tile.is_corrupted() { 1.0 } else { 0.0 },
        relic_modifier,
    })
}

/// Divinity needed to capture `key`
pub fn capture_cost(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player_id: PlayerId,
    key: TileKey,
) -> Result<u32> {
    Ok(capture_breakdown(state, content, config, player_id, key)?.total())
}

/// Validate, pay for and apply a capture
pub fn resolve_capture<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    rng: &mut R,
    player_id: PlayerId,
    key: TileKey,
) -> Result<CaptureOutcome> {
    let cost = capture_cost(state, content, config, player_id, key)?;
    ledger::spend(state.require_player_mut(player_id)?, &Resources::divinity(cost))?;

    let previous_owner = state.target_tile(&key)?.owner;
    state.transfer_tile(key, Owner::Player(player_id))?;
    if let Some(tile) = state.map.get_mut(&key) {
        let floor = config.capture.min_stability_after_capture;
        tile.stability = tile.stability.saturating_sub(config.capture.stability_loss).max(floor);
        if previous_owner.is_shadow() {
            tile.corruption = tile.corruption.min(1);
        }
    }

    {
        let player = state.require_player_mut(player_id)?;
        player.counters.captures += 1;
        player.total_captures += 1;
    }

    apply_domain_capture_effects(state, content, config, rng, player_id, key)?;
    let feature_event = trigger_feature_event(state, config, player_id, key)?;

    tracing::debug!(player = %player_id, tile = %key, cost, ?previous_owner, "tile captured");
    Ok(CaptureOutcome {
        cost,
        previous_owner,
        feature_event,
    })
}

fn apply_domain_capture_effects<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    rng: &mut R,
    player_id: PlayerId,
    key: TileKey,
) -> Result<()> {
    let domain = state.require_player(player_id)?.domain;
    let Some(def) = content.domain(domain) else {
        return Ok(());
    };
    let ctx = EffectContext::at(player_id, key);
    for triggered in &def.capture_effects {
        if !rng.gen_bool(triggered.chance.clamp(0.0, 1.0)) {
            continue;
        }
        let effect = std::slice::from_ref(&triggered.effect);
        // A bonus whose target is unusable (occupied tile, unit cap) is skipped
        if effects::validate_effects(state, content, config, &ctx, effect).is_err() {
            continue;
        }
        effects::apply_effects(state, content, config, &ctx, effect)?;
    }
    Ok(())
}

/// One-shot event the first time a feature tile is taken
fn trigger_feature_event(
    state: &mut GameState,
    config: &GameConfig,
    player_id: PlayerId,
    key: TileKey,
) -> Result<Option<String>> {
    let Some(tile) = state.map.get_mut(&key) else {
        return Ok(None);
    };
    let Some(feature) = tile.feature else {
        return Ok(None);
    };
    if tile.event_triggered {
        return Ok(None);
    }
    tile.event_triggered = true;

    let hostile = state.disposition == Disposition::Hostile;
    let caps = config.economy.caps;
    let capture = &config.capture;
    let player = state.require_player_mut(player_id)?;
    let mut stability_penalty = false;

    let message = match feature {
        TileFeature::SacredWell => {
            ledger::grant(player, Currency::Faith, capture.sacred_well_faith, &caps);
            format!("the sacred well grants {} faith", capture.sacred_well_faith)
        }
        TileFeature::Village => {
            if player.alignment >= capture.village_alignment_threshold || hostile {
                player.wallet.faith = player.wallet.faith.saturating_sub(capture.village_faith_penalty);
                stability_penalty = true;
                format!("the village resists; {} faith lost", capture.village_faith_penalty)
            } else {
                ledger::grant(player, Currency::Divinity, capture.village_divinity, &caps);
                format!("the village pledges {} divinity", capture.village_divinity)
            }
        }
        TileFeature::AncientRuins => {
            player.pending_ruins.push(key);
            "ancient ruins await exploration".to_string()
        }
    };
    if stability_penalty {
        if let Some(tile) = state.map.get_mut(&key) {
            tile.adjust_stability(-1);
        }
    }
    Ok(Some(message))
}
