//! Resource ledger
//!
//! Spend and grant are the only ways a wallet changes. Spending validates
//! every currency before touching any of them; granting clips at the cap.

use crate::content::{ContentRegistry, EventModifier, RelicEffect};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Currency, PlayerId, Resources, ALL_CURRENCIES};
use crate::state::{GameState, PlayerState};

/// First currency the wallet cannot cover, as an `InsufficientResource` error
pub fn check_affordable(wallet: &Resources, cost: &Resources) -> Result<()> {
    for currency in ALL_CURRENCIES {
        let needed = cost.get(currency);
        let available = wallet.get(currency);
        if needed > available {
            return Err(GameError::InsufficientResource {
                currency,
                needed,
                available,
            });
        }
    }
    Ok(())
}

pub fn can_afford(wallet: &Resources, cost: &Resources) -> bool {
    check_affordable(wallet, cost).is_ok()
}

/// Deduct `cost` or fail without mutation
pub fn spend(player: &mut PlayerState, cost: &Resources) -> Result<()> {
    check_affordable(&player.wallet, cost)?;
    for (currency, amount) in cost.entries() {
        *player.wallet.get_mut(currency) -= amount;
    }
    Ok(())
}

/// Add `amount` of one currency, clipped to its cap; returns what was actually added
pub fn grant(player: &mut PlayerState, currency: Currency, amount: u32, caps: &Resources) -> u32 {
    let cap = caps.get(currency);
    let slot = player.wallet.get_mut(currency);
    let before = *slot;
    *slot = slot.saturating_add(amount).min(cap.max(before));
    *slot - before
}

pub fn grant_all(player: &mut PlayerState, amounts: &Resources, caps: &Resources) -> Resources {
    let mut granted = Resources::ZERO;
    for (currency, amount) in amounts.entries() {
        *granted.get_mut(currency) = grant(player, currency, amount, caps);
    }
    granted
}

/// Turn-start income before caps
pub fn compute_income(
    state: &GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player_id: PlayerId,
) -> Result<Resources> {
    let player = state.require_player(player_id)?;
    let mut income = Resources {
        divinity: config.economy.base_divinity_income,
        faith: config.economy.base_faith_income,
        ..Resources::ZERO
    };

    for key in &player.owned_tiles {
        if let Some(tile) = state.tile(key) {
            income.divinity += tile.divinity_yield;
            income.faith += tile.faith_yield;
            if tile.is_corrupted() {
                income.shadow_energy += config.spread.shadow_energy_per_corrupted_tile;
            }
        }
    }

    if let Some(domain) = content.domain(player.domain) {
        income = income + domain.income_bonus;
    }

    for effect in content.relic_effects(&player.relics) {
        if let RelicEffect::Income { currency, amount } = effect {
            *income.get_mut(*currency) += amount;
        }
    }

    for active in &state.active_events {
        let Some(event) = content.event(&active.id) else {
            continue;
        };
        for modifier in &event.modifiers {
            if let EventModifier::Income { currency, amount } = modifier {
                *income.get_mut(*currency) += amount;
            }
        }
    }

    if player.is_ai() {
        income.divinity += state.settings.difficulty.ai_income_bonus();
    }

    Ok(income)
}

/// Grant turn-start income; returns the amounts actually credited
pub fn apply_income(
    state: &mut GameState,
    content: &ContentRegistry,
    config: &GameConfig,
    player_id: PlayerId,
) -> Result<Resources> {
    let income = compute_income(state, content, config, player_id)?;
    let player = state.require_player_mut(player_id)?;
    Ok(grant_all(player, &income, &config.economy.caps))
}

/// Unspent divinity becomes aegis at half rate; divinity resets to zero
pub fn convert_aegis(player: &mut PlayerState, caps: &Resources) -> u32 {
    let converted = player.wallet.divinity / 2;
    player.wallet.divinity = 0;
    grant(player, Currency::Aegis, converted, caps)
}

/// Relic grants that fire when the holder ends a turn
pub fn apply_end_of_turn_relics(player: &mut PlayerState, content: &ContentRegistry, caps: &Resources) {
    let grants: Vec<(Currency, u32)> = content
        .relic_effects(&player.relics)
        .filter_map(|effect| match effect {
            RelicEffect::EndOfTurn { currency, amount } => Some((*currency, *amount)),
            _ => None,
        })
        .collect();
    for (currency, amount) in grants {
        grant(player, currency, amount, caps);
    }
}
