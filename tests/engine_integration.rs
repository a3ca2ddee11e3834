//! Engine integration tests
//!
//! Drive whole matches through `GameEngine` and check the turn flow, the
//! capture scenario and the bookkeeping that happens between turns.

use std::sync::{Arc, Mutex};

use sanctum::ai::Personality;
use sanctum::content::ContentRegistry;
use sanctum::core::config::GameConfig;
use sanctum::core::types::{Domain, Owner, PlayerId, Resources, TileKey, UnitKind};
use sanctum::map::{GameMap, TerrainKind, MAX_CORRUPTION};
use sanctum::state::{
    ActionKind, Controller, GameAction, GameState, MatchSettings, Phase, PlayerState, Winner,
};
use sanctum::{GameEngine, GameOptions, PlayerSetup};

fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.events.chance_per_turn = 0.0;
    config.ai.jitter = 0.0;
    config
}

fn humans(seed: u64) -> GameOptions {
    let players = vec![
        PlayerSetup::new("Aster", Domain::Light, Controller::Human),
        PlayerSetup::new("Briar", Domain::Nature, Controller::Human),
    ];
    GameOptions::new(seed, players).with_gameplay_seed(seed)
}

fn ai_pair(seed: u64) -> GameOptions {
    let players = vec![
        PlayerSetup::new("Aster", Domain::Light, Controller::Ai(Personality::Aggressive)),
        PlayerSetup::new("Briar", Domain::Nature, Controller::Ai(Personality::Defensive)),
    ];
    GameOptions::new(seed, players).with_gameplay_seed(seed)
}

fn started(options: GameOptions, config: GameConfig) -> GameEngine {
    let mut engine = GameEngine::new(config, Arc::new(ContentRegistry::standard()));
    engine.initialize(options).unwrap();
    engine
}

fn resume(state: GameState, config: GameConfig) -> GameEngine {
    GameEngine::from_state(state, config, Arc::new(ContentRegistry::standard()), Some(11)).unwrap()
}

fn total_corruption(state: &GameState) -> u32 {
    state.map.tiles.values().map(|t| t.corruption as u32).sum()
}

#[test]
fn test_initialize_seats_players_in_corners() {
    let engine = started(humans(5), quiet_config());
    let state = engine.state();

    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.turn, 1);
    assert_eq!(state.current_player, 0);
    for player in &state.players {
        assert_eq!(player.owned_tiles.len(), 9);
        assert_eq!(player.sanctified_tiles.len(), 1);
        assert_eq!(player.units.len(), 1);
        assert!(!player.miracles.is_empty());
    }
    let first = state.player(PlayerId(1)).unwrap();
    assert!(first.owns(&TileKey::new(0, 0)));
    assert!(first.sanctified_tiles.contains(&TileKey::new(1, 1)));
    let explorer = state.unit_at(&TileKey::new(1, 1)).unwrap();
    assert_eq!(explorer.kind, UnitKind::Explorer);
    state.check_invariants().unwrap();
}

#[test]
fn test_capture_scenario_through_engine() {
    let build = |divinity: u32| {
        let mut player = PlayerState::new(PlayerId(1), "Aster", Domain::War, Controller::Human);
        player.wallet = Resources::divinity(divinity);
        let mut state = GameState::new(MatchSettings::default(), GameMap::new(6, 6), vec![player]);
        state.map.get_mut(&TileKey::new(3, 3)).unwrap().stability = 3;
        state.phase = Phase::Playing;
        resume(state, quiet_config())
    };
    let target = TileKey::new(3, 3);

    let mut engine = build(7);
    assert_eq!(engine.capture_cost(PlayerId(1), target).unwrap(), 7);
    assert!(engine.execute_action(GameAction::capture(PlayerId(1), target)));
    let state = engine.state();
    assert_eq!(state.player(PlayerId(1)).unwrap().wallet.divinity, 0);
    assert_eq!(state.tile(&target).unwrap().owner, Owner::Player(PlayerId(1)));

    let mut engine = build(6);
    assert!(!engine.execute_action(GameAction::capture(PlayerId(1), target)));
    let state = engine.state();
    assert_eq!(state.player(PlayerId(1)).unwrap().wallet.divinity, 6);
    assert_eq!(state.tile(&target).unwrap().owner, Owner::Neutral);
    let last = state.history.last().unwrap();
    assert!(!last.succeeded());
    assert!(last.message().unwrap().contains("divinity"));
}

#[test]
fn test_out_of_turn_action_is_rejected_and_logged() {
    let mut engine = started(humans(8), quiet_config());
    assert!(!engine.execute_action(GameAction::end_turn(PlayerId(2))));
    let state = engine.state();
    assert_eq!(state.current_player, 0);
    assert_eq!(state.history.len(), 1);
    assert!(!state.history[0].succeeded());
}

#[test]
fn test_invariants_hold_after_every_action() {
    let mut config = quiet_config();
    config.turn_limit = Some(25);
    let mut engine = GameEngine::new(config, Arc::new(ContentRegistry::standard()));

    let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let notified = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&failures);
    let count = Arc::clone(&notified);
    engine.subscribe(Box::new(move |state: &GameState, _action: Option<&GameAction>| {
        *count.lock().unwrap() += 1;
        if let Err(err) = state.check_invariants() {
            sink.lock().unwrap().push(err.to_string());
        }
    }));
    engine.initialize(ai_pair(21)).unwrap();

    assert!(engine.state().phase.is_terminal());
    assert!(*notified.lock().unwrap() > 10);
    assert!(failures.lock().unwrap().is_empty(), "{:?}", failures.lock().unwrap());
}

#[test]
fn test_ai_match_reaches_an_outcome() {
    let mut config = quiet_config();
    config.turn_limit = Some(40);
    let engine = started(ai_pair(3), config);
    let state = engine.state();

    assert!(state.phase.is_terminal());
    if state.phase == Phase::Victory {
        assert!(matches!(state.winner, Some(Winner::Player(_))));
    }
    let captures = state
        .history
        .iter()
        .filter(|a| a.succeeded() && matches!(a.kind, ActionKind::Capture { .. }))
        .count();
    assert!(captures > 0);
}

#[test]
fn test_deferred_ai_waits_for_driver() {
    let options = ai_pair(4).deferred();
    let mut engine = started(options, quiet_config());
    assert!(engine.awaiting_ai());
    assert!(engine.state().history.is_empty());

    engine.run_ai_turn();
    let state = engine.state();
    assert_eq!(state.current_player, 1);
    assert!(matches!(state.history.last().unwrap().kind, ActionKind::EndTurn));
}

#[test]
fn test_spread_runs_once_per_round() {
    let mut config = quiet_config();
    config.spread.min_probability = 1.0;
    config.spread.max_probability = 1.0;
    let engine = started(humans(12), config.clone());
    let mut state = engine.into_state();

    let seed = TileKey::new(12, 9);
    for key in std::iter::once(seed).chain(seed.neighbors()) {
        let tile = state.map.get_mut(&key).unwrap();
        tile.set_terrain(TerrainKind::Plains);
        tile.feature = None;
        tile.owner = Owner::Neutral;
        tile.corruption = 0;
    }
    let tile = state.map.get_mut(&seed).unwrap();
    tile.owner = Owner::Shadow;
    tile.corruption = MAX_CORRUPTION;
    let mut engine = resume(state, config);

    let before = total_corruption(engine.state());
    assert!(engine.execute_action(GameAction::end_turn(PlayerId(1))));
    assert_eq!(engine.state().turn, 1);
    assert_eq!(total_corruption(engine.state()), before);

    assert!(engine.execute_action(GameAction::end_turn(PlayerId(2))));
    assert_eq!(engine.state().turn, 2);
    let after = total_corruption(engine.state());
    assert!(after >= before + 4, "spread did not run on wrap: {} -> {}", before, after);

    assert!(engine.execute_action(GameAction::end_turn(PlayerId(1))));
    assert_eq!(total_corruption(engine.state()), after);
}

#[test]
fn test_wight_expires_on_owners_next_turn() {
    let engine = started(humans(14), quiet_config());
    let mut state = engine.into_state();
    let content = ContentRegistry::standard();
    let wight = content.unit(UnitKind::Wight).unwrap();
    let id = state.spawn_unit(PlayerId(1), wight, TileKey::new(2, 2)).unwrap();
    let mut engine = resume(state, quiet_config());

    assert!(engine.execute_action(GameAction::end_turn(PlayerId(1))));
    assert!(engine.state().unit(id).is_some());
    assert!(engine.execute_action(GameAction::end_turn(PlayerId(2))));
    assert!(engine.state().unit(id).is_none());
    assert!(!engine.state().player(PlayerId(1)).unwrap().units.contains(&id));
}

#[test]
fn test_end_turn_banks_divinity_as_aegis() {
    let engine = started(humans(15), quiet_config());
    let mut state = engine.into_state();
    let player = state.player_mut(PlayerId(1)).unwrap();
    player.wallet.divinity = 7;
    player.wallet.aegis = 1;
    let mut engine = resume(state, quiet_config());

    assert!(engine.execute_action(GameAction::end_turn(PlayerId(1))));
    let wallet = engine.state().player(PlayerId(1)).unwrap().wallet;
    assert_eq!(wallet.divinity, 0);
    assert_eq!(wallet.aegis, 4);
}

#[test]
fn test_sanctify_and_fortify_own_tiles() {
    let engine = started(humans(16), quiet_config());
    let mut state = engine.into_state();
    state.player_mut(PlayerId(1)).unwrap().wallet = Resources {
        divinity: 20,
        faith: 10,
        ..Resources::ZERO
    };
    let corner = TileKey::new(0, 0);
    state.map.get_mut(&corner).unwrap().stability = 4;
    let mut engine = resume(state, quiet_config());

    assert!(engine.execute_action(GameAction::new(PlayerId(1), ActionKind::Sanctify { tile: corner })));
    assert!(!engine.execute_action(GameAction::new(PlayerId(1), ActionKind::Sanctify { tile: corner })));
    assert!(engine.execute_action(GameAction::new(PlayerId(1), ActionKind::Fortify { tile: corner })));

    let state = engine.state();
    let tile = state.tile(&corner).unwrap();
    assert!(tile.sanctified);
    assert_eq!(tile.attunement, Some(Domain::Light));
    assert!(tile.stability > 5);
    assert!(state.player(PlayerId(1)).unwrap().sanctified_tiles.contains(&corner));

    let enemy = TileKey::new(23, 17);
    assert!(!engine.execute_action(GameAction::new(PlayerId(1), ActionKind::Fortify { tile: enemy })));
}

#[test]
fn test_move_spends_movement() {
    let mut engine = started(humans(17), quiet_config());
    let explorer = engine.state().unit_at(&TileKey::new(1, 1)).unwrap().clone();
    let to = TileKey::new(2, 1);
    let cost = engine.state().tile(&to).unwrap().movement_cost;

    assert!(engine.execute_action(GameAction::new(PlayerId(1), ActionKind::Move { unit: explorer.id, to })));
    let moved = engine.state().unit(explorer.id).unwrap();
    assert_eq!(moved.position, to);
    assert_eq!(moved.movement, explorer.movement - cost);

    let far = TileKey::new(20, 15);
    assert!(!engine.execute_action(GameAction::new(PlayerId(1), ActionKind::Move { unit: explorer.id, to: far })));
}

#[test]
fn test_turn_limit_ends_in_defeat_without_winner() {
    let mut config = quiet_config();
    config.turn_limit = Some(2);
    let mut engine = started(humans(18), config);
    for _ in 0..2 {
        assert!(engine.execute_action(GameAction::end_turn(PlayerId(1))));
        assert!(engine.execute_action(GameAction::end_turn(PlayerId(2))));
    }
    let state = engine.state();
    assert_eq!(state.phase, Phase::Defeat);
    assert_eq!(state.winner, None);
    assert!(!engine.execute_action(GameAction::end_turn(PlayerId(1))));
}

#[test]
fn test_map_is_deterministic_for_a_seed() {
    let a = started(humans(99), quiet_config());
    let b = started(humans(99), quiet_config());
    for key in a.state().map.keys_in_order() {
        let (ta, tb) = (a.state().tile(&key).unwrap(), b.state().tile(&key).unwrap());
        assert_eq!(ta.terrain, tb.terrain, "terrain at {}", key);
        assert_eq!(ta.feature, tb.feature, "feature at {}", key);
        assert_eq!(ta.owner, tb.owner, "owner at {}", key);
        assert_eq!(ta.corruption, tb.corruption, "corruption at {}", key);
    }
}

#[test]
fn test_played_match_round_trips_through_json() {
    let mut config = quiet_config();
    config.turn_limit = Some(12);
    let engine = started(ai_pair(31), config.clone());
    let json = engine.state().to_json().unwrap();
    let restored = GameState::from_json(&json).unwrap();

    let original = engine.state();
    assert_eq!(restored.turn, original.turn);
    assert_eq!(restored.phase, original.phase);
    assert_eq!(restored.history.len(), original.history.len());
    assert_eq!(restored.units.len(), original.units.len());
    assert_eq!(restored.shadow_influence, original.shadow_influence);
    for (a, b) in restored.players.iter().zip(&original.players) {
        assert_eq!(a.owned_tiles, b.owned_tiles);
        assert_eq!(a.revealed, b.revealed);
        assert_eq!(a.wallet, b.wallet);
        assert_eq!(a.relics, b.relics);
    }
    for key in original.map.keys_in_order() {
        assert_eq!(restored.tile(&key), original.tile(&key));
    }
    assert!(resume(restored, config).state().check_invariants().is_ok());
}
