//! Async match session tests

use std::sync::Arc;
use std::time::Duration;

use sanctum::ai::Personality;
use sanctum::content::ContentRegistry;
use sanctum::core::config::GameConfig;
use sanctum::core::types::{Domain, PlayerId};
use sanctum::state::{Controller, GameAction, GameState, Phase};
use sanctum::{GameEngine, GameOptions, MatchSession, PlayerSetup};

fn session(ai_delay: Duration) -> MatchSession {
    let mut config = GameConfig::default();
    config.events.chance_per_turn = 0.0;
    let players = vec![
        PlayerSetup::new("Aster", Domain::Light, Controller::Human),
        PlayerSetup::new("Briar", Domain::War, Controller::Ai(Personality::Aggressive)),
    ];
    let options = GameOptions::new(77, players).with_gameplay_seed(77).deferred();
    let mut engine = GameEngine::new(config, Arc::new(ContentRegistry::standard()));
    engine.initialize(options).unwrap();
    MatchSession::new(engine, ai_delay)
}

#[tokio::test]
async fn test_submit_plays_following_ai_turn() {
    let session = session(Duration::ZERO);
    assert!(session.submit(GameAction::end_turn(PlayerId(1))).await);

    let state = session.snapshot().await;
    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.turn, 2);
    assert_eq!(state.current_player, 0);
    assert!(state.history.iter().any(|a| a.player == PlayerId(2)));
}

#[tokio::test]
async fn test_rejected_action_still_reported() {
    let session = session(Duration::ZERO);
    assert!(!session.submit(GameAction::end_turn(PlayerId(2))).await);
    let state = session.snapshot().await;
    assert_eq!(state.turn, 1);
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn test_ai_delay_is_taken_outside_the_lock() {
    let session = session(Duration::from_millis(20));
    {
        let handle = session.handle();
        let mut engine = handle.lock().await;
        assert!(engine.execute_action(GameAction::end_turn(PlayerId(1))));
        assert!(engine.awaiting_ai());
    }

    let handle = session.handle();
    let (played, reader) = tokio::join!(session.drive_ai(), async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        // The driver is sleeping, so the lock is free to take
        let engine = handle.lock().await;
        engine.state().current_player
    });
    assert_eq!(played, 1);
    assert_eq!(reader, 1);
}

#[tokio::test]
async fn test_save_json_restores() {
    let session = session(Duration::ZERO);
    session.submit(GameAction::end_turn(PlayerId(1))).await;
    let json = session.save_json().await.unwrap();
    let restored = GameState::from_json(&json).unwrap();
    assert_eq!(restored.match_id, session.id());
    assert_eq!(restored.turn, 2);
}
