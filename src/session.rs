//! Per-match async session
//!
//! Wraps one engine behind a tokio mutex so that every action and every full
//! AI turn runs exclusively. The optional presentation delay is slept before
//! the lock is taken, never while holding it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::core::error::Result;
use crate::core::types::MatchId;
use crate::engine::GameEngine;
use crate::state::{GameAction, GameState};

pub struct MatchSession {
    id: MatchId,
    engine: Arc<Mutex<GameEngine>>,
    ai_delay: Duration,
}

impl MatchSession {
    /// Take ownership of an initialized engine; AI turns become session-driven
    pub fn new(mut engine: GameEngine, ai_delay: Duration) -> Self {
        engine.set_defer_ai_turns(true);
        let id = engine.state().match_id;
        Self {
            id,
            engine: Arc::new(Mutex::new(engine)),
            ai_delay,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn ai_delay(&self) -> Duration {
        self.ai_delay
    }

    /// Apply one action, then play any AI turns that follow it
    pub async fn submit(&self, action: GameAction) -> bool {
        let accepted = {
            let mut engine = self.engine.lock().await;
            engine.execute_action(action)
        };
        self.drive_ai().await;
        accepted
    }

    /// Play AI turns one at a time until a human holds the turn or the match ends
    ///
    /// Returns the number of AI turns played.
    pub async fn drive_ai(&self) -> usize {
        let mut played = 0;
        loop {
            if !self.engine.lock().await.awaiting_ai() {
                break;
            }
            if !self.ai_delay.is_zero() {
                tokio::time::sleep(self.ai_delay).await;
            }
            let mut engine = self.engine.lock().await;
            if !engine.awaiting_ai() {
                break;
            }
            engine.run_ai_turn();
            played += 1;
        }
        if played > 0 {
            tracing::debug!(match_id = %self.id.0, turns = played, "session drove AI turns");
        }
        played
    }

    /// Owned copy of the current state
    pub async fn snapshot(&self) -> GameState {
        self.engine.lock().await.state().clone()
    }

    pub async fn save_json(&self) -> Result<String> {
        self.engine.lock().await.state().to_json()
    }

    /// Shared handle for callers that need the engine directly
    pub fn handle(&self) -> Arc<Mutex<GameEngine>> {
        Arc::clone(&self.engine)
    }
}
