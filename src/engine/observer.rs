//! State-change notification hook

use crate::state::{GameAction, GameState};

/// Notified after every resolved action and every turn start
pub trait StateObserver: Send {
    /// `action` is the action just resolved, or `None` for a turn start
    fn state_changed(&mut self, state: &GameState, action: Option<&GameAction>);
}

impl<F> StateObserver for F
where
    F: FnMut(&GameState, Option<&GameAction>) + Send,
{
    fn state_changed(&mut self, state: &GameState, action: Option<&GameAction>) {
        self(state, action)
    }
}
