//! Turn and phase orchestration
//!
//! `GameEngine` is the only owner of the mutable `GameState`. Every change
//! goes through `execute_action` or the turn transitions it triggers;
//! resolvers borrow the state for exactly one call.

mod actions;
pub mod observer;
pub mod options;
mod turn;

pub use observer::StateObserver;
pub use options::{GameOptions, PlayerSetup};

use ahash::{AHashMap, AHashSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::ai::{self, AiProfile};
use crate::content::ContentRegistry;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Owner, PlayerId, Resources, TileKey, UnitKind};
use crate::map::{MapGenerator, MapSpec, TerrainKind};
use crate::state::{ActionKind, ActionResult, GameAction, GameState, MatchSettings, Phase, PlayerState};
use crate::systems::{capture, victory, visibility};

/// Side length of each player's starting block
const START_BLOCK: i32 = 3;

/// Result of a handler that succeeded
pub(crate) struct Resolution {
    pub message: String,
    pub cost: Resources,
}

impl Resolution {
    pub fn new(message: impl Into<String>, cost: Resources) -> Self {
        Self {
            message: message.into(),
            cost,
        }
    }
}

pub struct GameEngine {
    state: GameState,
    config: GameConfig,
    content: Arc<ContentRegistry>,
    /// Gameplay rolls only; the map has its own stream
    rng: ChaCha8Rng,
    observers: Vec<Box<dyn StateObserver>>,
    profiles: AHashMap<PlayerId, AiProfile>,
    defer_ai_turns: bool,
    in_ai_turn: bool,
}

impl GameEngine {
    pub fn new(config: GameConfig, content: Arc<ContentRegistry>) -> Self {
        Self {
            state: GameState::empty(),
            config,
            content,
            rng: ChaCha8Rng::from_entropy(),
            observers: Vec::new(),
            profiles: AHashMap::new(),
            defer_ai_turns: false,
            in_ai_turn: false,
        }
    }

    /// Engine with the standard rules and content
    pub fn with_defaults() -> Self {
        Self::new(GameConfig::default(), Arc::new(ContentRegistry::standard()))
    }

    /// Resume a saved match
    pub fn from_state(
        state: GameState,
        config: GameConfig,
        content: Arc<ContentRegistry>,
        gameplay_seed: Option<u64>,
    ) -> Result<Self> {
        config.validate()?;
        state.check_invariants()?;
        let mut engine = Self::new(config, content);
        engine.state = state;
        if let Some(seed) = gameplay_seed {
            engine.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        Ok(engine)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentRegistry {
        &self.content
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    /// Override the built-in profile of an AI player
    pub fn set_ai_profile(&mut self, player: PlayerId, profile: AiProfile) {
        self.profiles.insert(player, profile);
    }

    pub fn set_defer_ai_turns(&mut self, defer: bool) {
        self.defer_ai_turns = defer;
    }

    /// True when the match is running and an AI player holds the turn
    pub fn awaiting_ai(&self) -> bool {
        self.state.phase == Phase::Playing && self.state.current().is_some_and(|p| p.is_ai())
    }

    /// Capture cost of `key` for `player`, for front ends
    pub fn capture_cost(&self, player: PlayerId, key: TileKey) -> Result<u32> {
        capture::capture_cost(&self.state, &self.content, &self.config, player, key)
    }

    /// Start a new match, replacing any previous state
    pub fn initialize(&mut self, options: GameOptions) -> Result<()> {
        options.validate()?;
        self.config.validate()?;

        self.rng = match options.gameplay_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.defer_ai_turns = options.defer_ai_turns;
        self.in_ai_turn = false;
        self.profiles.clear();

        let spec = MapSpec {
            width: options.width,
            height: options.height,
            seed: options.seed,
            richness: options.richness,
            shadow_stability: self.config.spread.converted_stability,
        };
        let mut generator = MapGenerator::new(spec);
        let mut map = generator.generate();

        let corners = start_corners(options.width, options.height);
        let mut excluded = AHashSet::new();
        for corner in corners.iter().take(options.players.len()) {
            for key in block_keys(*corner, 1) {
                excluded.insert(key);
            }
            for key in block_keys(*corner, 0) {
                if let Some(tile) = map.get_mut(&key) {
                    if tile.impassable {
                        tile.set_terrain(TerrainKind::Plains);
                    }
                    tile.corruption = 0;
                    tile.owner = Owner::Neutral;
                }
            }
        }
        let seeds = generator.seed_shadow(&mut map, &excluded);

        let players: Vec<PlayerState> = options
            .players
            .iter()
            .enumerate()
            .map(|(i, setup)| {
                let mut player = PlayerState::new(PlayerId(i as u8 + 1), setup.name.clone(), setup.domain, setup.controller);
                player.wallet = self.config.economy.starting;
                if let Some(domain) = self.content.domain(setup.domain) {
                    player.miracles = domain.starting_miracles.clone();
                }
                player
            })
            .collect();

        let settings = MatchSettings {
            seed: options.seed,
            width: options.width,
            height: options.height,
            difficulty: options.difficulty,
            aggression: options.aggression,
            richness: options.richness,
            victory_conditions: options.victory_conditions.clone(),
        };
        self.state = GameState::new(settings, map, players);

        let explorer = self
            .content
            .unit(UnitKind::Explorer)
            .cloned()
            .ok_or_else(|| GameError::Config("content has no Explorer unit".into()))?;
        let ids: Vec<(PlayerId, crate::core::types::Domain)> =
            self.state.players.iter().map(|p| (p.id, p.domain)).collect();
        for ((id, domain), corner) in ids.into_iter().zip(corners) {
            for key in block_keys(corner, 0) {
                self.state.transfer_tile(key, Owner::Player(id))?;
            }
            let center = TileKey::new(corner.x + 1, corner.y + 1);
            if let Some(tile) = self.state.map.get_mut(&center) {
                tile.sanctify(domain);
            }
            self.state.require_player_mut(id)?.sanctified_tiles.insert(center);
            self.state.spawn_unit(id, &explorer, center)?;
        }

        for id in self.state.players.iter().map(|p| p.id).collect::<Vec<_>>() {
            visibility::update_visibility(&mut self.state, &self.content, id)?;
        }
        self.state.check_invariants()?;
        self.state.phase = Phase::Playing;
        self.state.current_player = 0;

        tracing::info!(
            match_id = %self.state.match_id.0,
            seed = options.seed,
            width = options.width,
            height = options.height,
            players = self.state.players.len(),
            shadow_seeds = seeds,
            "match initialized"
        );
        self.start_turn(false);
        Ok(())
    }

    /// Resolve one action; false when it was rejected
    ///
    /// Every action, accepted or not, is appended to the history and
    /// observers are notified. A consistency violation panics.
    pub fn execute_action(&mut self, mut action: GameAction) -> bool {
        action.turn = self.state.turn;
        let outcome = self.check_turn(&action).and_then(|_| self.dispatch(&action));
        let ends_turn = matches!(action.kind, ActionKind::EndTurn);

        let success = match outcome {
            Ok(resolution) => {
                action.cost_paid = resolution.cost;
                action.result = Some(ActionResult {
                    success: true,
                    message: resolution.message,
                });
                true
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(player = %action.player, action = action.kind.name(), "rejected: {}", err);
                action.result = Some(ActionResult {
                    success: false,
                    message: err.to_string(),
                });
                false
            }
            Err(err) => self.abort(err),
        };

        if success {
            tracing::debug!(
                player = %action.player,
                action = action.kind.name(),
                cost = %action.cost_paid,
                "{}",
                action.message().unwrap_or_default()
            );
            if let Err(err) = self.after_action(action.player) {
                self.abort(err);
            }
        }

        self.state.history.push(action);
        if let Some(last) = self.state.history.last() {
            for observer in self.observers.iter_mut() {
                observer.state_changed(&self.state, Some(last));
            }
        }

        if success && ends_turn && self.state.phase == Phase::Playing {
            self.advance_turn();
        }
        success
    }

    /// Play one AI player's turn to completion, ending it
    pub fn run_ai_turn(&mut self) {
        self.drive_ai(true);
    }

    fn check_turn(&self, action: &GameAction) -> Result<()> {
        if self.state.phase != Phase::Playing {
            return Err(GameError::InvalidAction(format!(
                "the match is not in progress ({:?})",
                self.state.phase
            )));
        }
        if self.state.current_player_id() != Some(action.player) {
            return Err(GameError::InvalidAction(format!("it is not {}'s turn", action.player)));
        }
        Ok(())
    }

    /// Visibility then victory after a successful action
    fn after_action(&mut self, player: PlayerId) -> Result<()> {
        if let Some(current) = self.state.current_player_id() {
            visibility::update_visibility(&mut self.state, &self.content, current)?;
        }
        self.state.require_player_mut(player)?.counters.actions += 1;
        if let Some(outcome) = victory::evaluate(&mut self.state, &self.content, &self.config) {
            victory::apply_outcome(&mut self.state, outcome);
        }
        self.state.check_invariants()
    }

    fn notify_turn_start(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.state_changed(&self.state, None);
        }
    }

    fn abort(&self, err: GameError) -> ! {
        tracing::error!(turn = self.state.turn, "aborting match: {}", err);
        panic!("{}", err);
    }

    fn profile_for(&self, player: &PlayerState) -> AiProfile {
        self.profiles
            .get(&player.id)
            .cloned()
            .unwrap_or_else(|| AiProfile::for_personality(player.personality().unwrap_or_default()))
    }

    /// Run AI turns until a human holds the turn or the match ends
    ///
    /// Iterative on purpose: AI end-turns start the next turn, which would
    /// otherwise re-enter here. `single_turn` stops after one AI player.
    fn drive_ai(&mut self, single_turn: bool) {
        if self.in_ai_turn {
            return;
        }
        self.in_ai_turn = true;
        while self.awaiting_ai() {
            let Some(player) = self.state.current().cloned() else {
                break;
            };
            self.play_ai_actions(&player);
            if self.state.phase != Phase::Playing {
                break;
            }
            if !self.execute_action(GameAction::end_turn(player.id)) {
                break;
            }
            if single_turn {
                break;
            }
        }
        self.in_ai_turn = false;
    }

    fn play_ai_actions(&mut self, player: &PlayerState) {
        let profile = self.profile_for(player);
        let mut budget = player.wallet;
        let mut taken = 0;
        while taken < self.config.ai.max_actions_per_turn {
            if self.state.phase != Phase::Playing || self.state.current_player_id() != Some(player.id) {
                break;
            }
            let Some(candidate) = ai::plan_next(
                &self.state,
                &self.content,
                &self.config,
                &profile,
                player.id,
                &budget,
                &mut self.rng,
            ) else {
                break;
            };
            if !self.execute_action(GameAction::new(player.id, candidate.action)) {
                break;
            }
            taken += 1;
            budget = self.state.player(player.id).map_or(Resources::ZERO, |p| p.wallet);
        }
        tracing::debug!(player = %player.id, actions = taken, "AI turn finished");
    }
}

/// Top-left corners of the starting blocks in seating order
fn start_corners(width: i32, height: i32) -> [TileKey; 4] {
    [
        TileKey::new(0, 0),
        TileKey::new(width - START_BLOCK, height - START_BLOCK),
        TileKey::new(width - START_BLOCK, 0),
        TileKey::new(0, height - START_BLOCK),
    ]
}

/// Keys of a starting block grown by `margin` on every side
fn block_keys(corner: TileKey, margin: i32) -> Vec<TileKey> {
    let mut keys = Vec::new();
    for y in (corner.y - margin)..(corner.y + START_BLOCK + margin) {
        for x in (corner.x - margin)..(corner.x + START_BLOCK + margin) {
            keys.push(TileKey::new(x, y));
        }
    }
    keys
}
