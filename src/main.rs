//! Sanctum - headless match runner
//!
//! Plays an all-AI match from a seed, prints a summary and optionally
//! writes the final state as JSON.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use sanctum::ai::{load_named_profile, Personality};
use sanctum::core::config::{Aggression, Difficulty, Richness};
use sanctum::core::error::{GameError, Result};
use sanctum::core::types::{Domain, PlayerId};
use sanctum::state::{Controller, Winner};
use sanctum::{ContentRegistry, GameConfig, GameEngine, GameOptions, Phase, PlayerSetup};

/// Run an AI-vs-AI Sanctum match
#[derive(Parser, Debug)]
#[command(name = "sanctum")]
#[command(about = "Play a headless all-AI match and report the outcome")]
struct Args {
    /// Map seed; the same seed always produces the same map
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Seed for in-match rolls (entropy when omitted)
    #[arg(long)]
    gameplay_seed: Option<u64>,

    #[arg(long, default_value_t = 24)]
    width: i32,

    #[arg(long, default_value_t = 18)]
    height: i32,

    /// Number of AI players (1-4)
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// easy, normal or hard
    #[arg(long, default_value = "normal")]
    difficulty: String,

    /// low, normal or high
    #[arg(long, default_value = "normal")]
    aggression: String,

    /// sparse, normal or abundant
    #[arg(long, default_value = "normal")]
    richness: String,

    /// Override the configured turn limit
    #[arg(long)]
    turn_limit: Option<u32>,

    /// Rules config in TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root containing data/ai_personalities/*.toml
    #[arg(long)]
    profile_root: Option<PathBuf>,

    /// Write the final state here as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

const SEATS: [(Domain, Personality); 4] = [
    (Domain::Light, Personality::Aggressive),
    (Domain::Nature, Personality::Defensive),
    (Domain::War, Personality::Opportunist),
    (Domain::Wisdom, Personality::Balanced),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("sanctum=info").init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.turn_limit.is_some() {
        config.turn_limit = args.turn_limit;
    }

    let players: Vec<PlayerSetup> = SEATS
        .iter()
        .take(args.players)
        .enumerate()
        .map(|(i, (domain, personality))| {
            PlayerSetup::new(format!("{} {}", personality.name(), i + 1), *domain, Controller::Ai(*personality))
        })
        .collect();

    let mut options = GameOptions::new(args.seed, players).with_size(args.width, args.height).deferred();
    options.difficulty = parse_difficulty(&args.difficulty)?;
    options.aggression = parse_aggression(&args.aggression)?;
    options.richness = parse_richness(&args.richness)?;
    options.gameplay_seed = args.gameplay_seed;

    let mut engine = GameEngine::new(config, Arc::new(ContentRegistry::standard()));
    engine.initialize(options)?;

    if let Some(root) = &args.profile_root {
        for (i, (_, personality)) in SEATS.iter().take(args.players).enumerate() {
            let profile = load_named_profile(root, personality.name())?;
            engine.set_ai_profile(PlayerId(i as u8 + 1), profile);
        }
    }

    while engine.state().phase == Phase::Playing {
        if !engine.awaiting_ai() {
            break;
        }
        engine.run_ai_turn();
    }

    print_summary(&engine);

    if let Some(path) = &args.output {
        std::fs::write(path, engine.state().to_json_pretty()?)?;
        tracing::info!(path = %path.display(), "final state written");
    }
    Ok(())
}

fn print_summary(engine: &GameEngine) {
    let state = engine.state();
    println!("\n=== SANCTUM ===");
    println!("Turn {}  Phase {:?}", state.turn, state.phase);
    match state.winner {
        Some(Winner::Player(id)) => {
            let name = state.player(id).map_or("?", |p| p.name.as_str());
            println!("Winner: {} ({})", name, id);
        }
        Some(Winner::Shadow) => println!("Winner: the Shadow"),
        None => println!("No winner"),
    }
    println!("Shadow influence {:.1}  share {:.1}%", state.shadow_influence, state.shadow_share() * 100.0);
    println!();
    for player in &state.players {
        println!(
            "{:<16} {:?}  tiles {:>3}  sanctified {:>2}  units {}  relics {}  wallet {}",
            player.name,
            player.domain,
            player.owned_tiles.len(),
            player.sanctified_tiles.len(),
            player.units.len(),
            player.relics.len(),
            player.wallet
        );
    }
    println!("{} actions recorded", state.history.len());
}

fn parse_difficulty(value: &str) -> Result<Difficulty> {
    match value.to_ascii_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "normal" => Ok(Difficulty::Normal),
        "hard" => Ok(Difficulty::Hard),
        other => Err(GameError::Config(format!("unknown difficulty '{}'", other))),
    }
}

fn parse_aggression(value: &str) -> Result<Aggression> {
    match value.to_ascii_lowercase().as_str() {
        "low" => Ok(Aggression::Low),
        "normal" => Ok(Aggression::Normal),
        "high" => Ok(Aggression::High),
        other => Err(GameError::Config(format!("unknown aggression '{}'", other))),
    }
}

fn parse_richness(value: &str) -> Result<Richness> {
    match value.to_ascii_lowercase().as_str() {
        "sparse" => Ok(Richness::Sparse),
        "normal" => Ok(Richness::Normal),
        "abundant" => Ok(Richness::Abundant),
        other => Err(GameError::Config(format!("unknown richness '{}'", other))),
    }
}
