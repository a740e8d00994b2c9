//! Headless Full Metal Planet simulator.
//!
//! Loads the game data from `FMP_ASSETS`, plays a full game and prints a
//! summary of where every player ended up.

use anyhow::{bail, Context, Result};
use fmp_core::{ActionPlanner, Bot, BotDifficulty, Catalog, Engine, EngineConfig, IdlePlanner};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod assets;
mod report;

use assets::AssetSet;
use report::GameSummary;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let assets_dir = std::env::var("FMP_ASSETS").unwrap_or_else(|_| "assets".into());
    let players: usize = env_or("FMP_PLAYERS", 2)?;
    let seed: Option<u64> = env_opt("FMP_SEED")?;
    let max_turns: Option<u32> = env_opt("FMP_MAX_TURNS")?;
    let bot = std::env::var("FMP_BOT").unwrap_or_else(|_| "medium".into());
    let json = std::env::var("FMP_OUTPUT").map_or(false, |v| v == "json");

    info!("Starting Full Metal Planet simulation from {}", assets_dir);

    let catalog = AssetSet::read(&assets_dir)?.into_catalog()?;
    let config = EngineConfig {
        max_turns,
        seed,
        ..EngineConfig::with_players(players)
    };

    match bot.as_str() {
        "idle" => play(catalog, config, IdlePlanner, json),
        "easy" => play(catalog, config, bot_player(BotDifficulty::Easy, seed), json),
        "medium" => play(catalog, config, bot_player(BotDifficulty::Medium, seed), json),
        other => bail!("unknown FMP_BOT '{}', expected idle, easy or medium", other),
    }
}

fn bot_player(difficulty: BotDifficulty, seed: Option<u64>) -> Bot {
    match seed {
        Some(seed) => Bot::with_seed(difficulty, seed),
        None => Bot::new(difficulty),
    }
}

fn play<P: ActionPlanner>(catalog: Catalog, config: EngineConfig, planner: P, json: bool) -> Result<()> {
    let mut engine = Engine::with_planner(catalog, config, planner).context("failed to set up the game")?;
    let turns = engine.run().context("game aborted")?;

    let summary = GameSummary::from_engine(&engine, turns);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
    }
    Ok(())
}

fn env_opt<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .with_context(|| format!("invalid {}: '{}'", name, value)),
        Err(_) => Ok(None),
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(env_opt(name)?.unwrap_or(default))
}
