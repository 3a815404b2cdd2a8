//! Arena CLI: play seeded strategy-vs-strategy games from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 100 --p1 best --p2 random
//!   cargo run --release --bin arena -- --games 50 --p1-preset aggressive --p2 best --p2-preset cautious

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use carcassonne_engine::engine::arena::run_arena;
use carcassonne_engine::engine::bot_strategy::{strategy_by_name, TurnStrategy};
use carcassonne_engine::engine::config::{load_config, load_default_config, EngineConfig};

#[derive(Parser)]
#[command(name = "arena", about = "Run strategy-vs-strategy arena experiments")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Base random seed; game i uses seed + i
    #[arg(long, default_value = "42", env = "CARCASSONNE_SEED")]
    seed: u64,

    /// Alternate seat positions between games (`--alternate-seats false` to pin them)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    alternate_seats: bool,

    /// Path to engine.toml
    #[arg(long, env = "CARCASSONNE_CONFIG")]
    config: Option<PathBuf>,

    /// P1 strategy: "best" or "random"
    #[arg(long, default_value = "best")]
    p1: String,

    /// P1 weight preset (defaults to the config's weights)
    #[arg(long)]
    p1_preset: Option<String>,

    /// P2 strategy: "best" or "random"
    #[arg(long, default_value = "random")]
    p2: String,

    /// P2 weight preset
    #[arg(long)]
    p2_preset: Option<String>,
}

fn build_seat(
    label: &str,
    strategy: &str,
    preset: Option<&str>,
    config: &EngineConfig,
) -> Result<(String, Box<dyn TurnStrategy>), String> {
    let weights = config.weights_for(preset);
    let built = strategy_by_name(strategy, weights)
        .ok_or_else(|| format!("unknown strategy '{}' (expected best or random)", strategy))?;
    let name = match preset {
        Some(p) => format!("{}:{}:{}", label, strategy, p),
        None => format!("{}:{}", label, strategy),
    };
    Ok((name, built))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };

    let strategies = vec![
        build_seat("p1", &cli.p1, cli.p1_preset.as_deref(), &config)?,
        build_seat("p2", &cli.p2, cli.p2_preset.as_deref(), &config)?,
    ];

    eprintln!(
        "Arena: {} games, seed={}, alternate_seats={}, peasants={}",
        cli.games, cli.seed, cli.alternate_seats, config.peasants_per_player
    );
    for (name, _) in &strategies {
        eprintln!("  {}", name);
    }
    eprintln!();

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] games completed", done, total);
    };

    let result = run_arena(
        &strategies,
        cli.games,
        cli.seed,
        config.peasants_per_player,
        cli.alternate_seats,
        Some(&progress_cb),
    )?;

    eprintln!("\r                                    ");
    println!("{}", result.summary());
    Ok(())
}
