//! Autoplay one seeded game with the best-turn strategy in every seat.
//!
//! Usage:
//!   carcassonne-engine --players 3 --seed 7 --save game.json
//!   carcassonne-engine --resume game.json --max-turns 40

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use carcassonne_engine::engine::arena::play_out;
use carcassonne_engine::engine::bot_strategy::{BestTurnStrategy, TurnStrategy};
use carcassonne_engine::engine::config::{load_config, load_default_config};
use carcassonne_engine::games::carcassonne::snapshot::{load_snapshot, save_snapshot};
use carcassonne_engine::games::carcassonne::{GameState, PlayerSetup};

#[derive(Parser)]
#[command(name = "carcassonne-engine", about = "Play an automated tile-placement game")]
struct Cli {
    /// Number of players (1-5)
    #[arg(long, default_value = "2")]
    players: usize,

    /// Random seed (overrides the config file)
    #[arg(long, env = "CARCASSONNE_SEED")]
    seed: Option<u64>,

    /// Path to engine.toml (default: auto-discover)
    #[arg(long, env = "CARCASSONNE_CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many placements
    #[arg(long)]
    max_turns: Option<u32>,

    /// Write a snapshot here when done
    #[arg(long)]
    save: Option<PathBuf>,

    /// Continue from a snapshot instead of starting a new game
    #[arg(long)]
    resume: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };
    let seed = cli.seed.or(config.seed).unwrap_or(0);
    let weights = config.scoring_weights();

    let mut state = match &cli.resume {
        Some(path) => load_snapshot(path)?,
        None => {
            let setup: Vec<PlayerSetup> = (1..=cli.players)
                .map(|i| PlayerSetup::new(format!("player{i}")))
                .collect();
            GameState::new(&setup, config.peasants_per_player, &mut StdRng::seed_from_u64(seed))?
        }
    };
    // A resumed game continues with a stream derived from the seed and turn.
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(state.turn as u64));

    let best = BestTurnStrategy::new(weights);
    let seat: &dyn TurnStrategy = &best;
    let seats = vec![seat; state.players.len()];
    let stats = play_out(&mut state, &seats, &mut rng, cli.max_turns, |state, report| {
        let player = &state.players[report.player_index];
        tracing::info!(
            turn = report.turn,
            player = %player.name,
            score = player.score,
            peasants = player.peasants_count,
            scored = report.scored.len(),
            "turn played"
        );
    })?;

    tracing::info!(
        turns = stats.turns,
        discarded = stats.discarded,
        regions = stats.regions_scored,
        remaining = state.card_pool.len(),
        "autoplay stopped"
    );

    let projection = state.end_game_scores()?;
    for (player, extra) in state.players.iter().zip(&projection) {
        println!(
            "{:>10} ({:?}): {:3} points, +{} if the game ended now (towns {}, roads {}, cloisters {})",
            player.name,
            player.color,
            player.score,
            extra.total(),
            extra.towns,
            extra.roads,
            extra.cloisters,
        );
    }

    if let Some(path) = &cli.save {
        save_snapshot(&state, path)?;
    }
    Ok(())
}
