//! Strategy-vs-strategy arena runner.
//!
//! Games are independent and seeded, so they run in parallel with rayon and
//! the aggregate is the same for any thread count.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::bot_strategy::TurnStrategy;
use crate::games::carcassonne::{GameError, GameState, PlayerSetup, TurnReport};

/// Counters for one played-out game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayStats {
    pub turns: u32,
    pub discarded: u32,
    pub regions_scored: u32,
}

/// Play turns until the pool runs out or `max_turns` placements have been
/// made. Tiles that fit nowhere are discarded. `on_turn` sees every report.
pub fn play_out(
    state: &mut GameState,
    seats: &[&dyn TurnStrategy],
    rng: &mut StdRng,
    max_turns: Option<u32>,
    mut on_turn: impl FnMut(&GameState, &TurnReport),
) -> Result<PlayStats, GameError> {
    if seats.is_empty() {
        return Err(GameError::InvalidPlayerCount(0));
    }
    let mut stats = PlayStats::default();
    while !state.is_pool_exhausted() {
        if max_turns.is_some_and(|max| state.turn >= max) {
            break;
        }
        if !state.next_card_fits() {
            state.discard_next_card()?;
            stats.discarded += 1;
            continue;
        }
        let strategy = seats[state.active_player_index % seats.len()];
        match strategy.choose_turn(state, rng)? {
            Some(turn) => {
                let report = state.apply_turn(&turn.card, turn.coords, turn.peasant_place)?;
                stats.turns += 1;
                stats.regions_scored += report.scored.len() as u32;
                on_turn(state, &report);
            }
            None => {
                state.discard_next_card()?;
                stats.discarded += 1;
            }
        }
    }
    Ok(stats)
}

/// Result of one arena game.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub seed: u64,
    /// Strategy label per seat.
    pub seats: Vec<String>,
    pub final_scores: Vec<u32>,
    /// Seats with the top final score.
    pub winners: Vec<usize>,
    pub stats: PlayStats,
    pub duration_ms: f64,
}

/// Play one seeded game with the given seating.
pub fn play_game(
    seats: &[(&str, &dyn TurnStrategy)],
    seed: u64,
    peasants_per_player: u32,
) -> Result<GameOutcome, GameError> {
    let t0 = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let setup: Vec<PlayerSetup> = seats.iter().map(|(label, _)| PlayerSetup::new(*label)).collect();
    let mut state = GameState::new(&setup, peasants_per_player, &mut rng)?;

    let strategies: Vec<&dyn TurnStrategy> = seats.iter().map(|(_, s)| *s).collect();
    let stats = play_out(&mut state, &strategies, &mut rng, None, |_, _| {})?;

    let final_scores = state.final_scores()?;
    let top = final_scores.iter().copied().max().unwrap_or(0);
    let winners: Vec<usize> = (0..final_scores.len()).filter(|&i| final_scores[i] == top).collect();

    Ok(GameOutcome {
        seed,
        seats: seats.iter().map(|(label, _)| label.to_string()).collect(),
        final_scores,
        winners,
        stats,
        duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 below two samples.
fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Wilson score interval at 95% for `successes` out of `trials`.
fn wilson_interval(successes: usize, trials: usize) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    const Z: f64 = 1.96;
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = Z * Z;
    let scale = 1.0 / (1.0 + z2 / n);
    let mid = scale * (p + z2 / (2.0 * n));
    let half = scale * Z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt();
    ((mid - half).max(0.0), (mid + half).min(1.0))
}

/// Per-strategy tallies over an arena run.
pub struct ArenaResult {
    pub num_games: usize,
    pub wins: BTreeMap<String, usize>,
    pub draws: usize,
    /// Final score of every game, per strategy label.
    pub total_scores: BTreeMap<String, Vec<f64>>,
    pub game_durations_ms: Vec<f64>,
    pub discarded: u32,
}

impl ArenaResult {
    fn wins_of(&self, name: &str) -> usize {
        self.wins.get(name).copied().unwrap_or(0)
    }

    fn scores_of(&self, name: &str) -> &[f64] {
        self.total_scores.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn win_rate(&self, name: &str) -> f64 {
        if self.num_games == 0 {
            return 0.0;
        }
        self.wins_of(name) as f64 / self.num_games as f64
    }

    pub fn avg_score(&self, name: &str) -> f64 {
        mean(self.scores_of(name))
    }

    pub fn score_stddev(&self, name: &str) -> f64 {
        sample_stddev(self.scores_of(name))
    }

    /// 95% interval for the win rate.
    pub fn confidence_interval_95(&self, name: &str) -> (f64, f64) {
        wilson_interval(self.wins_of(name), self.num_games)
    }

    pub fn summary(&self) -> String {
        let mut out = format!("{} games\n", self.num_games);
        out.push_str(&format!(
            "{:<24} {:>5} {:>7} {:>15} {:>13}\n",
            "strategy", "wins", "rate", "95% interval", "score"
        ));
        for name in self.wins.keys() {
            let (lo, hi) = self.confidence_interval_95(name);
            out.push_str(&format!(
                "{:<24} {:>5} {:>6.1}% {:>6.1}%..{:>5.1}% {:>6.1} ±{:>4.1}\n",
                name,
                self.wins_of(name),
                100.0 * self.win_rate(name),
                100.0 * lo,
                100.0 * hi,
                self.avg_score(name),
                self.score_stddev(name),
            ));
        }
        out.push_str(&format!("draws: {}, discarded tiles: {}", self.draws, self.discarded));
        if !self.game_durations_ms.is_empty() {
            let total_ms: f64 = self.game_durations_ms.iter().sum();
            out.push_str(&format!(
                "\n{:.0} ms per game, {:.1} s in total",
                mean(&self.game_durations_ms),
                total_ms / 1000.0
            ));
        }
        out
    }
}

/// Run `num_games` between labelled strategies, one seat each, and return
/// aggregated stats. Game `i` uses seed `base_seed + i`.
pub fn run_arena(
    strategies: &[(String, Box<dyn TurnStrategy>)],
    num_games: usize,
    base_seed: u64,
    peasants_per_player: u32,
    alternate_seats: bool,
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<ArenaResult, GameError> {
    let seat_count = strategies.len();
    let finished = AtomicUsize::new(0);

    let outcomes: Vec<GameOutcome> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seats: Vec<(&str, &dyn TurnStrategy)> = (0..seat_count)
                .map(|i| {
                    let (label, strategy) = if alternate_seats {
                        &strategies[(i + game_idx) % seat_count]
                    } else {
                        &strategies[i]
                    };
                    (label.as_str(), strategy.as_ref())
                })
                .collect();
            let outcome = play_game(&seats, base_seed + game_idx as u64, peasants_per_player);
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(report) = progress {
                report(done, num_games);
            }
            outcome
        })
        .collect::<Result<_, _>>()?;

    let mut tally = ArenaResult {
        num_games,
        wins: strategies.iter().map(|(n, _)| (n.clone(), 0)).collect(),
        draws: 0,
        total_scores: strategies.iter().map(|(n, _)| (n.clone(), Vec::new())).collect(),
        game_durations_ms: Vec::with_capacity(num_games),
        discarded: 0,
    };

    for outcome in &outcomes {
        tally.game_durations_ms.push(outcome.duration_ms);
        tally.discarded += outcome.stats.discarded;
        for (seat, score) in outcome.final_scores.iter().enumerate() {
            if let Some(scores) = tally.total_scores.get_mut(&outcome.seats[seat]) {
                scores.push(*score as f64);
            }
        }
        match outcome.winners.as_slice() {
            [winner] => {
                if let Some(w) = tally.wins.get_mut(&outcome.seats[*winner]) {
                    *w += 1;
                }
            }
            _ => tally.draws += 1,
        }
    }

    tracing::info!(games = num_games, draws = tally.draws, "arena finished");
    Ok(tally)
}
