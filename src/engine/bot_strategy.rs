//! Turn strategy trait and implementations.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::games::carcassonne::evaluator::{fit_next_card, possible_turns, PossibleTurn, ScoringWeights};
use crate::games::carcassonne::{GameError, GameState};

/// A strategy picks a turn for the active player, or `None` when the next
/// card fits nowhere.
pub trait TurnStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn choose_turn(&self, state: &GameState, rng: &mut StdRng) -> Result<Option<PossibleTurn>, GameError>;
}

/// Picks a uniformly random legal turn.
pub struct RandomStrategy;

impl TurnStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_turn(&self, state: &GameState, rng: &mut StdRng) -> Result<Option<PossibleTurn>, GameError> {
        let turns = possible_turns(state, &ScoringWeights::default())?;
        Ok(turns.choose(rng).cloned())
    }
}

/// Plays a top-ranked turn under the given weights.
pub struct BestTurnStrategy {
    pub weights: ScoringWeights,
}

impl BestTurnStrategy {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

impl TurnStrategy for BestTurnStrategy {
    fn name(&self) -> &str {
        "best"
    }

    fn choose_turn(&self, state: &GameState, rng: &mut StdRng) -> Result<Option<PossibleTurn>, GameError> {
        fit_next_card(state, &self.weights, rng)
    }
}

/// Build a strategy from its CLI name: "best" or "random".
pub fn strategy_by_name(name: &str, weights: ScoringWeights) -> Option<Box<dyn TurnStrategy>> {
    match name {
        "best" => Some(Box::new(BestTurnStrategy::new(weights))),
        "random" => Some(Box::new(RandomStrategy)),
        _ => None,
    }
}
