//! Carcassonne-style tile placement: catalog, board, region scoring, turn
//! evaluation and game state.

pub mod board;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod game;
pub mod meeples;
pub mod scoring;
pub mod snapshot;
pub mod tiles;
pub mod types;

pub use error::GameError;
pub use evaluator::{fit_next_card, possible_turns, PossibleTurn, ScoringWeights};
pub use game::{GameState, PlayerSetup, TurnReport};
