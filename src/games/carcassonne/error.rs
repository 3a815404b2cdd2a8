use thiserror::Error;

use super::types::Coords;

/// Errors reported by the game engine. State is validated before it is
/// touched, so every variant except `MalformedTile` leaves the game as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("tile does not fit at {coords}")]
    InvalidPlacement { coords: Coords },

    #[error("player {player_index} has no peasants left")]
    NoWorkersAvailable { player_index: usize },

    #[error("card pool is empty")]
    EmptyPool,

    #[error("expected card type {expected}, got {found}")]
    UnexpectedCard { expected: u8, found: u8 },

    #[error("peasant place does not exist on this tile")]
    InvalidPeasantPlace,

    #[error("region already has a peasant on it")]
    RegionClaimed,

    #[error("card type {0} is not in the pool")]
    CardNotInPool(u8),

    #[error("a game needs 1 to 5 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("tile type {card_type_id} has no union on side {side}")]
    MalformedTile { card_type_id: u8, side: usize },
}
