//! JSON snapshots of a game in progress.
//!
//! Cards are stored as `{card_type_id, orientation}` and rebuilt from the
//! catalog on load, so edges and unions always come from the built-in
//! definitions. Zones are an ordered `[cell_id, zone]` list.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{cell_id, recalculate_frontier};
use super::game::{GameState, MAX_PLAYERS, MIN_PLAYERS};
use super::tiles::InGameCard;
use super::types::*;

pub const SNAPSHOT_REVISION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot revision {found} is not supported (expected {expected})")]
    RevisionMismatch { found: u32, expected: u32 },

    #[error("unknown card type {0}")]
    UnknownCard(u8),

    #[error("inconsistent snapshot state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CardRecord {
    card_type_id: u8,
    orientation: u8,
}

impl CardRecord {
    fn from_card(card: &InGameCard) -> Self {
        Self {
            card_type_id: card.card_type_id,
            orientation: card.orientation,
        }
    }

    fn to_card(self) -> Result<InGameCard, SnapshotError> {
        InGameCard::new(self.card_type_id, self.orientation % 4).ok_or(SnapshotError::UnknownCard(self.card_type_id))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ZoneRecord {
    card: CardRecord,
    coords: Coords,
    peasant: Option<Peasant>,
    turn: u32,
    placed_by: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    zones: Vec<(CellId, ZoneRecord)>,
    potential_zones: Vec<CellId>,
    card_pool: Vec<CardRecord>,
    players: Vec<Player>,
    active_player_index: usize,
    turn: u32,
    peasants_per_player: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    revision: u32,
    state: StateRecord,
}

/// Serialize the state to a snapshot document.
pub fn to_snapshot_json(state: &GameState) -> Result<String, SnapshotError> {
    let mut zones: Vec<(CellId, ZoneRecord)> = state
        .zones
        .iter()
        .map(|(&id, z)| {
            (
                id,
                ZoneRecord {
                    card: CardRecord::from_card(&z.card),
                    coords: z.coords,
                    peasant: z.peasant,
                    turn: z.turn,
                    placed_by: z.placed_by,
                },
            )
        })
        .collect();
    zones.sort_by_key(|(id, _)| *id);

    let snapshot = Snapshot {
        revision: SNAPSHOT_REVISION,
        state: StateRecord {
            zones,
            potential_zones: state.potential_zones.iter().copied().collect(),
            card_pool: state.card_pool.iter().map(CardRecord::from_card).collect(),
            players: state.players.clone(),
            active_player_index: state.active_player_index,
            turn: state.turn,
            peasants_per_player: state.peasants_per_player,
        },
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Rebuild a state from a snapshot document.
pub fn from_snapshot_json(json: &str) -> Result<GameState, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    if snapshot.revision != SNAPSHOT_REVISION {
        return Err(SnapshotError::RevisionMismatch {
            found: snapshot.revision,
            expected: SNAPSHOT_REVISION,
        });
    }
    let record = snapshot.state;

    let seats = record.players.len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats) {
        return Err(SnapshotError::InvalidState(format!("{seats} players")));
    }
    if record.active_player_index >= seats {
        return Err(SnapshotError::InvalidState(format!(
            "active player {} of {seats}",
            record.active_player_index
        )));
    }

    let mut zones = HashMap::with_capacity(record.zones.len());
    for (id, z) in record.zones {
        if id != cell_id(z.coords) {
            tracing::warn!(cell = id.0, coords = %z.coords, "zone key disagrees with its coords, using coords");
        }
        zones.insert(
            cell_id(z.coords),
            Zone {
                card: z.card.to_card()?,
                coords: z.coords,
                peasant: z.peasant,
                turn: z.turn,
                placed_by: z.placed_by,
            },
        );
    }

    if zones.is_empty() {
        return Err(SnapshotError::InvalidState("no tiles on the board".into()));
    }
    let potential_zones: BTreeSet<CellId> = record.potential_zones.into_iter().collect();
    if potential_zones != recalculate_frontier(&zones) {
        return Err(SnapshotError::InvalidState("frontier does not match the board".into()));
    }

    let card_pool = record
        .card_pool
        .into_iter()
        .map(CardRecord::to_card)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GameState {
        zones,
        potential_zones,
        card_pool,
        players: record.players,
        active_player_index: record.active_player_index,
        turn: record.turn,
        peasants_per_player: record.peasants_per_player,
    })
}

pub fn save_snapshot(state: &GameState, path: &Path) -> Result<(), SnapshotError> {
    std::fs::write(path, to_snapshot_json(state)?)?;
    tracing::info!(path = %path.display(), turn = state.turn, "snapshot saved");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<GameState, SnapshotError> {
    let json = std::fs::read_to_string(path)?;
    let state = from_snapshot_json(&json)?;
    tracing::info!(path = %path.display(), turn = state.turn, "snapshot loaded");
    Ok(state)
}
