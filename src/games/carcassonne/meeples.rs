//! Peasant placement validation and return logic.

use std::collections::HashMap;

use super::board::coords;
use super::error::GameError;
use super::features::{walk_region, BoardView, WalkMode};
use super::tiles::InGameCard;
use super::types::*;

/// Check if `player_index` may put a peasant on `place` of `card`, which is
/// about to be laid at `at`.
///
/// Rules:
/// 1. The place exists on the tile (a union index in range, or `Center` on a cloister)
/// 2. The player has at least 1 peasant left
/// 3. The region the union belongs to has no peasants on it
pub fn can_place_peasant(
    zones: &HashMap<CellId, Zone>,
    players: &[Player],
    player_index: usize,
    card: &InGameCard,
    at: Coords,
    place: PeasantPlace,
) -> Result<(), GameError> {
    match place {
        PeasantPlace::Center if !card.has_cloister => return Err(GameError::InvalidPeasantPlace),
        PeasantPlace::Union(idx) if idx >= card.unions.len() => {
            return Err(GameError::InvalidPeasantPlace)
        }
        _ => {}
    }

    let available = players.get(player_index).map_or(0, |p| p.peasants_count);
    if available == 0 {
        return Err(GameError::NoWorkersAvailable { player_index });
    }

    if let PeasantPlace::Union(idx) = place {
        let view = BoardView::with_candidate(zones, at, card, None);
        if let Some(region) = walk_region(&view, at, idx, WalkMode::Probe)? {
            if region.has_peasants() {
                return Err(GameError::RegionClaimed);
            }
        }
    }
    Ok(())
}

/// Clear the listed peasants from their zones and give them back to their
/// owners.
pub fn return_peasants(
    zones: &mut HashMap<CellId, Zone>,
    players: &mut [Player],
    peasants: &[(CellId, usize)],
) -> Vec<ReturnedPeasant> {
    let mut returned = Vec::with_capacity(peasants.len());
    for &(cell, player_index) in peasants {
        let Some(zone) = zones.get_mut(&cell) else {
            continue;
        };
        if zone.peasant.take().is_none() {
            continue;
        }
        if let Some(player) = players.get_mut(player_index) {
            player.peasants_count += 1;
        }
        returned.push(ReturnedPeasant {
            player_index,
            coords: coords(cell),
        });
    }
    returned
}

/// Number of `player_index`'s peasants currently on the board.
pub fn peasants_on_board(zones: &HashMap<CellId, Zone>, player_index: usize) -> usize {
    zones
        .values()
        .filter(|z| z.peasant.is_some_and(|p| p.player_index == player_index))
        .count()
}

/// Peasant positions for one player, in cell-id order.
pub fn peasant_positions(zones: &HashMap<CellId, Zone>, player_index: usize) -> Vec<(Coords, PeasantPlace)> {
    let mut found: Vec<(CellId, PeasantPlace)> = zones
        .iter()
        .filter_map(|(&id, z)| match z.peasant {
            Some(p) if p.player_index == player_index => Some((id, p.place)),
            _ => None,
        })
        .collect();
    found.sort_by_key(|(id, _)| *id);
    found.into_iter().map(|(id, place)| (coords(id), place)).collect()
}
