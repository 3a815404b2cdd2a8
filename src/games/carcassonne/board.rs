//! Board logic: cell-id packing, neighbourhoods, placement validation and the
//! frontier of placeable cells.
//!
//! Cell ids pack `(col, row)` into 12 bits each with a bias of 2^11, so the
//! usable range is `-2048..=2047` on both axes. Games never get near it; going
//! beyond it is a known limit and is not checked.

use std::collections::{BTreeSet, HashMap};

use super::tiles::InGameCard;
use super::types::*;

const CELL_BITS: u32 = 12;
const CELL_BIAS: i32 = 1 << (CELL_BITS - 1);
const CELL_MASK: u32 = (1 << CELL_BITS) - 1;

/// Pack coordinates into a scalar cell id.
#[inline]
pub fn cell_id(coords: Coords) -> CellId {
    let col = (coords.col + CELL_BIAS) as u32 & CELL_MASK;
    let row = (coords.row + CELL_BIAS) as u32 & CELL_MASK;
    CellId((row << CELL_BITS) | col)
}

/// Inverse of [`cell_id`].
#[inline]
pub fn coords(id: CellId) -> Coords {
    let col = (id.0 & CELL_MASK) as i32 - CELL_BIAS;
    let row = ((id.0 >> CELL_BITS) & CELL_MASK) as i32 - CELL_BIAS;
    Coords::new(col, row)
}

/// Orthogonal neighbours clockwise from north, each with the side index that
/// addresses the shared edge on the centre tile.
pub fn neighbors(center: Coords) -> [(usize, Coords); 4] {
    [
        (NORTH, center.neighbor(NORTH)),
        (EAST, center.neighbor(EAST)),
        (SOUTH, center.neighbor(SOUTH)),
        (WEST, center.neighbor(WEST)),
    ]
}

/// The 8 cells around `center` (orthogonal and diagonal).
pub fn neighbors8(center: Coords) -> [Coords; 8] {
    let Coords { col, row } = center;
    [
        Coords::new(col - 1, row - 1),
        Coords::new(col, row - 1),
        Coords::new(col + 1, row - 1),
        Coords::new(col + 1, row),
        Coords::new(col + 1, row + 1),
        Coords::new(col, row + 1),
        Coords::new(col - 1, row + 1),
        Coords::new(col - 1, row),
    ]
}

/// Check if `card` (in its current orientation) fits at `target`.
///
/// Rules:
/// 1. The cell must be empty
/// 2. Every edge touching an occupied neighbour must have the same type
///
/// A missing neighbour imposes no constraint.
pub fn can_place(zones: &HashMap<CellId, Zone>, card: &InGameCard, target: Coords) -> bool {
    if zones.contains_key(&cell_id(target)) {
        return false;
    }

    for (side, neighbor) in neighbors(target) {
        let Some(zone) = zones.get(&cell_id(neighbor)) else {
            continue;
        };
        if zone.card.edges[opposite_side(side)] != card.edges[side] {
            return false;
        }
    }
    true
}

/// Check if any orientation of `card` fits anywhere on the frontier.
pub fn has_valid_placement(
    zones: &HashMap<CellId, Zone>,
    potential_zones: &BTreeSet<CellId>,
    card: &InGameCard,
) -> bool {
    let orientations = card.orientations();
    potential_zones.iter().any(|&id| {
        let target = coords(id);
        orientations.iter().any(|c| can_place(zones, c, target))
    })
}

/// Move `placed` from the frontier to the occupied set's border: drop it and
/// add every empty orthogonal neighbour.
pub fn expand_frontier(
    zones: &HashMap<CellId, Zone>,
    potential_zones: &mut BTreeSet<CellId>,
    placed: Coords,
) {
    potential_zones.remove(&cell_id(placed));
    for (_, neighbor) in neighbors(placed) {
        let id = cell_id(neighbor);
        if !zones.contains_key(&id) {
            potential_zones.insert(id);
        }
    }
}

/// Recalculate the frontier from scratch.
pub fn recalculate_frontier(zones: &HashMap<CellId, Zone>) -> BTreeSet<CellId> {
    let mut frontier = BTreeSet::new();
    for zone in zones.values() {
        for (_, neighbor) in neighbors(zone.coords) {
            let id = cell_id(neighbor);
            if !zones.contains_key(&id) {
                frontier.insert(id);
            }
        }
    }
    frontier
}

/// Number of occupied cells among the 8 around `center`.
pub fn occupied_around(zones: &HashMap<CellId, Zone>, center: Coords) -> usize {
    neighbors8(center)
        .iter()
        .filter(|c| zones.contains_key(&cell_id(**c)))
        .count()
}
