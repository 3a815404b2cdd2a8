//! Scoring rules shared by region completion and the end-of-game projection.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::board::{cell_id, coords, occupied_around};
use super::error::GameError;
use super::features::{walk_region, BoardView, WalkMode};
use super::types::*;

/// A surrounded cloister pays this much.
pub const CLOISTER_POINTS: u32 = 9;

/// Players holding the maximum peasant count in a region. Every tied player
/// is a winner.
pub fn leaders(tally: &BTreeMap<usize, u32>) -> Vec<usize> {
    let max_count = tally.values().copied().max().unwrap_or(0);
    if max_count == 0 {
        return Vec::new();
    }
    tally
        .iter()
        .filter(|(_, &count)| count == max_count)
        .map(|(&player, _)| player)
        .collect()
}

/// Give `points` to each winner in full.
pub fn award(players: &mut [Player], winners: &[usize], points: u32) {
    for &idx in winners {
        if let Some(player) = players.get_mut(idx) {
            player.score += points;
        }
    }
}

/// Points a player would add if the game stopped now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EndGameBreakdown {
    pub towns: u32,
    pub roads: u32,
    pub cloisters: u32,
}

impl EndGameBreakdown {
    pub fn total(&self) -> u32 {
        self.towns + self.roads + self.cloisters
    }

    fn add(&mut self, kind: RegionKind, points: u32) {
        match kind {
            RegionKind::Town => self.towns += points,
            RegionKind::Road => self.roads += points,
            RegionKind::Cloister => self.cloisters += points,
        }
    }
}

/// Value every peasant still on the board: open towns and roads at their
/// incomplete value, cloisters at 1 + occupied neighbours. Read-only.
pub fn score_end_game(
    zones: &HashMap<CellId, Zone>,
    player_count: usize,
) -> Result<Vec<EndGameBreakdown>, GameError> {
    let mut breakdown = vec![EndGameBreakdown::default(); player_count];
    let view = BoardView::new(zones);
    let mut seen: BTreeSet<(CellId, usize)> = BTreeSet::new();

    // Cell order keeps the projection stable across runs.
    let mut cells: Vec<CellId> = zones.keys().copied().collect();
    cells.sort_unstable();

    for cell in cells {
        let zone = &zones[&cell];
        let Some(peasant) = zone.peasant else {
            continue;
        };
        match peasant.place {
            PeasantPlace::Center => {
                let points = 1 + occupied_around(zones, zone.coords) as u32;
                if let Some(b) = breakdown.get_mut(peasant.player_index) {
                    b.add(RegionKind::Cloister, points);
                }
            }
            PeasantPlace::Union(idx) => {
                if seen.contains(&(cell, idx)) {
                    continue;
                }
                let Some(region) = walk_region(&view, coords(cell), idx, WalkMode::Probe)? else {
                    continue;
                };
                seen.extend(region.unions.iter().copied());
                let points = region.incomplete_points();
                for winner in leaders(&region.tally) {
                    if let Some(b) = breakdown.get_mut(winner) {
                        b.add(region.kind.into(), points);
                    }
                }
            }
        }
    }
    Ok(breakdown)
}

/// Final standings: current score plus the end-of-game projection.
pub fn final_scores(zones: &HashMap<CellId, Zone>, players: &[Player]) -> Result<Vec<u32>, GameError> {
    let projection = score_end_game(zones, players.len())?;
    Ok(players
        .iter()
        .zip(projection)
        .map(|(p, b)| p.score + b.total())
        .collect())
}

/// Whether the cloister at `at` is surrounded.
pub fn is_cloister_complete(zones: &HashMap<CellId, Zone>, at: Coords) -> bool {
    zones
        .get(&cell_id(at))
        .is_some_and(|z| z.card.has_cloister && occupied_around(zones, at) == 8)
}
