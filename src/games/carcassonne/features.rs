//! Region traversal: walking unions across the board, completion detection
//! for towns, roads and cloisters.
//!
//! A region is explored as a depth-first search over `(cell, edge)` nodes.
//! Arcs join edges of the same union on one tile and facing edges of adjacent
//! tiles. A stop barrier of already-entered `(cell, edge)` pairs keeps every
//! union from being entered twice, which also terminates rings.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::board::{cell_id, coords, neighbors8, occupied_around};
use super::error::GameError;
use super::meeples::return_peasants;
use super::scoring::{award, leaders, CLOISTER_POINTS};
use super::tiles::InGameCard;
use super::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Give up at the first open edge; only closed regions come back.
    Complete,
    /// Count open edges and keep walking the rest of the region.
    Probe,
}

/// Read access to the board, optionally with one not-yet-placed tile on it.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    zones: &'a HashMap<CellId, Zone>,
    candidate: Option<Candidate<'a>>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    cell: CellId,
    card: &'a InGameCard,
    peasant: Option<Peasant>,
}

impl<'a> BoardView<'a> {
    pub fn new(zones: &'a HashMap<CellId, Zone>) -> Self {
        Self {
            zones,
            candidate: None,
        }
    }

    /// A view with `card` laid at `at`, carrying `peasant` if given.
    pub fn with_candidate(
        zones: &'a HashMap<CellId, Zone>,
        at: Coords,
        card: &'a InGameCard,
        peasant: Option<Peasant>,
    ) -> Self {
        Self {
            zones,
            candidate: Some(Candidate {
                cell: cell_id(at),
                card,
                peasant,
            }),
        }
    }

    #[inline]
    pub fn tile_at(&self, cell: CellId) -> Option<(&'a InGameCard, Option<Peasant>)> {
        if let Some(c) = self.candidate {
            if c.cell == cell {
                return Some((c.card, c.peasant));
            }
        }
        self.zones.get(&cell).map(|z| (&z.card, z.peasant))
    }

    pub fn is_occupied(&self, cell: CellId) -> bool {
        self.tile_at(cell).is_some()
    }
}

/// One road or town region as seen from a starting union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub kind: UnionKind,
    /// Distinct tiles taking part.
    pub cells: BTreeSet<CellId>,
    /// Prime-town tiles among `cells`.
    pub prime_tiles: usize,
    /// Every `(cell, union index)` entered.
    pub unions: BTreeSet<(CellId, usize)>,
    /// Peasants standing on the region: `(cell, player_index)`.
    pub peasants: Vec<(CellId, usize)>,
    /// Peasant count per player.
    pub tally: BTreeMap<usize, u32>,
    /// Edges leading to empty cells. Always 0 in `Complete` mode.
    pub open_edges: usize,
}

impl Region {
    fn new(kind: UnionKind) -> Self {
        Self {
            kind,
            cells: BTreeSet::new(),
            prime_tiles: 0,
            unions: BTreeSet::new(),
            peasants: Vec::new(),
            tally: BTreeMap::new(),
            open_edges: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.open_edges == 0
    }

    pub fn has_peasants(&self) -> bool {
        !self.peasants.is_empty()
    }

    pub fn tile_count(&self) -> usize {
        self.cells.len()
    }

    /// Region value summed per distinct tile.
    pub fn value(&self) -> UnionScore {
        let plain = (self.cells.len() - self.prime_tiles) as f64;
        UnionScore::base(self.kind, false).scaled(plain)
            + UnionScore::base(self.kind, true).scaled(self.prime_tiles as f64)
    }

    /// Points paid out when the region closes.
    pub fn complete_points(&self) -> u32 {
        self.value().complete as u32
    }

    /// Points paid out if the region is still open at the end.
    pub fn incomplete_points(&self) -> u32 {
        self.value().incomplete as u32
    }

    pub fn tiles(&self) -> Vec<Coords> {
        self.cells.iter().map(|&c| coords(c)).collect()
    }
}

struct Walker {
    region: Region,
    barrier: HashSet<(CellId, usize)>,
    worklist: Vec<(Coords, usize)>,
}

impl Walker {
    fn enter(
        &mut self,
        at: Coords,
        card: &InGameCard,
        peasant: Option<Peasant>,
        union_index: usize,
        arrived_from: Option<usize>,
    ) {
        let cell = cell_id(at);
        let region = &mut self.region;
        if region.cells.insert(cell) && card.is_prime_town && region.kind == UnionKind::Town {
            region.prime_tiles += 1;
        }
        region.unions.insert((cell, union_index));

        if let Some(p) = peasant {
            if p.place == PeasantPlace::Union(union_index) {
                region.peasants.push((cell, p.player_index));
                *region.tally.entry(p.player_index).or_insert(0) += 1;
            }
        }

        for &side in &card.unions[union_index].sides {
            self.barrier.insert((cell, side));
            if Some(side) != arrived_from {
                self.worklist.push((at, side));
            }
        }
    }
}

/// Walk the region containing union `union_index` of the tile at `start`.
///
/// Returns `Ok(None)` when the start has no such union, or in `Complete`
/// mode when the region has an open edge.
pub fn walk_region(
    view: &BoardView<'_>,
    start: Coords,
    union_index: usize,
    mode: WalkMode,
) -> Result<Option<Region>, GameError> {
    let Some((card, peasant)) = view.tile_at(cell_id(start)) else {
        return Ok(None);
    };
    let Some(union) = card.unions.get(union_index) else {
        return Ok(None);
    };

    let mut walk = Walker {
        region: Region::new(union.kind),
        barrier: HashSet::new(),
        worklist: Vec::new(),
    };
    walk.enter(start, card, peasant, union_index, None);

    while let Some((from, side)) = walk.worklist.pop() {
        let to = from.neighbor(side);
        let to_cell = cell_id(to);
        let Some((next_card, next_peasant)) = view.tile_at(to_cell) else {
            match mode {
                WalkMode::Complete => return Ok(None),
                WalkMode::Probe => {
                    walk.region.open_edges += 1;
                    continue;
                }
            }
        };

        let arriving = opposite_side(side);
        if walk.barrier.contains(&(to_cell, arriving)) {
            continue;
        }

        let next_index = match next_card.union_index_at(arriving) {
            Some(idx) if next_card.unions[idx].kind == walk.region.kind => idx,
            _ => {
                tracing::error!(
                    card_type_id = next_card.card_type_id,
                    side = arriving,
                    at = %to,
                    "edge belongs to no matching union"
                );
                return Err(GameError::MalformedTile {
                    card_type_id: next_card.card_type_id,
                    side: arriving,
                });
            }
        };

        walk.enter(to, next_card, next_peasant, next_index, Some(arriving));
    }

    Ok(Some(walk.region))
}

/// Probe every union of a tile. The result is indexed by union.
pub fn probe_unions(view: &BoardView<'_>, at: Coords) -> Result<Vec<Region>, GameError> {
    let Some((card, _)) = view.tile_at(cell_id(at)) else {
        return Ok(Vec::new());
    };
    let mut regions = Vec::with_capacity(card.unions.len());
    for idx in 0..card.unions.len() {
        if let Some(region) = walk_region(view, at, idx, WalkMode::Probe)? {
            regions.push(region);
        }
    }
    Ok(regions)
}

/// Find every region of `kind` closed by the tile just placed at `placed`,
/// pay out its leaders and send its peasants home.
pub fn complete_unions(
    zones: &mut HashMap<CellId, Zone>,
    players: &mut [Player],
    placed: Coords,
    kind: UnionKind,
) -> Result<Vec<ScoredRegion>, GameError> {
    let placed_cell = cell_id(placed);
    let mut closed: Vec<Region> = Vec::new();
    {
        let view = BoardView::new(zones);
        let Some((card, _)) = view.tile_at(placed_cell) else {
            return Ok(Vec::new());
        };
        for (idx, union) in card.unions.iter().enumerate() {
            if union.kind != kind {
                continue;
            }
            if closed.iter().any(|r| r.unions.contains(&(placed_cell, idx))) {
                continue;
            }
            if let Some(region) = walk_region(&view, placed, idx, WalkMode::Complete)? {
                closed.push(region);
            }
        }
    }

    let mut scored = Vec::new();
    for region in closed {
        if !region.has_peasants() {
            tracing::debug!(kind = ?kind, tiles = region.tile_count(), "region closed without peasants");
            continue;
        }
        let winners = leaders(&region.tally);
        let points = region.complete_points();
        award(players, &winners, points);
        let returned = return_peasants(zones, players, &region.peasants);

        tracing::debug!(
            kind = ?kind,
            tiles = region.tile_count(),
            points,
            winners = ?winners,
            "region completed"
        );

        scored.push(ScoredRegion {
            kind: kind.into(),
            tiles: region.tiles(),
            points,
            winners,
            returned,
        });
    }
    Ok(scored)
}

/// Check the placed tile and its 8 neighbours for cloisters that are now
/// surrounded. Each one holding a centre peasant pays its owner.
pub fn complete_cloisters(
    zones: &mut HashMap<CellId, Zone>,
    players: &mut [Player],
    placed: Coords,
) -> Vec<ScoredRegion> {
    let mut to_check = vec![placed];
    to_check.extend(neighbors8(placed));

    let mut scored = Vec::new();
    for at in to_check {
        let owner = match zones.get(&cell_id(at)) {
            Some(zone) if zone.card.has_cloister => match zone.peasant {
                Some(p) if p.place == PeasantPlace::Center => p.player_index,
                _ => continue,
            },
            _ => continue,
        };
        if occupied_around(zones, at) < 8 {
            continue;
        }

        let winners = vec![owner];
        award(players, &winners, CLOISTER_POINTS);
        let returned = return_peasants(zones, players, &[(cell_id(at), owner)]);

        tracing::debug!(at = %at, owner, "cloister completed");

        let mut tiles = vec![at];
        tiles.extend(neighbors8(at));
        scored.push(ScoredRegion {
            kind: RegionKind::Cloister,
            tiles,
            points: CLOISTER_POINTS,
            winners,
            returned,
        });
    }
    scored
}
