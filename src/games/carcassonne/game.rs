//! Game state and the mutations a session applies to it.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{can_place, cell_id, expand_frontier, has_valid_placement, recalculate_frontier};
use super::error::GameError;
use super::features::{complete_cloisters, complete_unions};
use super::meeples::{can_place_peasant, peasants_on_board};
use super::scoring::{final_scores, score_end_game, EndGameBreakdown};
use super::tiles::{build_card_pool, InGameCard, STARTING_TILE_ID};
use super::types::*;

pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 5;
pub const DEFAULT_PEASANTS_PER_PLAYER: u32 = 7;

/// A seat at the table before the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// What one `apply_turn` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    pub player_index: usize,
    pub card_type_id: u8,
    pub orientation: u8,
    pub coords: Coords,
    pub peasant_place: Option<PeasantPlace>,
    /// Regions closed by this turn, towns first, then roads, then cloisters.
    pub scored: Vec<ScoredRegion>,
}

impl TurnReport {
    pub fn returned_peasants(&self) -> impl Iterator<Item = &ReturnedPeasant> {
        self.scored.iter().flat_map(|r| r.returned.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub zones: HashMap<CellId, Zone>,
    /// Empty cells orthogonally adjacent to a placed tile.
    pub potential_zones: BTreeSet<CellId>,
    /// Draw pile; the last card is played next.
    pub card_pool: Vec<InGameCard>,
    pub players: Vec<Player>,
    pub active_player_index: usize,
    pub turn: u32,
    pub peasants_per_player: u32,
}

impl GameState {
    /// Seat the players, shuffle the pool and lay the starting tile at the origin.
    pub fn new<G: Rng + ?Sized>(
        setup: &[PlayerSetup],
        peasants_per_player: u32,
        rng: &mut G,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&setup.len()) {
            return Err(GameError::InvalidPlayerCount(setup.len()));
        }

        let players = setup
            .iter()
            .zip(Color::SEATS)
            .map(|(seat, color)| Player {
                name: seat.name.clone(),
                color,
                score: 0,
                peasants_count: peasants_per_player,
            })
            .collect();

        let start = InGameCard::new(STARTING_TILE_ID, 0).ok_or(GameError::CardNotInPool(STARTING_TILE_ID))?;
        let mut zones = HashMap::new();
        zones.insert(
            cell_id(Coords::ORIGIN),
            Zone {
                card: start,
                coords: Coords::ORIGIN,
                peasant: None,
                turn: 0,
                placed_by: None,
            },
        );
        let potential_zones = recalculate_frontier(&zones);
        let card_pool = build_card_pool(rng);

        tracing::info!(
            players = setup.len(),
            pool = card_pool.len(),
            peasants_per_player,
            "game created"
        );

        Ok(Self {
            zones,
            potential_zones,
            card_pool,
            players,
            active_player_index: 0,
            turn: 0,
            peasants_per_player,
        })
    }

    pub fn next_card(&self) -> Option<&InGameCard> {
        self.card_pool.last()
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.active_player_index]
    }

    /// The pool is empty. Callers decide what that means for the game.
    pub fn is_pool_exhausted(&self) -> bool {
        self.card_pool.is_empty()
    }

    /// Whether the next card fits anywhere in any orientation.
    pub fn next_card_fits(&self) -> bool {
        self.next_card()
            .is_some_and(|card| has_valid_placement(&self.zones, &self.potential_zones, card))
    }

    pub fn zone_at(&self, at: Coords) -> Option<&Zone> {
        self.zones.get(&cell_id(at))
    }

    /// Lay `tile` at `coords`, optionally with a peasant, and score whatever
    /// it closes. Nothing changes if an error is returned.
    pub fn apply_turn(
        &mut self,
        tile: &InGameCard,
        coords: Coords,
        peasant_place: Option<PeasantPlace>,
    ) -> Result<TurnReport, GameError> {
        let next = self.card_pool.last().ok_or(GameError::EmptyPool)?;
        if !is_rotation_of(tile, next) {
            return Err(GameError::UnexpectedCard {
                expected: next.card_type_id,
                found: tile.card_type_id,
            });
        }

        let cell = cell_id(coords);
        if !self.potential_zones.contains(&cell) || !can_place(&self.zones, tile, coords) {
            return Err(GameError::InvalidPlacement { coords });
        }

        let player_index = self.active_player_index;
        if let Some(place) = peasant_place {
            can_place_peasant(&self.zones, &self.players, player_index, tile, coords, place)?;
        }

        // Validated; mutate from here on.
        let peasant = peasant_place.map(|place| Peasant { player_index, place });
        if peasant.is_some() {
            self.players[player_index].peasants_count -= 1;
        }
        self.turn += 1;
        self.zones.insert(
            cell,
            Zone {
                card: tile.clone(),
                coords,
                peasant,
                turn: self.turn,
                placed_by: Some(player_index),
            },
        );
        expand_frontier(&self.zones, &mut self.potential_zones, coords);
        self.card_pool.pop();
        self.active_player_index = (self.active_player_index + 1) % self.players.len();

        tracing::info!(
            turn = self.turn,
            player = player_index,
            card = tile.card_type_id,
            orientation = tile.orientation,
            at = %coords,
            peasant = ?peasant_place,
            "tile placed"
        );

        let mut scored = complete_unions(&mut self.zones, &mut self.players, coords, UnionKind::Town)?;
        scored.extend(complete_unions(&mut self.zones, &mut self.players, coords, UnionKind::Road)?);
        scored.extend(complete_cloisters(&mut self.zones, &mut self.players, coords));

        for region in &scored {
            tracing::info!(
                turn = self.turn,
                kind = ?region.kind,
                points = region.points,
                winners = ?region.winners,
                "region scored"
            );
        }

        Ok(TurnReport {
            turn: self.turn,
            player_index,
            card_type_id: tile.card_type_id,
            orientation: tile.orientation,
            coords,
            peasant_place,
            scored,
        })
    }

    /// Move one pooled card of `card_type_id` to the top of the pool.
    pub fn choose_next_card(&mut self, card_type_id: u8) -> Result<(), GameError> {
        let pos = self
            .card_pool
            .iter()
            .rposition(|c| c.card_type_id == card_type_id)
            .ok_or(GameError::CardNotInPool(card_type_id))?;
        let card = self.card_pool.remove(pos);
        self.card_pool.push(card);
        tracing::debug!(card = card_type_id, "next card chosen");
        Ok(())
    }

    /// Drop the next card without placing it. The active player keeps the turn.
    pub fn discard_next_card(&mut self) -> Result<InGameCard, GameError> {
        let card = self.card_pool.pop().ok_or(GameError::EmptyPool)?;
        tracing::info!(card = card.card_type_id, remaining = self.card_pool.len(), "card discarded");
        Ok(card)
    }

    /// What each player would add if the game stopped now. Read-only.
    pub fn end_game_scores(&self) -> Result<Vec<EndGameBreakdown>, GameError> {
        score_end_game(&self.zones, self.players.len())
    }

    /// Current score plus the end-of-game projection, per player.
    pub fn final_scores(&self) -> Result<Vec<u32>, GameError> {
        final_scores(&self.zones, &self.players)
    }

    pub fn peasants_on_board(&self, player_index: usize) -> usize {
        peasants_on_board(&self.zones, player_index)
    }

    /// Recompute the frontier and compare it with the tracked one.
    pub fn frontier_is_consistent(&self) -> bool {
        recalculate_frontier(&self.zones) == self.potential_zones
    }
}

fn is_rotation_of(tile: &InGameCard, card: &InGameCard) -> bool {
    if tile.card_type_id != card.card_type_id {
        return false;
    }
    let steps = (4 + tile.orientation as usize - card.orientation as usize) % 4;
    card.rotated_by(steps) == *tile
}
