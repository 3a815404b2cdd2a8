//! Turn enumeration and the heuristic used to rank candidate turns.
//!
//! Every legal `(orientation, cell, peasant option)` triple gets a
//! `UnionScore` estimate. The weights are tuning knobs, not rules; the
//! presets below are starting points for arena experiments.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{can_place, cell_id, coords, neighbors8, occupied_around};
use super::error::GameError;
use super::features::{probe_unions, walk_region, BoardView, Region, WalkMode};
use super::game::GameState;
use super::scoring::{leaders, CLOISTER_POINTS};
use super::tiles::InGameCard;
use super::types::*;

/// Tunable parameters for the turn heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Factor on the tile's own value when the player alone leads the region.
    pub sole_leader: f64,
    /// Factor when the player shares the lead.
    pub tied_leader: f64,
    /// Factor when nobody holds the region.
    pub unclaimed: f64,
    /// Subtracted factor when someone else leads.
    pub enemy_penalty: f64,
    /// Factor on the rest of a region claimed by this turn's peasant.
    pub contest_bonus: f64,
    /// Subtracted factor on the rest of a region extended for a rival.
    pub enemy_region_penalty: f64,
    /// Per step an own cloister moves towards completion.
    pub friendly_cloister: f64,
    /// Subtracted per step a rival cloister moves towards completion.
    pub enemy_cloister: f64,
    /// Charged on both components when the turn spends a peasant.
    pub peasant_cost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    sole_leader: 2.0,
    tied_leader: 0.5,
    unclaimed: 0.25,
    enemy_penalty: 1.0,
    contest_bonus: 1.5,
    enemy_region_penalty: 0.25,
    friendly_cloister: 1.0,
    enemy_cloister: 1.0,
    peasant_cost: 0.5,
};

pub static AGGRESSIVE_WEIGHTS: ScoringWeights = ScoringWeights {
    sole_leader: 2.5,
    tied_leader: 1.0,
    unclaimed: 0.25,
    enemy_penalty: 0.5,
    contest_bonus: 2.0,
    enemy_region_penalty: 0.1,
    friendly_cloister: 1.0,
    enemy_cloister: 0.5,
    peasant_cost: 0.25,
};

pub static CAUTIOUS_WEIGHTS: ScoringWeights = ScoringWeights {
    sole_leader: 2.0,
    tied_leader: 0.25,
    unclaimed: 0.25,
    enemy_penalty: 1.5,
    contest_bonus: 1.0,
    enemy_region_penalty: 0.5,
    friendly_cloister: 1.0,
    enemy_cloister: 1.5,
    peasant_cost: 1.0,
};

/// Resolve a named preset: "default", "aggressive" or "cautious".
pub fn weights_for_preset(name: &str) -> Option<ScoringWeights> {
    match name {
        "default" => Some(DEFAULT_WEIGHTS),
        "aggressive" => Some(AGGRESSIVE_WEIGHTS),
        "cautious" => Some(CAUTIOUS_WEIGHTS),
        _ => None,
    }
}

/// One legal turn for the next card with its heuristic value.
#[derive(Debug, Clone, PartialEq)]
pub struct PossibleTurn {
    pub card: InGameCard,
    pub coords: Coords,
    pub peasant_place: Option<PeasantPlace>,
    pub score: UnionScore,
}

impl PossibleTurn {
    #[inline]
    pub fn total(&self) -> f64 {
        self.score.total()
    }

    #[inline]
    pub fn cell(&self) -> CellId {
        cell_id(self.coords)
    }
}

const TIE_EPSILON: f64 = 1e-9;

/// Every legal turn for the next card, best first.
///
/// Ranked by `complete + incomplete` descending, then cell id ascending, then
/// enumeration order.
pub fn possible_turns(state: &GameState, weights: &ScoringWeights) -> Result<Vec<PossibleTurn>, GameError> {
    let next = state.next_card().ok_or(GameError::EmptyPool)?;
    let player_index = state.active_player_index;
    let has_worker = state
        .players
        .get(player_index)
        .is_some_and(|p| p.peasants_count > 0);

    let mut turns = Vec::new();
    for card in next.orientations() {
        for &cell in &state.potential_zones {
            let at = coords(cell);
            if !can_place(&state.zones, &card, at) {
                continue;
            }
            for place in peasant_options(&state.zones, &card, at, has_worker)? {
                let score = evaluate_turn(&state.zones, player_index, &card, at, place, weights)?;
                turns.push(PossibleTurn {
                    card: card.clone(),
                    coords: at,
                    peasant_place: place,
                    score,
                });
            }
        }
    }

    turns.sort_by(|a, b| match b.total().total_cmp(&a.total()) {
        Ordering::Equal => a.cell().cmp(&b.cell()),
        other => other,
    });
    Ok(turns)
}

/// Pick a top-ranked turn, breaking ties uniformly at random.
/// `Ok(None)` when the next card fits nowhere.
pub fn fit_next_card<G: Rng + ?Sized>(
    state: &GameState,
    weights: &ScoringWeights,
    rng: &mut G,
) -> Result<Option<PossibleTurn>, GameError> {
    let mut turns = possible_turns(state, weights)?;
    let Some(best) = turns.first().map(PossibleTurn::total) else {
        return Ok(None);
    };
    turns.retain(|t| (best - t.total()).abs() < TIE_EPSILON);
    Ok(turns.choose(rng).cloned())
}

/// Peasant options for a placement: none, each unclaimed union, the centre.
fn peasant_options(
    zones: &HashMap<CellId, Zone>,
    card: &InGameCard,
    at: Coords,
    has_worker: bool,
) -> Result<Vec<Option<PeasantPlace>>, GameError> {
    let mut options = vec![None];
    if !has_worker {
        return Ok(options);
    }
    let view = BoardView::with_candidate(zones, at, card, None);
    for (idx, region) in probe_unions(&view, at)?.iter().enumerate() {
        if !region.has_peasants() {
            options.push(Some(PeasantPlace::Union(idx)));
        }
    }
    if card.has_cloister {
        options.push(Some(PeasantPlace::Center));
    }
    Ok(options)
}

/// Heuristic value of laying `card` at `at` with an optional peasant.
pub fn evaluate_turn(
    zones: &HashMap<CellId, Zone>,
    player_index: usize,
    card: &InGameCard,
    at: Coords,
    place: Option<PeasantPlace>,
    weights: &ScoringWeights,
) -> Result<UnionScore, GameError> {
    let peasant = place.map(|place| Peasant { player_index, place });
    let view = BoardView::with_candidate(zones, at, card, peasant);
    let mut score = UnionScore::ZERO;

    for (idx, union) in card.unions.iter().enumerate() {
        let Some(region) = walk_region(&view, at, idx, WalkMode::Probe)? else {
            continue;
        };
        let own = UnionScore::base(union.kind, card.is_prime_town && union.kind == UnionKind::Town);
        score += own.scaled(standing(&region.tally, player_index, weights));
        score += attachment(&region, own, player_index, place == Some(PeasantPlace::Union(idx)), weights);
    }

    score += cloister_steps(zones, player_index, at, weights);

    if place == Some(PeasantPlace::Center) {
        let around = occupied_around(zones, at) as f64;
        score += UnionScore::new(CLOISTER_POINTS as f64, 1.0 + around);
    }

    if place.is_some() {
        score -= UnionScore::new(weights.peasant_cost, weights.peasant_cost);
    }
    Ok(score)
}

fn standing(tally: &BTreeMap<usize, u32>, player_index: usize, weights: &ScoringWeights) -> f64 {
    let winners = leaders(tally);
    if winners.is_empty() {
        weights.unclaimed
    } else if !winners.contains(&player_index) {
        -weights.enemy_penalty
    } else if winners.len() == 1 {
        weights.sole_leader
    } else {
        weights.tied_leader
    }
}

/// Value of joining an existing region, apart from the tile itself.
fn attachment(
    region: &Region,
    own: UnionScore,
    player_index: usize,
    claimed_here: bool,
    weights: &ScoringWeights,
) -> UnionScore {
    if region.tile_count() < 2 {
        return UnionScore::ZERO;
    }
    let rest = region.value() - own;
    if claimed_here && region.peasants.len() == 1 {
        return rest.scaled(weights.contest_bonus);
    }
    let winners = leaders(&region.tally);
    if !winners.is_empty() && !winners.contains(&player_index) {
        return rest.scaled(-weights.enemy_region_penalty);
    }
    UnionScore::ZERO
}

/// Progress the candidate gives to occupied cloisters around it.
fn cloister_steps(
    zones: &HashMap<CellId, Zone>,
    player_index: usize,
    at: Coords,
    weights: &ScoringWeights,
) -> UnionScore {
    let mut score = UnionScore::ZERO;
    for around in neighbors8(at) {
        let owner = match zones.get(&cell_id(around)) {
            Some(zone) if zone.card.has_cloister => match zone.peasant {
                Some(p) if p.place == PeasantPlace::Center => p.player_index,
                _ => continue,
            },
            _ => continue,
        };
        let filled = occupied_around(zones, around) + 1;
        let step = if filled == 8 {
            UnionScore::new(CLOISTER_POINTS as f64, 0.0)
        } else {
            UnionScore::new(0.0, 1.0)
        };
        let factor = if owner == player_index {
            weights.friendly_cloister
        } else {
            -weights.enemy_cloister
        };
        score += step.scaled(factor);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::carcassonne::game::PlayerSetup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn new_game(players: usize, seed: u64) -> GameState {
        let setup: Vec<PlayerSetup> = (0..players).map(|i| PlayerSetup::new(format!("p{i}"))).collect();
        GameState::new(&setup, 7, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_possible_turns_are_legal() {
        let state = new_game(2, 11);
        let turns = possible_turns(&state, &ScoringWeights::default()).unwrap();
        assert!(!turns.is_empty());
        for t in &turns {
            assert!(state.potential_zones.contains(&t.cell()));
            assert!(can_place(&state.zones, &t.card, t.coords));
        }
    }

    #[test]
    fn test_possible_turns_sorted() {
        let state = new_game(2, 5);
        let turns = possible_turns(&state, &ScoringWeights::default()).unwrap();
        for pair in turns.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.total() >= b.total());
            if a.total() == b.total() {
                assert!(a.cell() <= b.cell());
            }
        }
    }

    #[test]
    fn test_no_peasant_options_without_workers() {
        let mut state = new_game(1, 3);
        state.players[0].peasants_count = 0;
        let turns = possible_turns(&state, &ScoringWeights::default()).unwrap();
        assert!(!turns.is_empty());
        assert!(turns.iter().all(|t| t.peasant_place.is_none()));
    }

    #[test]
    fn test_empty_pool() {
        let mut state = new_game(1, 3);
        state.card_pool.clear();
        assert_eq!(possible_turns(&state, &ScoringWeights::default()), Err(GameError::EmptyPool));
    }

    #[test]
    fn test_fit_next_card_reproducible() {
        let state = new_game(3, 21);
        let weights = ScoringWeights::default();
        let a = fit_next_card(&state, &weights, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = fit_next_card(&state, &weights, &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_next_card_picks_a_top_turn() {
        let state = new_game(2, 8);
        let weights = ScoringWeights::default();
        let turns = possible_turns(&state, &weights).unwrap();
        let best = turns[0].total();
        for seed in 0..5 {
            let pick = fit_next_card(&state, &weights, &mut StdRng::seed_from_u64(seed)).unwrap().unwrap();
            assert!((pick.total() - best).abs() < TIE_EPSILON);
        }
    }

    #[test]
    fn test_claimed_union_not_offered() {
        let mut state = new_game(2, 4);
        // Claim the starting tile's road, then make the next card a straight road.
        state.zones.get_mut(&cell_id(Coords::ORIGIN)).unwrap().peasant = Some(Peasant {
            player_index: 1,
            place: PeasantPlace::Union(1),
        });
        state.card_pool.push(InGameCard::new(2, 0).unwrap());
        let turns = possible_turns(&state, &ScoringWeights::default()).unwrap();
        let east = Coords::new(1, 0);
        let road_east: Vec<_> = turns
            .iter()
            .filter(|t| t.coords == east && t.card.orientation == 0)
            .collect();
        assert!(!road_east.is_empty());
        assert!(road_east.iter().all(|t| t.peasant_place.is_none()));
    }

    #[test]
    fn test_own_region_beats_rival_region() {
        let mut zones = HashMap::new();
        zones.insert(
            cell_id(Coords::ORIGIN),
            Zone {
                card: InGameCard::new(2, 0).unwrap(),
                coords: Coords::ORIGIN,
                peasant: Some(Peasant {
                    player_index: 0,
                    place: PeasantPlace::Union(0),
                }),
                turn: 0,
                placed_by: None,
            },
        );
        let card = InGameCard::new(2, 0).unwrap();
        let w = ScoringWeights::default();
        let mine = evaluate_turn(&zones, 0, &card, Coords::new(1, 0), None, &w).unwrap();
        let theirs = evaluate_turn(&zones, 1, &card, Coords::new(1, 0), None, &w).unwrap();
        assert!(mine.total() > theirs.total());
        assert_eq!(mine, UnionScore::new(2.0, 2.0));
    }

    #[test]
    fn test_center_option_value() {
        let zones = HashMap::new();
        let card = InGameCard::new(5, 0).unwrap();
        let w = ScoringWeights::default();
        let score = evaluate_turn(&zones, 0, &card, Coords::ORIGIN, Some(PeasantPlace::Center), &w).unwrap();
        assert_eq!(score, UnionScore::new(9.0 - 0.5, 1.0 - 0.5));
    }

    #[test]
    fn test_presets() {
        assert_eq!(weights_for_preset("default"), Some(ScoringWeights::default()));
        assert!(weights_for_preset("aggressive").is_some());
        assert!(weights_for_preset("cautious").is_some());
        assert!(weights_for_preset("reckless").is_none());
    }
}
