//! Scripted games driven through `GameState::apply_turn`.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use carcassonne_engine::games::carcassonne::board::{cell_id, recalculate_frontier};
use carcassonne_engine::games::carcassonne::tiles::{InGameCard, MONASTERY_ROAD_TILE_ID};
use carcassonne_engine::games::carcassonne::types::*;
use carcassonne_engine::games::carcassonne::{GameError, GameState, PlayerSetup};

fn new_game(players: usize) -> GameState {
    let setup: Vec<PlayerSetup> = (0..players).map(|i| PlayerSetup::new(format!("p{i}"))).collect();
    GameState::new(&setup, 7, &mut StdRng::seed_from_u64(99)).unwrap()
}

/// Replace the pool so the given cards come out in order.
fn stack_pool(state: &mut GameState, cards: &[(u8, u8)]) {
    state.card_pool = cards
        .iter()
        .rev()
        .map(|&(id, _)| InGameCard::new(id, 0).unwrap())
        .collect();
}

fn play(state: &mut GameState, id: u8, orientation: u8, at: Coords, place: Option<PeasantPlace>) -> Vec<ScoredRegion> {
    let tile = InGameCard::new(id, orientation).unwrap();
    let report = state.apply_turn(&tile, at, place).unwrap();
    assert!(state.frontier_is_consistent());
    report.scored
}

fn assert_peasants_conserved(state: &GameState) {
    for (idx, player) in state.players.iter().enumerate() {
        assert_eq!(
            player.peasants_count as usize + state.peasants_on_board(idx),
            state.peasants_per_player as usize,
            "peasants of player {idx}"
        );
    }
}

#[test]
fn monastery_with_road_completes_after_eight_neighbours() {
    let mut zones = HashMap::new();
    zones.insert(
        cell_id(Coords::ORIGIN),
        Zone {
            card: InGameCard::new(MONASTERY_ROAD_TILE_ID, 0).unwrap(),
            coords: Coords::ORIGIN,
            peasant: Some(Peasant {
                player_index: 0,
                place: PeasantPlace::Center,
            }),
            turn: 0,
            placed_by: Some(0),
        },
    );
    let mut state = GameState {
        potential_zones: recalculate_frontier(&zones),
        zones,
        card_pool: Vec::new(),
        players: vec![Player {
            name: "solo".into(),
            color: Color::Red,
            score: 0,
            peasants_count: 6,
        }],
        active_player_index: 0,
        turn: 0,
        peasants_per_player: 7,
    };

    let ring = [
        (Coords::new(1, 0), 5),
        (Coords::new(0, 1), 5),
        (Coords::new(-1, 0), 5),
        (Coords::new(-1, -1), 5),
        (Coords::new(1, -1), 5),
        (Coords::new(1, 1), 5),
        (Coords::new(-1, 1), 5),
    ];
    let mut order = vec![(2u8, 1u8)];
    order.extend(ring.iter().map(|&(_, id)| (id, 0)));
    stack_pool(&mut state, &order);

    // The road north of the monastery leaves it incomplete.
    let scored = play(&mut state, 2, 1, Coords::new(0, -1), None);
    assert!(scored.is_empty());
    assert_eq!(state.players[0].score, 0);

    for (i, &(at, id)) in ring.iter().enumerate() {
        let scored = play(&mut state, id, 0, at, None);
        if i + 1 < ring.len() {
            assert!(scored.is_empty(), "completed early at {at}");
            assert_eq!(state.players[0].peasants_count, 6);
        } else {
            assert_eq!(scored.len(), 1);
            assert_eq!(scored[0].kind, RegionKind::Cloister);
            assert_eq!(scored[0].points, 9);
            assert_eq!(scored[0].returned, vec![ReturnedPeasant { player_index: 0, coords: Coords::ORIGIN }]);
        }
    }

    assert_eq!(state.players[0].score, 9);
    assert_eq!(state.players[0].peasants_count, 7);
    assert!(state.zone_at(Coords::ORIGIN).unwrap().peasant.is_none());
    assert_peasants_conserved(&state);
}

#[test]
fn closed_town_with_prime_tile_scores_once() {
    let mut state = new_game(1);
    stack_pool(&mut state, &[(14, 0), (7, 2), (7, 1), (7, 3)]);

    let scored = play(&mut state, 14, 0, Coords::new(0, -1), Some(PeasantPlace::Union(0)));
    assert!(scored.is_empty());
    assert_eq!(state.players[0].peasants_count, 6);

    assert!(play(&mut state, 7, 2, Coords::new(0, -2), None).is_empty());
    assert!(play(&mut state, 7, 1, Coords::new(-1, -1), None).is_empty());
    let scored = play(&mut state, 7, 3, Coords::new(1, -1), None);

    // 5 tiles, 1 prime: 4 + 4 * 2.
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].kind, RegionKind::Town);
    assert_eq!(scored[0].tiles.len(), 5);
    assert_eq!(scored[0].points, 12);
    assert_eq!(scored[0].winners, vec![0]);
    assert_eq!(state.players[0].score, 12);
    assert_peasants_conserved(&state);
}

#[test]
fn tied_road_pays_both_players_in_full() {
    let mut state = new_game(2);
    stack_pool(&mut state, &[(2, 0), (3, 1), (3, 2), (3, 3), (4, 0), (4, 1)]);

    assert!(play(&mut state, 2, 0, Coords::new(1, 0), Some(PeasantPlace::Union(0))).is_empty());
    assert!(play(&mut state, 3, 1, Coords::new(1, 1), Some(PeasantPlace::Union(0))).is_empty());
    assert!(play(&mut state, 3, 2, Coords::new(2, 0), None).is_empty());
    // The two claimed roads are one region from here on.
    assert!(play(&mut state, 3, 3, Coords::new(2, 1), None).is_empty());
    assert!(play(&mut state, 4, 0, Coords::new(-1, 0), None).is_empty());
    let scored = play(&mut state, 4, 1, Coords::new(1, 2), None);

    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].kind, RegionKind::Road);
    assert_eq!(scored[0].points, 7);
    assert_eq!(scored[0].winners, vec![0, 1]);
    assert_eq!(scored[0].returned.len(), 2);
    assert_eq!(state.players[0].score, 7);
    assert_eq!(state.players[1].score, 7);
    assert_eq!(state.players[0].peasants_count, 7);
    assert_eq!(state.players[1].peasants_count, 7);
    assert_peasants_conserved(&state);
}

#[test]
fn claiming_a_joined_region_is_rejected() {
    let mut state = new_game(2);
    stack_pool(&mut state, &[(2, 0), (2, 0)]);

    play(&mut state, 2, 0, Coords::new(1, 0), Some(PeasantPlace::Union(0)));
    let before = state.clone();
    let tile = InGameCard::new(2, 0).unwrap();
    assert_eq!(
        state.apply_turn(&tile, Coords::new(2, 0), Some(PeasantPlace::Union(0))),
        Err(GameError::RegionClaimed)
    );
    assert_eq!(state, before);
    assert!(state.apply_turn(&tile, Coords::new(2, 0), None).is_ok());
}

#[test]
fn completed_region_without_peasants_pays_nothing() {
    let mut state = new_game(1);
    stack_pool(&mut state, &[(7, 2)]);
    let scored = play(&mut state, 7, 2, Coords::new(0, -1), None);
    assert!(scored.is_empty());
    assert_eq!(state.players[0].score, 0);
}

#[test]
fn active_player_rotates_and_pool_shrinks() {
    let mut state = new_game(3);
    stack_pool(&mut state, &[(2, 0), (2, 0), (2, 0), (2, 0)]);
    let cells = [Coords::new(1, 0), Coords::new(2, 0), Coords::new(-1, 0), Coords::new(3, 0)];
    for (turn, at) in cells.into_iter().enumerate() {
        assert_eq!(state.active_player_index, turn % 3);
        let pool = state.card_pool.len();
        play(&mut state, 2, 0, at, None);
        assert_eq!(state.card_pool.len(), pool - 1);
    }
    assert_eq!(state.active_player_index, 1);
    assert_eq!(state.turn, 4);
    assert!(state.is_pool_exhausted());
}
