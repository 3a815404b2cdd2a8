//! Complete tile catalog (24 types, 72 tiles) and in-play tile values.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::*;

use EdgeType::{Empty as E, Road as R, Town as T};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: u8,
    /// Edges indexed clockwise: N=0, E=1, S=2, W=3.
    pub edges: [EdgeType; 4],
    /// Two edges sharing a nonzero tag are connected through the tile.
    pub connects: [u8; 4],
    #[serde(default)]
    pub has_cloister: bool,
    #[serde(default)]
    pub is_prime_town: bool,
    pub deck_count: u32,
}

const fn tile(id: u8, edges: [EdgeType; 4], connects: [u8; 4], deck_count: u32) -> TileDefinition {
    TileDefinition {
        id,
        edges,
        connects,
        has_cloister: false,
        is_prime_town: false,
        deck_count,
    }
}

const fn cloister(id: u8, edges: [EdgeType; 4], deck_count: u32) -> TileDefinition {
    TileDefinition {
        has_cloister: true,
        ..tile(id, edges, [0, 0, 0, 0], deck_count)
    }
}

const fn prime(id: u8, edges: [EdgeType; 4], connects: [u8; 4], deck_count: u32) -> TileDefinition {
    TileDefinition {
        is_prime_town: true,
        ..tile(id, edges, connects, deck_count)
    }
}

pub static TILE_CATALOG: Lazy<Vec<TileDefinition>> = Lazy::new(|| {
    vec![
        // 1: Town N, road E-W (x4), the starting tile
        tile(1, [T, R, E, R], [0, 1, 0, 1], 4),
        // 2: Straight road E-W (x8)
        tile(2, [E, R, E, R], [0, 1, 0, 1], 8),
        // 3: Road curve N-E (x9)
        tile(3, [R, R, E, E], [1, 1, 0, 0], 9),
        // 4: Road T-junction E-S-W (x4)
        tile(4, [E, R, R, R], [0, 0, 0, 0], 4),
        // 5: Monastery (x4)
        cloister(5, [E, E, E, E], 4),
        // 6: Monastery with road N (x2)
        cloister(6, [R, E, E, E], 2),
        // 7: Town N (x5)
        tile(7, [T, E, E, E], [0, 0, 0, 0], 5),
        // 8: Towns N and S, not connected (x3)
        tile(8, [T, E, T, E], [0, 0, 0, 0], 3),
        // 9: Town N-S connected (x1)
        tile(9, [T, E, T, E], [1, 0, 1, 0], 1),
        // 10: Town N, road T-junction E-S-W (x3)
        tile(10, [T, R, R, R], [0, 0, 0, 0], 3),
        // 11: Towns N and W, not connected (x2)
        tile(11, [T, E, E, T], [0, 0, 0, 0], 2),
        // 12: Town E-S-W connected (x2)
        tile(12, [E, T, T, T], [0, 1, 1, 1], 2),
        // 13: Town E-S-W connected, road N (x1)
        tile(13, [R, T, T, T], [0, 1, 1, 1], 1),
        // 14: Town on every side (x1)
        prime(14, [T, T, T, T], [1, 1, 1, 1], 1),
        // 15: Town N-E connected, road S-W curve (x3)
        tile(15, [T, T, R, R], [1, 1, 2, 2], 3),
        // 16: Town N-E connected (x3)
        tile(16, [T, T, E, E], [1, 1, 0, 0], 3),
        // 17: Crossroads (x1)
        tile(17, [R, R, R, R], [0, 0, 0, 0], 1),
        // 18: Town N, road S-W curve (x3)
        tile(18, [T, E, R, R], [0, 0, 1, 1], 3),
        // 19: Town N, road E-S curve (x3)
        tile(19, [T, R, R, E], [0, 1, 1, 0], 3),
        // 20 to 24: prime variants of 16, 15, 9, 12, 13
        prime(20, [T, T, E, E], [1, 1, 0, 0], 2),
        prime(21, [T, T, R, R], [1, 1, 2, 2], 2),
        prime(22, [T, E, T, E], [1, 0, 1, 0], 2),
        prime(23, [E, T, T, T], [0, 1, 1, 1], 2),
        prime(24, [R, T, T, T], [0, 1, 1, 1], 2),
    ]
});

pub const STARTING_TILE_ID: u8 = 1;
pub const MONASTERY_ROAD_TILE_ID: u8 = 6;

/// Per-type data derived once from the catalog.
#[derive(Debug, Clone)]
pub struct TileMetadata {
    pub rotation_symmetry: usize,
    pub unions: Vec<Union>,
}

static TILE_METADATA: Lazy<Vec<TileMetadata>> = Lazy::new(|| {
    TILE_CATALOG
        .iter()
        .map(|def| {
            let unions = build_unions(&def.edges, &def.connects);
            let rotation_symmetry = rotation_symmetry(&def.edges, &unions);
            TileMetadata {
                rotation_symmetry,
                unions,
            }
        })
        .collect()
});

/// Look up a catalog entry by type id.
pub fn tile_definition(id: u8) -> Option<&'static TileDefinition> {
    TILE_CATALOG.iter().find(|t| t.id == id)
}

fn tile_index(id: u8) -> Option<usize> {
    TILE_CATALOG.iter().position(|t| t.id == id)
}

pub fn tile_metadata(id: u8) -> Option<&'static TileMetadata> {
    tile_index(id).map(|idx| &TILE_METADATA[idx])
}

/// Partition edges into unions: shared nonzero tags join, tag 0 stays alone,
/// empty edges are dropped.
pub fn build_unions(edges: &[EdgeType; 4], connects: &[u8; 4]) -> Vec<Union> {
    let mut unions: Vec<Union> = Vec::new();
    let mut tag_slot: Vec<(u8, usize)> = Vec::new();

    for side in 0..4 {
        let Some(kind) = edges[side].union_kind() else {
            continue;
        };
        let tag = connects[side];
        if tag != 0 {
            if let Some(&(_, slot)) = tag_slot.iter().find(|(t, _)| *t == tag) {
                unions[slot].sides.push(side);
                continue;
            }
            tag_slot.push((tag, unions.len()));
        }
        unions.push(Union {
            kind,
            sides: vec![side],
        });
    }
    unions
}

fn rotate_edges(edges: &[EdgeType; 4]) -> [EdgeType; 4] {
    [edges[3], edges[0], edges[1], edges[2]]
}

fn rotation_symmetry(edges: &[EdgeType; 4], unions: &[Union]) -> usize {
    let mut normalized: Vec<Vec<usize>> = unions.iter().map(|u| u.sides.clone()).collect();
    normalized.sort();

    let mut rotated_edges = *edges;
    let mut rotated_unions: Vec<Union> = unions.to_vec();
    for steps in 1..4 {
        rotated_edges = rotate_edges(&rotated_edges);
        rotated_unions = rotated_unions.iter().map(Union::rotated).collect();
        let mut sides: Vec<Vec<usize>> = rotated_unions.iter().map(|u| u.sides.clone()).collect();
        sides.sort();
        if rotated_edges == *edges && sides == normalized {
            return steps;
        }
    }
    4
}

/// Total number of tiles in the deck, starting tile included.
pub fn get_tile_total() -> u32 {
    TILE_CATALOG.iter().map(|t| t.deck_count).sum()
}

/// Build the shuffled draw pool. Excludes one copy of the starting tile.
/// The last element is drawn first.
pub fn build_card_pool<G: Rng + ?Sized>(rng: &mut G) -> Vec<InGameCard> {
    let mut pool = Vec::with_capacity(get_tile_total() as usize);
    for def in TILE_CATALOG.iter() {
        let count = if def.id == STARTING_TILE_ID {
            def.deck_count - 1
        } else {
            def.deck_count
        };
        for _ in 0..count {
            pool.push(InGameCard::from_definition(def));
        }
    }
    pool.shuffle(rng);
    pool
}

// --- In-play tiles ---

/// A tile value in some orientation. Rotation returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InGameCard {
    pub card_type_id: u8,
    pub edges: [EdgeType; 4],
    pub connects: [u8; 4],
    pub unions: Vec<Union>,
    pub has_cloister: bool,
    pub is_prime_town: bool,
    /// Clockwise quarter turns applied to the catalog layout (0 to 3).
    pub orientation: u8,
}

impl InGameCard {
    pub fn from_definition(def: &TileDefinition) -> Self {
        let unions = match tile_metadata(def.id) {
            Some(meta) => meta.unions.clone(),
            None => build_unions(&def.edges, &def.connects),
        };
        Self {
            card_type_id: def.id,
            edges: def.edges,
            connects: def.connects,
            unions,
            has_cloister: def.has_cloister,
            is_prime_town: def.is_prime_town,
            orientation: 0,
        }
    }

    /// Build a catalog tile already turned `orientation` quarter turns.
    pub fn new(card_type_id: u8, orientation: u8) -> Option<Self> {
        let card = Self::from_definition(tile_definition(card_type_id)?);
        Some(card.rotated_by(orientation as usize))
    }

    /// Rotate clockwise by 90°.
    pub fn rotated(&self) -> Self {
        Self {
            card_type_id: self.card_type_id,
            edges: rotate_edges(&self.edges),
            connects: [self.connects[3], self.connects[0], self.connects[1], self.connects[2]],
            unions: self.unions.iter().map(Union::rotated).collect(),
            has_cloister: self.has_cloister,
            is_prime_town: self.is_prime_town,
            orientation: (self.orientation + 1) % 4,
        }
    }

    pub fn rotated_by(&self, steps: usize) -> Self {
        let mut card = self.clone();
        for _ in 0..steps % 4 {
            card = card.rotated();
        }
        card
    }

    /// Number of distinct orientations worth trying.
    pub fn rotation_symmetry(&self) -> usize {
        tile_metadata(self.card_type_id)
            .map(|m| m.rotation_symmetry)
            .unwrap_or(4)
    }

    /// Every distinct orientation, starting with this one.
    pub fn orientations(&self) -> Vec<InGameCard> {
        let mut result = Vec::with_capacity(4);
        let mut card = self.clone();
        for _ in 0..self.rotation_symmetry() {
            let next = card.rotated();
            result.push(card);
            card = next;
        }
        result
    }

    /// Index of the union containing `side`, if any.
    pub fn union_index_at(&self, side: usize) -> Option<usize> {
        self.unions.iter().position(|u| u.contains(side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tile_catalog_count() {
        assert_eq!(TILE_CATALOG.len(), 24);
    }

    #[test]
    fn test_total_tiles() {
        assert_eq!(get_tile_total(), 72);
    }

    #[test]
    fn test_card_pool_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = build_card_pool(&mut rng);
        assert_eq!(pool.len(), 71);
    }

    #[test]
    fn test_card_pool_is_seeded() {
        let a = build_card_pool(&mut StdRng::seed_from_u64(3));
        let b = build_card_pool(&mut StdRng::seed_from_u64(3));
        let ids_a: Vec<u8> = a.iter().map(|c| c.card_type_id).collect();
        let ids_b: Vec<u8> = b.iter().map(|c| c.card_type_id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_unique_ids() {
        let mut ids: Vec<u8> = TILE_CATALOG.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TILE_CATALOG.len());
    }

    #[test]
    fn test_starting_tile_unions() {
        let card = InGameCard::new(STARTING_TILE_ID, 0).unwrap();
        assert_eq!(card.edges, [T, R, E, R]);
        assert_eq!(card.unions.len(), 2);
        assert_eq!(card.unions[0], Union { kind: UnionKind::Town, sides: vec![NORTH] });
        assert_eq!(card.unions[1], Union { kind: UnionKind::Road, sides: vec![EAST, WEST] });
    }

    #[test]
    fn test_unconnected_towns_are_separate_unions() {
        let separate = InGameCard::new(8, 0).unwrap();
        assert_eq!(separate.unions.len(), 2);
        let joined = InGameCard::new(9, 0).unwrap();
        assert_eq!(joined.unions.len(), 1);
        assert_eq!(joined.unions[0].sides, vec![NORTH, SOUTH]);
    }

    #[test]
    fn test_empty_edges_form_no_union() {
        let monastery = InGameCard::new(5, 0).unwrap();
        assert!(monastery.unions.is_empty());
        assert!(monastery.has_cloister);
    }

    #[test]
    fn test_rotation_symmetry_classes() {
        assert_eq!(tile_metadata(5).unwrap().rotation_symmetry, 1);
        assert_eq!(tile_metadata(14).unwrap().rotation_symmetry, 1);
        assert_eq!(tile_metadata(17).unwrap().rotation_symmetry, 1);
        assert_eq!(tile_metadata(2).unwrap().rotation_symmetry, 2);
        assert_eq!(tile_metadata(8).unwrap().rotation_symmetry, 2);
        assert_eq!(tile_metadata(9).unwrap().rotation_symmetry, 2);
        assert_eq!(tile_metadata(1).unwrap().rotation_symmetry, 4);
        assert_eq!(tile_metadata(15).unwrap().rotation_symmetry, 4);
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        for def in TILE_CATALOG.iter() {
            let card = InGameCard::from_definition(def);
            assert_eq!(card.rotated_by(4), card, "tile {}", def.id);
            assert_eq!(card.rotated().rotated().rotated().rotated(), card, "tile {}", def.id);
        }
    }

    #[test]
    fn test_rotate_moves_edges_clockwise() {
        let card = InGameCard::new(STARTING_TILE_ID, 0).unwrap();
        let rotated = card.rotated();
        assert_eq!(rotated.edges, [R, T, R, E]);
        assert_eq!(rotated.connects, [1, 0, 1, 0]);
        assert_eq!(rotated.unions[0].sides, vec![EAST]);
        assert_eq!(rotated.unions[1].sides, vec![NORTH, SOUTH]);
        assert_eq!(rotated.orientation, 1);
    }

    #[test]
    fn test_symmetric_four_tiles_never_repeat_early() {
        for def in TILE_CATALOG.iter() {
            let card = InGameCard::from_definition(def);
            if card.rotation_symmetry() != 4 {
                continue;
            }
            let mut rotated = card.clone();
            for k in 1..4 {
                rotated = rotated.rotated();
                assert_ne!(rotated.edges, card.edges, "tile {} repeats after {k}", def.id);
            }
        }
    }

    #[test]
    fn test_orientations_count_matches_symmetry() {
        for def in TILE_CATALOG.iter() {
            let card = InGameCard::from_definition(def);
            assert_eq!(card.orientations().len(), card.rotation_symmetry());
        }
    }

    #[test]
    fn test_union_index_at() {
        let card = InGameCard::new(15, 0).unwrap();
        assert_eq!(card.union_index_at(NORTH), Some(0));
        assert_eq!(card.union_index_at(EAST), Some(0));
        assert_eq!(card.union_index_at(SOUTH), Some(1));
        assert_eq!(card.union_index_at(WEST), Some(1));
        let town = InGameCard::new(7, 0).unwrap();
        assert_eq!(town.union_index_at(SOUTH), None);
    }
}
