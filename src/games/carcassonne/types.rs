//! Carcassonne core types: edges, unions, coordinates, zones and players.

use serde::{Deserialize, Serialize};

use super::tiles::InGameCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Empty,
    Town,
    Road,
}

impl EdgeType {
    /// The union kind an edge of this type belongs to. Empty edges form no union.
    #[inline]
    pub fn union_kind(self) -> Option<UnionKind> {
        match self {
            EdgeType::Empty => None,
            EdgeType::Town => Some(UnionKind::Town),
            EdgeType::Road => Some(UnionKind::Road),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnionKind {
    Town,
    Road,
}

/// Edge indices, clockwise from the top edge.
pub const NORTH: usize = 0;
pub const EAST: usize = 1;
pub const SOUTH: usize = 2;
pub const WEST: usize = 3;

#[inline]
pub fn opposite_side(side: usize) -> usize {
    (side + 2) % 4
}

/// A connected group of same-kind edges on one tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Union {
    pub kind: UnionKind,
    /// Edge indices in ascending order.
    pub sides: Vec<usize>,
}

impl Union {
    #[inline]
    pub fn contains(&self, side: usize) -> bool {
        self.sides.contains(&side)
    }

    /// Shift every edge index one step clockwise.
    pub fn rotated(&self) -> Self {
        let mut sides: Vec<usize> = self.sides.iter().map(|s| (s + 1) % 4).collect();
        sides.sort_unstable();
        Self {
            kind: self.kind,
            sides,
        }
    }
}

// --- Coordinates ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub col: i32,
    pub row: i32,
}

impl Coords {
    pub const ORIGIN: Coords = Coords { col: 0, row: 0 };

    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The orthogonal neighbour across `side`. North is `row - 1`.
    pub fn neighbor(self, side: usize) -> Self {
        match side {
            NORTH => Self::new(self.col, self.row - 1),
            EAST => Self::new(self.col + 1, self.row),
            SOUTH => Self::new(self.col, self.row + 1),
            _ => Self::new(self.col - 1, self.row),
        }
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.col, self.row)
    }
}

/// Scalar cell identifier packed from a `Coords`. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

// --- Peasants ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "union_index", rename_all = "snake_case")]
pub enum PeasantPlace {
    /// On the cloister in the middle of the tile.
    Center,
    /// On the tile's union with this index.
    Union(usize),
}

impl std::fmt::Display for PeasantPlace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeasantPlace::Center => write!(f, "center"),
            PeasantPlace::Union(idx) => write!(f, "union {idx}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peasant {
    pub player_index: usize,
    pub place: PeasantPlace,
}

// --- Board-level types ---

/// A placed cell. Only `peasant` ever changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub card: InGameCard,
    pub coords: Coords,
    pub peasant: Option<Peasant>,
    /// Turn number of the placement; 0 for the starting tile.
    pub turn: u32,
    /// Who placed the tile; `None` for the starting tile.
    pub placed_by: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

impl Color {
    pub const SEATS: [Color; 5] = [Color::Red, Color::Blue, Color::Green, Color::Yellow, Color::Black];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub color: Color,
    pub score: u32,
    pub peasants_count: u32,
}

// --- Scoring reports ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Town,
    Road,
    Cloister,
}

impl From<UnionKind> for RegionKind {
    fn from(kind: UnionKind) -> Self {
        match kind {
            UnionKind::Town => RegionKind::Town,
            UnionKind::Road => RegionKind::Road,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedPeasant {
    pub player_index: usize,
    pub coords: Coords,
}

/// A region that completed and paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRegion {
    pub kind: RegionKind,
    pub tiles: Vec<Coords>,
    pub points: u32,
    pub winners: Vec<usize>,
    pub returned: Vec<ReturnedPeasant>,
}

// --- Scores ---

/// Value of a region if it finishes now (`complete`) vs. if it stays open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UnionScore {
    pub complete: f64,
    pub incomplete: f64,
}

impl UnionScore {
    pub const ZERO: UnionScore = UnionScore {
        complete: 0.0,
        incomplete: 0.0,
    };

    pub const fn new(complete: f64, incomplete: f64) -> Self {
        Self {
            complete,
            incomplete,
        }
    }

    /// Per-tile base value: road 1/1, town 2/1, prime town 4/2.
    pub fn base(kind: UnionKind, is_prime_town: bool) -> Self {
        match kind {
            UnionKind::Road => Self::new(1.0, 1.0),
            UnionKind::Town if is_prime_town => Self::new(4.0, 2.0),
            UnionKind::Town => Self::new(2.0, 1.0),
        }
    }

    #[inline]
    pub fn total(self) -> f64 {
        self.complete + self.incomplete
    }

    #[inline]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.complete * factor, self.incomplete * factor)
    }
}

impl std::ops::Add for UnionScore {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.complete + rhs.complete, self.incomplete + rhs.incomplete)
    }
}

impl std::ops::AddAssign for UnionScore {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for UnionScore {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.complete - rhs.complete, self.incomplete - rhs.incomplete)
    }
}

impl std::ops::SubAssign for UnionScore {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_neighbor() {
        let pos = Coords::new(0, 0);
        assert_eq!(pos.neighbor(NORTH), Coords::new(0, -1));
        assert_eq!(pos.neighbor(EAST), Coords::new(1, 0));
        assert_eq!(pos.neighbor(SOUTH), Coords::new(0, 1));
        assert_eq!(pos.neighbor(WEST), Coords::new(-1, 0));
    }

    #[test]
    fn test_opposite_side() {
        assert_eq!(opposite_side(NORTH), SOUTH);
        assert_eq!(opposite_side(EAST), WEST);
        assert_eq!(opposite_side(SOUTH), NORTH);
        assert_eq!(opposite_side(WEST), EAST);
    }

    #[test]
    fn test_union_rotated() {
        let union = Union {
            kind: UnionKind::Town,
            sides: vec![NORTH, WEST],
        };
        let rotated = union.rotated();
        assert_eq!(rotated.sides, vec![NORTH, EAST]);
        assert_eq!(rotated.kind, UnionKind::Town);
    }

    #[test]
    fn test_union_score_base_values() {
        assert_eq!(UnionScore::base(UnionKind::Road, false), UnionScore::new(1.0, 1.0));
        assert_eq!(UnionScore::base(UnionKind::Road, true), UnionScore::new(1.0, 1.0));
        assert_eq!(UnionScore::base(UnionKind::Town, false), UnionScore::new(2.0, 1.0));
        assert_eq!(UnionScore::base(UnionKind::Town, true), UnionScore::new(4.0, 2.0));
    }

    #[test]
    fn test_peasant_place_serde() {
        let json = serde_json::to_value(PeasantPlace::Union(2)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "union", "union_index": 2}));
        let center: PeasantPlace = serde_json::from_value(serde_json::json!({"type": "center"})).unwrap();
        assert_eq!(center, PeasantPlace::Center);
    }
}
