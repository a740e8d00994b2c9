//! Hex coordinate system for a flat-topped, "odd-q up" grid.
//!
//! The board stores hexes by offset coordinate (`col`, `row`) where odd columns
//! sit half a hex higher than even ones. Neighbour and distance math is done in
//! axial coordinates (`q`, `r`), which are symmetric and avoid the parity cases:
//! - `OffsetCoord`: storage key used by the board, maps and loaders
//! - `AxialCoord`: derived form used for directions and distances
//! - `Direction`: the six neighbour directions in a fixed clockwise order

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six neighbour directions of a flat-topped hex.
///
/// The order of [`Direction::ALL`] is clockwise starting from North and is used
/// everywhere directions are enumerated (neighbour lists, edge checks, pod
/// angles), so results are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from North
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Axial vector (dq, dr) for this direction
    pub const fn axial_delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::SouthEast => (1, 0),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::NorthWest => (-1, 0),
        }
    }

    /// Offset vector (dcol, drow) for this direction from a hex in `col`.
    ///
    /// Odd columns are shifted up, so the same direction maps to a different
    /// row delta depending on the parity of the starting column.
    pub const fn offset_delta(self, col: i32) -> (i32, i32) {
        if col & 1 == 0 {
            match self {
                Direction::North => (0, -1),
                Direction::NorthEast => (1, 0),
                Direction::SouthEast => (1, 1),
                Direction::South => (0, 1),
                Direction::SouthWest => (-1, 1),
                Direction::NorthWest => (-1, 0),
            }
        } else {
            match self {
                Direction::North => (0, -1),
                Direction::NorthEast => (1, -1),
                Direction::SouthEast => (1, 0),
                Direction::South => (0, 1),
                Direction::SouthWest => (-1, 0),
                Direction::NorthWest => (-1, -1),
            }
        }
    }

    /// Angle in degrees, clockwise from North (0, 60, ..., 300)
    pub const fn angle(self) -> u32 {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 60,
            Direction::SouthEast => 120,
            Direction::South => 180,
            Direction::SouthWest => 240,
            Direction::NorthWest => 300,
        }
    }

    /// Direction for an angle in degrees; only exact multiples of 60 in
    /// `0..360` are valid.
    pub fn from_angle(degrees: i32) -> Option<Direction> {
        if !(0..360).contains(&degrees) || degrees % 60 != 0 {
            return None;
        }
        Some(Self::ALL[(degrees / 60) as usize])
    }

    /// The direction pointing back the other way
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

/// Axial coordinate.
///
/// - `q` equals the offset column
/// - `r` is the row corrected for the column shift
/// - The implicit third coordinate `s` satisfies q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Back to storage coordinates
    pub const fn to_offset(self) -> OffsetCoord {
        let (col, row) = axial_to_offset(self.q, self.r);
        OffsetCoord::new(col, row)
    }

    /// Neighbour in a direction
    pub const fn step(self, direction: Direction) -> AxialCoord {
        let (dq, dr) = direction.axial_delta();
        AxialCoord::new(self.q + dq, self.r + dr)
    }

    /// Distance to another hex in steps
    pub fn distance_to(&self, other: &AxialCoord) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        ((dq.abs() + (dq + dr).abs() + dr.abs()) / 2) as u32
    }
}

/// Offset ("odd-q up") coordinate, the key hexes are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

impl OffsetCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub const fn to_axial(self) -> AxialCoord {
        let (q, r) = offset_to_axial(self.col, self.row);
        AxialCoord::new(q, r)
    }

    /// Neighbour in a direction, whether or not it is on a board
    pub const fn step(self, direction: Direction) -> OffsetCoord {
        self.to_axial().step(direction).to_offset()
    }

    /// The six surrounding cells in [`Direction::ALL`] order, unfiltered
    pub fn neighbors(&self) -> [OffsetCoord; 6] {
        Direction::ALL.map(|dir| self.step(dir))
    }

    /// Hex distance, usable as an A* heuristic
    pub fn distance_to(&self, other: &OffsetCoord) -> u32 {
        self.to_axial().distance_to(&other.to_axial())
    }

    /// Direction to an adjacent cell, if `other` is adjacent
    pub fn direction_to(&self, other: &OffsetCoord) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| self.step(*dir) == *other)
    }

    /// Pixel centre of this hex for a flat-topped layout with the given radius
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let col_spacing = 1.5 * hex_size;
        let row_spacing = 3.0_f64.sqrt() * hex_size;
        let x = self.col as f64 * col_spacing;
        let mut y = self.row as f64 * row_spacing;
        if self.col & 1 == 1 {
            y -= row_spacing / 2.0;
        }
        (x, y)
    }
}

impl From<(i32, i32)> for OffsetCoord {
    fn from((col, row): (i32, i32)) -> Self {
        Self::new(col, row)
    }
}

impl fmt::Display for OffsetCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// Convert an offset pair to an axial pair.
///
/// `col + (col & 1)` is always even, so the halving is exact for negative
/// columns too.
pub const fn offset_to_axial(col: i32, row: i32) -> (i32, i32) {
    (col, row - (col + (col & 1)) / 2)
}

/// Convert an axial pair to an offset pair; inverse of [`offset_to_axial`].
pub const fn axial_to_offset(q: i32, r: i32) -> (i32, i32) {
    (q, r + (q + (q & 1)) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_offset_axial_round_trip() {
        for col in -12..=12 {
            for row in -12..=12 {
                let (q, r) = offset_to_axial(col, row);
                assert_eq!(axial_to_offset(q, r), (col, row));
            }
        }
    }

    #[test]
    fn test_axial_offset_round_trip() {
        for q in -12..=12 {
            for r in -12..=12 {
                let (col, row) = axial_to_offset(q, r);
                assert_eq!(offset_to_axial(col, row), (q, r));
            }
        }
    }

    #[test]
    fn test_odd_columns_shift_up() {
        // (1,1) sits level with the seam between (0,0) and (0,1)
        let odd = OffsetCoord::new(1, 1);
        assert_eq!(odd.step(Direction::SouthWest), OffsetCoord::new(0, 1));
        assert_eq!(odd.step(Direction::NorthWest), OffsetCoord::new(0, 0));

        let even = OffsetCoord::new(0, 0);
        assert_eq!(even.step(Direction::NorthEast), OffsetCoord::new(1, 0));
        assert_eq!(even.step(Direction::SouthEast), OffsetCoord::new(1, 1));
    }

    #[test]
    fn test_offset_table_matches_axial_steps() {
        for col in -5..=5 {
            for row in -5..=5 {
                let coord = OffsetCoord::new(col, row);
                for dir in Direction::ALL {
                    let (dc, dr) = dir.offset_delta(col);
                    assert_eq!(
                        coord.step(dir),
                        OffsetCoord::new(col + dc, row + dr),
                        "{dir:?} from {coord}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbors_are_unique_and_adjacent() {
        for coord in [OffsetCoord::new(0, 0), OffsetCoord::new(3, 4), OffsetCoord::new(-1, -2)] {
            let neighbors = coord.neighbors();
            let unique: HashSet<_> = neighbors.iter().collect();
            assert_eq!(unique.len(), 6);

            for neighbor in &neighbors {
                assert_eq!(coord.distance_to(neighbor), 1);
                assert!(neighbor.neighbors().contains(&coord));
            }
        }
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let start = OffsetCoord::new(4, 7);
        for dir in Direction::ALL {
            assert_eq!(start.step(dir).step(dir.opposite()), start);
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = OffsetCoord::new(0, 0);
        assert_eq!(a.distance_to(&a), 0);
        assert_eq!(a.distance_to(&OffsetCoord::new(0, 3)), 3);
        assert_eq!(a.distance_to(&OffsetCoord::new(2, 0)), 2);
        assert_eq!(a.distance_to(&OffsetCoord::new(3, 0)), 3);

        let b = AxialCoord::new(0, 0);
        assert_eq!(b.distance_to(&AxialCoord::new(-3, 3)), 3);
        assert_eq!(b.distance_to(&AxialCoord::new(2, -1)), 2);
    }

    #[test]
    fn test_angles() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_angle(dir.angle() as i32), Some(dir));
        }
        assert_eq!(Direction::from_angle(45), None);
        assert_eq!(Direction::from_angle(360), None);
        assert_eq!(Direction::from_angle(-60), None);
    }

    #[test]
    fn test_direction_to() {
        let a = OffsetCoord::new(2, 2);
        assert_eq!(a.direction_to(&OffsetCoord::new(2, 1)), Some(Direction::North));
        assert_eq!(a.direction_to(&OffsetCoord::new(5, 5)), None);
    }

    #[test]
    fn test_odd_column_pixel_offset() {
        let (_, even_y) = OffsetCoord::new(0, 1).to_pixel(10.0);
        let (_, odd_y) = OffsetCoord::new(1, 1).to_pixel(10.0);
        assert!(odd_y < even_y);
    }
}
