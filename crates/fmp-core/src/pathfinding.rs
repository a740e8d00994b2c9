//! A* pathfinding over the planet board.
//!
//! Every step costs one, and hex distance is the heuristic. A hex can be
//! entered when its terrain under the current tide is one the unit type can
//! enter. The start hex is never checked, so a unit stranded on hostile
//! terrain can still leave it.

use crate::board::{Board, Tide};
use crate::hex::OffsetCoord;
use crate::units::UnitType;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Entry in the open set.
///
/// Ordered for a min-heap on `f`, ties broken by lower `h` and then by
/// insertion order, so results are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    seq: u64,
    coord: OffsetCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        (other.f, other.h, other.seq).cmp(&(self.f, self.h, self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest path from `start` to `goal` for a unit type under `tide`.
///
/// Returns the full path including `start` and `goal`, or `None` when either
/// end is off the board or no path exists.
pub fn find_path(
    board: &Board,
    start: OffsetCoord,
    goal: OffsetCoord,
    unit_type: &UnitType,
    tide: Tide,
) -> Option<Vec<OffsetCoord>> {
    if !board.contains(&start) || !board.contains(&goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut closed: HashSet<OffsetCoord> = HashSet::new();
    let mut came_from: HashMap<OffsetCoord, OffsetCoord> = HashMap::new();
    let mut g_scores: HashMap<OffsetCoord, u32> = HashMap::new();
    let mut seq = 0u64;

    let h = start.distance_to(&goal);
    g_scores.insert(start, 0);
    open_set.push(OpenNode {
        f: h,
        h,
        seq,
        coord: start,
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, goal));
        }
        // Stale entry for an already expanded hex
        if !closed.insert(current.coord) {
            continue;
        }

        let current_g = g_scores.get(&current.coord).copied().unwrap_or(u32::MAX);

        for neighbor in board.neighbors(&current.coord) {
            if closed.contains(&neighbor.coord) {
                continue;
            }
            if !unit_type.can_enter(board.effective_terrain(neighbor, tide)) {
                continue;
            }

            let tentative_g = current_g + 1;
            let known_g = g_scores.get(&neighbor.coord).copied().unwrap_or(u32::MAX);
            if tentative_g < known_g {
                came_from.insert(neighbor.coord, current.coord);
                g_scores.insert(neighbor.coord, tentative_g);

                seq += 1;
                let h = neighbor.coord.distance_to(&goal);
                open_set.push(OpenNode {
                    f: tentative_g + h,
                    h,
                    seq,
                    coord: neighbor.coord,
                });
            }
        }
    }

    None
}

/// AP cost of walking a path: one per step after the start
pub fn path_cost(path: &[OffsetCoord]) -> u32 {
    path.len().saturating_sub(1) as u32
}

fn reconstruct_path(
    came_from: &HashMap<OffsetCoord, OffsetCoord>,
    mut current: OffsetCoord,
) -> Vec<OffsetCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hex, Terrain};

    fn tank() -> UnitType {
        UnitType::new("tank", [Terrain::Plain, Terrain::Mountain])
    }

    fn boat() -> UnitType {
        UnitType::new("gunboat", [Terrain::Sea])
    }

    fn assert_contiguous(path: &[OffsetCoord]) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance_to(&pair[1]), 1, "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_straight_path_on_plain() {
        let board = Board::rectangular(5, 5, Terrain::Plain);
        let path = find_path(&board, (0, 0).into(), (0, 3).into(), &tank(), Tide::Mid).unwrap();

        assert_eq!(path.len(), 4);
        assert_eq!(path_cost(&path), 3);
        assert_eq!(path.first(), Some(&OffsetCoord::new(0, 0)));
        assert_eq!(path.last(), Some(&OffsetCoord::new(0, 3)));
        assert_contiguous(&path);
    }

    #[test]
    fn test_path_length_matches_hex_distance_on_open_board() {
        let board = Board::rectangular(8, 8, Terrain::Plain);
        let start = OffsetCoord::new(1, 6);
        for goal in [OffsetCoord::new(7, 0), OffsetCoord::new(6, 7), OffsetCoord::new(0, 0)] {
            let path = find_path(&board, start, goal, &tank(), Tide::Mid).unwrap();
            assert_eq!(path_cost(&path), start.distance_to(&goal));
            assert_contiguous(&path);
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let board = Board::rectangular(3, 3, Terrain::Plain);
        let path = find_path(&board, (1, 1).into(), (1, 1).into(), &tank(), Tide::Mid);
        assert_eq!(path, Some(vec![OffsetCoord::new(1, 1)]));
    }

    #[test]
    fn test_off_board_endpoints() {
        let board = Board::rectangular(3, 3, Terrain::Plain);
        assert_eq!(find_path(&board, (9, 9).into(), (0, 0).into(), &tank(), Tide::Mid), None);
        assert_eq!(find_path(&board, (0, 0).into(), (9, 9).into(), &tank(), Tide::Mid), None);
    }

    #[test]
    fn test_detours_around_sea() {
        let mut board = Board::rectangular(5, 5, Terrain::Plain);
        // Wall of sea across column 2 except the bottom row
        for row in 0..4 {
            board.insert_hex(Hex::new(OffsetCoord::new(2, row), Terrain::Sea));
        }

        let path = find_path(&board, (0, 0).into(), (4, 0).into(), &tank(), Tide::Mid).unwrap();
        assert!(path.contains(&OffsetCoord::new(2, 4)));
        assert!(path_cost(&path) > OffsetCoord::new(0, 0).distance_to(&OffsetCoord::new(4, 0)));
        assert_contiguous(&path);
    }

    #[test]
    fn test_unreachable_goal() {
        let mut board = Board::rectangular(5, 5, Terrain::Plain);
        for row in 0..5 {
            board.insert_hex(Hex::new(OffsetCoord::new(2, row), Terrain::Sea));
        }
        assert_eq!(find_path(&board, (0, 0).into(), (4, 4).into(), &tank(), Tide::Mid), None);
    }

    #[test]
    fn test_tide_changes_passability() {
        let mut board = Board::rectangular(3, 1, Terrain::Sea);
        board.insert_hex(Hex::new(OffsetCoord::new(1, 0), Terrain::Swamp));

        // Boats cross the swamp only when it floods
        assert!(find_path(&board, (0, 0).into(), (2, 0).into(), &boat(), Tide::High).is_some());
        assert!(find_path(&board, (0, 0).into(), (2, 0).into(), &boat(), Tide::Mid).is_none());
        assert!(find_path(&board, (0, 0).into(), (2, 0).into(), &boat(), Tide::Low).is_none());
    }

    #[test]
    fn test_start_terrain_is_not_checked() {
        let mut board = Board::rectangular(3, 3, Terrain::Plain);
        board.insert_hex(Hex::new(OffsetCoord::new(0, 0), Terrain::Sea));

        let path = find_path(&board, (0, 0).into(), (0, 2).into(), &tank(), Tide::Mid).unwrap();
        assert_eq!(path_cost(&path), 2);
    }

    #[test]
    fn test_deterministic() {
        let board = Board::rectangular(7, 7, Terrain::Plain);
        let first = find_path(&board, (0, 0).into(), (6, 6).into(), &tank(), Tide::Mid);
        for _ in 0..10 {
            assert_eq!(find_path(&board, (0, 0).into(), (6, 6).into(), &tank(), Tide::Mid), first);
        }
    }

    #[test]
    fn test_path_cost_of_empty_path() {
        assert_eq!(path_cost(&[]), 0);
    }
}
