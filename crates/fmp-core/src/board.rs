//! Planet board representation: terrain, tides, zones and freighter footprints.
//!
//! This module contains:
//! - Terrain types and how the tide changes them
//! - Hexes and the board registry (coordinate lookup, zones)
//! - Neighbour and edge-of-map queries
//! - Freighter footprint computation
//! - A JSON-friendly board view for external consumers

use crate::hex::{Direction, OffsetCoord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Zone identifier as it appears in map data ("1".."14")
pub type ZoneId = String;

/// Maximum number of pods a freighter has around its bubble
pub const FREIGHTER_PODS: usize = 3;

/// Terrain category stored on a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Plain,
    Swamp,
    Mountain,
    Sea,
    Reef,
}

impl Terrain {
    /// All terrain types
    pub const ALL: [Terrain; 5] = [
        Terrain::Plain,
        Terrain::Swamp,
        Terrain::Mountain,
        Terrain::Sea,
        Terrain::Reef,
    ];

    /// Terrain as seen under a given tide.
    ///
    /// Swamp and reef dry out to plain at low tide and flood to sea at high
    /// tide. Every other terrain, and every terrain at mid tide, is unchanged.
    pub fn under_tide(self, tide: Tide) -> Terrain {
        match (self, tide) {
            (Terrain::Swamp | Terrain::Reef, Tide::Low) => Terrain::Plain,
            (Terrain::Swamp | Terrain::Reef, Tide::High) => Terrain::Sea,
            (terrain, _) => terrain,
        }
    }

    /// Whether the tide can change this terrain
    pub fn is_tidal(self) -> bool {
        matches!(self, Terrain::Swamp | Terrain::Reef)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Terrain::Plain => "plain",
            Terrain::Swamp => "swamp",
            Terrain::Mountain => "mountain",
            Terrain::Sea => "sea",
            Terrain::Reef => "reef",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Terrain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Terrain::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown terrain '{s}'"))
    }
}

/// Global tide level for the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tide {
    Low,
    #[default]
    Mid,
    High,
}

impl Tide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tide::Low => "low",
            Tide::Mid => "mid",
            Tide::High => "high",
        }
    }
}

impl fmt::Display for Tide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single hex on the planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hex {
    /// Position on the grid
    pub coord: OffsetCoord,
    /// Stored terrain, before any tide is applied
    pub terrain: Terrain,
    /// Whether an ore marker sits on this hex
    pub ore: bool,
    /// Landing zone this hex belongs to, if any
    pub zone_id: Option<ZoneId>,
    /// Optional label for special hexes
    pub name: Option<String>,
    /// Victory points awarded for holding this hex
    #[serde(default)]
    pub victory_points: u32,
}

impl Hex {
    pub fn new(coord: OffsetCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            ore: false,
            zone_id: None,
            name: None,
            victory_points: 0,
        }
    }

    pub fn with_ore(mut self, ore: bool) -> Self {
        self.ore = ore;
        self
    }

    pub fn in_zone(mut self, zone: impl Into<ZoneId>) -> Self {
        self.zone_id = Some(zone.into());
        self
    }

    /// Pixel centre for renderers; derived, never stored
    pub fn pixel_center(&self, hex_size: f64) -> (f64, f64) {
        self.coord.to_pixel(hex_size)
    }
}

/// The planet board: every playable hex plus zone membership.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BoardJson", into = "BoardJson")]
pub struct Board {
    /// All hexes indexed by coordinate
    hexes: HashMap<OffsetCoord, Hex>,
    /// Zone membership lists
    zones: HashMap<ZoneId, Vec<OffsetCoord>>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `cols` x `rows` board covered in a single terrain
    pub fn rectangular(cols: i32, rows: i32, terrain: Terrain) -> Self {
        let mut board = Self::new();
        for col in 0..cols {
            for row in 0..rows {
                board.insert_hex(Hex::new(OffsetCoord::new(col, row), terrain));
            }
        }
        board
    }

    /// Add or replace a hex. A zone id on the hex registers zone membership;
    /// a replaced hex leaves the zone it was in.
    pub fn insert_hex(&mut self, hex: Hex) -> Option<Hex> {
        let old_zone = self.hexes.get(&hex.coord).and_then(|old| old.zone_id.clone());
        if let Some(old_zone) = old_zone.filter(|z| hex.zone_id.as_ref() != Some(z)) {
            if let Some(members) = self.zones.get_mut(&old_zone) {
                members.retain(|c| *c != hex.coord);
            }
        }
        if let Some(zone) = &hex.zone_id {
            let members = self.zones.entry(zone.clone()).or_default();
            if !members.contains(&hex.coord) {
                members.push(hex.coord);
            }
        }
        self.hexes.insert(hex.coord, hex)
    }

    /// Register coordinates as members of a zone.
    ///
    /// Coordinates without a hex (half-hex markers dropped at load, typos in
    /// map data) are skipped. Returns how many were added.
    pub fn add_zone_members(
        &mut self,
        zone: &str,
        coords: impl IntoIterator<Item = OffsetCoord>,
    ) -> usize {
        let mut added = 0;
        for coord in coords {
            if !self.hexes.contains_key(&coord) {
                debug!("Zone {} references missing hex {}, skipping", zone, coord);
                continue;
            }
            let members = self.zones.entry(zone.to_string()).or_default();
            if !members.contains(&coord) {
                members.push(coord);
                added += 1;
            }
        }
        added
    }

    /// Look up a hex
    pub fn get_hex(&self, coord: &OffsetCoord) -> Option<&Hex> {
        self.hexes.get(coord)
    }

    pub fn get_hex_mut(&mut self, coord: &OffsetCoord) -> Option<&mut Hex> {
        self.hexes.get_mut(coord)
    }

    pub fn contains(&self, coord: &OffsetCoord) -> bool {
        self.hexes.contains_key(coord)
    }

    /// All hexes, in no particular order
    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    /// Zone ids known to the board, sorted
    pub fn zone_ids(&self) -> Vec<&ZoneId> {
        let mut ids: Vec<_> = self.zones.keys().collect();
        ids.sort();
        ids
    }

    /// Hexes adjacent to `coord` that exist on the board, in
    /// [`Direction::ALL`] order. `coord` itself need not be on the board.
    pub fn neighbors(&self, coord: &OffsetCoord) -> Vec<&Hex> {
        coord
            .neighbors()
            .iter()
            .filter_map(|n| self.hexes.get(n))
            .collect()
    }

    /// Coordinates of the on-board neighbours of `coord`
    pub fn neighbor_coords(&self, coord: &OffsetCoord) -> Vec<OffsetCoord> {
        self.neighbors(coord).into_iter().map(|h| h.coord).collect()
    }

    /// Whether a hex lies on the edge of the map.
    ///
    /// A missing coordinate counts as an edge, as does any hex with at least
    /// one of its six direction cells off the board.
    pub fn is_edge(&self, coord: &OffsetCoord) -> bool {
        if !self.contains(coord) {
            return true;
        }
        coord.neighbors().iter().any(|n| !self.contains(n))
    }

    /// Hexes belonging to a zone. Only coordinates that resolve to a hex are
    /// returned.
    pub fn hexes_in_zone(&self, zone: &str) -> Vec<&Hex> {
        self.zones
            .get(zone)
            .map(|coords| coords.iter().filter_map(|c| self.hexes.get(c)).collect())
            .unwrap_or_default()
    }

    /// Terrain a unit on `hex` actually experiences under `tide`
    pub fn effective_terrain(&self, hex: &Hex, tide: Tide) -> Terrain {
        hex.terrain.under_tide(tide)
    }

    /// Effective terrain at a coordinate, `None` off the board
    pub fn effective_terrain_at(&self, coord: &OffsetCoord, tide: Tide) -> Option<Terrain> {
        self.get_hex(coord).map(|hex| self.effective_terrain(hex, tide))
    }

    /// Compute the four hexes a freighter covers: `[bubble, pod1, pod2, pod3]`.
    ///
    /// Angles are degrees clockwise from North in steps of 60. Invalid angles
    /// are logged and skipped, so the result may be shorter than four; callers
    /// validate the footprint before using it. Nothing here checks that the
    /// cells exist on the board.
    pub fn place_freighter(&self, bubble: OffsetCoord, pod_angles: &[i32]) -> Vec<OffsetCoord> {
        let mut cells = Vec::with_capacity(FREIGHTER_PODS + 1);
        cells.push(bubble);

        if pod_angles.len() != FREIGHTER_PODS {
            warn!(
                "Freighter at {} given {} pod angles, expected {}",
                bubble,
                pod_angles.len(),
                FREIGHTER_PODS
            );
        }

        for &angle in pod_angles.iter().take(FREIGHTER_PODS) {
            match Direction::from_angle(angle) {
                Some(dir) => {
                    let (dc, dr) = dir.offset_delta(bubble.col);
                    cells.push(OffsetCoord::new(bubble.col + dc, bubble.row + dr));
                }
                None => warn!("Invalid pod angle {} for freighter at {}, skipping pod", angle, bubble),
            }
        }

        cells
    }

    /// Remove ore from every hex of a zone. Returns the number of markers removed.
    pub fn clear_ore_in_zone(&mut self, zone: &str) -> usize {
        let coords = self.zones.get(zone).cloned().unwrap_or_default();
        let mut cleared = 0;
        for coord in coords {
            if let Some(hex) = self.hexes.get_mut(&coord) {
                if hex.ore {
                    hex.ore = false;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Tide rule for attack boats: a boat on a hex whose *stored* terrain is
    /// swamp is stranded at high tide. Off-board positions are never stranded.
    pub fn strands_attack_boat(&self, coord: &OffsetCoord, tide: Tide) -> bool {
        self.get_hex(coord)
            .map(|hex| hex.terrain == Terrain::Swamp && tide == Tide::High)
            .unwrap_or(false)
    }

    /// Get a JSON-friendly representation of the board
    pub fn to_json_friendly(&self) -> BoardJson {
        BoardJson::from(self.clone())
    }
}

/// JSON-friendly board view: hexes as a sorted list, zones as a sorted map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub hexes: Vec<Hex>,
    pub zones: BTreeMap<ZoneId, Vec<OffsetCoord>>,
}

impl From<Board> for BoardJson {
    fn from(board: Board) -> Self {
        let mut hexes: Vec<Hex> = board.hexes.into_values().collect();
        hexes.sort_by_key(|h| h.coord);
        Self {
            hexes,
            zones: board.zones.into_iter().collect(),
        }
    }
}

impl From<BoardJson> for Board {
    fn from(json: BoardJson) -> Self {
        let mut board = Board::new();
        for hex in json.hexes {
            board.insert_hex(hex);
        }
        for (zone, coords) in json.zones {
            board.add_zone_members(&zone, coords);
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoned_board() -> Board {
        let mut board = Board::rectangular(6, 6, Terrain::Plain);
        for coord in [OffsetCoord::new(2, 2), OffsetCoord::new(2, 3), OffsetCoord::new(3, 2)] {
            let hex = board.get_hex(&coord).cloned().unwrap();
            board.insert_hex(hex.in_zone("1").with_ore(true));
        }
        board
    }

    #[test]
    fn test_effective_terrain_table() {
        assert_eq!(Terrain::Swamp.under_tide(Tide::Low), Terrain::Plain);
        assert_eq!(Terrain::Swamp.under_tide(Tide::High), Terrain::Sea);
        assert_eq!(Terrain::Swamp.under_tide(Tide::Mid), Terrain::Swamp);
        assert_eq!(Terrain::Reef.under_tide(Tide::Low), Terrain::Plain);
        assert_eq!(Terrain::Reef.under_tide(Tide::High), Terrain::Sea);
        assert_eq!(Terrain::Reef.under_tide(Tide::Mid), Terrain::Reef);

        for tide in [Tide::Low, Tide::Mid, Tide::High] {
            assert_eq!(Terrain::Sea.under_tide(tide), Terrain::Sea);
            assert_eq!(Terrain::Plain.under_tide(tide), Terrain::Plain);
            assert_eq!(Terrain::Mountain.under_tide(tide), Terrain::Mountain);
        }
    }

    #[test]
    fn test_effective_terrain_uses_stored_terrain() {
        let mut board = Board::new();
        let coord = OffsetCoord::new(0, 0);
        board.insert_hex(Hex::new(coord, Terrain::Swamp));

        let hex = board.get_hex(&coord).unwrap();
        assert_eq!(board.effective_terrain(hex, Tide::High), Terrain::Sea);
        assert_eq!(board.effective_terrain_at(&coord, Tide::Low), Some(Terrain::Plain));
        assert_eq!(board.effective_terrain_at(&OffsetCoord::new(9, 9), Tide::Low), None);
        // The stored terrain is never rewritten
        assert_eq!(hex.terrain, Terrain::Swamp);
    }

    #[test]
    fn test_terrain_parse() {
        assert_eq!("reef".parse::<Terrain>(), Ok(Terrain::Reef));
        assert!("lava".parse::<Terrain>().is_err());
    }

    #[test]
    fn test_neighbors_symmetric() {
        let board = Board::rectangular(5, 5, Terrain::Plain);
        for hex in board.hexes() {
            let neighbors = board.neighbors(&hex.coord);
            assert!(neighbors.len() <= 6);
            for n in neighbors {
                assert!(board.neighbor_coords(&n.coord).contains(&hex.coord));
            }
        }
    }

    #[test]
    fn test_neighbors_of_off_board_coord() {
        let board = Board::rectangular(3, 3, Terrain::Plain);
        assert!(board.neighbors(&OffsetCoord::new(10, 10)).is_empty());

        // Just past the east edge: only the column-2 cells come back
        let outside = OffsetCoord::new(3, 1);
        let neighbors = board.neighbor_coords(&outside);
        assert_eq!(neighbors.len(), 2);
        for n in neighbors {
            assert_eq!(n.col, 2);
            assert_eq!(outside.distance_to(&n), 1);
        }
    }

    #[test]
    fn test_replacing_hex_moves_zone_membership() {
        let coord = OffsetCoord::new(1, 1);
        let mut board = Board::rectangular(3, 3, Terrain::Plain);
        board.insert_hex(Hex::new(coord, Terrain::Plain).in_zone("1"));
        board.insert_hex(Hex::new(coord, Terrain::Swamp).in_zone("2"));

        assert!(board.hexes_in_zone("1").is_empty());
        let zone2: Vec<_> = board.hexes_in_zone("2").iter().map(|h| h.coord).collect();
        assert_eq!(zone2, vec![coord]);

        // Dropping the zone entirely also clears the old membership
        board.insert_hex(Hex::new(coord, Terrain::Plain));
        assert!(board.hexes_in_zone("2").is_empty());

        // Same zone again does not duplicate the entry
        board.insert_hex(Hex::new(coord, Terrain::Plain).in_zone("3"));
        board.insert_hex(Hex::new(coord, Terrain::Mountain).in_zone("3"));
        assert_eq!(board.hexes_in_zone("3").len(), 1);
    }

    #[test]
    fn test_corner_neighbors() {
        let board = Board::rectangular(5, 5, Terrain::Plain);
        // Even column 0 at row 0: south, north-east and south-east exist
        let coords = board.neighbor_coords(&OffsetCoord::new(0, 0));
        assert_eq!(
            coords,
            vec![OffsetCoord::new(1, 0), OffsetCoord::new(1, 1), OffsetCoord::new(0, 1)]
        );
    }

    #[test]
    fn test_is_edge() {
        let board = Board::rectangular(5, 5, Terrain::Plain);
        assert!(board.is_edge(&OffsetCoord::new(0, 0)));
        assert!(board.is_edge(&OffsetCoord::new(4, 2)));
        assert!(!board.is_edge(&OffsetCoord::new(2, 2)));
        assert!(board.is_edge(&OffsetCoord::new(7, 7)));
    }

    #[test]
    fn test_hexes_in_zone_skips_missing() {
        let mut board = zoned_board();
        let added = board.add_zone_members("1", [OffsetCoord::new(3, 3), OffsetCoord::new(40, 40)]);
        assert_eq!(added, 1);

        let zone: Vec<_> = board.hexes_in_zone("1").iter().map(|h| h.coord).collect();
        assert_eq!(zone.len(), 4);
        assert!(!zone.contains(&OffsetCoord::new(40, 40)));
        assert!(board.hexes_in_zone("99").is_empty());
    }

    #[test]
    fn test_place_freighter_even_column() {
        let board = Board::new();
        let cells = board.place_freighter(OffsetCoord::new(2, 2), &[0, 120, 240]);
        assert_eq!(
            cells,
            vec![
                OffsetCoord::new(2, 2),
                OffsetCoord::new(2, 1),
                OffsetCoord::new(3, 3),
                OffsetCoord::new(1, 3),
            ]
        );
    }

    #[test]
    fn test_place_freighter_odd_column() {
        let board = Board::new();
        let cells = board.place_freighter(OffsetCoord::new(3, 2), &[60, 180, 300]);
        assert_eq!(
            cells,
            vec![
                OffsetCoord::new(3, 2),
                OffsetCoord::new(4, 1),
                OffsetCoord::new(3, 3),
                OffsetCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_place_freighter_pods_are_adjacent() {
        let board = Board::new();
        for bubble in [OffsetCoord::new(4, 4), OffsetCoord::new(5, 4)] {
            let cells = board.place_freighter(bubble, &[0, 60, 120]);
            for pod in &cells[1..] {
                assert_eq!(bubble.distance_to(pod), 1);
            }
        }
    }

    #[test]
    fn test_place_freighter_invalid_angle_fails_soft() {
        let board = Board::new();
        let cells = board.place_freighter(OffsetCoord::new(2, 2), &[0, 45, 240]);
        assert_eq!(cells.len(), 3);

        let too_many = board.place_freighter(OffsetCoord::new(2, 2), &[0, 60, 120, 180]);
        assert_eq!(too_many.len(), 4);
    }

    #[test]
    fn test_clear_ore_in_zone() {
        let mut board = zoned_board();
        board.insert_hex(Hex::new(OffsetCoord::new(0, 0), Terrain::Plain).with_ore(true));

        assert_eq!(board.clear_ore_in_zone("1"), 3);
        assert!(board.hexes_in_zone("1").iter().all(|h| !h.ore));
        // Hexes outside the zone keep their ore
        assert!(board.get_hex(&OffsetCoord::new(0, 0)).unwrap().ore);
        assert_eq!(board.clear_ore_in_zone("1"), 0);
    }

    #[test]
    fn test_strands_attack_boat() {
        let mut board = Board::new();
        let swamp = OffsetCoord::new(0, 0);
        let sea = OffsetCoord::new(0, 1);
        board.insert_hex(Hex::new(swamp, Terrain::Swamp));
        board.insert_hex(Hex::new(sea, Terrain::Sea));

        assert!(board.strands_attack_boat(&swamp, Tide::High));
        assert!(!board.strands_attack_boat(&swamp, Tide::Mid));
        assert!(!board.strands_attack_boat(&swamp, Tide::Low));
        assert!(!board.strands_attack_boat(&sea, Tide::High));
        assert!(!board.strands_attack_boat(&OffsetCoord::new(5, 5), Tide::High));
    }

    #[test]
    fn test_board_json_round_trip_keeps_zones() {
        let board = zoned_board();
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), board.len());
        assert_eq!(restored.hexes_in_zone("1").len(), 3);
        assert!(restored.get_hex(&OffsetCoord::new(2, 2)).unwrap().ore);
    }
}
