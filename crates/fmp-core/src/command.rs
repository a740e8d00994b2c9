//! Commands players issue and the events they produce.
//!
//! This module defines every command a player can give a unit and the
//! events emitted while a game runs. Commands estimate their AP cost against
//! a read-only state, then execute against a mutable one.

use crate::board::{Tide, ZoneId};
use crate::game::GameState;
use crate::hex::{AxialCoord, OffsetCoord};
use crate::pathfinding::{find_path, path_cost};
use crate::player::PlayerId;
use crate::units::{UnitId, UnitTypeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cost reported for a command that cannot be carried out
pub const UNREACHABLE_COST: u32 = u32::MAX;

/// All commands a player can issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Move a unit to a destination hex along the cheapest path
    Move(MoveCommand),
}

impl Command {
    /// AP needed to carry out the command, [`UNREACHABLE_COST`] if it cannot be
    pub fn estimate_ap_cost(&mut self, state: &GameState) -> u32 {
        match self {
            Command::Move(cmd) => cmd.estimate_ap_cost(state),
        }
    }

    /// Apply the command to the game state
    pub fn execute(&mut self, state: &mut GameState) -> Vec<GameEvent> {
        match self {
            Command::Move(cmd) => cmd.execute(state),
        }
    }

    /// Whether the command is possible with `available_ap`
    pub fn can_execute(&mut self, state: &GameState, available_ap: u32) -> bool {
        let cost = self.estimate_ap_cost(state);
        cost != UNREACHABLE_COST && cost <= available_ap
    }

    /// Unit the command acts on
    pub fn unit_id(&self) -> &UnitId {
        match self {
            Command::Move(cmd) => &cmd.unit_id,
        }
    }
}

/// Inputs a cached path was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathKey {
    origin: OffsetCoord,
    second_origin: Option<OffsetCoord>,
    stowed: bool,
    tide: Tide,
    destination: OffsetCoord,
}

#[derive(Debug, Clone, PartialEq)]
struct PathCache {
    key: PathKey,
    path: Option<Vec<OffsetCoord>>,
    /// Where a two-hex unit's second hex ends up
    second: Option<OffsetCoord>,
}

/// Move a unit to `destination`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCommand {
    pub unit_id: UnitId,
    pub destination: OffsetCoord,
    #[serde(skip)]
    cache: Option<PathCache>,
}

impl MoveCommand {
    pub fn new(unit_id: impl Into<UnitId>, destination: OffsetCoord) -> Self {
        Self {
            unit_id: unit_id.into(),
            destination,
            cache: None,
        }
    }

    /// Path from the unit's position to the destination.
    ///
    /// Units stowed in a freighter have no path. A two-hex unit keeps the
    /// shape of its footprint: its second hex shifts by the same offset and
    /// must land on a hex the unit can enter.
    ///
    /// Reuses the cached path while the unit footprint, tide and destination
    /// are unchanged.
    ///
    /// # Panics
    /// If the unit id is not in the game state.
    pub fn path(&mut self, state: &GameState) -> Option<&[OffsetCoord]> {
        self.plan(state).path.as_deref()
    }

    fn plan(&mut self, state: &GameState) -> &PathCache {
        let unit = state.unit(&self.unit_id);
        let key = PathKey {
            origin: unit.position,
            second_origin: unit.second_position,
            stowed: unit.in_freighter,
            tide: state.tide,
            destination: self.destination,
        };

        let hit = matches!(&self.cache, Some(cache) if cache.key == key);
        if !hit {
            let (path, second) = plan_move(state, &key, &unit.id, &unit.unit_type);
            self.cache = Some(PathCache { key, path, second });
        }
        self.cache.as_ref().expect("path cache populated above")
    }

    /// Steps along the path, or [`UNREACHABLE_COST`]
    pub fn estimate_ap_cost(&mut self, state: &GameState) -> u32 {
        self.path(state).map(path_cost).unwrap_or(UNREACHABLE_COST)
    }

    /// Relocate the unit to the end of its path. Without a path this is a
    /// no-op and no event is produced.
    pub fn execute(&mut self, state: &mut GameState) -> Vec<GameEvent> {
        let plan = self.plan(state);
        let (path, second) = (plan.path.clone(), plan.second);
        let Some(path) = path else {
            debug!("Unit {} has no path to {}", self.unit_id, self.destination);
            return Vec::new();
        };
        let (Some(&from), Some(&to)) = (path.first(), path.last()) else {
            return Vec::new();
        };
        if from == to {
            return Vec::new();
        }

        let unit = state.unit_mut(&self.unit_id);
        unit.position = to;
        unit.second_position = second;
        debug!("Unit {} moved {} -> {}", self.unit_id, from, to);

        vec![GameEvent::UnitMoved {
            unit: self.unit_id.clone(),
            from,
            to,
            cost: path_cost(&path),
        }]
    }
}

/// Path and final second hex for a move, `None` path when it is illegal
fn plan_move(
    state: &GameState,
    key: &PathKey,
    unit_id: &str,
    unit_type: &str,
) -> (Option<Vec<OffsetCoord>>, Option<OffsetCoord>) {
    if key.stowed {
        debug!("Unit {} is in a freighter and cannot move", unit_id);
        return (None, None);
    }
    let Some(unit_type) = state.unit_types.get(unit_type) else {
        warn!("Unit {} has unknown type {}", unit_id, unit_type);
        return (None, None);
    };

    let second = key
        .second_origin
        .map(|second| translate(second, key.origin, key.destination));
    if let Some(second) = second {
        let enterable = state
            .board
            .effective_terrain_at(&second, key.tide)
            .map_or(false, |terrain| unit_type.can_enter(terrain));
        if !enterable {
            debug!("Unit {} second hex cannot follow to {}", unit_id, second);
            return (None, None);
        }
    }

    let path = find_path(&state.board, key.origin, key.destination, unit_type, key.tide);
    (path, second)
}

/// Shift `coord` by the hex offset that takes `from` to `to`
fn translate(coord: OffsetCoord, from: OffsetCoord, to: OffsetCoord) -> OffsetCoord {
    let (c, f, t) = (coord.to_axial(), from.to_axial(), to.to_axial());
    AxialCoord::new(c.q + t.q - f.q, c.r + t.r - f.r).to_offset()
}

/// Events that occur during a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new turn began
    TurnStarted { turn: u32, name: String },

    /// The tide for the turn was set
    TideChanged { tide: Tide, card: Option<String> },

    /// A freighter landed
    FreighterLanded {
        player: PlayerId,
        zone: ZoneId,
        hexes: Vec<OffsetCoord>,
    },

    /// No legal landing spot was found
    LandingFailed { player: PlayerId },

    /// A unit left the freighter
    UnitDeployed {
        player: PlayerId,
        unit: UnitId,
        unit_type: UnitTypeId,
        position: OffsetCoord,
        second_position: Option<OffsetCoord>,
    },

    /// A unit had no legal spot and stays in the freighter
    UnitKeptInFreighter {
        player: PlayerId,
        unit: UnitId,
        unit_type: UnitTypeId,
    },

    /// A unit moved
    UnitMoved {
        unit: UnitId,
        from: OffsetCoord,
        to: OffsetCoord,
        cost: u32,
    },

    /// A unit was neutralized or freed by the tide
    NeutralizationChanged { unit: UnitId, neutralized: bool },

    /// A player spent AP on a command
    ApSpent { player: PlayerId, amount: u32 },

    /// A player closed their turn and banked AP
    ApBanked { player: PlayerId, banked: u32 },

    /// Turns ran out
    GameOver { turn: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Hex, Terrain};
    use crate::units::{Unit, UnitType, UnitTypeRegistry};

    fn state() -> GameState {
        let registry: UnitTypeRegistry = [UnitType::new("tank", [Terrain::Plain])].into_iter().collect();
        let mut state = GameState::new(Board::rectangular(5, 5, Terrain::Plain), registry);
        state
            .insert_unit(Unit::new("u1", 0, "tank", OffsetCoord::new(0, 0)))
            .unwrap();
        state
    }

    #[test]
    fn test_move_cost() {
        let state = state();
        let mut cmd = MoveCommand::new("u1", OffsetCoord::new(0, 3));
        assert_eq!(cmd.estimate_ap_cost(&state), 3);
    }

    #[test]
    fn test_move_execute() {
        let mut state = state();
        let mut cmd = Command::Move(MoveCommand::new("u1", OffsetCoord::new(0, 2)));
        let events = cmd.execute(&mut state);

        assert_eq!(state.unit("u1").position, OffsetCoord::new(0, 2));
        assert_eq!(
            events,
            vec![GameEvent::UnitMoved {
                unit: "u1".into(),
                from: OffsetCoord::new(0, 0),
                to: OffsetCoord::new(0, 2),
                cost: 2,
            }]
        );
    }

    #[test]
    fn test_unreachable_move_is_noop() {
        let mut state = state();
        state
            .board
            .insert_hex(Hex::new(OffsetCoord::new(4, 4), Terrain::Sea));
        let mut cmd = Command::Move(MoveCommand::new("u1", OffsetCoord::new(4, 4)));

        assert_eq!(cmd.estimate_ap_cost(&state), UNREACHABLE_COST);
        assert!(!cmd.can_execute(&state, 100));
        assert!(cmd.execute(&mut state).is_empty());
        assert_eq!(state.unit("u1").position, OffsetCoord::new(0, 0));
    }

    #[test]
    fn test_can_execute_respects_budget() {
        let state = state();
        let mut cmd = Command::Move(MoveCommand::new("u1", OffsetCoord::new(0, 3)));
        assert!(cmd.can_execute(&state, 3));
        assert!(!cmd.can_execute(&state, 2));
    }

    #[test]
    fn test_cache_invalidated_by_tide() {
        let registry: UnitTypeRegistry = [UnitType::new("gunboat", [Terrain::Sea])].into_iter().collect();
        let mut board = Board::rectangular(3, 1, Terrain::Sea);
        board.insert_hex(Hex::new(OffsetCoord::new(1, 0), Terrain::Swamp));
        let mut state = GameState::new(board, registry);
        state
            .insert_unit(Unit::new("boat", 0, "gunboat", OffsetCoord::new(0, 0)))
            .unwrap();

        let mut cmd = MoveCommand::new("boat", OffsetCoord::new(2, 0));
        state.tide = Tide::Mid;
        assert_eq!(cmd.estimate_ap_cost(&state), UNREACHABLE_COST);

        state.tide = Tide::High;
        assert_eq!(cmd.estimate_ap_cost(&state), 2);
    }

    #[test]
    fn test_cache_invalidated_by_unit_move() {
        let mut state = state();
        let mut cmd = MoveCommand::new("u1", OffsetCoord::new(0, 3));
        assert_eq!(cmd.estimate_ap_cost(&state), 3);

        state.unit_mut("u1").position = OffsetCoord::new(0, 2);
        assert_eq!(cmd.estimate_ap_cost(&state), 1);
    }

    #[test]
    fn test_move_to_current_position() {
        let mut state = state();
        let mut cmd = MoveCommand::new("u1", OffsetCoord::new(0, 0));
        assert_eq!(cmd.estimate_ap_cost(&state), 0);
        assert!(cmd.execute(&mut state).is_empty());
    }

    fn barge_state(position: OffsetCoord, second: OffsetCoord) -> GameState {
        let registry: UnitTypeRegistry = [UnitType::new("barge", [Terrain::Sea])].into_iter().collect();
        let mut state = GameState::new(Board::rectangular(5, 5, Terrain::Sea), registry);
        let mut barge = Unit::new("b1", 0, "barge", position);
        barge.second_position = Some(second);
        state.insert_unit(barge).unwrap();
        state
    }

    #[test]
    fn test_stowed_unit_cannot_move() {
        let mut state = state();
        state.unit_mut("u1").in_freighter = true;
        let mut cmd = Command::Move(MoveCommand::new("u1", OffsetCoord::new(0, 2)));

        assert_eq!(cmd.estimate_ap_cost(&state), UNREACHABLE_COST);
        assert!(cmd.execute(&mut state).is_empty());
        assert_eq!(state.unit("u1").position, OffsetCoord::new(0, 0));

        // Unloading makes the same command valid again
        state.unit_mut("u1").in_freighter = false;
        assert_eq!(cmd.estimate_ap_cost(&state), 2);
    }

    #[test]
    fn test_two_hex_unit_moves_whole_footprint() {
        let mut state = barge_state(OffsetCoord::new(2, 2), OffsetCoord::new(2, 3));
        let mut cmd = MoveCommand::new("b1", OffsetCoord::new(2, 0));
        cmd.execute(&mut state);

        let barge = state.unit("b1");
        assert_eq!(barge.position, OffsetCoord::new(2, 0));
        assert_eq!(barge.second_position, Some(OffsetCoord::new(2, 1)));
        assert!(!state.is_occupied(&OffsetCoord::new(2, 3)));
        assert!(state.is_occupied(&OffsetCoord::new(2, 1)));
    }

    #[test]
    fn test_two_hex_unit_keeps_orientation_across_columns() {
        let mut state = barge_state(OffsetCoord::new(2, 2), OffsetCoord::new(2, 3));
        let mut cmd = MoveCommand::new("b1", OffsetCoord::new(3, 2));
        cmd.execute(&mut state);

        let barge = state.unit("b1");
        assert_eq!(barge.second_position, Some(OffsetCoord::new(3, 3)));
        assert_eq!(
            barge.position.direction_to(&OffsetCoord::new(3, 3)),
            Some(crate::hex::Direction::South)
        );
    }

    #[test]
    fn test_two_hex_unit_blocked_when_second_hex_leaves_board() {
        let mut state = barge_state(OffsetCoord::new(2, 1), OffsetCoord::new(2, 2));
        let mut cmd = Command::Move(MoveCommand::new("b1", OffsetCoord::new(2, 4)));

        assert_eq!(cmd.estimate_ap_cost(&state), UNREACHABLE_COST);
        assert!(cmd.execute(&mut state).is_empty());
        assert_eq!(state.unit("b1").second_position, Some(OffsetCoord::new(2, 2)));
    }

    #[test]
    #[should_panic]
    fn test_unknown_unit_panics() {
        let state = state();
        MoveCommand::new("ghost", OffsetCoord::new(0, 1)).estimate_ap_cost(&state);
    }
}
