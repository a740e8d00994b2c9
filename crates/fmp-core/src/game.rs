//! Core game state.
//!
//! This module contains the `GameState` aggregate every command and phase
//! operates on, and the errors raised when it is misused.

use crate::board::{Board, Tide};
use crate::command::GameEvent;
use crate::hex::OffsetCoord;
use crate::player::{Player, PlayerId};
use crate::units::{Unit, UnitId, UnitType, UnitTypeId, UnitTypeRegistry, ATTACK_BOAT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when building or running a game
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Unit {unit} references unknown unit type '{unit_type}'")]
    UnknownUnitType { unit: UnitId, unit_type: UnitTypeId },

    #[error("Unit id {0} is already in use")]
    DuplicateUnit(UnitId),

    #[error("Unsupported player count {0}, expected 2 to 4")]
    InvalidPlayerCount(usize),

    #[error("Required unit type '{0}' is not defined")]
    MissingUnitType(UnitTypeId),

    #[error("Game is over")]
    GameOver,
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The planet board
    pub board: Board,
    /// Tide in force this turn
    pub tide: Tide,
    /// All players
    pub players: Vec<Player>,
    /// Known unit types
    pub unit_types: UnitTypeRegistry,
    /// Turn number (0 before the first turn)
    pub turn_number: u32,
    /// Live units by id
    units: BTreeMap<UnitId, Unit>,
}

impl GameState {
    /// Create a game with no players and no units
    pub fn new(board: Board, unit_types: UnitTypeRegistry) -> Self {
        Self {
            board,
            tide: Tide::default(),
            players: Vec::new(),
            unit_types,
            turn_number: 0,
            units: BTreeMap::new(),
        }
    }

    /// Add a player; ids are handed out in order
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = self.players.len() as PlayerId;
        self.players.push(Player::new(id, name.into()));
        id
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Get a mutable player by ID
    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    /// Add a unit. Its type must be registered and its id unused.
    pub fn insert_unit(&mut self, unit: Unit) -> Result<(), GameError> {
        if !self.unit_types.contains(&unit.unit_type) {
            return Err(GameError::UnknownUnitType {
                unit: unit.id,
                unit_type: unit.unit_type,
            });
        }
        if self.units.contains_key(&unit.id) {
            return Err(GameError::DuplicateUnit(unit.id));
        }
        self.units.insert(unit.id.clone(), unit);
        Ok(())
    }

    /// Look up a unit that must exist.
    ///
    /// # Panics
    /// If no unit has this id.
    pub fn unit(&self, id: &str) -> &Unit {
        self.units
            .get(id)
            .unwrap_or_else(|| panic!("unknown unit id {id}"))
    }

    /// Mutable form of [`GameState::unit`].
    ///
    /// # Panics
    /// If no unit has this id.
    pub fn unit_mut(&mut self, id: &str) -> &mut Unit {
        self.units
            .get_mut(id)
            .unwrap_or_else(|| panic!("unknown unit id {id}"))
    }

    pub fn get_unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    /// All units, ordered by id
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner == player)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Type of a unit
    pub fn unit_type_of(&self, unit: &Unit) -> Option<&UnitType> {
        self.unit_types.get(&unit.unit_type)
    }

    /// Whether any unit on the board covers `coord`
    pub fn is_occupied(&self, coord: &OffsetCoord) -> bool {
        self.units
            .values()
            .filter(|u| u.is_on_board())
            .any(|u| u.occupied_hexes().contains(coord))
    }

    /// Re-apply the tide rules to every unit.
    ///
    /// An attack boat is neutralized exactly when its hex is stored as swamp
    /// and the tide is high; other unit types are left alone. Units stowed
    /// in a freighter are judged at their recorded position, the bubble.
    /// Returns an event for each unit whose state changed, so a second call
    /// with the same tide returns nothing.
    pub fn apply_tide_effects(&mut self) -> Vec<GameEvent> {
        let tide = self.tide;
        let mut events = Vec::new();

        for unit in self.units.values_mut() {
            if unit.unit_type != ATTACK_BOAT {
                continue;
            }
            if !self.board.contains(&unit.position) {
                continue;
            }

            let neutralized = self.board.strands_attack_boat(&unit.position, tide);
            if unit.neutralized != neutralized {
                debug!("Unit {} neutralized: {} ({} tide)", unit.id, neutralized, tide);
                unit.neutralized = neutralized;
                events.push(GameEvent::NeutralizationChanged {
                    unit: unit.id.clone(),
                    neutralized,
                });
            }
        }

        events
    }

    /// Serialize the state to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
