//! Turn sequencing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rules for a single game turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDefinition {
    pub number: u32,
    pub name: String,
    /// Base AP each player receives this turn
    pub action_points: u32,
    /// Informational tag ("arrival", "deployment", ...)
    #[serde(default)]
    pub special: Option<String>,
    /// Whether the tide deck reshuffles on this turn
    #[serde(default)]
    pub tide_reshuffle: bool,
}

impl TurnDefinition {
    pub fn new(number: u32, name: impl Into<String>, action_points: u32) -> Self {
        Self {
            number,
            name: name.into(),
            action_points,
            special: None,
            tide_reshuffle: false,
        }
    }
}

/// Walks through the turn definitions one turn at a time.
///
/// The counter starts at 0; running past the last defined turn is the
/// game-over signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnManager {
    definitions: BTreeMap<u32, TurnDefinition>,
    current_turn: u32,
}

impl TurnManager {
    /// Build from definitions. A repeated turn number keeps the first one.
    pub fn new(definitions: impl IntoIterator<Item = TurnDefinition>) -> Self {
        let mut map = BTreeMap::new();
        for def in definitions {
            map.entry(def.number).or_insert(def);
        }
        Self {
            definitions: map,
            current_turn: 0,
        }
    }

    /// Move to the next turn and return its definition
    pub fn advance_turn(&mut self) -> Option<&TurnDefinition> {
        self.current_turn += 1;
        self.current_definition()
    }

    pub fn turn_definition(&self, number: u32) -> Option<&TurnDefinition> {
        self.definitions.get(&number)
    }

    pub fn current_definition(&self) -> Option<&TurnDefinition> {
        self.turn_definition(self.current_turn)
    }

    pub fn current_turn_number(&self) -> u32 {
        self.current_turn
    }

    /// Turns flagged to reshuffle the tide deck
    pub fn reshuffle_turns(&self) -> impl Iterator<Item = u32> + '_ {
        self.definitions
            .values()
            .filter(|def| def.tide_reshuffle)
            .map(|def| def.number)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
