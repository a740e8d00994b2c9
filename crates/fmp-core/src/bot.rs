//! Computer players.
//!
//! Bots plug into the engine's action loop as an [`ActionPlanner`]:
//! - Easy: each unit takes one random step
//! - Medium: each unit heads for the nearest ore it can reach

use crate::command::{Command, MoveCommand};
use crate::engine::ActionPlanner;
use crate::game::GameState;
use crate::hex::OffsetCoord;
use crate::pathfinding::find_path;
use crate::player::PlayerId;
use crate::units::{Unit, UnitId, UnitType};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
}

/// A planner that moves every free unit of the player at most once a turn
#[derive(Debug)]
pub struct Bot {
    pub difficulty: BotDifficulty,
    rng: StdRng,
    turn: u32,
    acted: HashSet<UnitId>,
}

impl Bot {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self::from_rng(difficulty, StdRng::from_entropy())
    }

    pub fn with_seed(difficulty: BotDifficulty, seed: u64) -> Self {
        Self::from_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn from_rng(difficulty: BotDifficulty, rng: StdRng) -> Self {
        Self {
            difficulty,
            rng,
            turn: 0,
            acted: HashSet::new(),
        }
    }

    /// Easy: a random free neighbour the unit can stand on
    fn random_step(&mut self, state: &GameState, unit: &Unit, unit_type: &UnitType) -> Option<OffsetCoord> {
        let options: Vec<OffsetCoord> = state
            .board
            .neighbors(&unit.position)
            .into_iter()
            .filter(|h| unit_type.can_enter(state.board.effective_terrain(h, state.tide)))
            .map(|h| h.coord)
            .filter(|c| !state.is_occupied(c))
            .collect();
        options.choose(&mut self.rng).copied()
    }
}

/// Medium: as far along the path to the nearest ore as `budget` allows,
/// stopping short of occupied hexes
fn ore_step(state: &GameState, unit: &Unit, unit_type: &UnitType, budget: u32) -> Option<OffsetCoord> {
    let target = state
        .board
        .hexes()
        .filter(|h| h.ore && h.coord != unit.position)
        .filter(|h| unit_type.can_enter(state.board.effective_terrain(h, state.tide)))
        .filter(|h| !state.is_occupied(&h.coord))
        .map(|h| (unit.position.distance_to(&h.coord), h.coord))
        .min()?
        .1;

    let path = find_path(&state.board, unit.position, target, unit_type, state.tide)?;
    let reach = (budget as usize).min(path.len().saturating_sub(1));
    path[1..=reach]
        .iter()
        .rev()
        .find(|c| !state.is_occupied(c))
        .copied()
}

impl ActionPlanner for Bot {
    fn next_command(&mut self, state: &GameState, player: PlayerId) -> Option<Command> {
        if state.turn_number != self.turn {
            self.turn = state.turn_number;
            self.acted.clear();
        }

        let budget = state.get_player(player)?.available_ap();
        if budget == 0 {
            return None;
        }

        // Barges span two hexes and neutralized units cannot act
        let candidates: Vec<&Unit> = state
            .units_of(player)
            .filter(|u| u.is_on_board() && !u.neutralized && u.second_position.is_none())
            .filter(|u| !self.acted.contains(&u.id))
            .collect();

        for unit in candidates {
            self.acted.insert(unit.id.clone());
            let Some(unit_type) = state.unit_type_of(unit) else {
                continue;
            };

            let destination = match self.difficulty {
                BotDifficulty::Easy => self.random_step(state, unit, unit_type),
                BotDifficulty::Medium => ore_step(state, unit, unit_type, budget),
            };
            let Some(destination) = destination else {
                continue;
            };

            let mut command = Command::Move(MoveCommand::new(unit.id.clone(), destination));
            if command.can_execute(state, budget) {
                debug!("Bot for player {} moves {} to {}", player, unit.id, destination);
                return Some(command);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Hex, Terrain};
    use crate::units::UnitTypeRegistry;

    fn game() -> GameState {
        let registry: UnitTypeRegistry = [UnitType::new("tank", [Terrain::Plain])].into_iter().collect();
        let mut board = Board::rectangular(6, 6, Terrain::Plain);
        board.insert_hex(Hex::new(OffsetCoord::new(0, 5), Terrain::Plain).with_ore(true));
        let mut state = GameState::new(board, registry);
        state.add_player("Bot");
        state.turn_number = 3;
        state
            .insert_unit(Unit::new("t1", 0, "tank", OffsetCoord::new(0, 0)))
            .unwrap();
        state.get_player_mut(0).unwrap().prepare_for_new_turn(3);
        state
    }

    fn destination(command: Option<Command>) -> OffsetCoord {
        match command {
            Some(Command::Move(m)) => m.destination,
            None => panic!("expected a move"),
        }
    }

    #[test]
    fn test_easy_bot_takes_one_step() {
        let state = game();
        let mut bot = Bot::with_seed(BotDifficulty::Easy, 42);
        let to = destination(bot.next_command(&state, 0));
        assert_eq!(OffsetCoord::new(0, 0).distance_to(&to), 1);
    }

    #[test]
    fn test_medium_bot_heads_for_ore() {
        let state = game();
        let mut bot = Bot::with_seed(BotDifficulty::Medium, 1);
        // Three AP toward ore five rows south
        assert_eq!(destination(bot.next_command(&state, 0)), OffsetCoord::new(0, 3));
    }

    #[test]
    fn test_bot_moves_each_unit_once_per_turn() {
        let mut state = game();
        let mut bot = Bot::with_seed(BotDifficulty::Medium, 1);
        assert!(bot.next_command(&state, 0).is_some());
        assert!(bot.next_command(&state, 0).is_none());

        state.turn_number += 1;
        assert!(bot.next_command(&state, 0).is_some());
    }

    #[test]
    fn test_bot_idle_without_ap() {
        let mut state = game();
        state.get_player_mut(0).unwrap().prepare_for_new_turn(0);
        let mut bot = Bot::with_seed(BotDifficulty::Easy, 7);
        assert!(bot.next_command(&state, 0).is_none());
    }

    #[test]
    fn test_bot_skips_neutralized_units() {
        let mut state = game();
        state.unit_mut("t1").neutralized = true;
        let mut bot = Bot::with_seed(BotDifficulty::Medium, 3);
        assert!(bot.next_command(&state, 0).is_none());
    }

    #[test]
    fn test_bot_stops_short_of_occupied_hex() {
        let mut state = game();
        state
            .insert_unit(Unit::new("t2", 0, "tank", OffsetCoord::new(0, 3)))
            .unwrap();
        let mut bot = Bot::with_seed(BotDifficulty::Medium, 3);
        let first = destination(bot.next_command(&state, 0));
        assert_ne!(first, OffsetCoord::new(0, 3));
    }
}
