//! End-of-game summary printed by the simulator.

use fmp_core::{ActionPlanner, Engine, GameEvent, OffsetCoord, PlayerId, Tide, ZoneId};
use serde::Serialize;
use std::fmt;

/// One player's standing at the end of the run.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub landing_zone: Option<ZoneId>,
    pub bubble: Option<OffsetCoord>,
    pub units_on_board: usize,
    pub units_in_freighter: usize,
    pub banked_ap: u32,
    pub moves: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub turns_played: u32,
    pub final_tide: Tide,
    pub neutralized_units: usize,
    pub players: Vec<PlayerSummary>,
}

impl GameSummary {
    pub fn from_engine<P: ActionPlanner>(engine: &Engine<P>, turns_played: u32) -> Self {
        let state = engine.state();
        let players = state
            .players
            .iter()
            .map(|player| {
                let landing = engine.landings().get(&player.id);
                let moves = engine
                    .events()
                    .iter()
                    .filter(|e| match e {
                        GameEvent::UnitMoved { unit, .. } => {
                            state.get_unit(unit).map_or(false, |u| u.owner == player.id)
                        }
                        _ => false,
                    })
                    .count();
                PlayerSummary {
                    id: player.id,
                    name: player.name.clone(),
                    landing_zone: landing.map(|l| l.zone.clone()),
                    bubble: landing.map(|l| l.bubble()),
                    units_on_board: player.units_on_board.len(),
                    units_in_freighter: player.units_in_freighter.len(),
                    banked_ap: player.banked_ap,
                    moves,
                }
            })
            .collect();

        Self {
            turns_played,
            final_tide: state.tide,
            neutralized_units: state.units().filter(|u| u.neutralized).count(),
            players,
        }
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} turns played, final tide {}, {} units neutralized",
            self.turns_played, self.final_tide, self.neutralized_units
        )?;
        for p in &self.players {
            let landing = match (&p.landing_zone, p.bubble) {
                (Some(zone), Some(bubble)) => format!("zone {} at {}", zone, bubble),
                _ => "not landed".to_string(),
            };
            writeln!(
                f,
                "  [{}] {}: {}, {} units deployed, {} in freighter, {} moves, {} AP banked",
                p.id, p.name, landing, p.units_on_board, p.units_in_freighter, p.moves, p.banked_ap
            )?;
        }
        Ok(())
    }
}
