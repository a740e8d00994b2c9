//! WebAssembly bindings for the Full Metal Planet engine.
//!
//! This module exposes the engine and its board queries to JavaScript
//! through wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::catalog::Catalog;
use crate::engine::{Engine, EngineConfig};
use crate::hex::OffsetCoord;
use crate::pathfinding::find_path;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    engine: Engine,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game from the four data files and a JSON list of player names
    #[wasm_bindgen(constructor)]
    pub fn new(
        map_json: &str,
        units_json: &str,
        tides_json: &str,
        turns_json: &str,
        player_names_json: &str,
    ) -> Result<WasmGame, JsValue> {
        let player_names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;
        let catalog = Catalog::from_json(map_json, units_json, tides_json, turns_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid game data: {}", e)))?;

        let config = EngineConfig {
            player_names,
            ..EngineConfig::default()
        };
        let engine = Engine::new(catalog, config)
            .map_err(|e| JsValue::from_str(&format!("Cannot start game: {}", e)))?;

        Ok(WasmGame { engine })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.engine
            .state()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Get board state as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        let board_json = self.engine.state().board.to_json_friendly();
        serde_json::to_string(&board_json).unwrap_or_else(|_| "{}".to_string())
    }

    /// Play one turn, returns the events JSON or an error
    #[wasm_bindgen(js_name = advanceTurn)]
    pub fn advance_turn(&mut self) -> Result<String, JsValue> {
        match self.engine.play_turn() {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Turn failed: {}", e))),
        }
    }

    /// Shortest path for a unit type under the current tide, as a JSON
    /// array of coordinates, or "null" when there is none
    #[wasm_bindgen(js_name = findPath)]
    pub fn find_path(
        &self,
        unit_type: &str,
        from_col: i32,
        from_row: i32,
        to_col: i32,
        to_row: i32,
    ) -> String {
        let state = self.engine.state();
        let Some(unit_type) = state.unit_types.get(unit_type) else {
            return "null".to_string();
        };
        let path = find_path(
            &state.board,
            OffsetCoord::new(from_col, from_row),
            OffsetCoord::new(to_col, to_row),
            unit_type,
            state.tide,
        );
        serde_json::to_string(&path).unwrap_or_else(|_| "null".to_string())
    }

    /// Terrain at a hex under the current tide
    #[wasm_bindgen(js_name = effectiveTerrain)]
    pub fn effective_terrain(&self, col: i32, row: i32) -> Option<String> {
        let state = self.engine.state();
        state
            .board
            .effective_terrain_at(&OffsetCoord::new(col, row), state.tide)
            .map(|t| t.to_string())
    }

    /// The next two tide cards as JSON
    #[wasm_bindgen(js_name = getTideForecast)]
    pub fn get_tide_forecast(&self) -> String {
        serde_json::to_string(self.engine.tide_deck().peek_next_two())
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Get a specific player's state as JSON
    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, player: u8) -> String {
        if let Some(p) = self.engine.state().get_player(player) {
            serde_json::to_string(p).unwrap_or_else(|_| "{}".to_string())
        } else {
            "null".to_string()
        }
    }

    #[wasm_bindgen(js_name = getTurnNumber)]
    pub fn get_turn_number(&self) -> u32 {
        self.engine.state().turn_number
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }
}
