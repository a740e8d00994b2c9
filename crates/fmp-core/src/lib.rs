//! Full Metal Planet - a hex-grid strategy game engine
//!
//! This crate provides the core game logic for Full Metal Planet, including:
//! - Hex coordinate system for a flat-topped, odd-q board
//! - Board representation with terrain, tides, zones and freighter footprints
//! - A* pathfinding that respects the tide
//! - Tide deck, turn sequencing and the player action point ledger
//! - Commands, game state and the turn loop
//!
//! # Architecture
//!
//! The engine is synchronous and platform-agnostic. It can be compiled to:
//! - Native Rust for headless simulation
//! - WebAssembly for browser front ends
//!
//! # Modules
//!
//! - [`hex`]: Offset and axial coordinates, directions, distances
//! - [`board`]: Hexes, terrain, tides and zones
//! - [`bot`]: Computer players for the action loop
//! - [`pathfinding`]: A* search over the board
//! - [`tide`]: Tide cards and the tide deck
//! - [`turn`]: Turn definitions and sequencing
//! - [`player`]: Player state and AP banking
//! - [`units`]: Unit types and live units
//! - [`command`]: Player commands and game events
//! - [`game`]: The game state aggregate
//! - [`catalog`]: Loading and validating game data
//! - [`engine`]: Landing, deployment and action phases

pub mod board;
pub mod bot;
pub mod catalog;
pub mod command;
pub mod engine;
pub mod game;
pub mod hex;
pub mod pathfinding;
pub mod player;
pub mod tide;
pub mod turn;
pub mod units;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use board::{Board, BoardJson, Hex, Terrain, Tide, ZoneId};
pub use bot::{Bot, BotDifficulty};
pub use catalog::{Catalog, CatalogError};
pub use command::{Command, GameEvent, MoveCommand, UNREACHABLE_COST};
pub use engine::{ActionPlanner, Engine, EngineConfig, IdlePlanner, Landing, LandingRules};
pub use game::{GameError, GameState};
pub use hex::{AxialCoord, Direction, OffsetCoord};
pub use pathfinding::{find_path, path_cost};
pub use player::{Player, PlayerColor, PlayerId, MAX_BANKED_AP};
pub use tide::{TideCard, TideDeck, TideDeckConfig, TideKind};
pub use turn::{TurnDefinition, TurnManager};
pub use units::{Unit, UnitId, UnitType, UnitTypeId, UnitTypeRegistry};
