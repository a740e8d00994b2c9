//! Typed records for game data and their validation into core types.
//!
//! Each data file is a JSON object holding a list of records. Lists are
//! read as raw values first so one malformed record is logged and skipped
//! instead of rejecting the whole file. Only a file that is not valid JSON at
//! all, or a board with no usable hex, is an error.

use crate::board::{Board, Hex, Terrain};
use crate::hex::OffsetCoord;
use crate::tide::{TideCard, TideDeckConfig, TideKind};
use crate::turn::TurnDefinition;
use crate::units::{UnitType, UnitTypeRegistry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while reading game data
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid JSON in {file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Map data contains no usable hexes")]
    EmptyBoard,
}

/// Zone ids appear as numbers or strings in map data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoneRef {
    Number(i64),
    Text(String),
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRef::Number(n) => write!(f, "{n}"),
            ZoneRef::Text(s) => f.write_str(s),
        }
    }
}

fn default_terrain() -> String {
    Terrain::Plain.as_str().to_string()
}

/// One hex of the map file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexRecord {
    pub col: Option<i32>,
    pub row: Option<i32>,
    #[serde(default = "default_terrain")]
    pub terrain: String,
    #[serde(default)]
    pub ore: bool,
    #[serde(default)]
    pub zone_id: Option<ZoneRef>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub victory_points: u32,
}

impl HexRecord {
    /// Validate into a board hex
    pub fn into_hex(self) -> Result<Hex, String> {
        let (Some(col), Some(row)) = (self.col, self.row) else {
            return Err("missing col/row".to_string());
        };
        let terrain: Terrain = self.terrain.parse()?;
        Ok(Hex {
            coord: OffsetCoord::new(col, row),
            terrain,
            ore: self.ore,
            zone_id: self.zone_id.map(|z| z.to_string()),
            name: self.name,
            victory_points: self.victory_points,
        })
    }
}

/// The map file: a hex list plus optional explicit zone lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapFile {
    #[serde(default)]
    pub hex_map: Vec<Value>,
    #[serde(default)]
    pub zones: BTreeMap<String, Vec<OffsetCoord>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitFile {
    #[serde(default)]
    pub units: Vec<Value>,
}

/// Deck setup rules as written in the tide file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TideSetupRecord {
    #[serde(default = "default_setup_turn")]
    pub setup_deck_turn: u32,
    #[serde(default = "default_last_fixed_turn")]
    pub last_fixed_turn: u32,
    #[serde(default = "default_future_deck_size")]
    pub future_deck_size: usize,
}

fn default_setup_turn() -> u32 {
    TideDeckConfig::default().setup_turn
}

fn default_last_fixed_turn() -> u32 {
    TideDeckConfig::default().last_fixed_turn
}

fn default_future_deck_size() -> usize {
    TideDeckConfig::default().future_deck_size
}

impl Default for TideSetupRecord {
    fn default() -> Self {
        Self {
            setup_deck_turn: default_setup_turn(),
            last_fixed_turn: default_last_fixed_turn(),
            future_deck_size: default_future_deck_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReshuffleRecord {
    #[serde(default)]
    pub turns: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TideFile {
    #[serde(default)]
    pub tide_cards: Vec<Value>,
    #[serde(default)]
    pub setup: TideSetupRecord,
    /// Turn number (as a string key) to card type
    #[serde(default)]
    pub fixed_turns: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub reshuffle: ReshuffleRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnFile {
    #[serde(default)]
    pub turns: Vec<Value>,
}

/// Decode each raw record, logging and skipping the ones that do not fit
fn decode_records<T: DeserializeOwned>(kind: &str, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {} record #{}: {}", kind, index, e);
                None
            }
        })
        .collect()
}

fn parse_file<T: DeserializeOwned>(file: &'static str, json: &str) -> Result<T, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Json { file, source })
}

/// Build a board from a map file
pub fn board_from_map(map: MapFile) -> Result<Board, CatalogError> {
    let mut board = Board::new();

    for record in decode_records::<HexRecord>("hex", map.hex_map) {
        match record.into_hex() {
            Ok(hex) if board.contains(&hex.coord) => {
                warn!("Duplicate hex {}, keeping the first", hex.coord);
            }
            Ok(hex) => {
                board.insert_hex(hex);
            }
            Err(reason) => warn!("Skipping hex record: {}", reason),
        }
    }

    if board.is_empty() {
        return Err(CatalogError::EmptyBoard);
    }

    for (zone, coords) in map.zones {
        board.add_zone_members(&zone, coords);
    }

    info!(
        "Loaded board: {} hexes, {} zones",
        board.len(),
        board.zone_ids().len()
    );
    Ok(board)
}

/// Parse map JSON into a board
pub fn load_board(json: &str) -> Result<Board, CatalogError> {
    board_from_map(parse_file("map", json)?)
}

/// Build the unit-type registry; duplicate ids keep the first definition
pub fn unit_types_from_file(file: UnitFile) -> UnitTypeRegistry {
    let mut registry = UnitTypeRegistry::new();
    for unit_type in decode_records::<UnitType>("unit type", file.units) {
        let id = unit_type.id.clone();
        if !registry.register(unit_type) {
            warn!("Duplicate unit type '{}', keeping the first", id);
        }
    }
    info!("Loaded {} unit types", registry.len());
    registry
}

pub fn load_unit_types(json: &str) -> Result<UnitTypeRegistry, CatalogError> {
    Ok(unit_types_from_file(parse_file("units", json)?))
}

/// Tide cards and deck rules
pub fn tide_deck_from_file(file: TideFile) -> (Vec<TideCard>, TideDeckConfig) {
    let mut seen = HashSet::new();
    let cards: Vec<TideCard> = decode_records::<TideCard>("tide card", file.tide_cards)
        .into_iter()
        .filter(|card| {
            let fresh = seen.insert(card.id.clone());
            if !fresh {
                warn!("Duplicate tide card '{}', keeping the first", card.id);
            }
            fresh
        })
        .collect();

    let defaults = TideDeckConfig::default();
    let fixed_turns = match file.fixed_turns {
        None => defaults.fixed_turns,
        Some(raw) => raw
            .into_iter()
            .filter_map(|(turn, kind)| {
                let parsed = turn.parse::<u32>().ok().zip(
                    serde_json::from_value::<TideKind>(Value::String(kind.clone())).ok(),
                );
                if parsed.is_none() {
                    warn!("Skipping fixed tide entry {} => '{}'", turn, kind);
                }
                parsed
            })
            .collect(),
    };

    let config = TideDeckConfig {
        setup_turn: file.setup.setup_deck_turn,
        last_fixed_turn: file.setup.last_fixed_turn,
        future_deck_size: file.setup.future_deck_size,
        fixed_turns,
        reshuffle_turns: file.reshuffle.turns.into_iter().collect(),
    };

    info!("Loaded {} tide cards", cards.len());
    (cards, config)
}

pub fn load_tide_deck(json: &str) -> Result<(Vec<TideCard>, TideDeckConfig), CatalogError> {
    Ok(tide_deck_from_file(parse_file("tides", json)?))
}

/// Turn definitions; records without a number or with bad fields are skipped
pub fn turns_from_file(file: TurnFile) -> Vec<TurnDefinition> {
    let turns = decode_records::<TurnDefinition>("turn", file.turns);
    info!("Loaded {} turn definitions", turns.len());
    turns
}

pub fn load_turns(json: &str) -> Result<Vec<TurnDefinition>, CatalogError> {
    Ok(turns_from_file(parse_file("turns", json)?))
}

/// Everything a game needs, validated
#[derive(Debug, Clone)]
pub struct Catalog {
    pub board: Board,
    pub unit_types: UnitTypeRegistry,
    pub tide_cards: Vec<TideCard>,
    pub tide_config: TideDeckConfig,
    pub turns: Vec<TurnDefinition>,
}

impl Catalog {
    /// Parse all four data files
    pub fn from_json(
        map: &str,
        units: &str,
        tides: &str,
        turns: &str,
    ) -> Result<Self, CatalogError> {
        let board = load_board(map)?;
        let unit_types = load_unit_types(units)?;
        let (tide_cards, tide_config) = load_tide_deck(tides)?;
        let turns = load_turns(turns)?;
        Ok(Self {
            board,
            unit_types,
            tide_cards,
            tide_config,
            turns,
        })
    }
}
