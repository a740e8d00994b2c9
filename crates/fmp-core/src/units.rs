//! Unit types, the unit-type registry and live units.
//!
//! Unit types are immutable descriptions loaded from data. Live units
//! reference their type by id and are owned by the game state.

use crate::board::Terrain;
use crate::hex::OffsetCoord;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Unique id of a live unit
pub type UnitId = String;

/// Id of a unit type ("tank", "barge", ...)
pub type UnitTypeId = String;

/// Unit type used for freighter landings
pub const STARFREIGHTER: &str = "starfreighter";
/// Unit type subject to the swamp tide rule
pub const ATTACK_BOAT: &str = "attack_boat";
pub const BARGE: &str = "barge";
pub const GUNBOAT: &str = "gunboat";

/// Turret block of a unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turrets {
    pub count: u32,
    pub range: u32,
}

/// A freighter pod layout: three angles around the bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodShape {
    pub shape_id: String,
    pub pod_angles: Vec<i32>,
}

/// Weapon range override while standing on a given terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeModifier {
    pub terrain: Terrain,
    pub range: u32,
}

/// Static description of a kind of unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub id: UnitTypeId,
    pub name: String,
    pub category: String,
    pub category_type: String,
    /// Effective terrains this unit may move onto
    pub can_enter: BTreeSet<Terrain>,
    /// Carried from data; the only tide rule in force is the attack-boat one
    pub tide_sensitive: bool,
    #[serde(default)]
    pub pod_shapes: Vec<PodShape>,
    #[serde(default)]
    pub turrets: Option<Turrets>,
    #[serde(default)]
    pub cargo_slots: u32,
    #[serde(default)]
    pub indestructible: bool,
    #[serde(default)]
    pub range: Option<u32>,
    #[serde(default)]
    pub range_modifiers: Vec<RangeModifier>,
}

impl UnitType {
    /// Minimal unit type with only movement rules, used by tests and tools
    pub fn new(id: impl Into<UnitTypeId>, can_enter: impl IntoIterator<Item = Terrain>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: String::new(),
            category_type: String::new(),
            can_enter: can_enter.into_iter().collect(),
            tide_sensitive: false,
            pod_shapes: Vec::new(),
            turrets: None,
            cargo_slots: 0,
            indestructible: false,
            range: None,
            range_modifiers: Vec::new(),
        }
    }

    pub fn can_enter(&self, terrain: Terrain) -> bool {
        self.can_enter.contains(&terrain)
    }

    /// Weapon range while standing on `terrain`, if the unit has one
    pub fn range_on(&self, terrain: Terrain) -> Option<u32> {
        self.range_modifiers
            .iter()
            .find(|m| m.terrain == terrain)
            .map(|m| m.range)
            .or(self.range)
    }
}

/// Registry of all known unit types, keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitTypeRegistry {
    types: BTreeMap<UnitTypeId, UnitType>,
}

impl UnitTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit type. The first registration of an id wins; returns
    /// false if the id was already present.
    pub fn register(&mut self, unit_type: UnitType) -> bool {
        if self.types.contains_key(&unit_type.id) {
            return false;
        }
        self.types.insert(unit_type.id.clone(), unit_type);
        true
    }

    pub fn get(&self, id: &str) -> Option<&UnitType> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<UnitType> for UnitTypeRegistry {
    fn from_iter<I: IntoIterator<Item = UnitType>>(iter: I) -> Self {
        let mut registry = Self::new();
        for unit_type in iter {
            registry.register(unit_type);
        }
        registry
    }
}

/// A live unit on the board or inside a freighter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub unit_type: UnitTypeId,
    /// Primary hex
    pub position: OffsetCoord,
    /// Second hex of two-hex units (barges)
    pub second_position: Option<OffsetCoord>,
    pub in_freighter: bool,
    pub neutralized: bool,
    /// Ids of units carried by this one
    pub cargo: Vec<UnitId>,
}

impl Unit {
    pub fn new(
        id: impl Into<UnitId>,
        owner: PlayerId,
        unit_type: impl Into<UnitTypeId>,
        position: OffsetCoord,
    ) -> Self {
        Self {
            id: id.into(),
            owner,
            unit_type: unit_type.into(),
            position,
            second_position: None,
            in_freighter: false,
            neutralized: false,
            cargo: Vec::new(),
        }
    }

    /// Every hex the unit covers
    pub fn occupied_hexes(&self) -> Vec<OffsetCoord> {
        let mut hexes = vec![self.position];
        hexes.extend(self.second_position);
        hexes
    }

    /// Whether the unit stands on the board (not stowed in a freighter)
    pub fn is_on_board(&self) -> bool {
        !self.in_freighter
    }
}
