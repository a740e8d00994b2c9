//! The turn loop.
//!
//! Each turn the engine advances the turn counter, draws the tide, applies
//! the tide rules and then runs the phase for that turn: freighter landing,
//! unit deployment, or the player action loop.

use crate::board::{Board, Terrain, Tide, ZoneId};
use crate::catalog::Catalog;
use crate::command::{Command, GameEvent};
use crate::game::{GameError, GameState};
use crate::hex::OffsetCoord;
use crate::player::PlayerId;
use crate::tide::TideDeck;
use crate::turn::{TurnDefinition, TurnManager};
use crate::units::{Unit, UnitType, UnitTypeId, BARGE, GUNBOAT, STARFREIGHTER};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, error, info, warn};
use uuid::Builder;

/// Upper bound on commands one player may issue in a single turn
pub const MAX_COMMANDS_PER_TURN: usize = 100;

/// Zone layout used to keep freighters apart.
///
/// Ring zones are adjacent to the zones before and after them in the list
/// (wrapping around); island zones have no neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingRules {
    pub ring: Vec<ZoneId>,
    pub islands: Vec<ZoneId>,
}

impl Default for LandingRules {
    fn default() -> Self {
        Self {
            ring: (1..=12).map(|z| z.to_string()).collect(),
            islands: vec!["13".to_string(), "14".to_string()],
        }
    }
}

impl LandingRules {
    /// Every zone a freighter may target, ring first
    pub fn zones(&self) -> impl Iterator<Item = &ZoneId> {
        self.ring.iter().chain(self.islands.iter())
    }

    /// Ring neighbours of a zone; empty for islands and unknown zones
    pub fn adjacent(&self, zone: &str) -> Vec<&ZoneId> {
        let len = self.ring.len();
        match self.ring.iter().position(|z| z == zone) {
            Some(i) if len > 1 => {
                let prev = &self.ring[(i + len - 1) % len];
                let next = &self.ring[(i + 1) % len];
                if prev == next {
                    vec![prev]
                } else {
                    vec![prev, next]
                }
            }
            _ => Vec::new(),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// One entry per player, 2 to 4
    pub player_names: Vec<String>,
    pub landing_turn: u32,
    pub deployment_turn: u32,
    /// Stop after this turn even if more are defined
    pub max_turns: Option<u32>,
    pub landing_rules: LandingRules,
    /// Units each player unloads on the deployment turn, in order
    pub roster: Vec<(UnitTypeId, u32)>,
    /// Seed for every random choice the engine and tide deck make
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_players(2)
    }
}

impl EngineConfig {
    /// Default settings with `count` players named "Player 1", "Player 2", ...
    pub fn with_players(count: usize) -> Self {
        Self {
            player_names: (1..=count).map(|i| format!("Player {i}")).collect(),
            landing_turn: 1,
            deployment_turn: 2,
            max_turns: None,
            landing_rules: LandingRules::default(),
            roster: default_roster(),
            seed: None,
        }
    }
}

/// Standard starting units
pub fn default_roster() -> Vec<(UnitTypeId, u32)> {
    [
        ("barge", 1),
        ("crab", 1),
        ("weather_hen", 1),
        ("gunboat", 2),
        ("tank", 4),
        ("heap", 1),
        ("pontoon", 1),
    ]
    .into_iter()
    .map(|(id, count)| (id.to_string(), count))
    .collect()
}

/// Where a player's freighter came down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landing {
    pub zone: ZoneId,
    /// Bubble first, then the three pods
    pub hexes: Vec<OffsetCoord>,
    pub pod_angles: Vec<i32>,
}

impl Landing {
    pub fn bubble(&self) -> OffsetCoord {
        self.hexes[0]
    }
}

/// Source of player commands during the action loop
pub trait ActionPlanner {
    /// Next command for `player`, or `None` to end their turn
    fn next_command(&mut self, state: &GameState, player: PlayerId) -> Option<Command>;
}

/// Planner that never acts
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePlanner;

impl ActionPlanner for IdlePlanner {
    fn next_command(&mut self, _state: &GameState, _player: PlayerId) -> Option<Command> {
        None
    }
}

/// Runs a game from the first turn until turns run out
#[derive(Debug)]
pub struct Engine<P = IdlePlanner> {
    state: GameState,
    turns: TurnManager,
    tide_deck: TideDeck,
    config: EngineConfig,
    planner: P,
    landings: BTreeMap<PlayerId, Landing>,
    /// Index of the player who acts first in the next action turn
    current_player: usize,
    events: Vec<GameEvent>,
    game_over: bool,
    rng: StdRng,
}

impl Engine<IdlePlanner> {
    /// Engine whose players never act
    pub fn new(catalog: Catalog, config: EngineConfig) -> Result<Self, GameError> {
        Self::with_planner(catalog, config, IdlePlanner)
    }
}

impl<P: ActionPlanner> Engine<P> {
    pub fn with_planner(catalog: Catalog, config: EngineConfig, planner: P) -> Result<Self, GameError> {
        let player_count = config.player_names.len();
        if !(2..=4).contains(&player_count) {
            return Err(GameError::InvalidPlayerCount(player_count));
        }

        let has_pods = catalog
            .unit_types
            .get(STARFREIGHTER)
            .map(|t| !t.pod_shapes.is_empty())
            .unwrap_or(false);
        if !has_pods {
            return Err(GameError::MissingUnitType(STARFREIGHTER.to_string()));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let turns = TurnManager::new(catalog.turns);
        let mut tide_config = catalog.tide_config;
        tide_config.reshuffle_turns.extend(turns.reshuffle_turns());
        let tide_deck = TideDeck::with_seed(catalog.tide_cards, tide_config, rng.gen());

        let mut state = GameState::new(catalog.board, catalog.unit_types);
        for name in &config.player_names {
            state.add_player(name.clone());
        }

        info!(
            "Engine ready: {} players, {} turns, {} hexes",
            player_count,
            turns.len(),
            state.board.len()
        );

        Ok(Self {
            state,
            turns,
            tide_deck,
            config,
            planner,
            landings: BTreeMap::new(),
            current_player: 0,
            events: Vec::new(),
            game_over: false,
            rng,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    pub fn tide_deck(&self) -> &TideDeck {
        &self.tide_deck
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn landings(&self) -> &BTreeMap<PlayerId, Landing> {
        &self.landings
    }

    /// Every event emitted so far
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Play turns until the game ends. Returns the number of turns played.
    pub fn run(&mut self) -> Result<u32, GameError> {
        let mut played = 0;
        while !self.game_over {
            self.play_turn()?;
            if !self.game_over {
                played += 1;
            }
        }
        info!("Game over after {} turns", played);
        Ok(played)
    }

    /// Play a single turn and return the events it produced
    pub fn play_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }

        let next = self.turns.advance_turn().cloned();
        let def = match next {
            Some(def) if self.config.max_turns.map_or(true, |max| def.number <= max) => def,
            _ => {
                self.game_over = true;
                let events = vec![GameEvent::GameOver {
                    turn: self.state.turn_number,
                }];
                self.events.extend(events.iter().cloned());
                return Ok(events);
            }
        };

        self.state.turn_number = def.number;
        info!("Turn {}: {}", def.number, def.name);

        let mut events = vec![GameEvent::TurnStarted {
            turn: def.number,
            name: def.name.clone(),
        }];

        events.push(self.draw_tide(def.number));
        events.extend(self.state.apply_tide_effects());

        if def.number == self.config.landing_turn {
            events.extend(self.land_freighters());
        } else if def.number == self.config.deployment_turn {
            events.extend(self.deploy_units());
        } else {
            events.extend(self.player_actions(&def));
        }

        self.events.extend(events.iter().cloned());
        Ok(events)
    }

    fn draw_tide(&mut self, turn: u32) -> GameEvent {
        let card = self.tide_deck.advance_turn_tide(turn).cloned();
        match &card {
            Some(card) => self.state.tide = card.tide(),
            None => error!("Turn {}: no tide card, keeping {} tide", turn, self.state.tide),
        }
        debug!("Turn {} tide: {}", turn, self.state.tide);
        GameEvent::TideChanged {
            tide: self.state.tide,
            card: card.map(|c| c.name),
        }
    }

    fn land_freighters(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let Some(freighter) = self.state.unit_types.get(STARFREIGHTER).cloned() else {
            error!("No {} unit type, cannot land freighters", STARFREIGHTER);
            return events;
        };

        for pid in 0..self.state.player_count() as PlayerId {
            let mut forbidden: HashSet<&ZoneId> = HashSet::new();
            for landing in self.landings.values() {
                forbidden.insert(&landing.zone);
                forbidden.extend(self.config.landing_rules.adjacent(&landing.zone));
            }
            let available: Vec<ZoneId> = self
                .config
                .landing_rules
                .zones()
                .filter(|z| !forbidden.contains(z))
                .cloned()
                .collect();

            let Some(zone) = available.choose(&mut self.rng).cloned() else {
                warn!("Player {}: no landing zone left", pid);
                events.push(GameEvent::LandingFailed { player: pid });
                continue;
            };
            debug!("Player {} targeting zone {}", pid, zone);

            match self.find_landing(&freighter, &zone) {
                Some(landing) => {
                    let cleared = self.state.board.clear_ore_in_zone(&zone);
                    if let Some(player) = self.state.get_player_mut(pid) {
                        player.freighter_landed = true;
                    }
                    info!(
                        "Player {} landed in zone {} at {} ({} ore cleared)",
                        pid,
                        zone,
                        landing.bubble(),
                        cleared
                    );
                    events.push(GameEvent::FreighterLanded {
                        player: pid,
                        zone: zone.clone(),
                        hexes: landing.hexes.clone(),
                    });
                    self.landings.insert(pid, landing);
                }
                None => {
                    warn!("Player {}: no landing spot in zone {}", pid, zone);
                    events.push(GameEvent::LandingFailed { player: pid });
                }
            }
        }

        events
    }

    /// Try bubble candidates of `zone` in random order, each with the pod
    /// shapes in random order, and return the first legal footprint.
    fn find_landing(&mut self, freighter: &UnitType, zone: &str) -> Option<Landing> {
        let board = &self.state.board;
        let mut candidates: Vec<OffsetCoord> = board
            .hexes_in_zone(zone)
            .into_iter()
            .filter(|h| matches!(h.terrain, Terrain::Plain | Terrain::Swamp))
            .map(|h| h.coord)
            .collect();
        candidates.sort();
        candidates.shuffle(&mut self.rng);

        let taken: HashSet<OffsetCoord> = self
            .landings
            .values()
            .flat_map(|l| l.hexes.iter().copied())
            .collect();

        for bubble in candidates {
            let mut shapes = freighter.pod_shapes.clone();
            shapes.shuffle(&mut self.rng);

            for shape in shapes {
                let hexes = board.place_freighter(bubble, &shape.pod_angles);
                if freighter_fits(board, &hexes, zone, &taken) {
                    return Some(Landing {
                        zone: zone.to_string(),
                        hexes,
                        pod_angles: shape.pod_angles,
                    });
                }
            }
        }
        None
    }

    fn deploy_units(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let tide = self.state.tide;

        for pid in 0..self.state.player_count() as PlayerId {
            let Some(landing) = self.landings.get(&pid).cloned() else {
                warn!("Player {} has no landing, cannot deploy", pid);
                continue;
            };

            let mut zone_hexes: Vec<OffsetCoord> = self
                .state
                .board
                .hexes_in_zone(&landing.zone)
                .iter()
                .map(|h| h.coord)
                .collect();
            zone_hexes.sort();

            let mut occupied: HashSet<OffsetCoord> = self
                .landings
                .values()
                .flat_map(|l| l.hexes.iter().copied())
                .collect();
            occupied.extend(
                self.state
                    .units()
                    .filter(|u| u.is_on_board())
                    .flat_map(|u| u.occupied_hexes()),
            );

            for (type_id, count) in self.config.roster.clone() {
                let Some(unit_type) = self.state.unit_types.get(&type_id).cloned() else {
                    warn!("Unknown roster unit type '{}', skipping", type_id);
                    continue;
                };

                for _ in 0..count {
                    let spot = deployment_spot(
                        &self.state.board,
                        &mut self.rng,
                        &zone_hexes,
                        &unit_type,
                        tide,
                        &occupied,
                    );
                    let id = Builder::from_random_bytes(self.rng.gen())
                        .into_uuid()
                        .simple()
                        .to_string();
                    let mut unit = Unit::new(id.clone(), pid, type_id.clone(), landing.bubble());

                    match spot {
                        Some((position, second)) => {
                            unit.position = position;
                            unit.second_position = second;
                            occupied.extend(unit.occupied_hexes());
                            events.push(GameEvent::UnitDeployed {
                                player: pid,
                                unit: id.clone(),
                                unit_type: type_id.clone(),
                                position,
                                second_position: second,
                            });
                        }
                        None => {
                            unit.in_freighter = true;
                            debug!("Player {}: {} stays in the freighter", pid, type_id);
                            events.push(GameEvent::UnitKeptInFreighter {
                                player: pid,
                                unit: id.clone(),
                                unit_type: type_id.clone(),
                            });
                        }
                    }

                    let on_board = unit.is_on_board();
                    if let Err(e) = self.state.insert_unit(unit) {
                        error!("Could not add deployed unit: {}", e);
                        continue;
                    }
                    if let Some(player) = self.state.get_player_mut(pid) {
                        if on_board {
                            player.add_unit_on_board(id);
                        } else {
                            player.add_unit_in_freighter(id);
                        }
                    }
                }
            }

            if let Some(player) = self.state.get_player(pid) {
                info!(
                    "Player {} deployed {} units, {} kept in freighter",
                    pid,
                    player.units_on_board.len(),
                    player.units_in_freighter.len()
                );
            }
        }

        events
    }

    fn player_actions(&mut self, def: &TurnDefinition) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let player_count = self.state.player_count();
        if player_count == 0 {
            return events;
        }

        for _ in 0..player_count {
            let index = self.current_player;
            let pid = index as PlayerId;
            self.state.players[index].prepare_for_new_turn(def.action_points);

            let mut issued = 0;
            while self.state.players[index].can_still_act() {
                if issued >= MAX_COMMANDS_PER_TURN {
                    warn!("Player {} hit the command limit", pid);
                    break;
                }
                let Some(mut command) = self.planner.next_command(&self.state, pid) else {
                    break;
                };
                issued += 1;

                let cost = command.estimate_ap_cost(&self.state);
                if !self.state.players[index].spend_ap(cost) {
                    debug!("Player {} cannot afford command costing {}", pid, cost);
                    break;
                }
                events.push(GameEvent::ApSpent {
                    player: pid,
                    amount: cost,
                });
                events.extend(command.execute(&mut self.state));
            }

            let banked = self.state.players[index].end_turn_banking();
            events.push(GameEvent::ApBanked {
                player: pid,
                banked,
            });
            self.current_player = (index + 1) % player_count;
        }

        events
    }
}

/// A freighter footprint is legal when it has all four hexes, each exists
/// on plain or swamp and is not under another freighter, the pods stay in
/// the bubble's zone (or outside every zone) and no hex is on the map edge.
fn freighter_fits(board: &Board, hexes: &[OffsetCoord], zone: &str, taken: &HashSet<OffsetCoord>) -> bool {
    if hexes.len() != 4 {
        return false;
    }
    for (i, coord) in hexes.iter().enumerate() {
        let Some(hex) = board.get_hex(coord) else {
            return false;
        };
        if !matches!(hex.terrain, Terrain::Plain | Terrain::Swamp) || taken.contains(coord) {
            return false;
        }
        if i > 0 && hex.zone_id.as_deref().map_or(false, |z| z != zone) {
            return false;
        }
        if board.is_edge(coord) {
            return false;
        }
    }
    true
}

/// Pick a random free hex of the landing zone for a unit.
///
/// Barges and gunboats need a sea neighbour. Barges also need a non-edge
/// primary hex and a free non-edge second hex that is sea, or enterable and
/// in the same zone.
fn deployment_spot(
    board: &Board,
    rng: &mut StdRng,
    zone_hexes: &[OffsetCoord],
    unit_type: &UnitType,
    tide: Tide,
    occupied: &HashSet<OffsetCoord>,
) -> Option<(OffsetCoord, Option<OffsetCoord>)> {
    let mut candidates = zone_hexes.to_vec();
    candidates.shuffle(rng);

    for coord in candidates {
        if occupied.contains(&coord) {
            continue;
        }
        let Some(hex) = board.get_hex(&coord) else {
            continue;
        };
        if !unit_type.can_enter(board.effective_terrain(hex, tide)) {
            continue;
        }

        let is_barge = unit_type.id == BARGE;
        if is_barge || unit_type.id == GUNBOAT {
            let coastal = board
                .neighbors(&coord)
                .iter()
                .any(|n| board.effective_terrain(n, tide) == Terrain::Sea);
            if !coastal {
                continue;
            }
        }

        if !is_barge {
            return Some((coord, None));
        }

        if board.is_edge(&coord) {
            continue;
        }
        let mut seconds = board.neighbors(&coord);
        seconds.shuffle(rng);
        let second = seconds.into_iter().find(|n| {
            let terrain = board.effective_terrain(n, tide);
            !board.is_edge(&n.coord)
                && !occupied.contains(&n.coord)
                && (terrain == Terrain::Sea
                    || (unit_type.can_enter(terrain) && n.zone_id == hex.zone_id))
        });
        if let Some(second) = second {
            return Some((coord, Some(second.coord)));
        }
    }
    None
}
