//! Tide deck: the card-driven sequence of tides.
//!
//! The deck keeps three piles (future, reserve, discard) and at most one
//! current card. The first turns use fixed tides; from the setup turn on the
//! tide is drawn from the front of the future pile.

use crate::board::Tide;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

/// Number of cards in a standard tide deck
pub const STANDARD_DECK_SIZE: usize = 15;

/// Printed type of a tide card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    Low,
    Normal,
    High,
}

impl TideKind {
    /// The tide this card produces; a normal card is mid tide
    pub fn tide(self) -> Tide {
        match self {
            TideKind::Low => Tide::Low,
            TideKind::Normal => Tide::Mid,
            TideKind::High => Tide::High,
        }
    }
}

/// A single tide card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TideCard {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TideKind,
    pub name: String,
}

impl TideCard {
    pub fn new(id: impl Into<String>, kind: TideKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
        }
    }

    pub fn tide(&self) -> Tide {
        self.kind.tide()
    }
}

/// Deck rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TideDeckConfig {
    /// Turn on which the piles are dealt
    pub setup_turn: u32,
    /// Last turn whose tide is fixed rather than drawn
    pub last_fixed_turn: u32,
    /// Cards dealt to the future pile on setup and reshuffle
    pub future_deck_size: usize,
    /// Turns with a predetermined tide type
    pub fixed_turns: BTreeMap<u32, TideKind>,
    /// Turns that trigger a reshuffle
    pub reshuffle_turns: BTreeSet<u32>,
}

impl Default for TideDeckConfig {
    fn default() -> Self {
        Self {
            setup_turn: 3,
            last_fixed_turn: 2,
            future_deck_size: 9,
            fixed_turns: BTreeMap::from([(1, TideKind::Normal), (2, TideKind::Normal)]),
            reshuffle_turns: BTreeSet::new(),
        }
    }
}

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// The tide deck and its piles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TideDeck {
    definitions: Vec<TideCard>,
    config: TideDeckConfig,
    future: Vec<TideCard>,
    reserve: Vec<TideCard>,
    discard: Vec<TideCard>,
    current: Option<TideCard>,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

impl TideDeck {
    /// Create a deck with an entropy-seeded RNG
    pub fn new(definitions: Vec<TideCard>, config: TideDeckConfig) -> Self {
        Self::with_rng(definitions, config, StdRng::from_entropy())
    }

    /// Create a deck whose shuffles are reproducible
    pub fn with_seed(definitions: Vec<TideCard>, config: TideDeckConfig, seed: u64) -> Self {
        Self::with_rng(definitions, config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(definitions: Vec<TideCard>, config: TideDeckConfig, rng: StdRng) -> Self {
        if !definitions.is_empty() && definitions.len() != STANDARD_DECK_SIZE {
            warn!(
                "Expected {} tide card definitions, found {}",
                STANDARD_DECK_SIZE,
                definitions.len()
            );
        }
        Self {
            definitions,
            config,
            future: Vec::new(),
            reserve: Vec::new(),
            discard: Vec::new(),
            current: None,
            rng,
        }
    }

    /// Deal the piles: shuffle every definition, the first
    /// `future_deck_size` go to the future pile and the rest to reserve.
    pub fn setup_deck_for_play(&mut self) {
        if self.definitions.is_empty() {
            error!("No tide card definitions, cannot set up deck");
            return;
        }

        let mut cards = self.definitions.clone();
        cards.shuffle(&mut self.rng);
        self.deal(cards);

        info!(
            "Tide deck set up: future {}, reserve {}",
            self.future.len(),
            self.reserve.len()
        );
    }

    /// Reshuffle every definition except the current card into fresh future
    /// and reserve piles. The discard pile is cleared.
    pub fn reshuffle(&mut self) {
        if self.definitions.is_empty() {
            error!("No tide card definitions, cannot reshuffle");
            return;
        }

        let current_id = self.current.as_ref().map(|c| c.id.as_str());
        let mut cards: Vec<TideCard> = self
            .definitions
            .iter()
            .filter(|c| Some(c.id.as_str()) != current_id)
            .cloned()
            .collect();
        cards.shuffle(&mut self.rng);
        self.deal(cards);

        info!(
            "Tide deck reshuffled: future {}, reserve {}",
            self.future.len(),
            self.reserve.len()
        );
    }

    fn deal(&mut self, mut cards: Vec<TideCard>) {
        let future_size = if self.config.future_deck_size > cards.len() {
            warn!(
                "future_deck_size {} exceeds {} available cards",
                self.config.future_deck_size,
                cards.len()
            );
            cards.len()
        } else {
            self.config.future_deck_size
        };

        self.reserve = cards.split_off(future_size);
        self.future = cards;
        self.discard.clear();
    }

    /// The card in force for `turn`.
    ///
    /// A fixed turn yields the first definition of the configured type and
    /// touches no pile. Any other turn pops the front of the future pile.
    pub fn tide_for_turn(&mut self, turn: u32) -> Option<TideCard> {
        if let Some(&kind) = self.config.fixed_turns.get(&turn) {
            let card = self.definitions.iter().find(|c| c.kind == kind).cloned();
            if card.is_none() {
                error!("No {:?} tide card defined for fixed turn {}", kind, turn);
            }
            return card;
        }

        if self.future.is_empty() {
            error!("Turn {}: future tide deck is empty", turn);
            return None;
        }
        Some(self.future.remove(0))
    }

    /// Per-turn deck step: setup, discard, draw, then reshuffle and refill
    pub fn advance_turn_tide(&mut self, turn: u32) -> Option<&TideCard> {
        let setup_turn = self.config.setup_turn;

        if turn == setup_turn && self.future.is_empty() {
            debug!("Turn {}: dealing tide deck", turn);
            self.setup_deck_for_play();
        }

        if let Some(previous) = self.current.take() {
            if turn.saturating_sub(1) > self.config.last_fixed_turn {
                debug!("Turn {}: discarding tide card '{}'", turn, previous.name);
                self.discard.push(previous);
            }
        }

        self.current = self.tide_for_turn(turn);

        if turn >= setup_turn {
            if self.config.reshuffle_turns.contains(&turn) {
                debug!("Turn {}: reshuffle triggered", turn);
                self.reshuffle();
            }
            if self.future.is_empty() && !self.reserve.is_empty() {
                let card = self.reserve.remove(0);
                debug!("Turn {}: moved '{}' from reserve to future", turn, card.name);
                self.future.push(card);
            }
        }

        self.current.as_ref()
    }

    /// Next card to be drawn
    pub fn peek_next(&self) -> Option<&TideCard> {
        self.future.first()
    }

    /// The next two cards to be drawn, as a weather hen forecasts them
    pub fn peek_next_two(&self) -> &[TideCard] {
        &self.future[..self.future.len().min(2)]
    }

    pub fn current(&self) -> Option<&TideCard> {
        self.current.as_ref()
    }

    pub fn future(&self) -> &[TideCard] {
        &self.future
    }

    pub fn reserve(&self) -> &[TideCard] {
        &self.reserve
    }

    pub fn discard(&self) -> &[TideCard] {
        &self.discard
    }

    pub fn definitions(&self) -> &[TideCard] {
        &self.definitions
    }

    pub fn config(&self) -> &TideDeckConfig {
        &self.config
    }
}
