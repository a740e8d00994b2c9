//! Player state and the action point ledger.
//!
//! This module contains:
//! - Player colours
//! - The per-turn AP ledger (spending, banking)
//! - Freighter and unit bookkeeping per player

use crate::units::UnitId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Player identifier (0-3)
pub type PlayerId = u8;

/// Largest amount of AP a player can carry over between turns
pub const MAX_BANKED_AP: u32 = 10;

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Green,
            _ => PlayerColor::Yellow,
        }
    }
}

/// AP banked from an unspent amount: 10 or more banks 10, 5 or more banks 5
pub fn banked_from_unspent(unspent: u32) -> u32 {
    let banked = if unspent >= 10 {
        10
    } else if unspent >= 5 {
        5
    } else {
        0
    };
    banked.min(MAX_BANKED_AP)
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (0-3)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
    /// Base AP granted by the current turn
    pub base_ap: u32,
    /// AP spent so far this turn, from base or bank
    pub ap_spent: u32,
    /// AP saved from earlier turns
    pub banked_ap: u32,
    /// Base plus bank, fixed when the turn starts
    spendable_ap: u32,
    /// Units deployed on the board
    pub units_on_board: Vec<UnitId>,
    /// Units still stowed in the freighter
    pub units_in_freighter: Vec<UnitId>,
    pub freighter_landed: bool,
    pub ore_in_freighter: u32,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            color: PlayerColor::for_player(id),
            base_ap: 0,
            ap_spent: 0,
            banked_ap: 0,
            spendable_ap: 0,
            units_on_board: Vec::new(),
            units_in_freighter: Vec::new(),
            freighter_landed: false,
            ore_in_freighter: 0,
        }
    }

    /// Start a turn with `base_ap`; the bank is snapshotted into the
    /// spendable pool.
    pub fn prepare_for_new_turn(&mut self, base_ap: u32) {
        self.base_ap = base_ap;
        self.ap_spent = 0;
        self.spendable_ap = base_ap + self.banked_ap;
        debug!(
            "Player {} prepared: base {} + banked {} = {} AP",
            self.id, base_ap, self.banked_ap, self.spendable_ap
        );
    }

    /// AP still spendable this turn
    pub fn available_ap(&self) -> u32 {
        self.spendable_ap.saturating_sub(self.ap_spent)
    }

    /// Base AP for the turn plus the bank
    pub fn total_available_ap(&self) -> u32 {
        self.base_ap + self.banked_ap
    }

    pub fn can_spend_ap(&self, cost: u32) -> bool {
        self.available_ap() >= cost
    }

    /// Spend AP. Fails without changing anything when the cost is not
    /// covered.
    pub fn spend_ap(&mut self, cost: u32) -> bool {
        if !self.can_spend_ap(cost) {
            debug!(
                "Player {} cannot spend {} AP, {} available",
                self.id,
                cost,
                self.available_ap()
            );
            return false;
        }
        match self.ap_spent.checked_add(cost) {
            Some(spent) => {
                self.ap_spent = spent;
                debug!("Player {} spent {} AP, {} left", self.id, cost, self.available_ap());
                true
            }
            None => false,
        }
    }

    /// Close the turn: unspent AP replaces the bank under the banking rule.
    /// Returns the new bank.
    pub fn end_turn_banking(&mut self) -> u32 {
        let unspent = self.available_ap();
        self.banked_ap = banked_from_unspent(unspent);
        debug!(
            "Player {} banked {} AP ({} unspent)",
            self.id, self.banked_ap, unspent
        );
        self.banked_ap
    }

    /// Whether the player has any AP left this turn
    pub fn can_still_act(&self) -> bool {
        self.available_ap() > 0
    }

    /// Record a unit as deployed on the board
    pub fn add_unit_on_board(&mut self, unit: UnitId) {
        self.units_on_board.push(unit);
    }

    /// Record a unit as stowed in the freighter
    pub fn add_unit_in_freighter(&mut self, unit: UnitId) {
        self.units_in_freighter.push(unit);
    }

    /// Every unit this player owns
    pub fn unit_ids(&self) -> impl Iterator<Item = &UnitId> {
        self.units_on_board.iter().chain(self.units_in_freighter.iter())
    }
}
