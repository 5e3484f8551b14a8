//! Game zones.
//!
//! Each zone is an ordered list of card ids. The library's order is the
//! shuffled deck order (index 0 is the bottom, the last element is the top).
//! The other zones keep stable insertion order so iteration — and therefore
//! trigger registration order — is deterministic.
//!
//! A card id must be in exactly one zone at a time. `GameState::move_card`
//! enforces that by removing from the source zone before adding to the
//! destination; the zone type itself only provides the container ops.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::CardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Command,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Command => "command zone",
        };
        write!(f, "{}", name)
    }
}

/// An ordered card container for one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,
    cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: Zone) -> Self {
        CardZone {
            zone_type,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card: CardId) {
        self.cards.push(card);
    }

    /// Remove `card` wherever it sits, preserving the order of the rest.
    /// Returns false if the card is not in this zone.
    pub fn remove(&mut self, card: CardId) -> bool {
        match self.cards.iter().position(|c| *c == card) {
            Some(idx) => {
                // Order must stay stable for deterministic iteration, so
                // no swap_remove.
                self.cards.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, idx: usize) -> Option<CardId> {
        if idx < self.cards.len() {
            Some(self.cards.remove(idx))
        } else {
            None
        }
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.cards.contains(&card)
    }

    /// Take the top card (for the library: the draw).
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardId> {
        self.cards.iter()
    }
}
