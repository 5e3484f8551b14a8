//! The game state: one solitaire game instance.
//!
//! `GameState` owns every mutable piece of a single run: the card store,
//! the five zones, life totals and per-turn counters, the trigger engine,
//! and the in-game RNG. Instances are fully independent; a batch creates
//! one per run and never shares them.

use rand_chacha::ChaCha12Rng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::core::{Card, CardId, EntityStore, ManaPool};
use crate::error::{Result, SimError};
use crate::game::logger::GameLogger;
use crate::game::phase::TurnStructure;
use crate::game::triggers::TriggerEngine;
use crate::zones::{CardZone, Zone};

/// Life total at the start of a Commander game.
pub const STARTING_LIFE: i32 = 40;

/// Opponents a single-target drain hits once; "each opponent" hits all of
/// them.
pub const OPPONENT_COUNT: u64 = 3;

pub struct GameState {
    pub cards: EntityStore<Card>,
    pub catalog: Arc<Catalog>,

    pub library: CardZone,
    pub hand: CardZone,
    pub battlefield: CardZone,
    pub graveyard: CardZone,
    pub command: CardZone,

    pub turn: TurnStructure,
    pub life: i32,
    pub mana_pool: ManaPool,
    pub engine: TriggerEngine,

    pub commander: Option<CardId>,
    /// Times the commander has been cast from the command zone. The tax is
    /// two generic per previous cast and never decreases.
    pub commander_casts: u32,

    pub lands_played_this_turn: u32,
    pub spells_cast_this_turn: u32,
    pub life_gained_this_turn: u32,
    pub recursion_used_this_turn: bool,

    /// Cumulative life lost by opponents over the whole game.
    pub damage_to_opponents: u64,
    /// Set by a protection effect while an opponent removal spell resolves.
    pub pending_removal_countered: bool,
    /// The modeled opponent's board, tracked as a bare count.
    pub opponent_creatures: u32,

    /// Bound on one `resolve_all` call before the run is abandoned.
    pub max_resolution_steps: usize,

    pub rng: RefCell<ChaCha12Rng>,
    pub logger: GameLogger,
}

impl GameState {
    pub fn new(catalog: Arc<Catalog>, logger: GameLogger) -> Self {
        GameState {
            cards: EntityStore::new(),
            catalog,
            library: CardZone::new(Zone::Library),
            hand: CardZone::new(Zone::Hand),
            battlefield: CardZone::new(Zone::Battlefield),
            graveyard: CardZone::new(Zone::Graveyard),
            command: CardZone::new(Zone::Command),
            turn: TurnStructure::new(),
            life: STARTING_LIFE,
            mana_pool: ManaPool::new(),
            engine: TriggerEngine::new(),
            commander: None,
            commander_casts: 0,
            lands_played_this_turn: 0,
            spells_cast_this_turn: 0,
            life_gained_this_turn: 0,
            recursion_used_this_turn: false,
            damage_to_opponents: 0,
            pending_removal_countered: false,
            opponent_creatures: 0,
            max_resolution_steps: 10_000,
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(0)),
            logger,
        }
    }

    /// Reseed the in-game RNG. Called once per run before any play.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = RefCell::new(ChaCha12Rng::seed_from_u64(seed));
    }

    pub fn with_max_resolution_steps(mut self, steps: usize) -> Self {
        self.max_resolution_steps = steps;
        self
    }

    pub fn zone(&self, zone: Zone) -> &CardZone {
        match zone {
            Zone::Library => &self.library,
            Zone::Hand => &self.hand,
            Zone::Battlefield => &self.battlefield,
            Zone::Graveyard => &self.graveyard,
            Zone::Command => &self.command,
        }
    }

    pub fn zone_mut(&mut self, zone: Zone) -> &mut CardZone {
        match zone {
            Zone::Library => &mut self.library,
            Zone::Hand => &mut self.hand,
            Zone::Battlefield => &mut self.battlefield,
            Zone::Graveyard => &mut self.graveyard,
            Zone::Command => &mut self.command,
        }
    }

    /// Move a card between zones. Fails without side effects if the card
    /// is not in `from`; the card is never in two zones at once.
    pub fn move_card(&mut self, card: CardId, from: Zone, to: Zone) -> Result<()> {
        if !self.zone_mut(from).remove(card) {
            return Err(SimError::InvalidZoneTransition(format!(
                "card {} is not in the {}",
                card, from
            )));
        }
        self.zone_mut(to).add(card);
        Ok(())
    }

    /// Instantiate `name` from the catalog into the store. The new card is
    /// in no zone yet; the caller places it.
    pub fn create_card(&mut self, name: &str) -> Result<CardId> {
        let id = self.cards.next_id();
        let card = self.catalog.instantiate(name, id)?;
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Create a token creature instance (no catalog entry, no cost).
    pub fn create_token_card(&mut self) -> CardId {
        let id = self.cards.next_id();
        self.cards.insert(id, Card::token(id));
        id
    }

    pub fn shuffle_library(&mut self, rng: &mut impl Rng) {
        self.library.shuffle(rng);
    }

    /// Draw one card, or report the empty library that ends the run.
    pub fn draw_card(&mut self) -> Result<CardId> {
        let card = self.library.draw_top().ok_or(SimError::EmptyLibrary)?;
        self.hand.add(card);
        Ok(card)
    }

    /// Ids of the player's creatures, in battlefield order.
    pub fn creatures_on_battlefield(&self) -> Vec<CardId> {
        self.battlefield
            .iter()
            .filter(|id| {
                self.cards
                    .get(**id)
                    .map(|c| c.is_creature())
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    /// Whether a card with this name is on the battlefield.
    pub fn battlefield_has(&self, name: &str) -> bool {
        self.battlefield.iter().any(|id| {
            self.cards
                .get(*id)
                .map(|c| c.name == name)
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, TriggerChances};

    fn test_state() -> GameState {
        let catalog = Arc::new(Catalog::new(&TriggerChances::default()));
        GameState::new(catalog, GameLogger::silent())
    }

    #[test]
    fn test_move_card_between_zones() {
        let mut game = test_state();
        let id = game.create_card("Soul Warden").unwrap();
        game.library.add(id);

        game.move_card(id, Zone::Library, Zone::Hand).unwrap();
        assert!(game.hand.contains(id));
        assert!(!game.library.contains(id));

        // A second move from the now-empty source zone fails cleanly.
        let err = game.move_card(id, Zone::Library, Zone::Graveyard).unwrap_err();
        assert!(matches!(err, SimError::InvalidZoneTransition(_)));
        assert!(game.hand.contains(id));
    }

    #[test]
    fn test_card_is_in_exactly_one_zone() {
        let mut game = test_state();
        let id = game.create_card("Plains").unwrap();
        game.library.add(id);
        game.move_card(id, Zone::Library, Zone::Hand).unwrap();
        game.move_card(id, Zone::Hand, Zone::Battlefield).unwrap();

        let zones = [Zone::Library, Zone::Hand, Zone::Battlefield, Zone::Graveyard, Zone::Command];
        let homes = zones
            .iter()
            .filter(|z| game.zone(**z).contains(id))
            .count();
        assert_eq!(homes, 1);
    }

    #[test]
    fn test_draw_from_empty_library_ends_run() {
        let mut game = test_state();
        let err = game.draw_card().unwrap_err();
        assert!(matches!(err, SimError::EmptyLibrary));
        assert!(err.ends_run());
    }

    #[test]
    fn test_unknown_card_is_setup_error() {
        let mut game = test_state();
        let err = game.create_card("Black Lotus").unwrap_err();
        assert!(matches!(err, SimError::UnknownCard(_)));
    }

    #[test]
    fn test_starting_life() {
        let game = test_state();
        assert_eq!(game.life, STARTING_LIFE);
    }
}
