//! Card instances.
//!
//! A `Card` is the mutable in-game copy of a catalog definition: printed
//! data plus per-instance state (tapped, +1/+1 counters). Instances are
//! created when a game is set up (or when a token effect resolves) and live
//! in the game's `EntityStore`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::entity::CardId;
use crate::core::mana::{Color, ManaCost};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
}

impl CardType {
    /// Permanents stay on the battlefield after resolving.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub card_type: CardType,
    pub cost: ManaCost,
    /// Colors this card produces when tapped as a mana source. Empty for
    /// cards that are not sources.
    pub produces: SmallVec<[Color; 2]>,
    pub power: Option<i8>,
    pub toughness: Option<i8>,
    pub tapped: bool,
    /// +1/+1 counters accumulated this game.
    pub counters: u16,
    pub enters_tapped: bool,
    /// Life paid when this permanent enters (Godless Shrine style).
    pub etb_life_cost: u8,
    /// Non-land permanent that taps for mana once on the battlefield.
    pub mana_source: bool,
    /// Token creatures cease to exist instead of going to the graveyard.
    pub token: bool,
}

impl Card {
    /// A 1/1 white creature token.
    pub fn token(id: CardId) -> Self {
        Card {
            id,
            name: "Token".to_string(),
            card_type: CardType::Creature,
            cost: ManaCost::default(),
            produces: SmallVec::new(),
            power: Some(1),
            toughness: Some(1),
            tapped: false,
            counters: 0,
            enters_tapped: false,
            etb_life_cost: 0,
            mana_source: false,
            token: true,
        }
    }

    pub fn is_creature(&self) -> bool {
        self.card_type == CardType::Creature
    }

    pub fn is_land(&self) -> bool {
        self.card_type == CardType::Land
    }

    pub fn is_permanent(&self) -> bool {
        self.card_type.is_permanent()
    }

    /// True for anything that can be tapped for mana: lands and flagged
    /// artifacts.
    pub fn is_mana_source(&self) -> bool {
        self.is_land() || self.mana_source
    }

    /// Printed power plus +1/+1 counters. Zero for cards without power.
    pub fn current_power(&self) -> i32 {
        self.power
            .map(|p| p as i32 + self.counters as i32)
            .unwrap_or(0)
    }

    /// Printed toughness plus +1/+1 counters. Zero for cards without
    /// toughness.
    pub fn current_toughness(&self) -> i32 {
        self.toughness
            .map(|t| t as i32 + self.counters as i32)
            .unwrap_or(0)
    }

    pub fn tap(&mut self) -> Result<()> {
        if self.tapped {
            return Err(SimError::IllegalAction(format!(
                "{} is already tapped",
                self.name
            )));
        }
        self.tapped = true;
        Ok(())
    }

    pub fn untap(&mut self) {
        self.tapped = false;
    }

    pub fn add_counters(&mut self, n: u16) {
        self.counters += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature(power: i8, toughness: i8) -> Card {
        Card {
            id: CardId::new(0),
            name: "Test Creature".to_string(),
            card_type: CardType::Creature,
            cost: ManaCost::default(),
            produces: SmallVec::new(),
            power: Some(power),
            toughness: Some(toughness),
            tapped: false,
            counters: 0,
            enters_tapped: false,
            etb_life_cost: 0,
            mana_source: false,
            token: false,
        }
    }

    #[test]
    fn test_counters_raise_power_and_toughness() {
        let mut c = creature(1, 1);
        assert_eq!(c.current_power(), 1);
        c.add_counters(3);
        assert_eq!(c.current_power(), 4);
        assert_eq!(c.current_toughness(), 4);
    }

    #[test]
    fn test_power_without_printed_power_is_zero() {
        let mut c = creature(1, 1);
        c.power = None;
        c.toughness = None;
        c.add_counters(2);
        assert_eq!(c.current_power(), 0);
        assert_eq!(c.current_toughness(), 0);
    }

    #[test]
    fn test_tapping_twice_is_illegal() {
        let mut c = creature(1, 1);
        assert!(c.tap().is_ok());
        let err = c.tap().unwrap_err();
        assert!(matches!(err, SimError::IllegalAction(_)));
        c.untap();
        assert!(c.tap().is_ok());
    }

    #[test]
    fn test_token_shape() {
        let t = Card::token(CardId::new(5));
        assert!(t.token);
        assert!(t.is_creature());
        assert_eq!(t.current_power(), 1);
        assert!(t.cost.is_free());
    }

    #[test]
    fn test_permanence_by_type() {
        assert!(CardType::Creature.is_permanent());
        assert!(CardType::Enchantment.is_permanent());
        assert!(!CardType::Instant.is_permanent());
        assert!(!CardType::Sorcery.is_permanent());
    }
}
