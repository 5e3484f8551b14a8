//! Core data types: entity storage, card instances, mana.

pub mod card;
pub mod entity;
pub mod mana;

pub use card::{Card, CardType};
pub use entity::{CardId, EntityStore};
pub use mana::{Color, ManaCost, ManaPool};
