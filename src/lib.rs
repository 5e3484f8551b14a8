//! Solitaire Commander deck simulator for the Soul Sisters lifegain
//! archetype (commander: Amalia Benavides Aguirre).
//!
//! The crate drives repeated single-player games of a fixed 100-card deck
//! through a turn state machine and a stack-based trigger engine, then
//! aggregates per-turn statistics over many independent runs.
//!
//! Layout:
//! - `core`: entities, card definitions and instances, mana
//! - `zones`: the five game zones and their card containers
//! - `catalog` / `deck`: the card database and decklist handling
//! - `game`: events, triggers, actions, turn structure, the game loop
//! - `sim`: batch execution and statistics

pub mod catalog;
pub mod core;
pub mod deck;
pub mod error;
pub mod game;
pub mod sim;
pub mod zones;

pub use error::{Result, SimError};
