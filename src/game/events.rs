//! Game events.
//!
//! Events are immutable records of something that happened. They are queued
//! by `emit` and matched against trigger registrations at dispatch; they
//! carry everything a listener may need (the entering card, the amount of
//! life gained) because listeners never get to inspect past state.
//!
//! Opponent-side events carry no card id: the opponent's board is modeled
//! as a bare creature count, so only the fact of the event crosses over.

use serde::{Deserialize, Serialize};

use crate::core::CardId;
use crate::game::phase::Step;

/// Whose action caused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A turn step began. Emitted before the step's built-in action.
    StepBegan { step: Step },
    /// A permanent arrived on a battlefield. Fired uniformly for casts,
    /// land drops, token creation, and graveyard recursion.
    PermanentEntered {
        card: Option<CardId>,
        creature: bool,
        owner: Owner,
    },
    /// A creature left a battlefield by dying.
    CreatureDied { card: Option<CardId>, owner: Owner },
    /// The player gained life. `amount` is the size of that single gain.
    LifeGained { amount: u32 },
    /// A non-land spell was cast.
    SpellCast { owner: Owner },
    LandPlayed { owner: Owner },
    /// The opponent cast targeted removal.
    RemovalCast,
    /// The opponent cast a board wipe.
    BoardwipeCast,
    /// The opponent searched their library.
    LibrarySearched,
}

impl GameEvent {
    /// The card id this event names, if any.
    pub fn card(&self) -> Option<CardId> {
        match self {
            GameEvent::PermanentEntered { card, .. } => *card,
            GameEvent::CreatureDied { card, .. } => *card,
            _ => None,
        }
    }

    /// The life amount carried by a life-gain event.
    pub fn life_amount(&self) -> Option<u32> {
        match self {
            GameEvent::LifeGained { amount } => Some(*amount),
            _ => None,
        }
    }
}
