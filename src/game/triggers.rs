//! The trigger engine: registrations, the event queue, and the resolution
//! stack.
//!
//! This module owns the two containers and their mechanical operations.
//! The scheduling policy — what gets dispatched when, fizzle checks,
//! trigger doubling — lives on `GameState` in `actions.rs`, which is the
//! only caller with access to zones and card data.
//!
//! Ordering rules the containers support:
//! - the queue is FIFO; `prioritize_newest` rotates the latest emissions to
//!   the front so events caused by a resolution are dispatched before older
//!   pending ones;
//! - the stack is LIFO; matches for one event are pushed in reverse
//!   registration order so they pop (resolve) in registration order.

use std::collections::VecDeque;

use crate::core::CardId;
use crate::game::actions::EffectAction;
use crate::game::events::{GameEvent, Owner};
use crate::game::phase::Step;

/// When a registered ability fires. "My" is the player; "Opp" the modeled
/// opponent; "Self" the registration's own source card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerWhen {
    SelfEntered,
    MyCreatureEntered,
    /// A creature other than the source entered, either side.
    AnyCreatureEntered,
    OppCreatureEntered,
    SelfDied,
    MyCreatureDied,
    AnyCreatureDied,
    /// The upkeep began.
    StartOfTurn,
    /// The end step began.
    EndOfTurn,
    LifeGained,
    MySpellCast,
    AnySpellCast,
    OppSpellCast,
    OppLandPlayed,
    OppRemovalCast,
    OppBoardwipeCast,
    OppLibrarySearched,
}

impl TriggerWhen {
    /// Does `event` fire a registration with this filter on `source`?
    ///
    /// Battlefield presence of the source is checked separately at
    /// dispatch; this is the pure event-shape match.
    pub fn matches(&self, event: &GameEvent, source: CardId) -> bool {
        match (self, event) {
            (TriggerWhen::SelfEntered, GameEvent::PermanentEntered { card: Some(c), .. }) => {
                *c == source
            }
            (
                TriggerWhen::MyCreatureEntered,
                GameEvent::PermanentEntered {
                    creature: true,
                    owner: Owner::Player,
                    ..
                },
            ) => true,
            (
                TriggerWhen::AnyCreatureEntered,
                GameEvent::PermanentEntered {
                    creature: true,
                    card,
                    ..
                },
            ) => *card != Some(source),
            (
                TriggerWhen::OppCreatureEntered,
                GameEvent::PermanentEntered {
                    creature: true,
                    owner: Owner::Opponent,
                    ..
                },
            ) => true,
            (TriggerWhen::SelfDied, GameEvent::CreatureDied { card: Some(c), .. }) => *c == source,
            (
                TriggerWhen::MyCreatureDied,
                GameEvent::CreatureDied {
                    owner: Owner::Player,
                    ..
                },
            ) => true,
            (TriggerWhen::AnyCreatureDied, GameEvent::CreatureDied { .. }) => true,
            (TriggerWhen::StartOfTurn, GameEvent::StepBegan { step: Step::Upkeep }) => true,
            (TriggerWhen::EndOfTurn, GameEvent::StepBegan { step: Step::End }) => true,
            (TriggerWhen::LifeGained, GameEvent::LifeGained { .. }) => true,
            (
                TriggerWhen::MySpellCast,
                GameEvent::SpellCast {
                    owner: Owner::Player,
                },
            ) => true,
            (TriggerWhen::AnySpellCast, GameEvent::SpellCast { .. }) => true,
            (
                TriggerWhen::OppSpellCast,
                GameEvent::SpellCast {
                    owner: Owner::Opponent,
                },
            ) => true,
            (
                TriggerWhen::OppLandPlayed,
                GameEvent::LandPlayed {
                    owner: Owner::Opponent,
                },
            ) => true,
            (TriggerWhen::OppRemovalCast, GameEvent::RemovalCast) => true,
            (TriggerWhen::OppBoardwipeCast, GameEvent::BoardwipeCast) => true,
            (TriggerWhen::OppLibrarySearched, GameEvent::LibrarySearched) => true,
            _ => false,
        }
    }
}

/// A live trigger binding. Created when its source enters the battlefield,
/// removed when the source leaves. `seq` is the global registration order
/// and breaks all ties deterministically.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub seq: u64,
    pub source: CardId,
    pub when: TriggerWhen,
    pub effect: EffectAction,
}

/// One pending resolution on the stack.
#[derive(Debug, Clone, Copy)]
pub struct StackEntry {
    pub source: CardId,
    pub effect: EffectAction,
    /// The event that fired this entry; effects scaling with the event
    /// payload read it at resolution.
    pub event: GameEvent,
    /// Captured at push time: the source was on the battlefield. Entries
    /// with this flag fizzle if the source has left by resolution time;
    /// death triggers (pushed after their source left) are exempt.
    pub requires_live_source: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TriggerEngine {
    registrations: Vec<Registration>,
    next_seq: u64,
    queue: VecDeque<GameEvent>,
    stack: Vec<StackEntry>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        TriggerEngine::default()
    }

    pub fn register(&mut self, source: CardId, when: TriggerWhen, effect: EffectAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.registrations.push(Registration {
            seq,
            source,
            when,
            effect,
        });
    }

    /// Drop every registration owned by `source`.
    pub fn remove_for_source(&mut self, source: CardId) {
        self.registrations.retain(|r| r.source != source);
    }

    /// Registrations matching `event`, in registration order.
    pub fn matching(&self, event: &GameEvent) -> Vec<Registration> {
        // `registrations` is append-ordered, so this is already seq order.
        self.registrations
            .iter()
            .filter(|r| r.when.matches(event, r.source))
            .copied()
            .collect()
    }

    /// Queue an event for later dispatch. Side-effect-free.
    pub fn emit(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn pop_event(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    /// Move the `n` most recently emitted events to the front of the
    /// queue, keeping their relative order. Called after a resolution so
    /// the events it caused are dispatched before older pending ones.
    pub fn prioritize_newest(&mut self, n: usize) {
        debug_assert!(n <= self.queue.len());
        if n > 0 && n < self.queue.len() {
            self.queue.rotate_right(n);
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn has_events(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn push_entry(&mut self, entry: StackEntry) {
        self.stack.push(entry);
    }

    pub fn pop_entry(&mut self) -> Option<StackEntry> {
        self.stack.pop()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Nothing queued and nothing pending: resolution is complete.
    pub fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.stack.is_empty()
    }

    #[cfg(test)]
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }
}
