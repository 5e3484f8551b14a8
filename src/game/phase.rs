//! Turn structure: the fixed cycle of steps within a turn.

use serde::{Deserialize, Serialize};

/// Steps of a turn, in order. The cycle is fixed; no step is ever skipped
/// or repeated within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    Main1,
    Combat,
    Main2,
    End,
    Cleanup,
}

impl Step {
    /// The step after this one, or None at the end of the turn.
    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Untap => Some(Step::Upkeep),
            Step::Upkeep => Some(Step::Draw),
            Step::Draw => Some(Step::Main1),
            Step::Main1 => Some(Step::Combat),
            Step::Combat => Some(Step::Main2),
            Step::Main2 => Some(Step::End),
            Step::End => Some(Step::Cleanup),
            Step::Cleanup => None,
        }
    }
}

/// Tracks where we are in the game: turn number and current step.
///
/// Turn numbers are 1-based. The turn counter only moves in `next_turn`,
/// so it increases by exactly one per completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStructure {
    pub turn_number: u32,
    pub current_step: Step,
}

impl TurnStructure {
    pub fn new() -> Self {
        TurnStructure {
            turn_number: 1,
            current_step: Step::Untap,
        }
    }

    /// Move to the next step. Returns false when the turn is over (the
    /// caller then invokes [`next_turn`](Self::next_turn)).
    pub fn advance_step(&mut self) -> bool {
        match self.current_step.next() {
            Some(step) => {
                self.current_step = step;
                true
            }
            None => false,
        }
    }

    pub fn next_turn(&mut self) {
        self.turn_number += 1;
        self.current_step = Step::Untap;
    }
}

impl Default for TurnStructure {
    fn default() -> Self {
        Self::new()
    }
}
