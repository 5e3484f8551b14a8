//! Game state, the turn driver, and the trigger engine.

pub mod actions;
pub mod events;
pub mod game_loop;
pub mod logger;
pub mod opponent;
pub mod phase;
pub mod state;
pub mod triggers;

pub use actions::{EffectAction, EffectAmount};
pub use events::{GameEvent, Owner};
pub use game_loop::{GameLoop, RunEndReason, RunOutcome, TurnSnapshot};
pub use logger::{GameLogger, OutputMode, VerbosityLevel};
pub use opponent::{OpponentConfig, OpponentModel, ScalingConfig, ScalingFormula};
pub use phase::{Step, TurnStructure};
pub use state::{GameState, OPPONENT_COUNT, STARTING_LIFE};
pub use triggers::{TriggerEngine, TriggerWhen};
