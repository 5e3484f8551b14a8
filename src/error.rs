use thiserror::Error;

/// Errors for deck setup, in-game actions, and run termination.
///
/// Setup errors are fatal before a game starts. Action errors are recovered
/// locally: the attempted action is refused and the game continues. The
/// termination variants end a single game without aborting a batch.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid decklist: {0}")]
    InvalidDecklist(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Card not found: {0}")]
    CardNotFound(u32),

    #[error("Insufficient mana to pay {0}")]
    InsufficientMana(String),

    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("Invalid zone transition: {0}")]
    InvalidZoneTransition(String),

    #[error("Library is empty")]
    EmptyLibrary,

    #[error("Trigger resolution exceeded {0} steps")]
    ResolutionLimitExceeded(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// True for errors that refuse a single action without ending the game.
    pub fn is_action_error(&self) -> bool {
        matches!(
            self,
            SimError::InsufficientMana(_)
                | SimError::IllegalAction(_)
                | SimError::InvalidZoneTransition(_)
        )
    }

    /// True for conditions that terminate the current game instance.
    pub fn ends_run(&self) -> bool {
        matches!(
            self,
            SimError::EmptyLibrary | SimError::ResolutionLimitExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
