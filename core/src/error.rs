use thiserror::Error;

/// Rejections from `apply_action`. The game is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Game is not running.")]
    NotRunning,

    #[error("You are not part of the crew. Use /sink join first.")]
    NotCrew,

    #[error("Unknown action.")]
    UnknownAction(String),
}

/// Rejections from crew management (join / leave / end).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrewError {
    #[error("That game has ended. Start a new one with /sink start.")]
    GameEnded,

    #[error("You are already in the crew.")]
    AlreadyCrew,

    #[error("You are not in the crew.")]
    NotInCrew,

    #[error("The captain cannot leave. Use /sink end to end the game.")]
    CaptainCannotLeave,

    #[error("Only the captain can end the game.")]
    NotCaptain,

    #[error("Game is not running.")]
    NotRunning,
}

/// Errors raised by the per-channel game store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("A Sink game is already running in this channel. Use /sink status.")]
    AlreadyRunning,

    #[error("No Sink game is running in this channel. Start one with /sink start.")]
    NoGame,

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Crew(#[from] CrewError),
}

pub type ActionResult<T> = Result<T, ActionError>;
pub type StoreResult<T> = Result<T, StoreError>;
