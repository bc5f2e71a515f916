use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid strategy address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Player '{player}' has no usable strategy: {reason}")]
    UnimplementedStrategy { player: String, reason: String },

    #[error("Duplicate player name '{name}'")]
    DuplicatePlayer { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;

/// Failures raised at the strategy seam. The player decides how each
/// class is isolated; none of them reach the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The policy itself signalled an error for this call.
    #[error("Fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// The endpoint could not be reached or answered garbage.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// A local policy does not provide a required decision.
    #[error("Strategy does not implement '{0}'")]
    Unimplemented(&'static str),
}

impl From<std::io::Error> for StrategyError {
    fn from(e: std::io::Error) -> Self {
        StrategyError::Transport(e.to_string())
    }
}

pub type StrategyResult<T> = Result<T, StrategyError>;
