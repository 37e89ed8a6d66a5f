//! Error types for Setu-IO.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge and engine error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An action is already in flight; the caller must observe completion
    /// and retry. Never queued behind the in-flight action.
    #[error("bridge busy: an action is already in flight")]
    Busy,

    /// The bridge has shut down; no further actions will resolve.
    #[error("bridge shut down")]
    ShutDown,

    /// Checkpoint bytes could not be applied to the engine.
    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    /// Engine-reported failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// Checkpoint serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
