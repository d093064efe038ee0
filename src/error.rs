use thiserror::Error;

use crate::engine::ObjectId;

/// Result type for history operations
pub type HistoryResult = Result<(), HistoryError>;

/// Result type for operations delegated to the scene engine
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures surfaced by the external scene engine's asynchronous primitives.
///
/// This crate never catches or retries these; they bubble to whoever drives
/// the failed operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected a snapshot during scene restoration
    #[error("scene deserialization failed: {0}")]
    Deserialize(String),
    /// The engine failed to duplicate an object
    #[error("object clone failed: {0}")]
    CloneFailed(String),
    /// An operation referenced an object the engine no longer knows
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),
    /// Any other engine-side failure
    #[error("engine error: {0}")]
    Other(String),
}

/// Errors reported by the history engine
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The undo stack holds no state before the current one
    #[error("nothing to undo")]
    NothingToUndo,
    /// The redo stack is empty
    #[error("nothing to redo")]
    NothingToRedo,
    /// An undo or redo restore has not finished yet
    #[error("a restore is already in flight")]
    RestoreInFlight,
    /// The engine failed while restoring a snapshot
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Crate-level error for deferred input operations (paste, undo, redo)
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    History(#[from] HistoryError),
}
