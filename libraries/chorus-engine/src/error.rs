//! Error types for the engine facade

use chorus_playback::PlaybackError;
use chorus_storage::StorageError;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Storage layer failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Playback model rejection
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Track record does not exist
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Track exists but its bytes or URL cannot be resolved
    #[error("Track source unavailable: {0}")]
    SourceUnavailable(String),

    /// Snapshot (de)serialization failure
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
