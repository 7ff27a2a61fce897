//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Collection name was empty after trimming
    #[error("Collection name must not be empty")]
    EmptyName,

    /// The default queue cannot be deleted
    #[error("The queue collection cannot be deleted")]
    CannotDeleteQueue,

    /// Collection has no tracks to play
    #[error("Collection is empty")]
    EmptyCollection,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Audio sink error
    #[error("Audio sink error: {0}")]
    Sink(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
