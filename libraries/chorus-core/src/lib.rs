//! Chorus Core
//!
//! Platform-agnostic core types and error handling for the Chorus
//! player engine.
//!
//! This crate defines:
//! - **Domain Types**: `Track`, `Collection`, `ActionEntry`, transport state
//! - **Ids**: generated string ids shared across storage tiers
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chorus_core::types::{Track, TrackSource, generate_id};
//!
//! let track = Track::new(generate_id(), "My Favorite Song", TrackSource::Blob);
//! assert_eq!(track.artist, "Unknown Artist");
//! ```

pub mod error;
pub mod types;

pub use error::{CoreError, Result};

// Re-export commonly used types
pub use types::{
    Action, ActionEntry, ActionId, BlobId, Collection, CollectionId, InsertPosition, PlayEntry,
    RemovedTrack, RepeatMode, StorageHealth, Track, TrackId, TrackMetadata, TrackSnapshot,
    TrackSource, TransportSettings, TransportStatus, CURRENT_COLLECTION,
};
