//! Chorus Engine
//!
//! The top-level facade tying together the Chorus storage and playback
//! crates into one player instance:
//!
//! - **Blob store + catalog**: audio payloads and track metadata
//! - **Collections**: the queue plus named playlists
//! - **Transport**: the playback state machine, driven through a
//!   host-supplied [`chorus_playback::AudioSink`]
//! - **Action log**: one-shot undo over collection mutations
//! - **Play history**: listening statistics
//!
//! All state writes through to an on-disk vault, so a reopened engine
//! resumes with the same library, collections, action log, and
//! settings.
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_engine::{Engine, EngineConfig};
//! use chorus_core::types::{InsertPosition, TrackMetadata, CURRENT_COLLECTION};
//! use chorus_storage::NewTrackSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::open(EngineConfig::new("/tmp/chorus")).await?;
//!
//! let track = engine
//!     .add_track(
//!         NewTrackSource::Bytes {
//!             bytes: vec![1, 2, 3],
//!             file_name: "Artist - Song.mp3".to_string(),
//!         },
//!         TrackMetadata::default(),
//!     )
//!     .await;
//! engine.insert_tracks(CURRENT_COLLECTION, &[track.id], InsertPosition::Back)?;
//! engine.play(CURRENT_COLLECTION, 0).await?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod snapshot;

pub use engine::{Engine, EngineConfig};
pub use error::{EngineError, Result};
pub use snapshot::LibrarySnapshot;
