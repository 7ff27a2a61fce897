//! Chorus Playback
//!
//! Platform-agnostic queue and transport management for the Chorus
//! player engine.
//!
//! This crate provides:
//! - Ordered collection model (default queue + named playlists)
//! - Transport state machine (stopped/loading/playing/paused)
//! - Shuffle and repeat modes
//! - Action log with one-shot undo
//! - Play history with listening stats
//!
//! No dependency on storage or on any audio backend: the host supplies
//! an [`AudioSink`] implementation and resolves track ids to playable
//! URLs. That keeps every rule in this crate testable without I/O.
//!
//! # Example
//!
//! ```rust
//! use chorus_playback::{CollectionSet, Transport};
//! use chorus_core::types::{InsertPosition, TransportSettings, CURRENT_COLLECTION};
//!
//! let mut collections = CollectionSet::new();
//! collections
//!     .insert(CURRENT_COLLECTION, &["a".to_string()], InsertPosition::Back)
//!     .unwrap();
//!
//! let mut transport = Transport::new(TransportSettings::default());
//! transport.begin_load(CURRENT_COLLECTION.to_string(), 0, true);
//! transport.source_ready();
//! ```

mod actions;
mod collections;
mod error;
mod history;
mod shuffle;
mod sink;
mod transport;

pub use actions::{ActionLog, UndoOutcome};
pub use collections::CollectionSet;
pub use error::{PlaybackError, Result};
pub use history::{ArtistListenTotal, ListeningStats, PlayHistory, TrackListenTotal};
pub use shuffle::random_other_index;
pub use sink::{AudioSink, NullSink};
pub use transport::{EndAction, Reconcile, Transport};
