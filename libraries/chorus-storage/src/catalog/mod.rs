//! Track catalog
//!
//! CRUD over track metadata records, independent of which tier holds the
//! audio bytes. File-backed tracks share their id with the blob record;
//! URL-backed tracks get an independent id and no blob.
//!
//! Removing a track releases its blob and playback URL but deliberately
//! leaves collections untouched; dangling collection entries render as
//! unplayable.

use crate::blob::BlobStore;
use chorus_core::types::{generate_id, Track, TrackId, TrackMetadata, TrackSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Input to [`TrackCatalog::create`]
#[derive(Debug, Clone)]
pub enum NewTrackSource {
    /// Raw audio bytes to be persisted by the blob store
    Bytes {
        /// File bytes
        bytes: Vec<u8>,
        /// Original file name, feeds the metadata heuristic
        file_name: String,
    },

    /// A directly playable URL; no bytes are stored
    Remote {
        /// Stable URL
        url: String,
        /// Optional file name for the metadata heuristic
        file_name: Option<String>,
    },
}

/// In-memory catalog of track records, persisted via the library snapshot
#[derive(Clone)]
pub struct TrackCatalog {
    blobs: BlobStore,
    tracks: Arc<Mutex<HashMap<TrackId, Track>>>,
}

impl TrackCatalog {
    /// Create an empty catalog over a blob store
    pub fn new(blobs: BlobStore) -> Self {
        Self {
            blobs,
            tracks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a track record, storing bytes when given
    ///
    /// Metadata priority: `overrides` > `parsed` hints > file name
    /// heuristic > defaults. The id is assigned up front; duration stays
    /// at the 0 sentinel until back-filled via [`TrackCatalog::update`].
    pub async fn create(
        &self,
        source: NewTrackSource,
        parsed: TrackMetadata,
        overrides: TrackMetadata,
    ) -> Track {
        let (id, track_source, file_name) = match source {
            NewTrackSource::Bytes { bytes, file_name } => {
                let id = self.blobs.put(bytes).await;
                (id, TrackSource::Blob, Some(file_name))
            }
            NewTrackSource::Remote { url, file_name } => {
                (generate_id(), TrackSource::Remote { url }, file_name)
            }
        };

        let from_name = file_name
            .as_deref()
            .map(TrackMetadata::from_file_name)
            .unwrap_or_default();
        let hints = from_name.merged_with(parsed).merged_with(overrides);

        let fallback_title = file_name.unwrap_or_else(|| "Unknown Title".to_string());
        let mut track = Track::new(
            id,
            hints.title.unwrap_or(fallback_title),
            track_source,
        );
        if let Some(artist) = hints.artist {
            track.artist = artist;
        }
        if let Some(album) = hints.album {
            track.album = album;
        }
        track.year = hints.year;
        track.genre = hints.genre;
        track.duration_seconds = hints.duration_seconds.unwrap_or(0.0);
        track.artwork = hints.artwork;
        track.artwork_mime = hints.artwork_mime;

        self.lock().insert(track.id.clone(), track.clone());
        track
    }

    /// Patch an existing record; used for duration back-fill
    ///
    /// Returns the updated track, or `None` when the id is unknown.
    pub fn update(&self, id: &str, patch: TrackMetadata) -> Option<Track> {
        let mut tracks = self.lock();
        let track = tracks.get_mut(id)?;
        if let Some(title) = patch.title {
            track.title = title;
        }
        if let Some(artist) = patch.artist {
            track.artist = artist;
        }
        if let Some(album) = patch.album {
            track.album = album;
        }
        if patch.year.is_some() {
            track.year = patch.year;
        }
        if patch.genre.is_some() {
            track.genre = patch.genre;
        }
        if let Some(duration) = patch.duration_seconds {
            track.duration_seconds = duration;
        }
        if patch.artwork.is_some() {
            track.artwork = patch.artwork;
            track.artwork_mime = patch.artwork_mime;
        }
        Some(track.clone())
    }

    /// Remove a track record and release its bytes
    ///
    /// Collections are not touched (dangling ids stay visible there).
    /// Returns the removed record, or `None` when the id is unknown.
    pub async fn remove(&self, id: &str) -> Option<Track> {
        let removed = self.lock().remove(id)?;
        if removed.source == TrackSource::Blob {
            self.blobs.delete(id).await;
        }
        Some(removed)
    }

    /// Fetch one record
    pub fn get(&self, id: &str) -> Option<Track> {
        self.lock().get(id).cloned()
    }

    /// All records, newest first
    pub fn all(&self) -> Vec<Track> {
        let mut tracks: Vec<Track> = self.lock().values().cloned().collect();
        tracks.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        tracks
    }

    /// Whether a record exists
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Reinstate a record without touching the blob store
    ///
    /// Used by snapshot hydration and by undo when restoring a track
    /// whose record was removed in the meantime.
    pub fn restore(&self, track: Track) {
        self.lock().insert(track.id.clone(), track);
    }

    /// Drop every record; full-reset flows only
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TrackId, Track>> {
        self.tracks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
