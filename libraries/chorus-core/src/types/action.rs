//! Action log entry types
//!
//! Every mutating catalog/collection operation is recorded as a closed
//! `Action` variant carrying enough data to derive its inverse. The
//! variants are matched exhaustively by the undo dispatcher; there is no
//! string-typed dispatch anywhere.

use super::collection::CollectionId;
use super::ids::{generate_id, TrackId};
use super::track::{Track, TrackSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action log entry identifier
pub type ActionId = String;

/// Minimal track snapshot captured for undo
///
/// Enough to recreate a visible (if unplayable) catalog record when the
/// original was removed in the meantime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    /// Track id
    pub id: TrackId,

    /// Title at capture time
    pub title: String,

    /// Artist at capture time
    pub artist: String,

    /// Album at capture time
    pub album: String,

    /// Release year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Genre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// Byte location, so a remote URL survives the round trip
    pub source: TrackSource,
}

impl TrackSnapshot {
    /// Capture a snapshot from a full track record
    pub fn of(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            year: track.year,
            genre: track.genre.clone(),
            source: track.source.clone(),
        }
    }

    /// Rebuild a catalog record from the snapshot
    ///
    /// Duration resets to the 0 sentinel; it is back-filled on next load.
    pub fn into_track(self) -> Track {
        let mut track = Track::new(self.id, self.title, self.source);
        track.artist = self.artist;
        track.album = self.album;
        track.year = self.year;
        track.genre = self.genre;
        track
    }
}

/// A track removed from a collection, with its original index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedTrack {
    /// Index the track occupied before removal
    pub index: usize,

    /// Snapshot for reinsertion
    pub track: TrackSnapshot,
}

/// A recorded mutation, one variant per undoable operation kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A collection was created
    CollectionCreate {
        /// New collection id
        id: CollectionId,
        /// Name at creation time
        name: String,
    },

    /// A collection was deleted, with a full snapshot for restoration
    CollectionDelete {
        /// Deleted collection id
        id: CollectionId,
        /// Name at deletion time
        name: String,
        /// Cover reference, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        cover: Option<String>,
        /// Full ordered track list
        track_ids: Vec<TrackId>,
    },

    /// Tracks were added to a collection
    TracksAdd {
        /// Target collection
        collection_id: CollectionId,
        /// Display label of the target at record time
        label: String,
        /// Added track ids
        track_ids: Vec<TrackId>,
    },

    /// Tracks were removed from a collection
    TracksRemove {
        /// Source collection
        collection_id: CollectionId,
        /// Display label of the source at record time
        label: String,
        /// Removed tracks with their original indices
        tracks: Vec<RemovedTrack>,
    },

    /// Tracks were moved between collections
    TracksMove {
        /// Source collection
        source_id: CollectionId,
        /// Target collection
        target_id: CollectionId,
        /// Display label of the source
        source_label: String,
        /// Display label of the target
        target_label: String,
        /// Moved track ids in original relative order
        track_ids: Vec<TrackId>,
    },
}

impl Action {
    /// Human-readable description, matched exhaustively
    pub fn describe(&self) -> String {
        match self {
            Self::CollectionCreate { name, .. } => format!("Created playlist \"{name}\""),
            Self::CollectionDelete { name, .. } => format!("Deleted playlist \"{name}\""),
            Self::TracksAdd {
                label, track_ids, ..
            } => format!("Added {} to {label}", count_label(track_ids.len())),
            Self::TracksRemove { label, tracks, .. } => {
                format!("Removed {} from {label}", count_label(tracks.len()))
            }
            Self::TracksMove {
                source_label,
                target_label,
                track_ids,
                ..
            } => format!(
                "Moved {} from {source_label} to {target_label}",
                count_label(track_ids.len())
            ),
        }
    }
}

fn count_label(count: usize) -> String {
    if count == 1 {
        "track".to_string()
    } else {
        format!("{count} tracks")
    }
}

/// An appended action log record
///
/// Append-only: never modified after creation except for the one-shot
/// `undoable` flag, which flips to false after an undo attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Entry id
    pub id: ActionId,

    /// When the mutation happened
    pub timestamp: DateTime<Utc>,

    /// Whether the entry can still be undone
    pub undoable: bool,

    /// The recorded mutation
    #[serde(flatten)]
    pub action: Action,
}

impl ActionEntry {
    /// Wrap an action into a fresh undoable entry
    pub fn new(action: Action) -> Self {
        Self {
            id: format!("act-{}", generate_id()),
            timestamp: Utc::now(),
            undoable: true,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_covers_counts() {
        let one = Action::TracksAdd {
            collection_id: "current".to_string(),
            label: "Queue".to_string(),
            track_ids: vec!["t1".to_string()],
        };
        assert_eq!(one.describe(), "Added track to Queue");

        let many = Action::TracksAdd {
            collection_id: "current".to_string(),
            label: "Queue".to_string(),
            track_ids: vec!["t1".to_string(), "t2".to_string()],
        };
        assert_eq!(many.describe(), "Added 2 tracks to Queue");
    }

    #[test]
    fn entry_serializes_with_snake_case_tag() {
        let entry = ActionEntry::new(Action::CollectionCreate {
            id: "pl-1".to_string(),
            name: "Jazz".to_string(),
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"collection_create\""));
        assert!(json.contains("\"undoable\":true"));
    }

    #[test]
    fn snapshot_round_trip_keeps_remote_url() {
        let mut track = Track::new(
            "t1".to_string(),
            "Song",
            TrackSource::Remote {
                url: "https://example.com/a.mp3".to_string(),
            },
        );
        track.artist = "Artist".to_string();
        track.duration_seconds = 123.0;

        let restored = TrackSnapshot::of(&track).into_track();
        assert_eq!(restored.artist, "Artist");
        assert_eq!(restored.duration_seconds, 0.0);
        assert_eq!(
            restored.source,
            TrackSource::Remote {
                url: "https://example.com/a.mp3".to_string()
            }
        );
    }
}
