//! Play history and listening statistics
//!
//! Records each completed listen with its duration, and aggregates
//! top-track / top-artist totals for display. Entries with no actual
//! listened time are discarded at the door.

use chorus_core::types::{PlayEntry, Track, TrackId};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;

const TOP_LIMIT: usize = 50;

/// Aggregated seconds and play count for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackListenTotal {
    /// Track id
    pub track_id: TrackId,

    /// Total seconds listened
    pub seconds: u64,

    /// Number of recorded listens
    pub plays: u64,
}

/// Aggregated seconds and play count for one artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistListenTotal {
    /// Artist name
    pub artist: String,

    /// Total seconds listened
    pub seconds: u64,

    /// Number of recorded listens
    pub plays: u64,
}

/// Aggregated listening statistics
#[derive(Debug, Clone, Serialize)]
pub struct ListeningStats {
    /// Total seconds across every counted entry
    pub total_seconds: u64,

    /// Top tracks by listened seconds, capped at 50
    pub top_tracks: Vec<TrackListenTotal>,

    /// Top artists by listened seconds, capped at 50
    pub top_artists: Vec<ArtistListenTotal>,

    /// Year filter the stats were computed for, if any
    pub year: Option<i32>,
}

/// Append-only record of completed listens
#[derive(Debug, Clone, Default)]
pub struct PlayHistory {
    entries: Vec<PlayEntry>,
}

impl PlayHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a listen; returns the entry, or `None` for non-positive
    /// listened time
    pub fn add(
        &mut self,
        track_id: TrackId,
        played_at: DateTime<Utc>,
        listened_seconds: f64,
    ) -> Option<&PlayEntry> {
        if listened_seconds <= 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = listened_seconds.round().max(1.0) as u64;
        self.entries
            .push(PlayEntry::new(track_id, played_at, rounded));
        self.entries.last()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[PlayEntry] {
        &self.entries
    }

    /// Replace the history wholesale (hydration)
    pub fn set_entries(&mut self, entries: Vec<PlayEntry>) {
        self.entries = entries;
    }

    /// Drop every entry; full-reset flows only
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Aggregate totals, optionally restricted to one calendar year
    ///
    /// Tracks no longer in the catalog still count under their id; their
    /// artist falls back to "Unknown Artist".
    pub fn stats(&self, tracks: &[Track], year: Option<i32>) -> ListeningStats {
        let artist_of: HashMap<&str, &str> = tracks
            .iter()
            .map(|t| (t.id.as_str(), t.artist.as_str()))
            .collect();

        let mut total_seconds = 0u64;
        let mut by_track: HashMap<&str, (u64, u64)> = HashMap::new();
        let mut by_artist: HashMap<&str, (u64, u64)> = HashMap::new();

        for entry in &self.entries {
            if let Some(year) = year {
                if entry.played_at.year() != year {
                    continue;
                }
            }
            total_seconds += entry.listened_seconds;

            let track_total = by_track.entry(entry.track_id.as_str()).or_default();
            track_total.0 += entry.listened_seconds;
            track_total.1 += 1;

            let artist = artist_of
                .get(entry.track_id.as_str())
                .copied()
                .unwrap_or("Unknown Artist");
            let artist_total = by_artist.entry(artist).or_default();
            artist_total.0 += entry.listened_seconds;
            artist_total.1 += 1;
        }

        let mut top_tracks: Vec<TrackListenTotal> = by_track
            .into_iter()
            .map(|(track_id, (seconds, plays))| TrackListenTotal {
                track_id: track_id.to_string(),
                seconds,
                plays,
            })
            .collect();
        top_tracks.sort_by(|a, b| b.seconds.cmp(&a.seconds));
        top_tracks.truncate(TOP_LIMIT);

        let mut top_artists: Vec<ArtistListenTotal> = by_artist
            .into_iter()
            .map(|(artist, (seconds, plays))| ArtistListenTotal {
                artist: artist.to_string(),
                seconds,
                plays,
            })
            .collect();
        top_artists.sort_by(|a, b| b.seconds.cmp(&a.seconds));
        top_artists.truncate(TOP_LIMIT);

        ListeningStats {
            total_seconds,
            top_tracks,
            top_artists,
            year,
        }
    }
}
