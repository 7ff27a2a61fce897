//! Track record types

use super::ids::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a track's audio bytes live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackSource {
    /// Bytes stored in the blob store under the track's own id
    Blob,

    /// Track backed by a stable URL (server or local file), no blob
    Remote {
        /// Directly playable URL, survives snapshot round-trips
        url: String,
    },
}

/// A catalog track record
///
/// Metadata only; audio bytes are owned by the blob store. A track whose
/// bytes cannot be resolved from any tier stays visible in listings but
/// is unplayable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique id, shared with the blob record for file-backed tracks
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Release year (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Genre (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// Duration in seconds; starts at 0 and is back-filled once known
    pub duration_seconds: f64,

    /// Embedded artwork bytes, serialized as base64
    #[serde(with = "base64_bytes", default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<Vec<u8>>,

    /// Artwork MIME type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_mime: Option<String>,

    /// Audio byte location
    pub source: TrackSource,

    /// When the track was added to the catalog
    pub added_at: DateTime<Utc>,
}

impl Track {
    /// Create a track with default metadata
    pub fn new(id: TrackId, title: impl Into<String>, source: TrackSource) -> Self {
        Self {
            id,
            title: title.into(),
            artist: "Unknown Artist".to_string(),
            album: "Unknown Album".to_string(),
            year: None,
            genre: None,
            duration_seconds: 0.0,
            artwork: None,
            artwork_mime: None,
            source,
            added_at: Utc::now(),
        }
    }
}

/// Metadata hints for track creation
///
/// Filled by tag parsers or by the caller; every field is optional.
/// Priority at creation time: explicit overrides > parsed tags >
/// filename heuristic > defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Release year
    pub year: Option<i32>,

    /// Genre
    pub genre: Option<String>,

    /// Duration in seconds, if already known
    pub duration_seconds: Option<f64>,

    /// Embedded artwork bytes
    pub artwork: Option<Vec<u8>>,

    /// Artwork MIME type
    pub artwork_mime: Option<String>,
}

impl TrackMetadata {
    /// Overlay `other` on top of `self`: fields set in `other` win
    pub fn merged_with(mut self, other: TrackMetadata) -> Self {
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.artist.is_some() {
            self.artist = other.artist;
        }
        if other.album.is_some() {
            self.album = other.album;
        }
        if other.year.is_some() {
            self.year = other.year;
        }
        if other.genre.is_some() {
            self.genre = other.genre;
        }
        if other.duration_seconds.is_some() {
            self.duration_seconds = other.duration_seconds;
        }
        if other.artwork.is_some() {
            self.artwork = other.artwork;
            self.artwork_mime = other.artwork_mime;
        }
        self
    }
}

impl TrackMetadata {
    /// Derive title/artist hints from a file name
    ///
    /// `Artist - Title.mp3` splits on the first ` - `; anything else uses
    /// the stem as the title.
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _ext)| stem);

        let mut hints = TrackMetadata::default();
        if let Some((artist, title)) = stem.split_once(" - ") {
            let artist = artist.trim();
            let title = title.trim();
            if !artist.is_empty() && !title.is_empty() {
                hints.artist = Some(artist.to_string());
                hints.title = Some(title.to_string());
                return hints;
            }
        }

        let stem = stem.trim();
        if !stem.is_empty() {
            hints.title = Some(stem.to_string());
        }
        hints
    }
}

/// Serde helper: `Option<Vec<u8>>` as base64 text
///
/// Keeps artwork compact in JSON snapshots, matching the data-URL shape
/// used by the mirror tier.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => STANDARD.encode(bytes).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
