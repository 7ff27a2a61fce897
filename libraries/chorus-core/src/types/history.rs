//! Play history entry type

use super::ids::{generate_id, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single completed listen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEntry {
    /// Entry id
    pub id: String,

    /// Which track was listened to
    pub track_id: TrackId,

    /// When the listen happened
    pub played_at: DateTime<Utc>,

    /// Seconds actually listened (rounded, always positive)
    pub listened_seconds: u64,
}

impl PlayEntry {
    /// Create a new entry stamped now
    pub fn new(track_id: TrackId, played_at: DateTime<Utc>, listened_seconds: u64) -> Self {
        Self {
            id: format!("play-{}", generate_id()),
            track_id,
            played_at,
            listened_seconds,
        }
    }
}
