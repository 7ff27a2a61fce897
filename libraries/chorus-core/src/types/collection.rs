//! Ordered track collections (the queue and named playlists)

use super::ids::TrackId;
use serde::{Deserialize, Serialize};

/// Id of the distinguished default queue collection
///
/// The queue always exists and cannot be deleted or renamed.
pub const CURRENT_COLLECTION: &str = "current";

/// Collection identifier
pub type CollectionId = String;

/// A named ordered sequence of track ids
///
/// Duplicates are permitted; the same track may appear in several
/// collections and several times within one. Removing a track from the
/// catalog does not cascade here - dangling ids render as unplayable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique collection id
    pub id: CollectionId,

    /// Display name (non-empty after trimming)
    pub name: String,

    /// Optional cover image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,

    /// Ordered track ids
    pub track_ids: Vec<TrackId>,
}

/// Where to insert tracks into a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Prepend (drag/paste/drop-to-top flows)
    Front,

    /// Append (bulk folder scans)
    Back,
}
