//! Persisted library snapshot
//!
//! One JSON document holding the catalog records, the queue, the custom
//! collections, and which collection is active. Audio bytes never enter
//! the snapshot; blob-backed tracks are re-resolved through the blob
//! store on load, so a snapshot is always revivable even when some
//! payloads are gone.

use chorus_core::types::{Collection, CollectionId, Track, TrackId, CURRENT_COLLECTION};
use serde::{Deserialize, Serialize};

/// Serialized library state, stored under one vault key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    /// Catalog records (metadata only)
    pub tracks: Vec<Track>,

    /// The queue's ordered track ids
    pub current_collection: Vec<TrackId>,

    /// Custom collections in creation order
    pub custom_collections: Vec<Collection>,

    /// Which collection the transport points at
    pub current_collection_id: CollectionId,
}

impl Default for LibrarySnapshot {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            current_collection: Vec::new(),
            custom_collections: Vec::new(),
            current_collection_id: CURRENT_COLLECTION.to_string(),
        }
    }
}
