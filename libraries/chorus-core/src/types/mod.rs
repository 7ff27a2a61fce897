//! Domain types shared across Chorus crates

mod action;
mod collection;
mod history;
mod ids;
mod track;
mod transport;

pub use action::{Action, ActionEntry, ActionId, RemovedTrack, TrackSnapshot};
pub use collection::{Collection, CollectionId, InsertPosition, CURRENT_COLLECTION};
pub use history::PlayEntry;
pub use ids::{generate_id, BlobId, TrackId};
pub use track::{Track, TrackMetadata, TrackSource};
pub use transport::{RepeatMode, TransportSettings, TransportStatus};

use serde::{Deserialize, Serialize};

/// Persistence health counters reported by the blob store
///
/// `persistent` counts payloads in the primary tier, `temporary` counts
/// payloads held by the fallback tier (including mirrored ones). Used by
/// hosts as a passive status indicator, never as an error signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageHealth {
    /// Payloads durably stored in the primary tier
    pub persistent: usize,

    /// Payloads held in the fallback tier
    pub temporary: usize,
}
