//! Id generation and aliases
//!
//! All entities use generated string ids with the same format regardless
//! of which storage tier ends up holding the payload, so an id never
//! leaks tier placement to callers.

use chrono::Utc;
use uuid::Uuid;

/// Track identifier
///
/// Equals the blob id for file-backed tracks (one-to-one), independently
/// generated for URL-backed tracks.
pub type TrackId = String;

/// Blob identifier in either storage tier
pub type BlobId = String;

/// Generate a new id: millisecond timestamp plus a random suffix
///
/// The timestamp prefix makes ids sort roughly chronologically, which the
/// eviction paths rely on as a cheap oldest-first ordering.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..12])
}
