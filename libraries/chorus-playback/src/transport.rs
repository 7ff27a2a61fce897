//! Transport state machine
//!
//! Pure state: no I/O, no sink calls. The engine resolves sources and
//! drives the sink, then reports outcomes back here (`source_ready`,
//! `load_failed`). Index arithmetic takes the active collection length
//! as an argument so every transition is testable in isolation.

use crate::shuffle::random_other_index;
use chorus_core::types::{
    CollectionId, InsertPosition, RepeatMode, TransportSettings, TransportStatus,
    CURRENT_COLLECTION,
};

/// What should happen when the current track finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Restart the same index from position 0 (repeat one)
    RestartCurrent,

    /// Load this index and keep playing
    Advance(usize),

    /// End of collection with repeat off
    Stop,
}

/// How a collection mutation affects the current index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Same logical item is still current (index may have shifted)
    Unchanged,

    /// The current item was removed; reload at this index
    Reload(usize),

    /// Collection became empty; playback stops
    Stop,
}

/// Playback transport state
#[derive(Debug, Clone)]
pub struct Transport {
    status: TransportStatus,
    collection_id: CollectionId,
    index: usize,
    position_seconds: f64,
    settings: TransportSettings,
    resume_on_ready: bool,
}

impl Transport {
    /// Create a stopped transport pointed at the queue
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            status: TransportStatus::Stopped,
            collection_id: CURRENT_COLLECTION.to_string(),
            index: 0,
            position_seconds: 0.0,
            settings,
            resume_on_ready: false,
        }
    }

    /// Current status
    pub fn status(&self) -> TransportStatus {
        self.status
    }

    /// Active collection id
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Current index into the active collection
    pub fn index(&self) -> usize {
        self.index
    }

    /// Playback position in seconds
    pub fn position_seconds(&self) -> f64 {
        self.position_seconds
    }

    /// Persisted settings (volume, shuffle, repeat)
    pub fn settings(&self) -> TransportSettings {
        self.settings
    }

    /// Replace settings wholesale (hydration)
    pub fn set_settings(&mut self, settings: TransportSettings) {
        self.settings = settings;
    }

    /// Point at a collection without loading anything (hydration)
    pub fn set_collection(&mut self, collection_id: CollectionId, index: usize) {
        self.collection_id = collection_id;
        self.index = index;
    }

    // Transitions

    /// Begin loading `index` of `collection_id`
    ///
    /// `resume` decides whether the transport continues into `Playing`
    /// or `Paused` once the source is ready.
    pub fn begin_load(&mut self, collection_id: CollectionId, index: usize, resume: bool) {
        self.collection_id = collection_id;
        self.index = index;
        self.position_seconds = 0.0;
        self.resume_on_ready = resume;
        self.status = TransportStatus::Loading;
    }

    /// The loaded source is ready to play
    pub fn source_ready(&mut self) {
        if self.status == TransportStatus::Loading {
            self.status = if self.resume_on_ready {
                TransportStatus::Playing
            } else {
                TransportStatus::Paused
            };
        }
    }

    /// The source could not be resolved or started
    ///
    /// No retry; the transport stops and the caller surfaces the state.
    pub fn load_failed(&mut self) {
        self.status = TransportStatus::Stopped;
        self.position_seconds = 0.0;
    }

    /// Pause if playing
    pub fn pause(&mut self) {
        if self.status == TransportStatus::Playing {
            self.status = TransportStatus::Paused;
        }
    }

    /// Resume if paused
    pub fn resume(&mut self) {
        if self.status == TransportStatus::Paused {
            self.status = TransportStatus::Playing;
        }
    }

    /// Stop and rewind
    pub fn stop(&mut self) {
        self.status = TransportStatus::Stopped;
        self.position_seconds = 0.0;
    }

    /// Whether the transport would keep playing after a track change
    pub fn is_playing(&self) -> bool {
        self.status == TransportStatus::Playing
            || (self.status == TransportStatus::Loading && self.resume_on_ready)
    }

    // Continuous parameters (no state transitions)

    /// Set position in seconds
    pub fn set_position(&mut self, seconds: f64) {
        self.position_seconds = seconds.max(0.0);
    }

    /// Set volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) {
        self.settings.volume = volume.clamp(0.0, 1.0);
    }

    /// Flip shuffle; returns the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        self.settings.shuffle = !self.settings.shuffle;
        self.settings.shuffle
    }

    /// Advance repeat mode through off -> all -> one
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.settings.repeat = self.settings.repeat.cycled();
        self.settings.repeat
    }

    // Index arithmetic

    /// Index for a manual "next": always wraps, shuffle-aware
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if self.settings.shuffle {
            return Some(random_other_index(len, self.index));
        }
        Some((self.index + 1) % len)
    }

    /// Index for a manual "previous": always wraps, ignores shuffle
    pub fn previous_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.index + len - 1) % len)
    }

    /// Dispatch a natural track end by repeat mode
    ///
    /// Manual navigation always wraps; only this auto-advance honors
    /// `RepeatMode::Off` stopping at the last index.
    pub fn handle_track_end(&self, len: usize) -> EndAction {
        if len == 0 {
            return EndAction::Stop;
        }
        match self.settings.repeat {
            RepeatMode::One => EndAction::RestartCurrent,
            RepeatMode::All => match self.next_index(len) {
                Some(next) => EndAction::Advance(next),
                None => EndAction::Stop,
            },
            RepeatMode::Off => {
                // Stops at the last index even when shuffling; shuffle
                // only changes which index is picked before that.
                if self.index + 1 < len {
                    if self.settings.shuffle {
                        EndAction::Advance(random_other_index(len, self.index))
                    } else {
                        EndAction::Advance(self.index + 1)
                    }
                } else {
                    EndAction::Stop
                }
            }
        }
    }

    /// Adjust the index after removals from the active collection
    ///
    /// `removed` holds the original indices in ascending order;
    /// `new_len` is the collection length after removal.
    pub fn reconcile_removal(&mut self, removed: &[usize], new_len: usize) -> Reconcile {
        let shift = removed.iter().filter(|&&r| r < self.index).count();
        let current_removed = removed.contains(&self.index);

        if !current_removed {
            self.index -= shift;
            return Reconcile::Unchanged;
        }

        if new_len == 0 {
            self.stop();
            self.index = 0;
            return Reconcile::Stop;
        }

        self.index = (self.index - shift).min(new_len - 1);
        self.position_seconds = 0.0;
        Reconcile::Reload(self.index)
    }

    /// Adjust the index after insertions into the active collection
    ///
    /// `prev_len` is the length before insertion.
    pub fn reconcile_insert(&mut self, position: InsertPosition, count: usize, prev_len: usize) {
        if prev_len == 0 {
            self.index = 0;
            return;
        }
        // Front insertion lands below every existing index
        if position == InsertPosition::Front {
            self.index += count;
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(TransportSettings::default())
    }
}
