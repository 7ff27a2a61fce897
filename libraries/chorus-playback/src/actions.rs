//! Action log and undo dispatch
//!
//! Append-only log of collection mutations. Undo is one-shot: the first
//! attempt applies the inverse (or finds nothing left to invert) and
//! flips the entry's `undoable` flag; later attempts are no-ops either
//! way. Inverses are derived from the recorded data by exhaustive match
//! on the closed `Action` type.

use crate::collections::CollectionSet;
use chorus_core::types::{
    Action, ActionEntry, ActionId, Collection, TrackId, TrackSnapshot,
};
use std::collections::HashSet;

/// Result of an undo attempt
#[derive(Debug, Default)]
pub struct UndoOutcome {
    /// Whether an inverse was actually applied
    pub applied: bool,

    /// Removed-track snapshots the caller may need to restore into the
    /// catalog before the reinserted ids resolve again
    pub restored_tracks: Vec<TrackSnapshot>,
}

/// Append-only record of undoable mutations
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<ActionEntry>,
}

impl ActionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action, returning the new entry's id
    pub fn record(&mut self, action: Action) -> ActionId {
        let entry = ActionEntry::new(action);
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    /// Replace the log wholesale (hydration)
    pub fn set_entries(&mut self, entries: Vec<ActionEntry>) {
        self.entries = entries;
    }

    /// Drop every entry; full-reset flows only
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Undo the entry with the given id against `collections`
    ///
    /// Unknown ids and already-consumed entries return a default (not
    /// applied) outcome. The inverse applies best-effort against the
    /// current state: a collection deleted since the action was recorded
    /// simply has nothing left to invert, and the flag still flips.
    pub fn undo(&mut self, id: &str, collections: &mut CollectionSet) -> UndoOutcome {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            tracing::warn!(action_id = id, "undo requested for unknown action");
            return UndoOutcome::default();
        };
        if !entry.undoable {
            return UndoOutcome::default();
        }
        entry.undoable = false;

        let mut outcome = UndoOutcome::default();
        match &entry.action {
            Action::CollectionCreate { id, .. } => {
                if collections.delete(id).is_ok() {
                    outcome.applied = true;
                }
            }
            Action::CollectionDelete {
                id,
                name,
                cover,
                track_ids,
            } => {
                let restored = collections.restore(Collection {
                    id: id.clone(),
                    name: name.clone(),
                    cover: cover.clone(),
                    track_ids: track_ids.clone(),
                });
                outcome.applied = restored;
            }
            Action::TracksAdd {
                collection_id,
                track_ids,
                ..
            } => {
                let wanted: HashSet<TrackId> = track_ids.iter().cloned().collect();
                if let Ok(removed) = collections.remove_matching(collection_id, &wanted) {
                    outcome.applied = removed > 0;
                }
            }
            Action::TracksRemove {
                collection_id,
                tracks,
                ..
            } => {
                let entries: Vec<(usize, TrackId)> = tracks
                    .iter()
                    .map(|t| (t.index, t.track.id.clone()))
                    .collect();
                if collections.reinsert_at(collection_id, &entries).is_ok() {
                    outcome.applied = !entries.is_empty();
                    outcome.restored_tracks = tracks.iter().map(|t| t.track.clone()).collect();
                }
            }
            Action::TracksMove {
                source_id,
                target_id,
                track_ids,
                ..
            } => {
                let wanted: HashSet<TrackId> = track_ids.iter().cloned().collect();
                if let Ok(count) = collections.relocate_to_front(target_id, source_id, &wanted) {
                    outcome.applied = count > 0;
                }
            }
        }
        outcome
    }
}
