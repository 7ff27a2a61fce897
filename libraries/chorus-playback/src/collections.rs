//! Ordered collection model
//!
//! One distinguished `current` queue plus named custom collections.
//! Multi-index removal processes indices highest-to-lowest so every
//! originally-specified index is removed regardless of shifts; moves
//! preserve the moved tracks' original relative order. Mutations apply
//! synchronously in memory, so callers never observe a partial state.

use crate::error::{PlaybackError, Result};
use chorus_core::types::{
    generate_id, Collection, InsertPosition, TrackId, CURRENT_COLLECTION,
};
use std::collections::HashSet;

/// The default queue plus custom collections, in creation order
#[derive(Debug, Clone, Default)]
pub struct CollectionSet {
    current: Vec<TrackId>,
    custom: Vec<Collection>,
}

impl CollectionSet {
    /// Create an empty set (queue exists but has no tracks)
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts
    pub fn from_parts(current: Vec<TrackId>, custom: Vec<Collection>) -> Self {
        Self { current, custom }
    }

    /// The queue's track ids
    pub fn queue(&self) -> &[TrackId] {
        &self.current
    }

    /// Custom collections in creation order
    pub fn custom(&self) -> &[Collection] {
        &self.custom
    }

    /// Track ids of any collection
    pub fn tracks(&self, id: &str) -> Option<&[TrackId]> {
        if id == CURRENT_COLLECTION {
            return Some(&self.current);
        }
        self.custom
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.track_ids.as_slice())
    }

    /// Length of a collection, if it exists
    pub fn len_of(&self, id: &str) -> Option<usize> {
        self.tracks(id).map(<[TrackId]>::len)
    }

    /// Whether a collection exists
    pub fn contains(&self, id: &str) -> bool {
        self.tracks(id).is_some()
    }

    /// Display label: the queue has a fixed one, playlists use their name
    pub fn label(&self, id: &str) -> String {
        if id == CURRENT_COLLECTION {
            return "Queue".to_string();
        }
        self.custom
            .iter()
            .find(|c| c.id == id)
            .map_or_else(|| "Playlist".to_string(), |c| c.name.clone())
    }

    /// Create a custom collection
    ///
    /// Rejects names that are empty after trimming.
    pub fn create(&mut self, name: &str, cover: Option<String>) -> Result<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaybackError::EmptyName);
        }
        let collection = Collection {
            id: format!("pl-{}", generate_id()),
            name: name.to_string(),
            cover,
            track_ids: Vec::new(),
        };
        self.custom.push(collection.clone());
        Ok(collection)
    }

    /// Delete a custom collection, returning its snapshot
    ///
    /// The queue is not deletable.
    pub fn delete(&mut self, id: &str) -> Result<Collection> {
        if id == CURRENT_COLLECTION {
            return Err(PlaybackError::CannotDeleteQueue);
        }
        let position = self
            .custom
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| PlaybackError::CollectionNotFound(id.to_string()))?;
        Ok(self.custom.remove(position))
    }

    /// Reinstate a deleted collection with its full snapshot
    ///
    /// No-op (returns false) when a collection with that id exists.
    pub fn restore(&mut self, collection: Collection) -> bool {
        if self.contains(&collection.id) {
            return false;
        }
        self.custom.push(collection);
        true
    }

    /// Insert tracks at the front or back of a collection
    pub fn insert(
        &mut self,
        id: &str,
        track_ids: &[TrackId],
        position: InsertPosition,
    ) -> Result<()> {
        let tracks = self.tracks_mut(id)?;
        match position {
            InsertPosition::Front => {
                tracks.splice(0..0, track_ids.iter().cloned());
            }
            InsertPosition::Back => tracks.extend(track_ids.iter().cloned()),
        }
        Ok(())
    }

    /// Remove the given indices from a collection
    ///
    /// Indices are processed highest-to-lowest so each originally-given
    /// index is removed regardless of shifts caused by earlier removals
    /// in the same call. Out-of-bounds indices are skipped. Returns the
    /// removed `(original_index, track_id)` pairs in ascending order.
    pub fn remove(&mut self, id: &str, indices: &[usize]) -> Result<Vec<(usize, TrackId)>> {
        let tracks = self.tracks_mut(id)?;

        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < tracks.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed = Vec::with_capacity(sorted.len());
        for &index in sorted.iter().rev() {
            removed.push((index, tracks.remove(index)));
        }
        removed.reverse();
        Ok(removed)
    }

    /// Remove every instance of the given track ids from a collection
    ///
    /// Inverse of an add; returns how many entries were removed.
    pub fn remove_matching(&mut self, id: &str, track_ids: &HashSet<TrackId>) -> Result<usize> {
        let tracks = self.tracks_mut(id)?;
        let before = tracks.len();
        tracks.retain(|track_id| !track_ids.contains(track_id));
        Ok(before - tracks.len())
    }

    /// Reinsert tracks at their recorded indices, ascending, clamped
    ///
    /// Inverse of a removal.
    pub fn reinsert_at(&mut self, id: &str, entries: &[(usize, TrackId)]) -> Result<()> {
        let tracks = self.tracks_mut(id)?;
        let mut sorted: Vec<&(usize, TrackId)> = entries.iter().collect();
        sorted.sort_by_key(|(index, _)| *index);
        for (index, track_id) in sorted {
            let at = (*index).min(tracks.len());
            tracks.insert(at, track_id.clone());
        }
        Ok(())
    }

    /// Move the given indices from `source` into `target`
    ///
    /// Removal follows the highest-to-lowest rule; insertion preserves
    /// the moved tracks' original relative order. A same-collection move
    /// is a no-op, not an error. Returns the moved ids in original
    /// order, or `None` for the no-op case.
    pub fn move_between(
        &mut self,
        source: &str,
        indices: &[usize],
        target: &str,
        position: InsertPosition,
    ) -> Result<Option<Vec<TrackId>>> {
        if source == target {
            return Ok(None);
        }
        // Validate the target up front so a bad move mutates nothing
        if !self.contains(target) {
            return Err(PlaybackError::CollectionNotFound(target.to_string()));
        }

        let removed = self.remove(source, indices)?;
        let moved: Vec<TrackId> = removed.into_iter().map(|(_, track_id)| track_id).collect();
        if moved.is_empty() {
            return Ok(Some(moved));
        }
        self.insert(target, &moved, position)?;
        Ok(Some(moved))
    }

    /// Send tracks matching `track_ids` from `target` back to the front
    /// of `source`, preserving their order in `target`
    ///
    /// Inverse of a move.
    pub fn relocate_to_front(
        &mut self,
        target: &str,
        source: &str,
        track_ids: &HashSet<TrackId>,
    ) -> Result<usize> {
        let target_tracks = self.tracks_mut(target)?;
        let mut pulled = Vec::new();
        let mut index = 0;
        while index < target_tracks.len() {
            if track_ids.contains(&target_tracks[index]) {
                pulled.push(target_tracks.remove(index));
            } else {
                index += 1;
            }
        }
        let count = pulled.len();
        if count > 0 {
            self.insert(source, &pulled, InsertPosition::Front)?;
        }
        Ok(count)
    }

    /// Remove every track of a collection, returning the removed pairs
    pub fn clear_collection(&mut self, id: &str) -> Result<Vec<(usize, TrackId)>> {
        let tracks = self.tracks_mut(id)?;
        let drained: Vec<(usize, TrackId)> = tracks.drain(..).enumerate().collect();
        Ok(drained)
    }

    /// Drop everything; full-reset flows only
    pub fn clear(&mut self) {
        self.current.clear();
        self.custom.clear();
    }

    fn tracks_mut(&mut self, id: &str) -> Result<&mut Vec<TrackId>> {
        if id == CURRENT_COLLECTION {
            return Ok(&mut self.current);
        }
        self.custom
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| &mut c.track_ids)
            .ok_or_else(|| PlaybackError::CollectionNotFound(id.to_string()))
    }
}
