//! Engine facade
//!
//! Owns one instance of every component (blob store, catalog,
//! collections, transport, action log, play history) and exposes the
//! public player surface. Nothing here is a global: the engine is
//! constructed once at startup and passed by reference to whatever
//! needs it.
//!
//! Mutations apply synchronously in memory, then write through to the
//! state vault. Vault write failures are logged and swallowed; the
//! in-memory state stays authoritative for the session.

use crate::error::{EngineError, Result};
use crate::snapshot::LibrarySnapshot;
use chorus_core::types::{
    Action, ActionEntry, ActionId, Collection, InsertPosition, RemovedTrack, RepeatMode,
    StorageHealth, Track, TrackId, TrackMetadata, TrackSnapshot, TrackSource, TransportSettings,
    TransportStatus, CURRENT_COLLECTION,
};
use chorus_playback::{
    ActionLog, AudioSink, CollectionSet, EndAction, ListeningStats, NullSink, PlayHistory,
    PlaybackError, Reconcile, Transport,
};
use chorus_storage::{
    create_pool, run_migrations, BlobStore, BlobStoreConfig, NewTrackSource, StateVault,
    TrackCatalog,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

const KEY_LIBRARY: &str = "library_snapshot";
const KEY_ACTIONS: &str = "action_log";
const KEY_HISTORY: &str = "play_history";
const KEY_SETTINGS: &str = "playback_state";

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the blob database, state vault, and media cache
    pub data_dir: PathBuf,

    /// Blob store tuning
    pub blob: BlobStoreConfig,
}

impl EngineConfig {
    /// Config with default blob tuning
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            blob: BlobStoreConfig::default(),
        }
    }
}

/// The player engine
pub struct Engine {
    blobs: BlobStore,
    catalog: TrackCatalog,
    collections: CollectionSet,
    transport: Transport,
    log: ActionLog,
    history: PlayHistory,
    vault: StateVault,
    sink: Box<dyn AudioSink>,
}

impl Engine {
    /// Open the engine with a silent sink (headless/test use)
    pub async fn open(config: EngineConfig) -> Result<Self> {
        Self::open_with_sink(config, Box::new(NullSink)).await
    }

    /// Open the engine, hydrating all persisted state
    pub async fn open_with_sink(config: EngineConfig, sink: Box<dyn AudioSink>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db_path = config.data_dir.join("chorus.db");
        let pool = create_pool(&format!("sqlite://{}", db_path.display())).await?;
        run_migrations(&pool).await?;

        let vault = StateVault::open(config.data_dir.join("state.redb"))?;
        let blobs = BlobStore::new(
            pool,
            vault.clone(),
            config.data_dir.join("media"),
            config.blob.clone(),
        )?;
        blobs.hydrate().await?;
        let catalog = TrackCatalog::new(blobs.clone());

        let snapshot: LibrarySnapshot = load_state(&vault, KEY_LIBRARY).unwrap_or_default();
        for track in snapshot.tracks {
            catalog.restore(track);
        }
        let collections =
            CollectionSet::from_parts(snapshot.current_collection, snapshot.custom_collections);

        let settings: TransportSettings = load_state(&vault, KEY_SETTINGS).unwrap_or_default();
        let mut transport = Transport::new(settings);
        let active = if collections.contains(&snapshot.current_collection_id) {
            snapshot.current_collection_id
        } else {
            CURRENT_COLLECTION.to_string()
        };
        transport.set_collection(active, 0);

        let mut log = ActionLog::new();
        log.set_entries(load_state(&vault, KEY_ACTIONS).unwrap_or_default());
        let mut history = PlayHistory::new();
        history.set_entries(load_state(&vault, KEY_HISTORY).unwrap_or_default());

        Ok(Self {
            blobs,
            catalog,
            collections,
            transport,
            log,
            history,
            vault,
            sink,
        })
    }

    // Catalog

    /// Add a track record, persisting bytes when given
    ///
    /// Does not touch any collection; insert the returned id explicitly.
    pub async fn add_track(&mut self, source: NewTrackSource, hints: TrackMetadata) -> Track {
        let track = self
            .catalog
            .create(source, TrackMetadata::default(), hints)
            .await;
        self.persist_library();
        track
    }

    /// Back-fill a track's duration once the sink reports it
    pub fn set_track_duration(&mut self, id: &str, seconds: f64) -> Option<Track> {
        let patch = TrackMetadata {
            duration_seconds: Some(seconds),
            ..TrackMetadata::default()
        };
        let updated = self.catalog.update(id, patch);
        if updated.is_some() {
            self.persist_library();
        }
        updated
    }

    /// Remove a track record and release its bytes
    ///
    /// Collection entries are left in place; they render as unplayable.
    pub async fn remove_track(&mut self, id: &str) -> Result<Track> {
        let removed = self
            .catalog
            .remove(id)
            .await
            .ok_or_else(|| EngineError::TrackNotFound(id.to_string()))?;
        self.persist_library();
        Ok(removed)
    }

    /// One catalog record
    pub fn track(&self, id: &str) -> Option<Track> {
        self.catalog.get(id)
    }

    /// All catalog records, newest first
    pub fn tracks(&self) -> Vec<Track> {
        self.catalog.all()
    }

    /// Resolve a track to a playable URL; `None` when unavailable
    pub async fn playback_url(&self, track_id: &str) -> Option<Url> {
        let track = self.catalog.get(track_id)?;
        match track.source {
            TrackSource::Blob => self.blobs.playback_url(track_id).await,
            TrackSource::Remote { url } => Url::parse(&url).ok(),
        }
    }

    // Transport

    /// Load and play `index` of `collection_id`
    pub async fn play(&mut self, collection_id: &str, index: usize) -> Result<()> {
        let len = self
            .collections
            .len_of(collection_id)
            .ok_or_else(|| PlaybackError::CollectionNotFound(collection_id.to_string()))?;
        if len == 0 {
            return Err(PlaybackError::EmptyCollection.into());
        }
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds(index).into());
        }
        self.load_track(collection_id.to_string(), index, true).await
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.sink.pause();
        self.transport.pause();
    }

    /// Resume paused playback
    pub fn resume(&mut self) -> Result<()> {
        if self.transport.status() == TransportStatus::Paused {
            self.sink.play()?;
            self.transport.resume();
        }
        Ok(())
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) {
        self.sink.stop();
        self.transport.stop();
    }

    /// Seek to a position in seconds
    pub fn seek(&mut self, seconds: f64) {
        self.sink.seek(seconds);
        self.transport.set_position(seconds);
    }

    /// Set volume (clamped to `[0, 1]`) and persist it
    pub fn set_volume(&mut self, volume: f32) {
        self.transport.set_volume(volume);
        self.sink.set_volume(self.transport.settings().volume);
        self.persist_settings();
    }

    /// Flip shuffle; returns the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        let shuffle = self.transport.toggle_shuffle();
        self.persist_settings();
        shuffle
    }

    /// Cycle repeat off -> all -> one
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        let repeat = self.transport.cycle_repeat();
        self.persist_settings();
        repeat
    }

    /// Skip to the next track (wraps; random when shuffling)
    pub async fn next(&mut self) -> Result<()> {
        let len = self.active_len();
        let Some(index) = self.transport.next_index(len) else {
            self.stop();
            return Ok(());
        };
        let resume = self.transport.is_playing();
        self.load_track(self.transport.collection_id().to_string(), index, resume)
            .await
    }

    /// Skip to the previous track (wraps)
    pub async fn previous(&mut self) -> Result<()> {
        let len = self.active_len();
        let Some(index) = self.transport.previous_index(len) else {
            self.stop();
            return Ok(());
        };
        let resume = self.transport.is_playing();
        self.load_track(self.transport.collection_id().to_string(), index, resume)
            .await
    }

    /// Handle the sink reporting the current track finished
    ///
    /// Records the listen, then advances per repeat mode.
    pub async fn track_ended(&mut self, listened_seconds: f64) -> Result<()> {
        if let Some(track_id) = self.current_track_id() {
            self.history.add(track_id, Utc::now(), listened_seconds);
            self.persist_history();
        }

        let len = self.active_len();
        match self.transport.handle_track_end(len) {
            EndAction::RestartCurrent => {
                self.transport.set_position(0.0);
                self.sink.seek(0.0);
                self.sink.play()?;
                Ok(())
            }
            EndAction::Advance(index) => {
                self.load_track(self.transport.collection_id().to_string(), index, true)
                    .await
            }
            EndAction::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    /// Transport state (read-only)
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // Collections

    /// The queue's track ids
    pub fn queue(&self) -> &[TrackId] {
        self.collections.queue()
    }

    /// Custom collections in creation order
    pub fn custom_collections(&self) -> &[Collection] {
        self.collections.custom()
    }

    /// Track ids of any collection
    pub fn collection_tracks(&self, id: &str) -> Option<&[TrackId]> {
        self.collections.tracks(id)
    }

    /// Create a named collection
    pub fn create_collection(&mut self, name: &str, cover: Option<String>) -> Result<Collection> {
        let collection = self.collections.create(name, cover)?;
        self.log.record(Action::CollectionCreate {
            id: collection.id.clone(),
            name: collection.name.clone(),
        });
        self.persist_library();
        self.persist_actions();
        Ok(collection)
    }

    /// Delete a custom collection (the queue is not deletable)
    ///
    /// Revokes playback URLs held by its blob-backed tracks; if it was
    /// the active collection, the transport falls back to the queue.
    pub fn delete_collection(&mut self, id: &str) -> Result<()> {
        let removed = self.collections.delete(id)?;

        for track_id in &removed.track_ids {
            if let Some(track) = self.catalog.get(track_id) {
                if track.source == TrackSource::Blob {
                    self.blobs.revoke_url(track_id);
                }
            }
        }

        if self.transport.collection_id() == id {
            self.sink.stop();
            self.transport.stop();
            self.transport
                .set_collection(CURRENT_COLLECTION.to_string(), 0);
        }

        self.log.record(Action::CollectionDelete {
            id: removed.id,
            name: removed.name,
            cover: removed.cover,
            track_ids: removed.track_ids,
        });
        self.persist_library();
        self.persist_actions();
        Ok(())
    }

    /// Insert tracks at the front or back of a collection
    pub fn insert_tracks(
        &mut self,
        collection_id: &str,
        track_ids: &[TrackId],
        position: InsertPosition,
    ) -> Result<ActionId> {
        let prev_len = self
            .collections
            .len_of(collection_id)
            .ok_or_else(|| PlaybackError::CollectionNotFound(collection_id.to_string()))?;
        self.collections.insert(collection_id, track_ids, position)?;

        if self.transport.collection_id() == collection_id {
            self.transport
                .reconcile_insert(position, track_ids.len(), prev_len);
        }

        let entry_id = self.log.record(Action::TracksAdd {
            collection_id: collection_id.to_string(),
            label: self.collections.label(collection_id),
            track_ids: track_ids.to_vec(),
        });
        self.persist_library();
        self.persist_actions();
        Ok(entry_id)
    }

    /// Remove the given indices from a collection
    ///
    /// Returns the recorded action id, or `None` when every index was
    /// out of bounds and nothing changed.
    pub async fn remove_tracks(
        &mut self,
        collection_id: &str,
        indices: &[usize],
    ) -> Result<Option<ActionId>> {
        let removed = self.collections.remove(collection_id, indices)?;
        if removed.is_empty() {
            return Ok(None);
        }

        let entry_id = self.record_removal(collection_id, &removed);
        let positions: Vec<usize> = removed.iter().map(|(index, _)| *index).collect();
        self.reconcile_active_removal(collection_id, &positions).await;

        self.persist_library();
        self.persist_actions();
        Ok(Some(entry_id))
    }

    /// Remove every track from a collection as one undoable action
    pub async fn clear_collection(&mut self, collection_id: &str) -> Result<Option<ActionId>> {
        let drained = self.collections.clear_collection(collection_id)?;
        if drained.is_empty() {
            return Ok(None);
        }

        let entry_id = self.record_removal(collection_id, &drained);
        let positions: Vec<usize> = drained.iter().map(|(index, _)| *index).collect();
        self.reconcile_active_removal(collection_id, &positions).await;

        self.persist_library();
        self.persist_actions();
        Ok(Some(entry_id))
    }

    /// Move the given indices from `source` into `target`
    ///
    /// A same-collection move is a no-op, not an error.
    pub async fn move_tracks(
        &mut self,
        source: &str,
        indices: &[usize],
        target: &str,
        position: InsertPosition,
    ) -> Result<Option<ActionId>> {
        let source_len = self
            .collections
            .len_of(source)
            .ok_or_else(|| PlaybackError::CollectionNotFound(source.to_string()))?;
        let target_prev_len = self.collections.len_of(target);

        let Some(moved) = self.collections.move_between(source, indices, target, position)? else {
            return Ok(None);
        };
        if moved.is_empty() {
            return Ok(None);
        }

        let entry_id = self.log.record(Action::TracksMove {
            source_id: source.to_string(),
            target_id: target.to_string(),
            source_label: self.collections.label(source),
            target_label: self.collections.label(target),
            track_ids: moved.clone(),
        });

        let mut positions: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < source_len)
            .collect();
        positions.sort_unstable();
        positions.dedup();

        if self.transport.collection_id() == target {
            if let Some(prev_len) = target_prev_len {
                self.transport
                    .reconcile_insert(position, moved.len(), prev_len);
            }
        }
        self.reconcile_active_removal(source, &positions).await;

        self.persist_library();
        self.persist_actions();
        Ok(Some(entry_id))
    }

    // Action log

    /// Undo an action log entry; returns whether an inverse applied
    ///
    /// Unknown ids and already-consumed entries are silent no-ops.
    pub fn undo(&mut self, entry_id: &str) -> bool {
        let outcome = self.log.undo(entry_id, &mut self.collections);

        // Reinserted ids must resolve to catalog records again
        for snapshot in outcome.restored_tracks {
            if !self.catalog.contains(&snapshot.id) {
                self.catalog.restore(snapshot.into_track());
            }
        }

        self.reconcile_after_undo();
        self.persist_library();
        self.persist_actions();
        outcome.applied
    }

    /// Action log entries, oldest first
    pub fn list_actions(&self) -> &[ActionEntry] {
        self.log.entries()
    }

    // History and health

    /// Listening statistics, optionally for one calendar year
    pub fn listening_stats(&self, year: Option<i32>) -> ListeningStats {
        self.history.stats(&self.catalog.all(), year)
    }

    /// Persistent/temporary payload split
    pub fn storage_health(&self) -> StorageHealth {
        self.blobs.counts()
    }

    /// Wipe every store and reset in-memory state
    pub async fn full_reset(&mut self) -> Result<()> {
        self.sink.stop();
        self.transport = Transport::new(TransportSettings::default());
        self.catalog.clear();
        self.collections.clear();
        self.log.clear();
        self.history.clear();
        self.blobs.clear_all().await?;
        self.vault.clear_state()?;
        Ok(())
    }

    // Internal plumbing

    fn active_len(&self) -> usize {
        self.collections
            .len_of(self.transport.collection_id())
            .unwrap_or(0)
    }

    fn current_track_id(&self) -> Option<TrackId> {
        self.collections
            .tracks(self.transport.collection_id())?
            .get(self.transport.index())
            .cloned()
    }

    async fn load_track(
        &mut self,
        collection_id: String,
        index: usize,
        resume: bool,
    ) -> Result<()> {
        let track_id = self
            .collections
            .tracks(&collection_id)
            .and_then(|tracks| tracks.get(index))
            .cloned()
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        self.transport.begin_load(collection_id, index, resume);
        let Some(url) = self.playback_url(&track_id).await else {
            tracing::warn!(%track_id, "no playable source, stopping");
            self.sink.stop();
            self.transport.load_failed();
            return Err(EngineError::SourceUnavailable(track_id));
        };

        self.sink.load(&url)?;
        self.sink.set_volume(self.transport.settings().volume);
        if resume {
            self.sink.play()?;
        }
        self.transport.source_ready();
        Ok(())
    }

    fn record_removal(&mut self, collection_id: &str, removed: &[(usize, TrackId)]) -> ActionId {
        let tracks: Vec<RemovedTrack> = removed
            .iter()
            .map(|(index, track_id)| RemovedTrack {
                index: *index,
                track: self.snapshot_of(track_id),
            })
            .collect();
        self.log.record(Action::TracksRemove {
            collection_id: collection_id.to_string(),
            label: self.collections.label(collection_id),
            tracks,
        })
    }

    /// Snapshot a track for undo, tolerating already-deleted records
    fn snapshot_of(&self, track_id: &str) -> TrackSnapshot {
        self.catalog.get(track_id).map_or_else(
            || {
                TrackSnapshot::of(&Track::new(
                    track_id.to_string(),
                    track_id,
                    TrackSource::Blob,
                ))
            },
            |track| TrackSnapshot::of(&track),
        )
    }

    /// Re-point the transport after indices left the active collection
    async fn reconcile_active_removal(&mut self, collection_id: &str, positions: &[usize]) {
        if self.transport.collection_id() != collection_id {
            return;
        }
        let new_len = self.collections.len_of(collection_id).unwrap_or(0);
        match self.transport.reconcile_removal(positions, new_len) {
            Reconcile::Unchanged => {}
            Reconcile::Reload(index) => {
                let resume = self.transport.is_playing();
                let collection_id = collection_id.to_string();
                if let Err(err) = self.load_track(collection_id, index, resume).await {
                    tracing::warn!("reload after removal failed: {err}");
                }
            }
            Reconcile::Stop => self.sink.stop(),
        }
    }

    fn reconcile_after_undo(&mut self) {
        let active = self.transport.collection_id().to_string();
        match self.collections.len_of(&active) {
            None => {
                self.sink.stop();
                self.transport.stop();
                self.transport
                    .set_collection(CURRENT_COLLECTION.to_string(), 0);
            }
            Some(0) => {
                self.sink.stop();
                self.transport.stop();
                self.transport.set_collection(active, 0);
            }
            Some(len) => {
                if self.transport.index() >= len {
                    self.transport.set_collection(active, len - 1);
                }
            }
        }
    }

    // Write-through persistence, best effort

    fn persist_library(&self) {
        let snapshot = LibrarySnapshot {
            tracks: self.catalog.all(),
            current_collection: self.collections.queue().to_vec(),
            custom_collections: self.collections.custom().to_vec(),
            current_collection_id: self.transport.collection_id().to_string(),
        };
        self.persist_state(KEY_LIBRARY, &snapshot);
    }

    fn persist_actions(&self) {
        self.persist_state(KEY_ACTIONS, self.log.entries());
    }

    fn persist_history(&self) {
        self.persist_state(KEY_HISTORY, self.history.entries());
    }

    fn persist_settings(&self) {
        self.persist_state(KEY_SETTINGS, &self.transport.settings());
    }

    fn persist_state<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(err) = self.vault.put_state(key, &json) {
                    tracing::warn!("state write failed for {key}: {err}");
                }
            }
            Err(err) => tracing::warn!("state serialization failed for {key}: {err}"),
        }
    }
}

fn load_state<T: DeserializeOwned>(vault: &StateVault, key: &str) -> Option<T> {
    let json = match vault.get_state(key) {
        Ok(found) => found?,
        Err(err) => {
            tracing::warn!("state read failed for {key}: {err}");
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("state entry {key} is malformed, ignoring: {err}");
            None
        }
    }
}
