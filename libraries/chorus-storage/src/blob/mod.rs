//! Two-tier blob store
//!
//! Persists opaque audio payloads under generated ids. Writes target the
//! primary `SQLite` tier; capacity pressure, quota errors, and slow
//! writes all degrade transparently into the fallback tier (in-memory
//! map plus a synchronous mirror for small payloads). Callers never see
//! a hard failure from `put`, and ids carry no tier information.
//!
//! Lookup order mirrors the write path in reverse: in-memory fallback
//! first, then the mirror, then the primary tier.

use crate::error::Result;
use crate::vault::StateVault;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chorus_core::types::{generate_id, BlobId, StorageHealth};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Which tier currently holds a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Durable `SQLite` tier
    Primary,

    /// In-memory/mirrored fallback tier
    Fallback,
}

/// Tuning knobs for the blob store
///
/// The defaults carry the constants the store was originally tuned with;
/// the right values depend on the host's quota behavior, so they are
/// configurable rather than baked in.
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    /// Primary-tier item count at which new writes divert to fallback
    pub primary_soft_limit: usize,

    /// How long a primary write may take before it is abandoned
    pub write_timeout: Duration,

    /// Largest payload the fallback tier mirrors for restart survival
    pub mirror_max_bytes: usize,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            primary_soft_limit: 150,
            write_timeout: Duration::from_secs(10),
            mirror_max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Bookkeeping for both tiers plus handed-out playback URLs
#[derive(Default)]
struct TierState {
    /// Ids accounted to the primary tier
    primary_ids: HashSet<BlobId>,

    /// In-memory fallback payloads
    fallback: HashMap<BlobId, Vec<u8>>,

    /// Ids with a mirrored copy in the vault
    mirror_ids: HashSet<BlobId>,

    /// Playback URLs currently handed out, backed by media-cache files
    urls: HashMap<BlobId, Url>,
}

struct BlobStoreInner {
    pool: SqlitePool,
    vault: StateVault,
    config: BlobStoreConfig,
    media_dir: PathBuf,
    state: Mutex<TierState>,
}

/// Two-tier blob store handle
///
/// Cheap to clone; all clones share tier bookkeeping.
#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<BlobStoreInner>,
}

impl BlobStore {
    /// Create a store over an already-migrated pool and an open vault
    ///
    /// `media_dir` holds materialized files backing playback URLs; it is
    /// created if missing.
    pub fn new(
        pool: SqlitePool,
        vault: StateVault,
        media_dir: impl AsRef<Path>,
        config: BlobStoreConfig,
    ) -> Result<Self> {
        std::fs::create_dir_all(media_dir.as_ref())?;
        let media_dir = media_dir.as_ref().canonicalize()?;
        Ok(Self {
            inner: Arc::new(BlobStoreInner {
                pool,
                vault,
                config,
                media_dir,
                state: Mutex::new(TierState::default()),
            }),
        })
    }

    /// Rebuild tier accounting from persisted state
    ///
    /// Call once at startup, before serving requests.
    pub async fn hydrate(&self) -> Result<()> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM blobs")
            .fetch_all(&self.inner.pool)
            .await?;
        let mirror_ids: Vec<String> = self
            .inner
            .vault
            .mirror_keys()?
            .iter()
            .filter_map(|key| key.strip_prefix("track_").map(ToString::to_string))
            .collect();

        let mut state = self.lock_state();
        state.primary_ids = ids.into_iter().collect();
        state.mirror_ids = mirror_ids.into_iter().collect();
        Ok(())
    }

    /// Store a payload, returning its generated id
    ///
    /// Never fails: primary-tier trouble (soft limit reached, quota
    /// error, timeout, any other write failure) diverts the payload to
    /// the fallback tier. Quota errors additionally trigger best-effort
    /// eviction of the oldest quarter of primary entries.
    pub async fn put(&self, bytes: Vec<u8>) -> BlobId {
        let id = generate_id();

        let at_soft_limit = {
            let state = self.lock_state();
            state.primary_ids.len() >= self.inner.config.primary_soft_limit
        };
        if at_soft_limit {
            tracing::warn!("primary tier at soft limit, storing {id} in fallback");
            self.fallback_put(&id, bytes);
            return id;
        }

        let write = self.insert_primary(&id, &bytes);
        match tokio::time::timeout(self.inner.config.write_timeout, write).await {
            Ok(Ok(())) => {
                self.lock_state().primary_ids.insert(id.clone());
                self.spawn_verification(id.clone());
                id
            }
            Ok(Err(err)) if is_quota_error(&err) => {
                tracing::warn!("primary tier quota exceeded, storing {id} in fallback: {err}");
                self.evict_oldest_primary().await;
                self.fallback_put(&id, bytes);
                id
            }
            Ok(Err(err)) => {
                tracing::warn!("primary write failed, storing {id} in fallback: {err}");
                self.fallback_put(&id, bytes);
                id
            }
            Err(_elapsed) => {
                // The in-flight write is abandoned, not cancelled; a late
                // commit leaves an unaccounted primary row, which get()
                // and delete() both tolerate.
                tracing::warn!(
                    "primary write exceeded {:?}, storing {id} in fallback",
                    self.inner.config.write_timeout
                );
                self.fallback_put(&id, bytes);
                id
            }
        }
    }

    /// Fetch a payload from whichever tier holds it
    ///
    /// Absence is a normal result, never an error. Tier errors during
    /// lookup are logged and treated as absence in that tier.
    pub async fn get(&self, id: &str) -> Option<Vec<u8>> {
        // Fallback map first
        if let Some(bytes) = self.lock_state().fallback.get(id).cloned() {
            return Some(bytes);
        }

        // Then the synchronous mirror
        match self.inner.vault.get_mirror(&mirror_key(id)) {
            Ok(Some(encoded)) => {
                if let Some(bytes) = decode_data_url(&encoded) {
                    return Some(bytes);
                }
                tracing::warn!("mirror entry for {id} is not a valid data URL");
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("mirror read failed for {id}: {err}"),
        }

        // Finally the primary tier
        match self.read_primary(id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!("primary read failed for {id}: {err}");
                None
            }
        }
    }

    /// Produce a locally-resolvable playback URL for a stored payload
    ///
    /// Materializes the bytes into the media cache on first request and
    /// reuses the handle afterwards. Returns `None` when the bytes are
    /// unavailable in every tier.
    pub async fn playback_url(&self, id: &str) -> Option<Url> {
        if let Some(url) = self.lock_state().urls.get(id).cloned() {
            return Some(url);
        }

        let bytes = self.get(id).await?;
        let path = self.inner.media_dir.join(id);
        if let Err(err) = std::fs::write(&path, &bytes) {
            tracing::warn!("failed to materialize media file for {id}: {err}");
            return None;
        }
        let url = Url::from_file_path(&path).ok()?;
        self.lock_state().urls.insert(id.to_string(), url.clone());
        Some(url)
    }

    /// Invalidate a previously handed-out playback URL
    ///
    /// The blob store is the only component allowed to revoke handles.
    pub fn revoke_url(&self, id: &str) {
        if self.lock_state().urls.remove(id).is_some() {
            let path = self.inner.media_dir.join(id);
            if let Err(err) = std::fs::remove_file(&path) {
                tracing::debug!("media cache file for {id} already gone: {err}");
            }
        }
    }

    /// Remove a payload from whichever tier holds it
    pub async fn delete(&self, id: &str) {
        self.revoke_url(id);

        {
            let mut state = self.lock_state();
            state.fallback.remove(id);
            state.mirror_ids.remove(id);
            state.primary_ids.remove(id);
        }
        if let Err(err) = self.inner.vault.delete_mirror(&mirror_key(id)) {
            tracing::warn!("mirror delete failed for {id}: {err}");
        }
        if let Err(err) = sqlx::query("DELETE FROM blobs WHERE id = ?")
            .bind(id)
            .execute(&self.inner.pool)
            .await
        {
            tracing::warn!("primary delete failed for {id}: {err}");
        }
    }

    /// Wipe every tier; full-reset flows only
    pub async fn clear_all(&self) -> Result<()> {
        {
            let mut state = self.lock_state();
            let ids: Vec<BlobId> = state.urls.keys().cloned().collect();
            for id in ids {
                let path = self.inner.media_dir.join(&id);
                let _ = std::fs::remove_file(path);
            }
            *state = TierState::default();
        }
        self.inner.vault.clear_mirror()?;
        sqlx::query("DELETE FROM blobs")
            .execute(&self.inner.pool)
            .await?;
        Ok(())
    }

    /// Current persistent/temporary split for health reporting
    pub fn counts(&self) -> StorageHealth {
        let state = self.lock_state();
        let temporary: HashSet<&BlobId> = state.fallback.keys().chain(&state.mirror_ids).collect();
        StorageHealth {
            persistent: state.primary_ids.len(),
            temporary: temporary.len(),
        }
    }

    /// Which tier holds `id`, according to current accounting
    pub fn tier_of(&self, id: &str) -> Option<Tier> {
        let state = self.lock_state();
        if state.fallback.contains_key(id) || state.mirror_ids.contains(id) {
            Some(Tier::Fallback)
        } else if state.primary_ids.contains(id) {
            Some(Tier::Primary)
        } else {
            None
        }
    }

    /// Try to move a fallback payload into the primary tier
    ///
    /// Returns `true` when the payload now lives in the primary tier.
    /// Soft-limit and write failures leave the payload where it was.
    pub async fn promote(&self, id: &str) -> bool {
        let bytes = {
            let state = self.lock_state();
            if state.primary_ids.len() >= self.inner.config.primary_soft_limit {
                return false;
            }
            state.fallback.get(id).cloned()
        };
        let bytes = bytes.or_else(|| {
            self.inner
                .vault
                .get_mirror(&mirror_key(id))
                .ok()
                .flatten()
                .and_then(|encoded| decode_data_url(&encoded))
        });
        let Some(bytes) = bytes else {
            return false;
        };

        let write = self.insert_primary(id, &bytes);
        match tokio::time::timeout(self.inner.config.write_timeout, write).await {
            Ok(Ok(())) => {
                {
                    let mut state = self.lock_state();
                    state.fallback.remove(id);
                    state.mirror_ids.remove(id);
                    state.primary_ids.insert(id.to_string());
                }
                if let Err(err) = self.inner.vault.delete_mirror(&mirror_key(id)) {
                    tracing::warn!("mirror delete failed for promoted {id}: {err}");
                }
                true
            }
            _ => false,
        }
    }

    /// Drop `id` from primary accounting
    ///
    /// Used when post-commit verification finds the row unreadable, so
    /// health reporting stays honest about what actually persisted.
    pub fn demote(&self, id: &str) {
        self.lock_state().primary_ids.remove(id);
    }

    // Internal plumbing

    fn lock_state(&self) -> std::sync::MutexGuard<'_, TierState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn insert_primary(&self, id: &str, bytes: &[u8]) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO blobs (id, payload, created_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(bytes)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.inner.pool)
            .await?;
        Ok(())
    }

    async fn read_primary(&self, id: &str) -> sqlx::Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT payload FROM blobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.inner.pool)
            .await?;
        Ok(row.map(|row| row.get::<Vec<u8>, _>("payload")))
    }

    /// Place a payload in the fallback tier, mirroring small ones
    fn fallback_put(&self, id: &str, bytes: Vec<u8>) {
        let mirrorable = bytes.len() < self.inner.config.mirror_max_bytes;
        let encoded = mirrorable.then(|| encode_data_url(&bytes));

        {
            let mut state = self.lock_state();
            state.fallback.insert(id.to_string(), bytes);
        }

        let Some(encoded) = encoded else {
            return;
        };
        match self.inner.vault.put_mirror(&mirror_key(id), &encoded) {
            Ok(()) => {
                self.lock_state().mirror_ids.insert(id.to_string());
            }
            Err(err) => {
                tracing::warn!("mirror write failed for {id}, evicting oldest entries: {err}");
                match self.inner.vault.evict_oldest_mirror() {
                    Ok(evicted) => {
                        let mut state = self.lock_state();
                        let keep: HashSet<String> = self
                            .inner
                            .vault
                            .mirror_keys()
                            .unwrap_or_default()
                            .iter()
                            .filter_map(|key| key.strip_prefix("track_").map(ToString::to_string))
                            .collect();
                        state.mirror_ids.retain(|id| keep.contains(id));
                        tracing::debug!("evicted {evicted} mirror entries");
                    }
                    Err(err) => tracing::warn!("mirror eviction failed: {err}"),
                }
            }
        }
    }

    /// Best-effort removal of the oldest quarter of primary entries
    async fn evict_oldest_primary(&self) {
        let count = self.lock_state().primary_ids.len();
        if count == 0 {
            return;
        }
        let evict = (count / 4).max(1);

        let ids: Vec<String> = match sqlx::query_scalar(
            "SELECT id FROM blobs ORDER BY created_at ASC LIMIT ?",
        )
        .bind(evict as i64)
        .fetch_all(&self.inner.pool)
        .await
        {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!("primary eviction scan failed: {err}");
                return;
            }
        };

        for id in &ids {
            if let Err(err) = sqlx::query("DELETE FROM blobs WHERE id = ?")
                .bind(id)
                .execute(&self.inner.pool)
                .await
            {
                tracing::warn!("primary eviction failed for {id}: {err}");
                continue;
            }
            self.lock_state().primary_ids.remove(id);
        }
        tracing::debug!("evicted {} primary entries", ids.len());
    }

    /// Re-read a just-committed primary row shortly after the write
    ///
    /// Demotes the id from primary accounting if the row is unreadable,
    /// covering engines that silently drop committed writes.
    fn spawn_verification(&self, id: BlobId) {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            match store.read_primary(&id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!("primary row {id} vanished after commit, demoting");
                    store.demote(&id);
                }
                Err(err) => {
                    tracing::warn!("verification read failed for {id}, demoting: {err}");
                    store.demote(&id);
                }
            }
        });
    }
}

fn mirror_key(id: &str) -> String {
    format!("track_{id}")
}

fn encode_data_url(bytes: &[u8]) -> String {
    format!("data:application/octet-stream;base64,{}", BASE64.encode(bytes))
}

fn decode_data_url(encoded: &str) -> Option<Vec<u8>> {
    let (_prefix, payload) = encoded.split_once("base64,")?;
    BASE64.decode(payload.as_bytes()).ok()
}

/// Whether a primary-tier error indicates capacity exhaustion
fn is_quota_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_ascii_lowercase();
            message.contains("full") || message.contains("quota")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trip() {
        let bytes = vec![0u8, 1, 2, 250];
        let encoded = encode_data_url(&bytes);
        assert!(encoded.starts_with("data:application/octet-stream;base64,"));
        assert_eq!(decode_data_url(&encoded), Some(bytes));
    }

    #[test]
    fn malformed_data_url_decodes_to_none() {
        assert_eq!(decode_data_url("not a data url"), None);
        assert_eq!(decode_data_url("data:;base64,!!!"), None);
    }

    #[test]
    fn mirror_key_is_prefixed() {
        assert_eq!(mirror_key("abc"), "track_abc");
    }
}
