//! Test helpers for storage integration tests
//!
//! Stores are backed by REAL files in a temp directory (not in-memory)
//! so migrations, WAL behavior, and restart survival are exercised the
//! way production uses them.

use chorus_storage::{BlobStore, BlobStoreConfig, StateVault};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Temp-dir backed store that cleans up on drop
pub struct TestStore {
    pub store: BlobStore,
    pub pool: SqlitePool,
    pub vault: StateVault,
    pub temp_dir: TempDir,
}

impl TestStore {
    /// Create a fresh store with default tuning
    pub async fn new() -> Self {
        Self::with_config(BlobStoreConfig::default()).await
    }

    /// Create a fresh store with custom tuning
    pub async fn with_config(config: BlobStoreConfig) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = open_store(&temp_dir, "blobs.db", config).await;
        let pool = store.1;
        let vault = store.2;
        Self {
            store: store.0,
            pool,
            vault,
            temp_dir,
        }
    }
}

/// Open a blob store rooted in `dir`, reusing any existing files
pub async fn open_store(
    dir: &TempDir,
    db_file: &str,
    config: BlobStoreConfig,
) -> (BlobStore, SqlitePool, StateVault) {
    let db_url = format!("sqlite://{}", dir.path().join(db_file).display());
    let pool = chorus_storage::create_pool(&db_url)
        .await
        .expect("Failed to create pool");
    chorus_storage::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let vault = StateVault::open(dir.path().join("state.redb")).expect("Failed to open vault");

    let store = BlobStore::new(pool.clone(), vault.clone(), dir.path().join("media"), config)
        .expect("Failed to create blob store");
    store.hydrate().await.expect("Failed to hydrate");

    (store, pool, vault)
}
