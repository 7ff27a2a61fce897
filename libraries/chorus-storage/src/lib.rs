//! Chorus Storage
//!
//! Tiered local storage layer for the Chorus player engine.
//!
//! Audio payloads live in a two-tier blob store:
//!
//! - **Primary tier**: `SQLite` (async, durable), capacity-aware
//! - **Fallback tier**: in-memory map, with small payloads mirrored into
//!   a synchronous `redb` key-value store so they survive restarts
//!
//! Every primary-tier failure (timeout, quota, transaction error)
//! degrades into the fallback tier instead of surfacing an error; the
//! only externally visible effect is the persistent/temporary split in
//! [`chorus_core::StorageHealth`].
//!
//! The same `redb` database also holds the serialized library snapshot,
//! action log, play history, and transport settings as string-keyed JSON
//! entries (see [`StateVault`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_storage::{create_pool, run_migrations, BlobStore, BlobStoreConfig, StateVault};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite:///tmp/chorus/blobs.db").await?;
//! run_migrations(&pool).await?;
//! let vault = StateVault::open("/tmp/chorus/state.redb")?;
//!
//! let store = BlobStore::new(pool, vault, "/tmp/chorus/media", BlobStoreConfig::default())?;
//! store.hydrate().await?;
//!
//! let id = store.put(vec![1, 2, 3]).await;
//! assert_eq!(store.get(&id).await, Some(vec![1, 2, 3]));
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod catalog;
mod error;
mod vault;

pub use blob::{BlobStore, BlobStoreConfig, Tier};
pub use catalog::{NewTrackSource, TrackCatalog};
pub use error::{Result, StorageError};
pub use vault::StateVault;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into the binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations for the primary blob tier
///
/// Call once at startup before constructing a [`BlobStore`].
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool for the primary blob tier
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g. `sqlite://chorus.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
