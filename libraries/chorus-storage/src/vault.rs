//! Synchronous string-keyed state vault
//!
//! Thin wrapper around a `redb` database with two tables:
//!
//! - `mirror`: data-URL encoded copies of small fallback-tier payloads,
//!   keyed `track_<id>`, so they survive process restarts even when the
//!   primary tier is unavailable
//! - `state`: JSON snapshots (library, action log, play history,
//!   transport settings) under fixed string keys
//!
//! All operations are synchronous; callers treat the vault the way the
//! blob store treats its mirror tier: best effort, failures logged and
//! swallowed at the call site.

use crate::error::Result;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

const MIRROR: TableDefinition<&str, &str> = TableDefinition::new("mirror");
const STATE: TableDefinition<&str, &str> = TableDefinition::new("state");

/// Handle to the synchronous key-value vault
#[derive(Clone)]
pub struct StateVault {
    db: Arc<Database>,
}

impl StateVault {
    /// Open (or create) the vault at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Create both tables up front so reads never hit a missing table
        let txn = db.begin_write()?;
        {
            txn.open_table(MIRROR)?;
            txn.open_table(STATE)?;
        }
        txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // Mirror table

    /// Store a mirrored payload under `key`
    pub fn put_mirror(&self, key: &str, value: &str) -> Result<()> {
        self.put(MIRROR, key, value)
    }

    /// Fetch a mirrored payload
    pub fn get_mirror(&self, key: &str) -> Result<Option<String>> {
        self.get(MIRROR, key)
    }

    /// Remove a mirrored payload
    pub fn delete_mirror(&self, key: &str) -> Result<()> {
        self.delete(MIRROR, key)
    }

    /// All mirror keys in key order
    ///
    /// Keys embed a timestamp prefix, so key order doubles as
    /// oldest-first order for eviction.
    pub fn mirror_keys(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MIRROR)?;
        let mut keys = Vec::new();
        for item in table.iter()? {
            let (key, _value) = item?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    /// Evict the oldest half of the mirror entries
    ///
    /// Returns how many entries were removed.
    pub fn evict_oldest_mirror(&self) -> Result<usize> {
        let keys = self.mirror_keys()?;
        if keys.is_empty() {
            return Ok(0);
        }
        let evict = (keys.len() / 2).max(1);

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MIRROR)?;
            for key in &keys[..evict] {
                table.remove(key.as_str())?;
            }
        }
        txn.commit()?;
        Ok(evict)
    }

    /// Drop every mirror entry
    pub fn clear_mirror(&self) -> Result<()> {
        self.clear(MIRROR)
    }

    // State table

    /// Store a JSON state entry under a fixed key
    pub fn put_state(&self, key: &str, value: &str) -> Result<()> {
        self.put(STATE, key, value)
    }

    /// Fetch a JSON state entry
    pub fn get_state(&self, key: &str) -> Result<Option<String>> {
        self.get(STATE, key)
    }

    /// Remove a state entry
    pub fn delete_state(&self, key: &str) -> Result<()> {
        self.delete(STATE, key)
    }

    /// Drop every state entry
    pub fn clear_state(&self) -> Result<()> {
        self.clear(STATE)
    }

    // Shared plumbing

    fn put(&self, table: TableDefinition<&str, &str>, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn get(&self, table: TableDefinition<&str, &str>, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(table)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_string()))
    }

    fn delete(&self, table: TableDefinition<&str, &str>, key: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn clear(&self, table: TableDefinition<&str, &str>) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table)?;
            let keys: Vec<String> = table
                .iter()?
                .map(|item| item.map(|(key, _)| key.value().to_string()))
                .collect::<std::result::Result<_, _>>()?;
            for key in keys {
                table.remove(key.as_str())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}
