//! In-Memory Key-Value Store
//!
//! Thread-safe hashmap with TTL metadata, guarded by a single reader/writer
//! lock. Reads take the shared form, every mutation the exclusive one.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::sweeper::{Sweeper, SweeperHandle};
use super::{now_nanos, Entry, Value};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::metrics::{StatsSnapshot, StoreStats};
use crate::persistence::snapshot;

/// State shared between store handles and the sweeper
#[derive(Debug)]
pub(crate) struct Shared {
    entries: RwLock<HashMap<String, Entry>>,
    config: StoreConfig,
    pub(super) stats: StoreStats,
}

impl Shared {
    pub(crate) fn new(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            stats: StoreStats::new(),
        }
    }

    /// Remove expired keys, returns count of removed keys.
    ///
    /// Keys are collected under the read lock and removed under the write
    /// lock.
    pub(crate) fn sweep_expired(&self) -> usize {
        let expired = self.collect_expired(now_nanos());
        let removed = if expired.is_empty() {
            0
        } else {
            self.remove_expired(&expired, now_nanos())
        };

        self.stats.record_sweep(removed as u64);
        removed
    }

    /// Keys whose entries are expired at `now`
    fn collect_expired(&self, now: i64) -> Vec<String> {
        let map = self.entries.read();
        map.iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove the given keys that are still expired at `now`. An entry
    /// rewritten since it was collected is kept.
    fn remove_expired(&self, keys: &[String], now: i64) -> usize {
        let mut map = self.entries.write();
        let mut removed = 0;
        for key in keys {
            if map.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                map.remove(key);
                removed += 1;
            }
        }
        removed
    }
}

/// Thread-safe in-memory key-value store
///
/// Cloning is cheap and every clone sees the same entries. When built with a
/// non-zero sweep interval a background sweeper removes expired entries; it
/// stops on [`Store::shutdown`] or once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct Store {
    shared: Arc<Shared>,
    sweeper: Option<Arc<SweeperHandle>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl Store {
    /// Create a store with a default TTL and sweep interval (zero disables either)
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self::with_config(
            StoreConfig::default()
                .with_default_ttl(default_ttl)
                .with_sweep_interval(sweep_interval),
        )
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let shared = Arc::new(Shared::new(config));

        let sweeper = if shared.config.sweeper_enabled() {
            Sweeper::spawn(Arc::downgrade(&shared), shared.config.sweep_interval).map(Arc::new)
        } else {
            None
        };

        Self { shared, sweeper }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Set key-value pair. A zero `ttl` falls back to the default TTL; if
    /// that is zero too the entry never expires.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, ttl: Duration) {
        let value: Value = value.into();
        let entry = Entry::new(value.normalize(), self.shared.config.effective_ttl(ttl));
        let mut map = self.shared.entries.write();
        map.insert(key.into(), entry);
        self.shared.stats.record_write();
    }

    /// Get value by key, returns None if key doesn't exist or is expired.
    ///
    /// Expired entries are left in place for the sweeper.
    pub fn get(&self, key: &str) -> Option<Value> {
        let map = self.shared.entries.read();
        let value = map
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone());
        self.shared.stats.record_lookup(value.is_some());
        value
    }

    /// Full entry for a live key
    pub fn get_entry(&self, key: &str) -> Option<Entry> {
        let map = self.shared.entries.read();
        let entry = map.get(key).filter(|entry| !entry.is_expired()).cloned();
        self.shared.stats.record_lookup(entry.is_some());
        entry
    }

    /// Remaining lifetime of a live key, None if absent, expired or
    /// never-expiring
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let map = self.shared.entries.read();
        map.get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(Entry::ttl_remaining)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.shared.entries.write();
        map.remove(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        self.shared.stats.record_delete(1);
        Ok(())
    }

    /// Move an entry to a new key, overwriting whatever `new_key` held
    pub fn rename(&self, old_key: &str, new_key: impl Into<String>) -> Result<()> {
        let mut map = self.shared.entries.write();
        let entry = map
            .remove(old_key)
            .ok_or_else(|| Error::KeyNotFound(old_key.to_string()))?;
        map.insert(new_key.into(), entry);
        self.shared.stats.record_write();
        Ok(())
    }

    /// Duplicate an entry under `key` + copy suffix. The copy keeps the
    /// source expiration.
    pub fn copy(&self, key: &str) -> Result<()> {
        let mut map = self.shared.entries.write();
        let copy = map
            .get(key)
            .map(|entry| entry.rewritten(entry.value.clone()))
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        map.insert(format!("{}{}", key, self.shared.config.copy_suffix), copy);
        self.shared.stats.record_write();
        Ok(())
    }

    /// Add `delta` to an integer value, returns the new value
    pub fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.update_int(key, |current| current.checked_add(delta))
    }

    /// Subtract `delta` from an integer value, returns the new value
    pub fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        self.update_int(key, |current| current.checked_sub(delta))
    }

    fn update_int(&self, key: &str, op: impl FnOnce(i64) -> Option<i64>) -> Result<i64> {
        let mut map = self.shared.entries.write();
        let entry = map
            .get_mut(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        let current = entry
            .value
            .as_int()
            .ok_or_else(|| Error::NotAnInteger(key.to_string()))?;
        let next = op(current).ok_or_else(|| Error::Overflow(key.to_string()))?;

        *entry = entry.rewritten(Value::Int(next));
        self.shared.stats.record_write();
        Ok(next)
    }

    /// Check if any entry holds `value`. Linear scan.
    pub fn exist(&self, value: &Value) -> bool {
        let value = value.clone().normalize();
        let map = self.shared.entries.read();
        map.values().any(|entry| entry.value == value)
    }

    /// True if a `get` on `key` would miss right now
    pub fn expire(&self, key: &str) -> bool {
        let map = self.shared.entries.read();
        map.get(key).map(|e| e.is_expired()).unwrap_or(true)
    }

    /// Get the number of keys (including expired)
    pub fn count(&self) -> usize {
        self.shared.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Get all keys (for debugging/testing)
    pub fn keys(&self) -> Vec<String> {
        let map = self.shared.entries.read();
        map.keys().cloned().collect()
    }

    pub fn flush_all(&self) {
        let mut map = self.shared.entries.write();
        let removed = map.len();
        map.clear();
        self.shared.stats.record_delete(removed as u64);
    }

    /// Run one sweep pass now, returns count of removed keys
    pub fn sweep_expired(&self) -> usize {
        self.shared.sweep_expired()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Stop the background sweeper. Idempotent; lazy expiration on reads
    /// keeps working.
    pub fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.cancel();
        }
    }

    /// Whether a background sweeper is still alive
    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .as_ref()
            .map(|s| !s.is_finished())
            .unwrap_or(false)
    }

    /// Dump every entry to `path` as a JSON snapshot.
    ///
    /// The read lock is held until the file is written, so the snapshot is a
    /// consistent point-in-time view.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let map = self.shared.entries.read();
        snapshot::save(path, &map)?;
        info!(path = %path.display(), entries = map.len(), "Saved snapshot");
        Ok(())
    }

    /// Replace all entries with the snapshot at `path`.
    ///
    /// Nothing is merged: keys missing from the file are gone afterwards. On
    /// error the current entries are left untouched.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let entries = snapshot::load(path)?;
        let loaded = entries.len();

        let mut map = self.shared.entries.write();
        *map = entries;
        info!(path = %path.display(), entries = loaded, "Loaded snapshot");
        Ok(())
    }
}
