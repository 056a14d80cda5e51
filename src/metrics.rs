//! Store Statistics
//!
//! Lock-free operation counters kept alongside the entry map.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collector
#[derive(Debug, Default)]
pub struct StoreStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,

    /// Entries reclaimed by sweep passes
    swept: AtomicU64,
    /// Sweep passes run
    sweeps: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub deletes: u64,
    pub swept: u64,
    pub sweeps: u64,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delete(&self, count: u64) {
        self.deletes.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one sweep pass and how many entries it removed
    pub fn record_sweep(&self, removed: u64) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept.fetch_add(removed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Fraction of lookups that hit, 0.0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Get a summary of the counters
    pub fn summary(&self) -> String {
        format!(
            "Lookups: {} hit / {} miss ({:.1}%) | Writes: {} | Deletes: {} | Swept: {} in {} passes",
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.writes,
            self.deletes,
            self.swept,
            self.sweeps
        )
    }
}
