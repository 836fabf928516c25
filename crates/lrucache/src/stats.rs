//! Cache statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for cache activity
///
/// Counters are atomics so a shared handle can read them without taking
/// the cache lock.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Lookups that found their key
    pub hits: u64,
    /// Lookups that did not
    pub misses: u64,
    /// New keys stored
    pub inserts: u64,
    /// Existing keys overwritten
    pub updates: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// `hits / (hits + misses)`, 0.0 before any lookup
    pub hit_ratio: f64,
}

impl StatsSnapshot {
    fn from_counts(hits: u64, misses: u64, inserts: u64, updates: u64, evictions: u64) -> Self {
        let lookups = hits + misses;
        let hit_ratio = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };

        Self {
            hits,
            misses,
            inserts,
            updates,
            evictions,
            hit_ratio,
        }
    }
}

impl CacheStats {
    /// Zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a lookup that found its key
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a lookup that did not
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a newly stored key
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an overwrite of an existing key
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an entry dropped to make room
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookups that found their key
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that did not
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// New keys stored
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Existing keys overwritten
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Entries dropped to make room
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Share of lookups that hit, 0.0 before any lookup
    pub fn hit_ratio(&self) -> f64 {
        self.snapshot().hit_ratio
    }

    /// Copy the current counters
    ///
    /// Each counter is read on its own, so a snapshot taken while another
    /// thread records may mix counts from before and after that call.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::from_counts(
            self.hits(),
            self.misses(),
            self.inserts(),
            self.updates(),
            self.evictions(),
        )
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.updates,
            &self.evictions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
