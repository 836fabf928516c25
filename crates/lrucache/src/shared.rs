//! Thread-safe handle over an [`LruCache`]
//!
//! The map and the recency list must change together, so the whole cache
//! sits behind one mutex held for the duration of each call. `get` reorders
//! entries, which rules out a read lock.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::LruCache;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::stats::CacheStats;

/// Cloneable, lock-protected LRU cache
///
/// Values are handed out as clones since references cannot outlive the
/// lock guard.
pub struct SharedLruCache<K, V> {
    /// Cache guarded as one unit
    inner: Arc<Mutex<LruCache<K, V>>>,

    /// Counters, readable without locking
    stats: Arc<CacheStats>,
}

impl<K, V> SharedLruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a shared cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::from_cache(LruCache::new(capacity)?))
    }

    /// Create a shared cache from a [`CacheConfig`]
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::from_cache(LruCache::from_config(config)?))
    }

    /// Wrap an existing cache
    pub fn from_cache(cache: LruCache<K, V>) -> Self {
        let stats = cache.shared_stats();
        Self {
            inner: Arc::new(Mutex::new(cache)),
            stats,
        }
    }

    /// Look up a value and mark it most recently used
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Insert or overwrite a value
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Look up a value without changing its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Check for a key without changing its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    /// Run several operations under a single lock acquisition
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LruCache<K, V>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<K, V> Clone for SharedLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            stats: Arc::clone(&self.stats),
        }
    }
}
