//! LRU cache: hash index over the recency list
//!
//! The map stores [`EntryHandle`]s into the list arena rather than
//! references, so eviction can never leave a dangling pointer behind.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::entry::EntryHandle;
use crate::error::Result;
use crate::list::{Iter, OrderedList};
use crate::stats::CacheStats;

/// Upper bound on slots reserved up front; larger caches grow on demand.
const MAX_PREALLOC: usize = 4096;

/// Fixed-capacity cache that evicts the least recently used entry
///
/// Both [`get`](Self::get) and [`put`](Self::put) count as a use. Lookups
/// that must not disturb the order go through [`peek`](Self::peek).
///
/// # Example
/// ```
/// use lrucache::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.put(1, "one");
/// cache.put(2, "two");
/// assert_eq!(cache.get(&1), Some(&"one"));
///
/// cache.put(3, "three"); // evicts 2
/// assert_eq!(cache.get(&2), None);
/// ```
pub struct LruCache<K, V, S = RandomState> {
    map: HashMap<K, EntryHandle, S>,
    list: OrderedList<K, V>,
    capacity: usize,
    stats: Arc<CacheStats>,
    record_stats: bool,
}

impl<K, V> LruCache<K, V, RandomState>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries
    ///
    /// # Errors
    /// `Error::InvalidConfiguration` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::from_config(&CacheConfig::new(capacity))
    }

    /// Create a cache from a [`CacheConfig`]
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Create a cache using a custom hasher for the key index
    pub fn with_hasher(capacity: usize, hasher: S) -> Result<Self> {
        Self::with_config_and_hasher(&CacheConfig::new(capacity), hasher)
    }

    /// Create a cache from a config and a custom hasher
    pub fn with_config_and_hasher(config: &CacheConfig, hasher: S) -> Result<Self> {
        config.validate()?;

        let prealloc = config.capacity.min(MAX_PREALLOC);
        debug!(
            capacity = config.capacity,
            record_stats = config.record_stats,
            "lru cache created"
        );

        Ok(Self {
            map: HashMap::with_capacity_and_hasher(prealloc, hasher),
            list: OrderedList::with_capacity(prealloc),
            capacity: config.capacity,
            stats: Arc::new(CacheStats::new()),
            record_stats: config.record_stats,
        })
    }

    /// Look up a value and mark it most recently used
    ///
    /// A miss returns `None` and leaves the order untouched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.touch(key)?;
        self.list.get(handle).map(|(_, value)| value)
    }

    /// Mutable lookup; marks the entry most recently used like [`get`](Self::get)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.touch(key)?;
        self.list.get_mut(handle)
    }

    /// Insert or overwrite a value and mark it most recently used
    ///
    /// Inserting a new key into a full cache first evicts the least
    /// recently used entry.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&handle) = self.map.get(&key) {
            // Update existing
            if let Some(slot) = self.list.get_mut(handle) {
                *slot = value;
            }
            self.list.move_to_front(handle);
            self.record(CacheStats::record_update);
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict();
        }

        let handle = self.list.insert_at_front(key.clone(), value);
        self.map.insert(key, handle);
        self.record(CacheStats::record_insert);
    }

    /// Look up a value without changing its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &handle = self.map.get(key)?;
        self.list.get(handle).map(|(_, value)| value)
    }

    /// Check for a key without changing its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.map.remove(key)?;
        self.list.remove(handle).map(|(_, value)| value)
    }

    /// Remove and return the least recently used entry
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.remove_from_back()?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Least recently used entry, without changing its recency
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry; capacity and statistics are kept
    pub fn clear(&mut self) {
        debug!(len = self.map.len(), "lru cache cleared");
        self.map.clear();
        self.list.clear();
    }

    /// Iterate from most to least recently used without touching recency
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.list.iter()
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|(key, _)| key)
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub(crate) fn shared_stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    fn touch<Q>(&mut self, key: &Q) -> Option<EntryHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key) {
            Some(&handle) => {
                self.list.move_to_front(handle);
                self.record(CacheStats::record_hit);
                trace!(len = self.map.len(), "cache hit");
                Some(handle)
            }
            None => {
                self.record(CacheStats::record_miss);
                trace!(len = self.map.len(), "cache miss");
                None
            }
        }
    }

    fn evict(&mut self) {
        if let Some((key, _)) = self.list.remove_from_back() {
            self.map.remove(&key);
            self.record(CacheStats::record_eviction);
            debug!(capacity = self.capacity, "evicted least recently used entry");
        }
    }

    fn record(&self, counter: fn(&CacheStats)) {
        if self.record_stats {
            counter(&self.stats);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a LruCache<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

/// Renders entries most recent first, e.g. `(3: 3) -> (1: 1)`
impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list.is_empty() {
            return write!(f, "Empty cache");
        }

        for (i, (key, value)) in self.list.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "({}: {})", key, value)?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.list.len())
            .field("entries", &self.list)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::stats::StatsSnapshot;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn assert_consistent<K, V, S>(cache: &LruCache<K, V, S>)
    where
        K: Hash + Eq + Clone,
        S: BuildHasher,
    {
        cache.list.check_invariants();
        assert_eq!(cache.map.len(), cache.list.len());
        assert!(cache.len() <= cache.capacity());
        for (key, _) in cache.list.iter() {
            let handle = cache.map.get(key).copied();
            assert!(handle.is_some(), "listed key missing from index");
        }
    }

    #[test]
    fn test_lru_basic() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.len(), 2);
        assert_consistent(&cache);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(&1), Some(&1));
        cache.put(3, 3); // evicts 2

        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(&1));
        assert_eq!(cache.get(&3), Some(&3));
        assert_consistent(&cache);
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = LruCache::new(1).unwrap();

        cache.put(1, 1);
        cache.put(2, 2); // evicts 1

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&2));
        assert_eq!(cache.len(), 1);
        assert_consistent(&cache);
    }

    #[test]
    fn test_update_refreshes_recency() {
        let mut cache = LruCache::new(3).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        cache.put(2, 20); // update, not insert

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&2), Some(&20));

        cache.put(4, 4); // evicts 1
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
        assert_consistent(&cache);
    }

    #[test]
    fn test_zero_capacity() {
        let result: Result<LruCache<u32, u32>> = LruCache::new(0);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_lru_eviction() {
        init_tracing();
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // Should evict 1

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.get(&3), Some(&"c"));
        assert_eq!(cache.stats().evictions(), 1);
    }

    #[test]
    fn test_lru_overwrite() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(1, "b");

        assert_eq!(cache.get(&1), Some(&"b"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().inserts(), 1);
        assert_eq!(cache.stats().updates(), 1);
    }

    #[test]
    fn test_get_keeps_value() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put("k", 7);

        for _ in 0..3 {
            assert_eq!(cache.get("k"), Some(&7));
        }
        assert_eq!(cache.peek("k"), Some(&7));
    }

    #[test]
    fn test_miss_keeps_order() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);

        assert_eq!(cache.get(&9), None);

        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_peek_keeps_order() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.peek(&1), Some(&"a"));
        cache.put(3, "c"); // still evicts 1

        assert!(!cache.contains(&1));
        assert_eq!(cache.stats().hits(), 0);
    }

    #[test]
    fn test_get_mut() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);

        if let Some(value) = cache.get_mut(&1) {
            *value += 1;
        }
        cache.put(3, 30); // evicts 2

        assert_eq!(cache.peek(&1), Some(&11));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn test_lru_remove() {
        let mut cache = LruCache::new(3).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");

        assert_eq!(cache.remove(&2), Some("b"));
        assert_eq!(cache.remove(&2), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&2), None);
        assert_consistent(&cache);
    }

    #[test]
    fn test_pop_and_peek_lru() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);

        assert_eq!(cache.peek_lru(), Some((&2, &"b")));
        assert_eq!(cache.pop_lru(), Some((2, "b")));
        assert_eq!(cache.pop_lru(), Some((1, "a")));
        assert_eq!(cache.pop_lru(), None);
        assert_eq!(cache.stats().evictions(), 0);
        assert_consistent(&cache);
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = LruCache::new(3).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.clear();

        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 3);

        cache.put(3, "c");
        assert_eq!(cache.get(&3), Some(&"c"));
        assert_consistent(&cache);
    }

    #[test]
    fn test_string_keys_borrowed_lookup() {
        let mut cache: LruCache<String, u32> = LruCache::new(2).unwrap();
        cache.put("alpha".to_string(), 1);

        assert_eq!(cache.get("alpha"), Some(&1));
        assert!(cache.contains("alpha"));
        assert_eq!(cache.remove("alpha"), Some(1));
    }

    #[test]
    fn test_iter_order() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put(1, 'a');
        cache.put(2, 'b');
        cache.put(3, 'c');
        cache.get(&1);

        let entries: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, vec![(1, 'a'), (3, 'c'), (2, 'b')]);

        let keys: Vec<_> = (&cache).into_iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 3, 2]);
    }

    #[test]
    fn test_display() {
        let mut cache = LruCache::new(3).unwrap();
        assert_eq!(cache.to_string(), "Empty cache");

        cache.put(1, 1);
        cache.put(2, 2);
        cache.get(&1);
        assert_eq!(cache.to_string(), "(1: 1) -> (2: 2)");
    }

    #[test]
    fn test_stats_hits_and_misses() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);

        cache.get(&1);
        cache.get(&1);
        cache.get(&2);

        assert_eq!(cache.stats().hits(), 2);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.stats().hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_stats_disabled() {
        let config = CacheConfig::new(1).with_stats(false);
        let mut cache = LruCache::from_config(&config).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        cache.get(&2);
        cache.get(&1);

        assert_eq!(cache.stats().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_custom_hasher() {
        let hasher = std::collections::hash_map::RandomState::new();
        let mut cache = LruCache::with_hasher(2, hasher).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut cache = LruCache::new(usize::MAX).unwrap();
        cache.put(1, 1);
        assert_eq!(cache.get(&1), Some(&1));
    }

    /// Replays a pseudo-random workload against a naive most-recent-first
    /// `Vec` model.
    #[test]
    fn test_matches_naive_model() {
        let capacity = 5;
        let mut cache = LruCache::new(capacity).unwrap();
        let mut model: Vec<(u64, u64)> = Vec::new();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;

        for step in 0..2_000u64 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let key = seed % 9;

            if seed % 3 == 0 {
                let expected = model.iter().position(|(k, _)| *k == key).map(|pos| {
                    let entry = model.remove(pos);
                    model.insert(0, entry);
                    entry.1
                });
                assert_eq!(cache.get(&key).copied(), expected);
            } else {
                match model.iter().position(|(k, _)| *k == key) {
                    Some(pos) => {
                        model.remove(pos);
                    }
                    None if model.len() == capacity => {
                        model.pop();
                    }
                    None => {}
                }
                model.insert(0, (key, step));
                cache.put(key, step);
            }

            let actual: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
            assert_eq!(actual, model);
            assert_consistent(&cache);
        }
    }
}
