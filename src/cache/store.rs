//! Cache Store Module
//!
//! Bounded key/value cache combining HashMap storage with insertion-order
//! eviction and max-age expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, InsertionOrder, SystemClock};

// == Cache ==
/// TTL- and size-bounded cache.
///
/// Entries older than `max_age` read as absent and are dropped on read.
/// Inserting while `len >= max_size` first evicts the earliest inserted key.
#[derive(Debug)]
pub struct Cache<V = serde_json::Value> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order tracker
    order: InsertionOrder,
    stats: CacheStats,
    max_age_ms: u64,
    max_size: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates a new Cache with the given max age and size, timed by the system clock.
    ///
    /// A `max_size` of zero is treated as one.
    pub fn new(max_age: Duration, max_size: usize) -> Self {
        Self::with_clock(max_age, max_size, Arc::new(SystemClock))
    }

    /// Creates a new Cache timed by the given clock.
    pub fn with_clock(max_age: Duration, max_size: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_age_ms: max_age.as_millis() as u64,
            max_size: max_size.max(1),
            clock,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` for absent keys. Expired entries are removed as a
    /// side effect and also read as `None`.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now, self.max_age_ms),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!(key, "cache entry expired");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, replacing any previous value for the key.
    ///
    /// If the cache holds `max_size` entries or more beforehand, exactly
    /// one entry is evicted first: the earliest inserted one. The written
    /// key moves to the back of the insertion order.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if self.entries.len() >= self.max_size {
            if let Some(evicted) = self.order.pop_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "cache entry evicted");
            }
        }

        let entry = CacheEntry::new(value, self.clock.now_ms());
        self.entries.insert(key.clone(), entry);
        self.order.record(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_invalidation();
        }
        removed
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.max_age_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Checks for a key without touching stats or expiring it.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
            true
        } else {
            false
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn manual_cache(max_age_ms: u64, max_size: usize) -> (Cache<i32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(10_000));
        let cache = Cache::with_clock(Duration::from_millis(max_age_ms), max_size, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_new() {
        let cache: Cache<i32> = Cache::new(Duration::from_secs(60), 10);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_set_and_get() {
        let (mut cache, _) = manual_cache(100, 10);

        cache.set("key1", 1);

        assert_eq!(cache.get("key1"), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let (mut cache, _) = manual_cache(100, 10);
        assert_eq!(cache.get("nonexistent"), None);
    }

    #[test]
    fn test_delete() {
        let (mut cache, _) = manual_cache(100, 10);

        cache.set("key1", 1);

        assert!(cache.delete("key1"));
        assert!(!cache.delete("key1"));
        assert!(cache.is_empty());
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_clear() {
        let (mut cache, _) = manual_cache(100, 10);
        cache.set("a", 1);
        cache.set("b", 2);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_overwrite() {
        let (mut cache, _) = manual_cache(100, 10);

        cache.set("key1", 1);
        cache.set("key1", 2);

        assert_eq!(cache.get("key1"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiration() {
        let (mut cache, clock) = manual_cache(100, 10);

        cache.set("key1", 1);

        clock.advance(Duration::from_millis(100));
        assert_eq!(cache.get("key1"), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("key1"), None);
        assert!(!cache.contains("key1"));
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_overwrite_refreshes_age() {
        let (mut cache, clock) = manual_cache(100, 10);

        cache.set("key1", 1);
        clock.advance(Duration::from_millis(80));
        cache.set("key1", 2);
        clock.advance(Duration::from_millis(80));

        assert_eq!(cache.get("key1"), Some(2));
    }

    #[test]
    fn test_insertion_order_eviction() {
        let (mut cache, _) = manual_cache(100, 2);

        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reads_do_not_reorder() {
        let (mut cache, _) = manual_cache(100, 3);

        cache.set("key1", 1);
        cache.set("key2", 2);
        cache.set("key3", 3);

        // Reading key1 does not protect it from eviction
        cache.get("key1");
        cache.set("key4", 4);

        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.get("key2"), Some(2));
    }

    #[test]
    fn test_reinsert_moves_key_to_back() {
        let (mut cache, _) = manual_cache(100, 3);

        cache.set("key1", 1);
        cache.set("key2", 2);
        cache.set("key3", 3);

        // Full cache: the overwrite itself evicts the oldest (key1) and re-inserts key2 last
        cache.set("key2", 20);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("key1"), None);

        cache.set("key4", 4);
        cache.set("key5", 5);

        // key3 is now the earliest inserted
        assert_eq!(cache.get("key3"), None);
        assert_eq!(cache.get("key2"), Some(20));
    }

    #[test]
    fn test_zero_max_size_holds_one_entry() {
        let (mut cache, _) = manual_cache(100, 0);

        cache.set("a", 1);
        cache.set("b", 2);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_stats() {
        let (mut cache, _) = manual_cache(100, 10);

        cache.set("key1", 1);
        cache.get("key1"); // hit
        cache.get("nonexistent"); // miss
        cache.delete("key1");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_purge_expired() {
        let (mut cache, clock) = manual_cache(100, 10);

        cache.set("key1", 1);
        clock.advance(Duration::from_millis(60));
        cache.set("key2", 2);
        clock.advance(Duration::from_millis(60));

        let removed = cache.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key2"), Some(2));
    }

    #[test]
    fn test_expired_entry_is_fresh_insert_after_reset() {
        let (mut cache, clock) = manual_cache(100, 2);

        cache.set("a", 1);
        clock.advance(Duration::from_millis(150));
        assert_eq!(cache.get("a"), None);

        cache.set("b", 2);
        cache.set("a", 3);

        // "a" was dropped on read, so the new "a" is the latest insertion
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get("a"), Some(3));
    }
}
