//! Bounded in-memory cache with per-entry expiry.
//!
//! Owned by whoever needs it (the search controller, the gateway state)
//! and passed by reference; there is no process-wide instance.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_used: u64,
}

/// LRU cache whose entries expire a fixed time after insertion
pub struct TtlLruCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    capacity: usize,
    ttl: Duration,
    tick: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlLruCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            ttl,
            tick: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Look up `key` as of `now`, dropping it if it has expired
    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now.duration_since(entry.inserted_at) >= self.ttl,
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.value.clone()
        })
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now())
    }

    /// Insert as of `now`, evicting the least recently used entry when full
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_one(now);
        }

        self.tick += 1;
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
                last_used: self.tick,
            },
        );
    }

    /// Remove a single entry
    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Expired entries go first; otherwise the least recently used one.
    fn evict_one(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < ttl);
        if self.entries.len() < self.capacity {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_within_ttl() {
        let mut cache = TtlLruCache::new(4, Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("bench", 1, now);

        assert_eq!(cache.get_at(&"bench", now + Duration::from_secs(59)), Some(1));
        assert_eq!(cache.get_at(&"squat", now), None);
    }

    #[test]
    fn test_expired_entry_removed() {
        let mut cache = TtlLruCache::new(4, Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("bench", 1, now);

        assert_eq!(cache.get_at(&"bench", now + Duration::from_secs(60)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_least_recently_used_evicted() {
        let mut cache = TtlLruCache::new(2, Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("a", 1, now);
        cache.insert_at("b", 2, now);

        // Touch "a" so "b" becomes the eviction candidate
        assert_eq!(cache.get_at(&"a", now), Some(1));
        cache.insert_at("c", 3, now);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&"b", now), None);
        assert_eq!(cache.get_at(&"a", now), Some(1));
        assert_eq!(cache.get_at(&"c", now), Some(3));
    }

    #[test]
    fn test_expired_entries_evicted_before_live_ones() {
        let mut cache = TtlLruCache::new(2, Duration::from_secs(10));
        let start = Instant::now();
        cache.insert_at("old", 1, start);
        let later = start + Duration::from_secs(5);
        cache.insert_at("fresh", 2, later);

        let after = start + Duration::from_secs(11);
        assert_eq!(cache.get_at(&"fresh", after), Some(2));
        cache.insert_at("new", 3, after);
        assert_eq!(cache.get_at(&"fresh", after), Some(2));
        assert_eq!(cache.get_at(&"new", after), Some(3));
    }

    #[test]
    fn test_reinsert_does_not_evict() {
        let mut cache = TtlLruCache::new(1, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.invalidate(&"a"), Some(2));
        assert!(cache.is_empty());
    }
}
