use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use std::time::Instant;

/// bounded read-through cache with per-entry expiry. eviction drops the
/// stalest entry when the bound is hit; a periodic sweep clears expired
/// entries wholesale. callers wrap it in their own lock.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    capacity: usize,
    entries: HashMap<K, Entry<V>>,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored: Instant,
    expires: Instant,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: HashMap::new() }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires > Instant::now())
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_stalest();
        }
        self.entries.insert(key, Entry { value, stored: now, expires: now + ttl });
    }

    /// drop expired entries; returns how many were removed
    pub fn sweep(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_stalest(&mut self) {
        if let Some(stalest) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&stalest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_entries_are_invisible() {
        let mut cache = TtlCache::new(8);
        cache.insert("key", 1, Duration::from_secs(0));
        assert_eq!(cache.get(&"key"), None);
        cache.insert("key", 2, Duration::from_secs(60));
        assert_eq!(cache.get(&"key"), Some(2));
    }

    #[test]
    fn capacity_evicts_the_stalest() {
        let mut cache = TtlCache::new(2);
        cache.insert("a", 1, Duration::from_secs(60));
        cache.insert("b", 2, Duration::from_secs(60));
        cache.insert("c", 3, Duration::from_secs(60));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn sweep_reports_removals() {
        let mut cache = TtlCache::new(8);
        cache.insert("a", 1, Duration::from_secs(0));
        cache.insert("b", 2, Duration::from_secs(60));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reinserting_a_full_cache_does_not_evict() {
        let mut cache = TtlCache::new(2);
        cache.insert("a", 1, Duration::from_secs(60));
        cache.insert("b", 2, Duration::from_secs(60));
        cache.insert("a", 3, Duration::from_secs(60));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(3));
        assert_eq!(cache.get(&"b"), Some(2));
    }
}
