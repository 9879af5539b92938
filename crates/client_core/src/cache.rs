//! Bounded, insertion-ordered request cache.
//!
//! Eviction is FIFO: reading an entry never refreshes it. The cache only saves
//! round trips; a miss always falls back to a live fetch.

use std::hash::Hash;

use indexmap::IndexMap;
use tracing::debug;

pub const DEFAULT_CACHE_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct QueryCache<K, V> {
    capacity: usize,
    entries: IndexMap<K, V>,
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Hash + Eq + std::fmt::Debug,
{
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + std::fmt::Debug,
{
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `value` as the most recently inserted entry, evicting the
    /// oldest entry first when the cache is full and `key` is new.
    pub fn insert(&mut self, key: K, value: V) {
        if self.entries.shift_remove(&key).is_none() && self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                debug!(?evicted, "evicted oldest cache entry");
            }
        }
        self.entries.insert(key, value);
        debug!(size = self.entries.len(), "cache entry stored");
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!(size = self.entries.len(), "invalidating cache");
        }
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}
