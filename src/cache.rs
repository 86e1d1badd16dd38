//! Advisory hot cache for repeated queries (spec §10, ambient stack).
//!
//! Strictly a performance shortcut: a miss falls through to the normal
//! retrieval path and never changes final ordering (spec §11, "Hot caches").

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Thread-safe, fixed-capacity LRU cache keyed by anything hashable.
///
/// Used to memoize recent `(query, repo, snapshot)` fusion outcomes so a
/// repeated query does not re-run classification and fan-out.
pub struct HotCache<K, V> {
    cache: Mutex<LruCache<K, V>>,
}

impl<K, V> HotCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Builds a cache with the given capacity, clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1 above");
        Self { cache: Mutex::new(LruCache::new(cap)) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.cache.lock().unwrap().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}
