//! In-memory TTL cache with optional capacity bound.
//!
//! Entries expire lazily on read. When a capacity is set, inserting past it
//! evicts the least recently inserted entry. Re-inserting an existing key
//! counts as a fresh insertion.

use std::hash::Hash;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when `now + ttl` is past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe keyed cache.
///
/// Insertion order is tracked by the backing `IndexMap`, so eviction of the
/// oldest entry is `shift_remove_index(0)`.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    entries: Mutex<IndexMap<K, CacheEntry<V>>>,
    capacity: Option<usize>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates a cache. `capacity` of `None` means unbounded.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity,
        }
    }

    /// Returns the value for `key` if present and not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.shift_remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key` for `ttl`.
    ///
    /// A zero `ttl` is a no-op: the entry would be expired on arrival.
    /// A `ttl` too large to represent never expires.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        if ttl.is_zero() || self.capacity == Some(0) {
            return;
        }

        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };

        let mut entries = self.entries.lock();
        entries.shift_remove(&key);
        entries.insert(key, entry);

        if let Some(capacity) = self.capacity {
            while entries.len() > capacity {
                entries.shift_remove_index(0);
            }
        }
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}
