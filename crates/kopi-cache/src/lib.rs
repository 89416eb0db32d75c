//! Bounded, concurrency-safe LRU cache.
//!
//! [`BoundedCache`] is a fixed-capacity map that evicts the
//! least-recently-used entry when a new key would exceed capacity. It is the
//! storage behind kopi's per-type metadata caches, but carries no kopi
//! types of its own: keys and values are generic.
//!
//! # Concurrency
//!
//! All operations are `&self` and serialize behind one coarse
//! `parking_lot::Mutex`, `get` included, because a lookup promotes its key
//! and therefore rewrites the recency list. Compute callbacks
//! ([`BoundedCache::get_or_insert_with`] and the fallible variant) run
//! **outside** the lock, so the cache never calls back into caller code
//! while holding it. The tradeoff is documented on those methods: two
//! racing misses for the same key may both evaluate the callback, and the
//! first stored value wins.
//!
//! # Hits are advisory
//!
//! An entry can be evicted by unrelated traffic between two uses. Callers
//! must own a recompute path rather than assume a previous `put` is still
//! resident; `get_or_insert_with` is that path.

mod lru;

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

pub use lru::LruCore;

/// Fixed-capacity, access-ordered cache with interior locking.
///
/// Values must be `Clone`: lookups hand back owned values so no lock is
/// held across caller code. Callers caching anything non-trivial wrap it in
/// `Arc` to make that clone cheap.
pub struct BoundedCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    /// Create a cache bounded to `max_capacity` entries (clamped to >= 1).
    pub fn new(max_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(max_capacity)),
        }
    }

    /// Create a cache bounded to `max_capacity`, pre-reserving
    /// `initial_capacity` slots.
    pub fn with_capacity(initial_capacity: usize, max_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::with_capacity(initial_capacity, max_capacity)),
        }
    }

    /// Look up a value, promoting its key to most-recently-used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    /// Look up a value without disturbing the recency order.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }

    /// True when the key is present. Does not promote.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Insert or replace, returning the previous value for the key.
    ///
    /// Inserting a new key at capacity evicts the least-recently-used entry
    /// first; the key ends up most-recently-used either way.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Return the existing value for the key, or insert `value` and return
    /// it.
    ///
    /// The check-and-insert is atomic under the cache lock. A hit promotes
    /// the key like [`BoundedCache::get`].
    pub fn put_if_absent(&self, key: K, value: V) -> V {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.get(&key) {
            return existing.clone();
        }
        inner.insert(key, value.clone());
        value
    }

    /// Return the cached value for the key, computing and storing it on a
    /// miss.
    ///
    /// `compute` runs outside the cache lock, so two callers racing on the
    /// same missing key may both evaluate it; the first stored value wins
    /// and both callers converge on whatever the cache retained. Compute
    /// functions must therefore be idempotent; that holds for the pure
    /// introspection work this cache exists for.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let fresh = compute();
        self.put_if_absent(key, fresh)
    }

    /// Fallible form of [`BoundedCache::get_or_insert_with`].
    ///
    /// An `Err` from `compute` propagates to the caller and is never
    /// cached, so a failed computation is retried on the next call.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let fresh = compute()?;
        Ok(self.put_if_absent(key, fresh))
    }

    /// Remove one entry by key, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True when no entries are live.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of entries this cache will hold.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

impl<K: Eq + Hash + Clone, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedCache")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .finish()
    }
}
