//! Single-threaded LRU core: hash index plus an index-linked recency list.
//!
//! `LruCore` keeps entries in a slot arena. Each slot carries `prev`/`next`
//! indices forming a doubly-linked list ordered by access recency (head is
//! most recently used, tail is least). The hash index maps keys to slot
//! indices, so every operation is O(1) apart from `clear`.
//!
//! Concurrency lives one level up in [`crate::BoundedCache`]; this core is
//! deliberately lock-free and `&mut`-based so it can be tested in isolation.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Sentinel slot index meaning "no neighbor".
const NIL: usize = usize::MAX;

struct Slot<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Fixed-capacity map with least-recently-used eviction.
///
/// `max_capacity` is fixed at construction and never grows; inserting a new
/// key at capacity evicts the current least-recently-used entry first, so
/// `len() <= capacity()` holds after every mutating operation.
pub struct LruCore<K, V> {
    /// Key to slot-index mapping.
    index: FxHashMap<K, usize>,
    /// Slot arena; `None` marks a vacant slot awaiting reuse.
    slots: Vec<Option<Slot<K, V>>>,
    /// Vacant slot indices available for reuse.
    free: Vec<usize>,
    /// Most-recently-used slot index, or `NIL` when empty.
    head: usize,
    /// Least-recently-used slot index, or `NIL` when empty.
    tail: usize,
    max_capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruCore<K, V> {
    /// Create a core bounded to `max_capacity` entries (clamped to >= 1).
    pub fn new(max_capacity: usize) -> Self {
        Self::with_capacity(0, max_capacity)
    }

    /// Create a core bounded to `max_capacity`, pre-reserving room for
    /// `initial_capacity` entries in the index and arena.
    pub fn with_capacity(initial_capacity: usize, max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(1);
        let initial_capacity = initial_capacity.min(max_capacity);
        let mut index = FxHashMap::default();
        index.reserve(initial_capacity);
        Self {
            index,
            slots: Vec::with_capacity(initial_capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            max_capacity,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no entries are live.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries this core will hold.
    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    /// Look up a value and promote its key to most-recently-used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    /// Look up a value without disturbing the recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    /// True when the key is present. Does not promote.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace, returning the previous value for the key.
    ///
    /// A replaced key is promoted. A new key at capacity evicts the
    /// least-recently-used entry before the insert.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            let slot = self.slots[idx].as_mut().expect("indexed slot is live");
            let previous = std::mem::replace(&mut slot.value, value);
            self.touch(idx);
            return Some(previous);
        }

        if self.len() >= self.max_capacity {
            log::trace!(
                "lru cache at capacity {}, evicting least-recently-used entry",
                self.max_capacity
            );
            self.pop_lru();
        }

        let idx = self.alloc(Slot {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        self.index.insert(key, idx);
        self.attach_front(idx);
        None
    }

    /// Remove one entry by key.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.detach(idx);
        let slot = self.slots[idx].take().expect("indexed slot is live");
        self.free.push(idx);
        Some(slot.value)
    }

    /// Remove and return the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail;
        if idx == NIL {
            return None;
        }
        self.detach(idx);
        let slot = self.slots[idx].take().expect("tail slot is live");
        self.index.remove(&slot.key);
        self.free.push(idx);
        Some((slot.key, slot.value))
    }

    /// Drop every entry and release the arena.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn alloc(&mut self, slot: Slot<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    /// Unlink a slot from the recency list. The slot itself stays live.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slots[idx].as_ref().expect("detached slot is live");
            (slot.prev, slot.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].as_mut().expect("prev slot is live").next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].as_mut().expect("next slot is live").prev = prev;
        }
    }

    /// Link a detached slot in at the most-recently-used position.
    fn attach_front(&mut self, idx: usize) {
        {
            let slot = self.slots[idx].as_mut().expect("attached slot is live");
            slot.prev = NIL;
            slot.next = self.head;
        }
        if self.head == NIL {
            self.tail = idx;
        } else {
            self.slots[self.head].as_mut().expect("head slot is live").prev = idx;
        }
        self.head = idx;
    }

    /// Promote a slot to most-recently-used.
    fn touch(&mut self, idx: usize) {
        if self.head != idx {
            self.detach(idx);
            self.attach_front(idx);
        }
    }
}
