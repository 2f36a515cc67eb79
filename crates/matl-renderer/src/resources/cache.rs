//! Bounded least-recently-used cache for GPU objects keyed by their settings.

use std::collections::HashMap;
use std::hash::Hash;

/// Keeps at most `capacity` values; inserting into a full cache drops the one
/// used least recently.
pub struct BoundedCache<K, V> {
    entries: HashMap<K, (V, u64)>,
    capacity: usize,
    tick: u64,
}

impl<K: Eq + Hash + Copy, V> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    /// Value for `key`, created with `create` on a miss.
    pub fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> V) -> &V {
        self.tick += 1;
        let tick = self.tick;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }

        let entry = self.entries.entry(key).or_insert_with(|| (create(), tick));
        entry.1 = tick;
        &entry.0
    }

    fn evict_least_recent(&mut self) -> Option<V> {
        let key = self
            .entries
            .iter()
            .min_by_key(|(_, (_, used))| *used)
            .map(|(key, _)| *key)?;
        self.entries.remove(&key).map(|(value, _)| value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
