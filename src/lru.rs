use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Bounded map evicting the least recently used entry.
///
/// Every `get` hit and every `put` stamps the entry with a fresh tick; the smallest tick
/// is the eviction victim.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Returns a clone of the value and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.next_tick();
        let (value, stamp) = self.entries.get_mut(key)?;
        let old = std::mem::replace(stamp, tick);
        let value = value.clone();
        if let Some(owner) = self.order.remove(&old) {
            self.order.insert(tick, owner);
        }
        Some(value)
    }

    /// Inserts or replaces. Returns the evicted key when a new key pushed the cache over
    /// capacity.
    pub fn put(&mut self, key: K, value: V) -> Option<K> {
        let tick = self.next_tick();

        if let Some((slot, stamp)) = self.entries.get_mut(&key) {
            *slot = value;
            let old = std::mem::replace(stamp, tick);
            self.order.remove(&old);
            self.order.insert(tick, key);
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        self.entries.insert(key.clone(), (value, tick));
        self.order.insert(tick, key);
        evicted
    }
}
