//! Capacity-bounded LRU cache.
//!
//! Keys live in an [`OpenTable`] mapping to node indices; recency is an
//! index-linked list over a node arena with two sentinel nodes (head is the
//! most-recently-used end, tail the least). Evicted nodes go on a free list
//! and are reused by later inserts.

use crate::error::SearchError;
use crate::table::OpenTable;
use serde::Serialize;

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
struct Node<V> {
    key: String,
    /// `None` for the sentinels and for nodes on the free list.
    value: Option<V>,
    hits: u64,
    prev: usize,
    next: usize,
}

impl<V> Node<V> {
    fn sentinel() -> Self { Self { key: String::new(), value: None, hits: 0, prev: HEAD, next: TAIL } }
}

/// Snapshot of cache counters. Counters are cumulative across [`LruCache::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_queries: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub replacements: u64,
    pub insertions: u64,
    pub size: usize,
    pub capacity: usize,
}

#[derive(Debug)]
pub struct LruCache<V> {
    table: OpenTable<usize>,
    nodes: Vec<Node<V>>,
    free: Vec<usize>,
    capacity: usize,
    size: usize,
    hits: u64,
    misses: u64,
    replacements: u64,
    insertions: u64,
}

impl<V> LruCache<V> {
    /// Creates an empty cache holding at most `capacity` entries. A capacity of 0 is rejected.
    pub fn new(capacity: usize) -> Result<Self, SearchError> {
        if capacity == 0 {
            return Err(SearchError::ZeroCapacity);
        }
        Ok(Self {
            table: OpenTable::with_slots(capacity),
            nodes: vec![Node::sentinel(), Node::sentinel()],
            free: Vec::new(),
            capacity,
            size: 0,
            hits: 0,
            misses: 0,
            replacements: 0,
            insertions: 0,
        })
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn push_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn move_to_front(&mut self, idx: usize) {
        self.unlink(idx);
        self.push_front(idx);
    }

    /// Drops the least-recently-used entry. Returns `false` when the cache is empty.
    fn evict_last(&mut self) -> bool {
        let last = self.nodes[TAIL].prev;
        if last == HEAD {
            return false;
        }
        self.unlink(last);
        let key = std::mem::take(&mut self.nodes[last].key);
        self.table.remove(&key);
        self.nodes[last].value = None;
        self.nodes[last].hits = 0;
        self.free.push(last);
        self.size -= 1;
        self.replacements += 1;
        tracing::debug!(key = %key, "cache eviction");
        true
    }

    /// Looks up `key`, counting a hit or miss. A hit makes the entry the most recently used.
    ///
    /// The cache keeps ownership of the value; clone it to keep it past the next mutation.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let Some(&idx) = self.table.search(key) else {
            self.misses += 1;
            return None;
        };
        self.hits += 1;
        self.nodes[idx].hits += 1;
        self.move_to_front(idx);
        self.nodes[idx].value.as_ref()
    }

    /// Stores `value` under `key` as the most-recently-used entry, evicting the
    /// least-recently-used entry first when a new key arrives at a full cache.
    pub fn put(&mut self, key: String, value: V) {
        if let Some(&idx) = self.table.search(&key) {
            self.nodes[idx].value = Some(value);
            self.move_to_front(idx);
            return;
        }
        if self.size >= self.capacity {
            self.evict_last();
        }
        let node = Node { key: key.clone(), value: Some(value), hits: 0, prev: HEAD, next: TAIL };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.push_front(idx);
        self.table.insert(key, idx);
        self.size += 1;
        self.insertions += 1;
        debug_assert_eq!(self.size, self.table.len());
    }

    /// Changes the bound, evicting least-recently-used entries until the cache fits.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), SearchError> {
        if capacity == 0 {
            return Err(SearchError::ZeroCapacity);
        }
        self.capacity = capacity;
        while self.size > self.capacity && self.evict_last() {}
        Ok(())
    }

    /// Drops every entry. Hit, miss, replacement and insertion counters are kept.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free.clear();
        self.table.clear();
        self.size = 0;
    }

    pub fn contains(&self, key: &str) -> bool { self.table.contains(key) }

    pub fn len(&self) -> usize { self.size }
    pub fn is_empty(&self) -> bool { self.size == 0 }
    pub fn is_full(&self) -> bool { self.size >= self.capacity }
    pub fn capacity(&self) -> usize { self.capacity }

    pub fn hits(&self) -> u64 { self.hits }
    pub fn misses(&self) -> u64 { self.misses }
    pub fn total_queries(&self) -> u64 { self.hits + self.misses }
    pub fn replacements(&self) -> u64 { self.replacements }
    pub fn insertions(&self) -> u64 { self.insertions }

    pub fn hit_rate(&self) -> f64 {
        match self.total_queries() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn miss_rate(&self) -> f64 {
        match self.total_queries() {
            0 => 0.0,
            total => self.misses as f64 / total as f64,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            total_queries: self.total_queries(),
            hit_rate: self.hit_rate(),
            miss_rate: self.miss_rate(),
            replacements: self.replacements,
            insertions: self.insertions,
            size: self.size,
            capacity: self.capacity,
        }
    }

    /// Entries from most- to least-recently-used as `(key, value, hits)`.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { cache: self, cursor: self.nodes[HEAD].next }
    }
}

pub struct Iter<'a, V> {
    cache: &'a LruCache<V>,
    cursor: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let node = &self.cache.nodes[self.cursor];
        self.cursor = node.next;
        let value = node.value.as_ref()?;
        Some((node.key.as_str(), value, node.hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(cache: &LruCache<V>) -> Vec<String> {
        cache.iter().map(|(k, _, _)| k.to_string()).collect()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(LruCache::<u32>::new(0).unwrap_err(), SearchError::ZeroCapacity);
        let mut c = LruCache::<u32>::new(1).unwrap();
        assert_eq!(c.set_capacity(0), Err(SearchError::ZeroCapacity));
        assert_eq!(c.capacity(), 1);
    }

    #[test]
    fn get_on_empty_cache_is_a_miss() {
        let mut c = LruCache::<u32>::new(3).unwrap();
        assert!(c.get("nothing").is_none());
        assert_eq!(c.misses(), 1);
        assert_eq!(c.hits(), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn accessed_key_survives_eviction() {
        let mut c = LruCache::new(2).unwrap();
        c.put("a".to_string(), 1);
        c.put("b".to_string(), 2);
        assert_eq!(c.get("a"), Some(&1));
        c.put("c".to_string(), 3);
        assert!(c.get("b").is_none());
        assert_eq!(c.get("a"), Some(&1));
        assert_eq!(c.get("c"), Some(&3));
        assert_eq!(c.replacements(), 1);
        assert_eq!(c.insertions(), 3);
    }

    #[test]
    fn first_key_evicted_after_capacity_plus_one_puts() {
        let cap = 5;
        let mut c = LruCache::new(cap).unwrap();
        for i in 0..=cap {
            c.put(format!("k{i}"), i);
            assert!(c.len() <= cap);
        }
        assert!(!c.contains("k0"));
        assert!(c.get("k0").is_none());
        assert_eq!(c.len(), cap);
        assert!(c.is_full());
    }

    #[test]
    fn hit_moves_entry_to_front() {
        let mut c = LruCache::new(3).unwrap();
        c.put("x".to_string(), 'x');
        c.put("y".to_string(), 'y');
        c.put("z".to_string(), 'z');
        assert_eq!(keys(&c), vec!["z", "y", "x"]);
        c.get("x");
        assert_eq!(keys(&c), vec!["x", "z", "y"]);
        let (_, _, hits) = c.iter().next().unwrap();
        assert_eq!(hits, 1);
    }

    #[test]
    fn put_existing_key_replaces_without_replacement_count() {
        let mut c = LruCache::new(2).unwrap();
        c.put("a".to_string(), vec![1]);
        c.put("b".to_string(), vec![2]);
        c.put("a".to_string(), vec![3, 4]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.replacements(), 0);
        assert_eq!(c.insertions(), 2);
        assert_eq!(keys(&c), vec!["a", "b"]);
        assert_eq!(c.get("a"), Some(&vec![3, 4]));
    }

    #[test]
    fn shrinking_capacity_evicts_least_recent() {
        let mut c = LruCache::new(4).unwrap();
        for k in ["a", "b", "c", "d"] {
            c.put(k.to_string(), ());
        }
        c.set_capacity(2).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.replacements(), 2);
        assert_eq!(keys(&c), vec!["d", "c"]);
        c.set_capacity(10).unwrap();
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn clear_keeps_counters() {
        let mut c = LruCache::new(2).unwrap();
        c.put("a".to_string(), 1);
        c.get("a");
        c.get("b");
        c.clear();
        assert!(c.is_empty());
        assert!(c.get("a").is_none());
        assert_eq!(c.hits(), 1);
        assert_eq!(c.misses(), 2);
        assert_eq!(c.insertions(), 1);
        c.put("c".to_string(), 3);
        assert_eq!(keys(&c), vec!["c"]);
    }

    #[test]
    fn rates_sum_to_one() {
        let mut c = LruCache::new(2).unwrap();
        let empty = c.stats();
        assert_eq!(empty.hit_rate, 0.0);
        assert_eq!(empty.miss_rate, 0.0);
        c.put("a".to_string(), 1);
        c.get("a");
        c.get("a");
        c.get("z");
        let stats = c.stats();
        assert_eq!(stats.hits + stats.misses, stats.total_queries);
        assert!((stats.hit_rate + stats.miss_rate - 1.0).abs() < 1e-12);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn evicted_slots_are_reused() {
        let mut c = LruCache::new(2).unwrap();
        for i in 0..100 {
            c.put(format!("q{i}"), i);
        }
        // two sentinels plus two live nodes
        assert_eq!(c.nodes.len(), 4);
        assert_eq!(keys(&c), vec!["q99", "q98"]);
        assert_eq!(c.replacements(), 98);
    }
}
