//! String-keyed open-addressing hash table with linear probing and
//! tombstone deletion. Backs the LRU cache's key lookup.

const DEFAULT_SLOTS: usize = 53;
const HASH_SEED: u64 = 5381;
const HASH_BASE: u64 = 33;

#[derive(Debug, Clone)]
enum Slot<V> {
    Empty,
    Occupied { key: String, value: V },
    /// Deleted entry. Probe chains walk through it; inserts may reuse it.
    Tombstone,
}

#[derive(Debug, Clone)]
pub struct OpenTable<V> {
    slots: Vec<Slot<V>>,
    len: usize,
}

impl<V> Default for OpenTable<V> {
    fn default() -> Self { Self::with_slots(DEFAULT_SLOTS) }
}

impl<V> OpenTable<V> {
    pub fn new() -> Self { Self::default() }

    pub fn with_slots(slots: usize) -> Self {
        let slots = slots.max(1);
        Self { slots: (0..slots).map(|_| Slot::Empty).collect(), len: 0 }
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Number of slots currently allocated.
    pub fn slot_count(&self) -> usize { self.slots.len() }

    fn home(&self, key: &str) -> usize {
        let mut h = HASH_SEED;
        for b in key.bytes() {
            h = h.wrapping_mul(HASH_BASE).wrapping_add(b as u64);
        }
        (h % self.slots.len() as u64) as usize
    }

    /// Inserts `value` under `key`, replacing the previous value if the key is present.
    /// Grows to twice the slot count once the table is 70% full.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        let n = self.slots.len();
        let start = self.home(&key);
        let mut idx = start;
        let mut reusable: Option<usize> = None;
        loop {
            match &mut self.slots[idx] {
                Slot::Occupied { key: k, value: v } if *k == key => {
                    return Some(std::mem::replace(v, value));
                }
                Slot::Occupied { .. } => {}
                Slot::Tombstone => {
                    reusable.get_or_insert(idx);
                }
                Slot::Empty => {
                    reusable.get_or_insert(idx);
                    break;
                }
            }
            idx = (idx + 1) % n;
            if idx == start {
                break;
            }
        }
        // only a new key can push the load past the limit
        match reusable {
            Some(target) if self.len * 10 < n * 7 => {
                self.slots[target] = Slot::Occupied { key, value };
                self.len += 1;
                debug_assert!(self.len <= self.slots.len());
                None
            }
            _ => {
                self.grow();
                self.insert(key, value)
            }
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        let n = self.slots.len();
        let start = self.home(key);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied { key: k, .. } if k == key => return Some(idx),
                _ => {}
            }
            idx = (idx + 1) % n;
            if idx == start {
                return None;
            }
        }
    }

    pub fn search(&self, key: &str) -> Option<&V> {
        let idx = self.position(key)?;
        match &self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn search_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.position(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool { self.position(key).is_some() }

    /// Marks the key's slot as a tombstone and hands back its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.position(key)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied { value, .. } => {
                self.len -= 1;
                Some(value)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
    }

    /// Doubles the slot count and reinserts live entries; tombstones are dropped.
    fn grow(&mut self) {
        let new_len = self.slots.len() * 2;
        let old = std::mem::replace(&mut self.slots, (0..new_len).map(|_| Slot::Empty).collect());
        self.len = 0;
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                let start = self.home(&key);
                let mut idx = start;
                while matches!(self.slots[idx], Slot::Occupied { .. }) {
                    idx = (idx + 1) % new_len;
                }
                self.slots[idx] = Slot::Occupied { key, value };
                self.len += 1;
            }
        }
        tracing::trace!(slots = new_len, len = self.len, "hash table grown");
    }

    #[cfg(test)]
    fn live_slots(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Occupied { .. })).count()
    }

    #[cfg(test)]
    fn tombstones(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Tombstone)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_search() {
        let mut t = OpenTable::new();
        assert!(t.is_empty());
        t.insert("rust".to_string(), 1);
        t.insert("cache".to_string(), 2);
        assert_eq!(t.search("rust"), Some(&1));
        assert_eq!(t.search("cache"), Some(&2));
        assert_eq!(t.search("graph"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn insert_existing_key_replaces_value() {
        let mut t = OpenTable::new();
        assert_eq!(t.insert("k".to_string(), 1), None);
        assert_eq!(t.insert("k".to_string(), 7), Some(1));
        assert_eq!(t.search("k"), Some(&7));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn remove_leaves_probe_chain_intact() {
        let mut t = OpenTable::with_slots(16);
        let keys: Vec<String> = (0..8).map(|i| format!("key{i}")).collect();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k.clone(), i);
        }
        assert_eq!(t.remove("key3"), Some(3));
        assert_eq!(t.search("key3"), None);
        assert_eq!(t.remove("key3"), None);
        for (i, k) in keys.iter().enumerate().filter(|(i, _)| *i != 3) {
            assert_eq!(t.search(k), Some(&i), "lost {k} after removing a neighbour");
        }
        assert_eq!(t.len(), 7);
        assert_eq!(t.len(), t.live_slots());
    }

    #[test]
    fn tombstone_is_reused_without_duplicating_keys() {
        let mut t = OpenTable::with_slots(8);
        t.insert("a".to_string(), 1);
        t.insert("b".to_string(), 2);
        t.remove("a");
        assert_eq!(t.tombstones(), 1);
        t.insert("b".to_string(), 3);
        assert_eq!(t.len(), 1);
        assert_eq!(t.live_slots(), 1);
        assert_eq!(t.search("b"), Some(&3));
        t.insert("a".to_string(), 4);
        assert_eq!(t.search("a"), Some(&4));
        assert_eq!(t.len(), t.live_slots());
    }

    #[test]
    fn grows_at_seventy_percent_and_drops_tombstones() {
        let mut t = OpenTable::with_slots(10);
        for i in 0..7 {
            t.insert(format!("k{i}"), i);
        }
        assert_eq!(t.slot_count(), 10);
        t.remove("k0");
        assert_eq!(t.tombstones(), 1);
        t.insert("k7".to_string(), 7);
        t.insert("k8".to_string(), 8);
        assert_eq!(t.slot_count(), 20);
        assert_eq!(t.tombstones(), 0);
        for i in 1..9 {
            assert_eq!(t.search(&format!("k{i}")), Some(&i));
        }
        assert_eq!(t.len(), 8);
    }

    #[test]
    fn replacing_a_value_never_grows() {
        let mut t = OpenTable::with_slots(10);
        for i in 0..7 {
            t.insert(format!("k{i}"), i);
        }
        for i in 0..7 {
            assert_eq!(t.insert(format!("k{i}"), i * 10), Some(i));
        }
        assert_eq!(t.slot_count(), 10);
        assert_eq!(t.len(), 7);
        assert_eq!(t.search("k3"), Some(&30));
        t.insert("k7".to_string(), 70);
        assert_eq!(t.slot_count(), 20);
    }

    #[test]
    fn single_slot_table_still_accepts_inserts() {
        let mut t = OpenTable::with_slots(1);
        t.insert("x".to_string(), 1);
        t.insert("y".to_string(), 2);
        t.insert("z".to_string(), 3);
        assert_eq!(t.len(), 3);
        assert_eq!(t.search("x"), Some(&1));
        assert_eq!(t.search("z"), Some(&3));
    }

    #[test]
    fn churn_keeps_size_consistent() {
        let mut t = OpenTable::with_slots(4);
        for round in 0..50 {
            let k = format!("q{}", round % 13);
            if round % 3 == 0 {
                t.remove(&k);
            } else {
                t.insert(k, round);
            }
            assert_eq!(t.len(), t.live_slots());
        }
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.search("q1"), None);
    }
}
