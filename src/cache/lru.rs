use std::collections::HashMap;
use std::hash::Hash;

/// Least-recently-used map
///
/// Every `get`/`insert` stamps the entry; inserting past capacity evicts the
/// oldest stamp. Eviction is a linear scan, fine for the few dozen entries a
/// session touches.
#[derive(Debug)]
pub struct LruMap<K, V> {
    capacity: usize,
    clock: u64,
    entries: HashMap<K, (V, u64)>,
}

impl<K: Eq + Hash + Clone, V> LruMap<K, V> {
    /// `capacity` of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            clock: 0,
            entries: HashMap::new(),
        }
    }

    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stamp = self.next_stamp();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.1 = stamp;
                Some(&entry.0)
            }
            None => None,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or overwrites; returns the evicted key, if any
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        let stamp = self.next_stamp();
        if let Some(entry) = self.entries.get_mut(&key) {
            *entry = (value, stamp);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, stamp))| *stamp)
                .map(|(k, _)| k.clone());
            if let Some(k) = &oldest {
                self.entries.remove(k);
            }
            oldest
        } else {
            None
        };

        self.entries.insert(key, (value, stamp));
        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(v, _)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut map = LruMap::new(2);
        map.insert("a", 1);
        map.insert("b", 2);
        // touch "a" so "b" becomes the oldest
        assert_eq!(map.get(&"a"), Some(&1));

        let evicted = map.insert("c", 3);

        assert_eq!(evicted, Some("b"));
        assert!(map.contains(&"a"));
        assert!(map.contains(&"c"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn overwrite_does_not_evict() {
        let mut map = LruMap::new(1);
        map.insert("a", 1);
        assert_eq!(map.insert("a", 2), None);
        assert_eq!(map.get(&"a"), Some(&2));
    }
}
