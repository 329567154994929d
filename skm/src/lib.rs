#![deny(missing_docs)]
//! # skm: sorted-key map
//!
//! An associative container that keeps its keys in ascending
//! lexicographic order and offers **both** keyed and positional access:
//!
//! - [`SortedKeyMap`]: the single-threaded container
//! - [`SyncSortedKeyMap`]: the same API behind a readers-writer lock
//!
//! Keys are `String`s; values are any `V`. Insertion maintains order, so
//! `add` is O(n) in the number of keys; keyed lookups are O(1) and
//! positional lookups are O(1) after the ordered key vector.
//!
//! ## Quick start
//!
//! ```rust
//! use skm::SortedKeyMap;
//!
//! let mut sm = SortedKeyMap::new();
//! assert!(sm.add("b", 2));
//! assert!(sm.add("a", 1));
//! assert!(!sm.add("a", 10)); // duplicate keys are rejected
//!
//! // Keys are kept sorted, independent of insertion order.
//! assert_eq!(sm.key(0), Some("a"));
//! assert_eq!(sm.key(1), Some("b"));
//! assert_eq!(sm.get_by_index(0), Some(&1));
//! assert_eq!(sm.index("b"), Some(1));
//! ```

mod sync;

pub use sync::SyncSortedKeyMap;

use std::collections::HashMap;

/// A map with a sorted set of keys.
///
/// Lookup by key goes through a `HashMap`; the ordering lives in a
/// separate key vector, so positional access (`key`, `get_by_index`,
/// `index`) and ordered iteration ([`SortedKeyMap::over`]) come for
/// free.
#[derive(Debug, Default, Clone)]
pub struct SortedKeyMap<V> {
    mm: HashMap<String, V>,
    kk: Vec<String>,
}

impl<V> SortedKeyMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            mm: HashMap::new(),
            kk: Vec::new(),
        }
    }

    /// Insert `value` under `key` at its ordered position.
    ///
    /// Returns `true` on insertion. If the key is already present the
    /// map is unchanged (the existing value is **not** replaced) and
    /// `false` is returned.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.mm.contains_key(&key) {
            return false;
        }
        let idx = match self.kk.binary_search(&key) {
            Ok(_) => return false,
            Err(idx) => idx,
        };
        self.kk.insert(idx, key.clone());
        self.mm.insert(key, value);
        true
    }

    /// Whether `idx` addresses an existing entry.
    pub fn exists_index(&self, idx: usize) -> bool {
        idx < self.kk.len()
    }

    /// Whether `key` is present.
    pub fn exists_key(&self, key: &str) -> bool {
        self.mm.contains_key(key)
    }

    /// The value at position `idx` in key order.
    pub fn get_by_index(&self, idx: usize) -> Option<&V> {
        self.mm.get(self.kk.get(idx)?)
    }

    /// The value stored under `key`.
    pub fn get_by_key(&self, key: &str) -> Option<&V> {
        self.mm.get(key)
    }

    /// The position of `key` in the sorted key order.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.kk.binary_search_by(|k| k.as_str().cmp(key)).ok()
    }

    /// The key at position `idx`.
    pub fn key(&self, idx: usize) -> Option<&str> {
        self.kk.get(idx).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.kk.len()
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.kk.is_empty()
    }

    /// Ordered iteration with early termination.
    ///
    /// Calls `f(index, key, value)` for each entry in key order.
    /// Iteration stops at the first call that returns `false`.
    pub fn over<F>(&self, mut f: F)
    where
        F: FnMut(usize, &str, &V) -> bool,
    {
        for (idx, key) in self.kk.iter().enumerate() {
            if !f(idx, key, &self.mm[key]) {
                break;
            }
        }
    }

    /// Empty the map.
    pub fn reset(&mut self) {
        self.mm.clear();
        self.kk.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keys deliberately out of order; values distinguish entries.
    const DATA: [(&str, i32); 5] = [("d", 20), ("a", 50), ("e", 10), ("b", 40), ("c", 30)];

    fn filled() -> SortedKeyMap<i32> {
        let mut sm = SortedKeyMap::new();
        for (k, v) in DATA {
            assert!(sm.add(k, v));
        }
        sm
    }

    fn sorted_data() -> Vec<(&'static str, i32)> {
        let mut data = DATA.to_vec();
        data.sort();
        data
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut sm = filled();
        for (k, v) in DATA {
            assert!(!sm.add(k, v));
        }
        assert_eq!(sm.len(), DATA.len());
    }

    #[test]
    fn keys_are_sorted_regardless_of_insertion_order() {
        let sm = filled();
        for (idx, (k, _)) in sorted_data().into_iter().enumerate() {
            assert_eq!(sm.key(idx), Some(k));
        }
    }

    #[test]
    fn exists_index_bounds() {
        let sm = filled();
        for idx in 0..DATA.len() {
            assert!(sm.exists_index(idx));
        }
        assert!(!sm.exists_index(DATA.len()));
    }

    #[test]
    fn exists_key_membership() {
        let sm = filled();
        for (k, _) in DATA {
            assert!(sm.exists_key(k));
        }
        assert!(!sm.exists_key("not found"));
    }

    #[test]
    fn get_by_index_follows_key_order() {
        let sm = filled();
        for (idx, (_, v)) in sorted_data().into_iter().enumerate() {
            assert_eq!(sm.get_by_index(idx), Some(&v));
        }
        assert_eq!(sm.get_by_index(DATA.len()), None);
    }

    #[test]
    fn get_by_key_lookup() {
        let sm = filled();
        for (k, v) in DATA {
            assert_eq!(sm.get_by_key(k), Some(&v));
        }
        assert_eq!(sm.get_by_key("not found"), None);
    }

    #[test]
    fn index_and_key_are_duals() {
        let sm = filled();
        for (idx, (k, _)) in sorted_data().into_iter().enumerate() {
            assert_eq!(sm.index(k), Some(idx));
            assert_eq!(sm.key(idx), Some(k));
        }
        assert_eq!(sm.index("not found"), None);
        assert_eq!(sm.key(DATA.len()), None);
    }

    #[test]
    fn len_counts_entries() {
        let sm = filled();
        assert_eq!(sm.len(), DATA.len());
        assert!(!sm.is_empty());
        assert!(SortedKeyMap::<i32>::new().is_empty());
    }

    #[test]
    fn over_visits_in_order() {
        let sm = filled();
        let expected = sorted_data();
        let mut seen = 0;
        sm.over(|idx, key, value| {
            assert_eq!(idx, seen);
            assert_eq!(key, expected[idx].0);
            assert_eq!(*value, expected[idx].1);
            seen += 1;
            true
        });
        assert_eq!(seen, DATA.len());
    }

    #[test]
    fn over_stops_on_false() {
        let sm = filled();
        let mut seen = 0;
        sm.over(|idx, _, _| {
            seen += 1;
            idx < 1
        });
        assert_eq!(seen, 2);
    }

    #[test]
    fn reset_empties_the_map() {
        let mut sm = filled();
        sm.reset();
        assert_eq!(sm.len(), 0);
        assert!(!sm.exists_key("a"));
        assert!(sm.add("a", 1));
    }
}
