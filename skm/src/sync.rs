//! Thread-safe wrapper around [`SortedKeyMap`].

use std::sync::RwLock;

use crate::SortedKeyMap;

/// A [`SortedKeyMap`] behind a readers-writer lock.
///
/// Reads take the shared lock, writes (`add`, `reset`) the exclusive
/// one. Value-returning reads hand out clones, since a reference cannot
/// outlive the lock guard; keep values cheap to clone or wrap them in an
/// `Arc`.
#[derive(Debug, Default)]
pub struct SyncSortedKeyMap<V> {
    inner: RwLock<SortedKeyMap<V>>,
}

impl<V> SyncSortedKeyMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SortedKeyMap::new()),
        }
    }

    /// Insert `value` under `key`; `false` if the key already exists.
    pub fn add(&self, key: impl Into<String>, value: V) -> bool {
        self.inner.write().expect("skm lock poisoned").add(key, value)
    }

    /// Whether `idx` addresses an existing entry.
    pub fn exists_index(&self, idx: usize) -> bool {
        self.read().exists_index(idx)
    }

    /// Whether `key` is present.
    pub fn exists_key(&self, key: &str) -> bool {
        self.read().exists_key(key)
    }

    /// The position of `key` in the sorted key order.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.read().index(key)
    }

    /// The key at position `idx`.
    pub fn key(&self, idx: usize) -> Option<String> {
        self.read().key(idx).map(str::to_owned)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Ordered iteration with early termination, under the shared lock.
    ///
    /// The lock is held for the whole walk; keep `f` short.
    pub fn over<F>(&self, f: F)
    where
        F: FnMut(usize, &str, &V) -> bool,
    {
        self.read().over(f)
    }

    /// Empty the map.
    pub fn reset(&self) {
        self.inner.write().expect("skm lock poisoned").reset()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SortedKeyMap<V>> {
        self.inner.read().expect("skm lock poisoned")
    }
}

impl<V: Clone> SyncSortedKeyMap<V> {
    /// The value at position `idx` in key order, cloned.
    pub fn get_by_index(&self, idx: usize) -> Option<V> {
        self.read().get_by_index(idx).cloned()
    }

    /// The value stored under `key`, cloned.
    pub fn get_by_key(&self, key: &str) -> Option<V> {
        self.read().get_by_key(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn same_api_as_the_plain_map() {
        let sm = SyncSortedKeyMap::new();
        assert!(sm.add("b", 2));
        assert!(sm.add("a", 1));
        assert!(!sm.add("b", 20));

        assert_eq!(sm.len(), 2);
        assert_eq!(sm.key(0), Some("a".to_owned()));
        assert_eq!(sm.index("b"), Some(1));
        assert_eq!(sm.get_by_key("a"), Some(1));
        assert_eq!(sm.get_by_index(1), Some(2));
        assert!(sm.exists_key("a"));
        assert!(sm.exists_index(1));
        assert!(!sm.exists_index(2));

        sm.reset();
        assert!(sm.is_empty());
    }

    #[test]
    fn concurrent_adds_keep_order() {
        let sm = Arc::new(SyncSortedKeyMap::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sm = Arc::clone(&sm);
                thread::spawn(move || {
                    for j in 0..50 {
                        sm.add(format!("{i:02}_{j:02}"), i * 50 + j);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(sm.len(), 8 * 50);
        let mut previous = String::new();
        sm.over(|_, key, _| {
            assert!(previous.as_str() < key);
            previous = key.to_owned();
            true
        });
    }
}
