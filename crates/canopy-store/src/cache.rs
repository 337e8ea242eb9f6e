//! Capacity-bounded cache with injected key equality.
//!
//! Entries sit in insertion order, newest at the front. Writes promote;
//! reads never do, so the back entry is always the oldest write.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Key equality predicate.
pub type KeyEq<K> = Box<dyn Fn(&K, &K) -> bool + Send + Sync>;

/// A bounded, write-promoted cache.
pub struct BoundedCache<K, V> {
    entries: VecDeque<(K, V)>,
    capacity: usize,
    equals: KeyEq<K>,
    read_from: bool,
}

impl<K: PartialEq + 'static, V> BoundedCache<K, V> {
    /// Cache keyed by `K`'s own equality.
    pub fn new(capacity: usize) -> Self {
        Self::with_equality(capacity, |a: &K, b: &K| a == b)
    }
}

impl<K, V> BoundedCache<K, V> {
    /// Cache keyed by an arbitrary equality predicate. A zero capacity is
    /// raised to one.
    pub fn with_equality(
        capacity: usize,
        equals: impl Fn(&K, &K) -> bool + Send + Sync + 'static,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            equals: Box::new(equals),
            read_from: true,
        }
    }

    /// Insert or overwrite `key` at the front.
    ///
    /// At capacity the back entry is evicted first, even when `key` is
    /// already cached.
    pub fn add(&mut self, key: K, value: V) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
            debug!(capacity = self.capacity, "cache evicted oldest entry");
        }
        self.remove_matching(&key);
        self.entries.push_front((key, value));
    }

    /// Exact lookup. Always misses while reads are disabled.
    pub fn fetch(&self, key: &K) -> Option<&V> {
        if !self.read_from {
            return None;
        }
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> StoreResult<V>
    where
        K: fmt::Display,
    {
        self.remove_matching(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Move an entry known to be present back to the front with a new value.
    /// Skips the capacity check.
    pub fn replace(&mut self, key: K, value: V) -> StoreResult<()>
    where
        K: fmt::Display,
    {
        if self.remove_matching(&key).is_none() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        self.entries.push_front((key, value));
        Ok(())
    }

    /// Enable or disable reads. Writes and removals keep working either way.
    pub fn set_read_from(&mut self, enabled: bool) {
        self.read_from = enabled;
    }

    pub fn reads_enabled(&self) -> bool {
        self.read_from
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

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| (self.equals)(k, key))
    }

    fn remove_matching(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        self.entries.remove(index).map(|(_, v)| v)
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("read_from", &self.read_from)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_types::{Address, Codec, HashAlg};
    use proptest::prelude::*;

    fn addr(byte: u8) -> Address {
        Address::new(Codec::DagCbor, HashAlg::Blake3, [byte; 32])
    }

    // ---------------------------------------------------------------
    // Capacity and eviction
    // ---------------------------------------------------------------

    #[test]
    fn overflow_evicts_first_added() {
        let mut cache = BoundedCache::new(3);
        for i in 0..4 {
            cache.add(addr(i), i);
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.fetch(&addr(0)).is_none());
        assert_eq!(cache.fetch(&addr(3)), Some(&3));
    }

    #[test]
    fn reads_do_not_promote() {
        let mut cache = BoundedCache::new(2);
        cache.add(addr(1), 1);
        cache.add(addr(2), 2);
        assert!(cache.fetch(&addr(1)).is_some());
        cache.add(addr(3), 3);
        assert!(cache.fetch(&addr(1)).is_none());
        assert!(cache.fetch(&addr(2)).is_some());
    }

    #[test]
    fn overwrite_at_capacity_still_evicts_back() {
        let mut cache = BoundedCache::new(2);
        cache.add(addr(1), 1);
        cache.add(addr(2), 2);
        cache.add(addr(2), 20);
        assert_eq!(cache.len(), 1);
        assert!(cache.fetch(&addr(1)).is_none());
        assert_eq!(cache.fetch(&addr(2)), Some(&20));
    }

    #[test]
    fn overwrite_below_capacity_keeps_single_entry() {
        let mut cache = BoundedCache::new(4);
        cache.add(addr(1), 1);
        cache.add(addr(1), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.fetch(&addr(1)), Some(&2));
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut cache = BoundedCache::new(0);
        cache.add(addr(1), 1);
        cache.add(addr(2), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.capacity(), 1);
    }

    // ---------------------------------------------------------------
    // Remove / replace
    // ---------------------------------------------------------------

    #[test]
    fn remove_missing_is_not_found() {
        let mut cache: BoundedCache<Address, u8> = BoundedCache::new(2);
        assert!(matches!(cache.remove(&addr(9)), Err(StoreError::NotFound(a)) if a == addr(9).to_string()));
    }

    #[test]
    fn remove_returns_value() {
        let mut cache = BoundedCache::new(2);
        cache.add(addr(1), "one");
        assert_eq!(cache.remove(&addr(1)).unwrap(), "one");
        assert!(cache.is_empty());
    }

    #[test]
    fn replace_skips_capacity_check() {
        let mut cache = BoundedCache::new(2);
        cache.add(addr(1), 1);
        cache.add(addr(2), 2);
        cache.replace(addr(1), 10).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.fetch(&addr(1)), Some(&10));
        assert_eq!(cache.fetch(&addr(2)), Some(&2));
    }

    #[test]
    fn replace_missing_is_not_found() {
        let mut cache = BoundedCache::new(2);
        cache.add(addr(1), 1);
        assert!(matches!(cache.replace(addr(2), 2), Err(StoreError::NotFound(_))));
    }

    // ---------------------------------------------------------------
    // Read bypass and injected equality
    // ---------------------------------------------------------------

    #[test]
    fn read_bypass_forces_misses() {
        let mut cache = BoundedCache::new(4);
        cache.add(addr(1), 1);
        cache.set_read_from(false);
        assert!(cache.fetch(&addr(1)).is_none());

        cache.add(addr(2), 2);
        cache.remove(&addr(1)).unwrap();
        assert_eq!(cache.len(), 1);

        cache.set_read_from(true);
        assert_eq!(cache.fetch(&addr(2)), Some(&2));
    }

    #[test]
    fn injected_equality_is_used() {
        let mut cache = BoundedCache::with_equality(4, |a: &String, b: &String| {
            a.eq_ignore_ascii_case(b)
        });
        cache.add("Root".to_string(), 1);
        cache.add("ROOT".to_string(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.fetch(&"root".to_string()), Some(&2));
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..16, keys in prop::collection::vec(any::<u8>(), 0..64)) {
            let mut cache = BoundedCache::new(capacity);
            for key in keys {
                cache.add(addr(key), key);
                prop_assert!(cache.len() <= capacity);
            }
        }

        #[test]
        fn latest_write_is_always_cached(capacity in 1usize..16, keys in prop::collection::vec(any::<u8>(), 1..64)) {
            let mut cache = BoundedCache::new(capacity);
            for key in &keys {
                cache.add(addr(*key), *key);
            }
            let last = *keys.last().unwrap();
            prop_assert_eq!(cache.fetch(&addr(last)), Some(&last));
        }
    }
}
