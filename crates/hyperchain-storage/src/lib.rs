//! # Hyperchain Storage
//!
//! Linear key-value state behind the bridge module.
//!
//! ## Storage Layout
//!
//! - `StateStore` - the host's byte-keyed store (`get`, `put`, `delete`, `prefix_iterate`)
//! - `MemStore` - ordered in-memory store, shared between host and queries
//! - `CacheStore` - write-back branch over a parent; commit on success, drop on error
//! - `codec` - bincode record encoding; corrupt records are fatal

pub mod cache;
pub mod codec;

pub use cache::CacheStore;

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key/value pair as returned by prefix iteration
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Byte-keyed state store provided by the host
///
/// Iteration is always in ascending key order so that every replica walks
/// records identically.
pub trait StateStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, ascending
    fn prefix_iterate(&self, prefix: &[u8]) -> Vec<KvPair>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// Ordered in-memory store
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemStore {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of the full contents, for state comparisons in tests and tooling
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.data.read().clone()
    }
}

impl StateStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.data.write().insert(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.data.write().remove(key);
    }

    fn prefix_iterate(&self, prefix: &[u8]) -> Vec<KvPair> {
        self.data
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut store = MemStore::new();
        store.put(b"a".to_vec(), b"1".to_vec());

        assert_eq!(store.get(b"a"), Some(b"1".to_vec()));
        assert!(store.has(b"a"));

        store.delete(b"a");
        assert!(!store.has(b"a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_prefix_iterate_is_ordered_and_bounded() {
        let mut store = MemStore::new();
        store.put(vec![0x05, b'b'], vec![2]);
        store.put(vec![0x05, b'a'], vec![1]);
        store.put(vec![0x06, b'a'], vec![3]);
        store.put(vec![0x04, b'z'], vec![0]);

        let items = store.prefix_iterate(&[0x05]);
        assert_eq!(
            items,
            vec![(vec![0x05, b'a'], vec![1]), (vec![0x05, b'b'], vec![2])]
        );
    }

    #[test]
    fn test_clones_share_state() {
        let mut store = MemStore::new();
        let view = store.clone();
        store.put(b"k".to_vec(), b"v".to_vec());
        assert_eq!(view.get(b"k"), Some(b"v".to_vec()));
    }
}
