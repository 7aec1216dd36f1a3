//! Write-back branch over a parent store
//!
//! A message handler runs against a `CacheStore`. Writes stay in the overlay
//! until `commit`; dropping the cache discards them. This is how a failed
//! message leaves no partial state behind.

use crate::{KvPair, StateStore};
use std::collections::BTreeMap;

/// Cached branch of a parent store
pub struct CacheStore<'a> {
    parent: &'a mut dyn StateStore,

    /// Pending writes: `Some` = put, `None` = delete
    overlay: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> CacheStore<'a> {
    pub fn new(parent: &'a mut dyn StateStore) -> Self {
        Self {
            parent,
            overlay: BTreeMap::new(),
        }
    }

    /// Number of pending writes
    pub fn pending(&self) -> usize {
        self.overlay.len()
    }

    /// Flush pending writes into the parent
    pub fn commit(self) {
        let count = self.overlay.len();
        for (key, value) in self.overlay {
            match value {
                Some(value) => self.parent.put(key, value),
                None => self.parent.delete(&key),
            }
        }
        tracing::trace!(writes = count, "cache committed");
    }

    /// Drop pending writes
    pub fn discard(self) {
        tracing::trace!(writes = self.overlay.len(), "cache discarded");
    }
}

impl StateStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.overlay.get(key) {
            Some(pending) => pending.clone(),
            None => self.parent.get(key),
        }
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.overlay.insert(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.overlay.insert(key.to_vec(), None);
    }

    fn prefix_iterate(&self, prefix: &[u8]) -> Vec<KvPair> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.prefix_iterate(prefix).into_iter().collect();

        for (key, pending) in self
            .overlay
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match pending {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        merged.into_iter().collect()
    }
}
