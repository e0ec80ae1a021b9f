//! In-memory key-value store.
//!
//! `MemStore` implements `KvStore` using a `BTreeMap` for deterministic
//! key ordering. Used as the committed store in tests and simulations.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::state_store::{in_range, KvPair, KvStore, WriteBatch};

/// In-memory store backed by `BTreeMap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Create a store pre-populated with data.
    pub fn with_data(data: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self { data }
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(key))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn range(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        // BTreeMap::range panics on inverted bounds, which callers may pass.
        Ok(self
            .data
            .iter()
            .skip_while(|(k, _)| start.map_or(false, |s| k.as_slice() < s))
            .take_while(|(k, _)| in_range(k, start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn apply_batch(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut next = self.data.clone();
        for (key, value) in batch {
            match value {
                Some(value) => {
                    next.insert(key, value);
                }
                None => {
                    next.remove(&key);
                }
            }
        }
        self.data = next;
        Ok(())
    }
}
