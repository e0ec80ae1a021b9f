//! Transactional write buffer for a unit of work.
//!
//! Writes made during a unit of work are buffered in a [`StateOverlay`] and
//! are visible to later reads in the same unit. On success they are
//! committed to the underlying store; on abort they are dropped.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::state_store::{in_range, KvPair, KvStore, WriteBatch};

/// Buffered writes: key → Some(value) for sets, key → None for deletions.
///
/// Uses `BTreeMap` so commit order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateOverlay {
    writes: WriteBatch,
}

/// Result of looking up a key in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResult {
    /// Key was set in the overlay with this value.
    Found(Vec<u8>),
    /// Key was deleted in this overlay.
    Deleted,
    /// Key is not in the overlay; the caller must check the committed store.
    NotInOverlay,
}

impl StateOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any earlier set or delete of it.
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    /// Record a deletion. Later reads return `Deleted` instead of falling
    /// through to the committed store.
    pub fn delete(&mut self, key: Vec<u8>) {
        self.writes.insert(key, None);
    }

    pub fn get(&self, key: &[u8]) -> OverlayResult {
        match self.writes.get(key) {
            Some(Some(value)) => OverlayResult::Found(value.clone()),
            Some(None) => OverlayResult::Deleted,
            None => OverlayResult::NotInOverlay,
        }
    }

    /// Returns the buffered writes in key order.
    pub fn writes(&self) -> &WriteBatch {
        &self.writes
    }

    /// Returns the number of keys touched (set or deleted).
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if no writes have been buffered.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply every buffered write to `store` as one batch. On error the
    /// store is left as it was before the commit.
    pub fn commit<S: KvStore + ?Sized>(self, store: &mut S) -> Result<(), StoreError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        store.apply_batch(self.writes)
    }
}

/// A `KvStore` view of committed state plus a write overlay.
///
/// The committed store is only read; all writes land in the overlay.
#[derive(Debug)]
pub struct OverlayStore<'a, S: ?Sized> {
    parent: &'a S,
    overlay: StateOverlay,
}

impl<'a, S: KvStore + ?Sized> OverlayStore<'a, S> {
    pub fn new(parent: &'a S) -> Self {
        Self {
            parent,
            overlay: StateOverlay::new(),
        }
    }

    /// Release the committed store and return the buffered writes.
    pub fn into_overlay(self) -> StateOverlay {
        self.overlay
    }
}

impl<'a, S: KvStore + ?Sized> KvStore for OverlayStore<'a, S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.overlay.get(key) {
            OverlayResult::Found(v) => Ok(Some(v)),
            OverlayResult::Deleted => Ok(None),
            OverlayResult::NotInOverlay => self.parent.get(key),
        }
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        match self.overlay.get(key) {
            OverlayResult::Found(_) => Ok(true),
            OverlayResult::Deleted => Ok(false),
            OverlayResult::NotInOverlay => self.parent.has(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.overlay.set(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.overlay.delete(key.to_vec());
        Ok(())
    }

    fn range(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.range(start, end)?.into_iter().collect();
        for (key, value) in self.overlay.writes() {
            if !in_range(key, start, end) {
                continue;
            }
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_store::MemStore;

    fn committed() -> MemStore {
        let mut store = MemStore::new();
        store.set(b"a", b"1").unwrap();
        store.set(b"b", b"2").unwrap();
        store.set(b"c", b"3").unwrap();
        store
    }

    #[test]
    fn test_overlay_set_and_get() {
        let mut overlay = StateOverlay::new();
        overlay.set(b"key1".to_vec(), b"value1".to_vec());
        assert_eq!(overlay.get(b"key1"), OverlayResult::Found(b"value1".to_vec()));
        assert_eq!(overlay.get(b"missing"), OverlayResult::NotInOverlay);
    }

    #[test]
    fn test_overlay_delete_then_set() {
        let mut overlay = StateOverlay::new();
        overlay.delete(b"key1".to_vec());
        assert_eq!(overlay.get(b"key1"), OverlayResult::Deleted);

        overlay.set(b"key1".to_vec(), b"new_value".to_vec());
        assert_eq!(overlay.get(b"key1"), OverlayResult::Found(b"new_value".to_vec()));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_reads_fall_through_to_parent() {
        let store = committed();
        let mut view = OverlayStore::new(&store);
        view.set(b"b", b"20").unwrap();
        view.delete(b"c").unwrap();

        assert_eq!(view.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(view.get(b"b").unwrap(), Some(b"20".to_vec()));
        assert_eq!(view.get(b"c").unwrap(), None);
        assert!(view.has(b"a").unwrap());
        assert!(!view.has(b"c").unwrap());
        // Parent is untouched.
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_range_merges_overlay() {
        let store = committed();
        let mut view = OverlayStore::new(&store);
        view.set(b"bb", b"new").unwrap();
        view.delete(b"a").unwrap();
        view.set(b"z", b"out").unwrap();

        let entries = view.range(None, Some(b"c".as_slice())).unwrap();
        assert_eq!(
            entries,
            vec![
                (b"b".to_vec(), b"2".to_vec()),
                (b"bb".to_vec(), b"new".to_vec()),
            ]
        );
    }

    #[test]
    fn test_commit_applies_in_order() {
        let mut store = committed();
        let overlay = {
            let mut view = OverlayStore::new(&store);
            view.set(b"d", b"4").unwrap();
            view.delete(b"a").unwrap();
            view.into_overlay()
        };
        assert!(!overlay.is_empty());
        overlay.commit(&mut store).unwrap();

        assert_eq!(store.get(b"a").unwrap(), None);
        assert_eq!(store.get(b"d").unwrap(), Some(b"4".to_vec()));
        assert_eq!(store.len(), 3);
    }
}
