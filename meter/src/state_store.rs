//! Key-value store abstraction priced by the gas-metered wrapper.
//!
//! Implementations:
//! - `MemStore` (this crate): in-memory BTreeMap
//! - `OverlayStore` (this crate): write buffer over a committed store,
//!   used by the unit-of-work executor

use std::collections::BTreeMap;

use tracing::error;

use crate::error::StoreError;

/// A key-value entry as returned by range scans.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Writes to apply together: key → Some(value) for sets, key → None for
/// deletions.
pub type WriteBatch = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// Abstraction over a byte-keyed store.
///
/// Implementations must be deterministic: range scans return entries in
/// ascending key order, and the same state always yields the same results.
pub trait KvStore {
    /// Get the value for a key. Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Check if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may optimize this.
    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Insert or overwrite a key.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// All entries with `start <= key < end`, ascending. `None` leaves that
    /// side of the range open.
    fn range(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError>;

    /// Apply every write in `batch`, or none of them.
    ///
    /// The default implementation records what each key held, applies the
    /// writes in key order, and restores the recorded values if a write
    /// fails. Backends with native transactions should override it.
    fn apply_batch(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut previous = Vec::with_capacity(batch.len());
        for key in batch.keys() {
            previous.push(self.get(key)?);
        }

        for (applied, (key, value)) in batch.iter().enumerate() {
            let result = match value {
                Some(value) => self.set(key, value),
                None => self.delete(key),
            };
            if let Err(err) = result {
                let restore = batch.keys().zip(&previous).take(applied);
                for (key, old) in restore {
                    let undone = match old {
                        Some(old) => self.set(key, old),
                        None => self.delete(key),
                    };
                    if let Err(undo_err) = undone {
                        error!(%undo_err, "failed to restore key after aborted batch");
                        return Err(StoreError::Backend(format!(
                            "batch rollback failed: {undo_err} (after: {err})"
                        )));
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Returns true if `key` lies in the half-open range `[start, end)`.
pub(crate) fn in_range(key: &[u8], start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    start.map_or(true, |s| key >= s) && end.map_or(true, |e| key < e)
}
