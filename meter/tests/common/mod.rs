//! Shared test helpers for integration tests.

#![allow(dead_code)]

use storegas_meter::{Gas, GasError, GasMeter, KvStore, MemStore};

/// A committed store with a few accounts, in key order.
pub fn seeded_store() -> MemStore {
    let mut store = MemStore::new();
    store.set(b"acct/alice", b"100").unwrap();
    store.set(b"acct/bob", b"250").unwrap();
    store.set(b"acct/carol", b"7").unwrap();
    store.set(b"meta/height", b"42").unwrap();
    store
}

/// Charge each `(amount, descriptor)` pair in order, stopping at the first error.
pub fn charge_all<M: GasMeter + ?Sized>(
    meter: &mut M,
    charges: &[(Gas, &str)],
) -> Result<(), GasError> {
    for (amount, descriptor) in charges {
        meter.consume_gas(*amount, descriptor)?;
    }
    Ok(())
}
