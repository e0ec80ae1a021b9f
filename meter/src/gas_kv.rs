//! Gas-metered view over a `KvStore`.
//!
//! Every operation is priced from a [`GasConfig`] and charged to the meter
//! before the result is handed back. Pricing:
//!
//! | operation | charges |
//! |---|---|
//! | `get` | `ReadFlat`, then `ReadPerByte` for key and value |
//! | `set` | `WriteFlat`, then `WritePerByte` for key and value |
//! | `has` | `Has` |
//! | `delete` | `Delete` |
//! | each iterated entry | `ValuePerByte` for key and value, then `IterNextFlat` |
//!
//! Writes are charged in full before the parent store is touched, so a
//! gas error leaves the parent unchanged.
//!
//! `GasKvStore` is itself a `KvStore`, so it can be layered under an
//! overlay or passed to code generic over the store.

use std::cell::{Ref, RefCell};
use std::vec;

use storegas_primitives::{
    per_byte_cost, Gas, GasConfig, GasError, GAS_DELETE_DESC, GAS_HAS_DESC,
    GAS_ITER_NEXT_COST_FLAT_DESC, GAS_READ_COST_FLAT_DESC, GAS_READ_PER_BYTE_DESC,
    GAS_VALUE_PER_BYTE_DESC, GAS_WRITE_COST_FLAT_DESC, GAS_WRITE_PER_BYTE_DESC,
};

use crate::error::StoreError;
use crate::gas_meter::GasMeter;
use crate::state_store::{KvPair, KvStore};

/// Charge `rate * byte_count` under `descriptor`.
fn consume_per_byte<M: GasMeter + ?Sized>(
    meter: &mut M,
    rate: Gas,
    byte_count: usize,
    descriptor: &str,
) -> Result<(), GasError> {
    let amount = per_byte_cost(rate, byte_count, descriptor)?;
    meter.consume_gas(amount, descriptor)
}

/// Charge for one iterated entry.
fn consume_entry<M: GasMeter + ?Sized>(
    meter: &mut M,
    config: &GasConfig,
    key: &[u8],
    value: &[u8],
) -> Result<(), GasError> {
    let rate = config.read_cost_per_byte;
    consume_per_byte(&mut *meter, rate, key.len(), GAS_VALUE_PER_BYTE_DESC)?;
    consume_per_byte(&mut *meter, rate, value.len(), GAS_VALUE_PER_BYTE_DESC)?;
    meter.consume_gas(config.iter_next_cost_flat, GAS_ITER_NEXT_COST_FLAT_DESC)
}

/// A `KvStore` wrapper that charges a gas meter for every access.
///
/// The meter sits in a `RefCell` so reads through `&self` can charge it.
pub struct GasKvStore<'a, S: ?Sized, M: ?Sized> {
    parent: &'a mut S,
    meter: RefCell<&'a mut M>,
    config: GasConfig,
}

impl<'a, S, M> GasKvStore<'a, S, M>
where
    S: KvStore + ?Sized,
    M: GasMeter + ?Sized,
{
    pub fn new(parent: &'a mut S, meter: &'a mut M, config: GasConfig) -> Self {
        Self {
            parent,
            meter: RefCell::new(meter),
            config,
        }
    }

    pub fn gas_config(&self) -> &GasConfig {
        &self.config
    }

    /// The meter being charged.
    pub fn meter(&self) -> Ref<'_, M> {
        Ref::map(self.meter.borrow(), |meter| &**meter)
    }

    /// Mutable access to the meter, for callers that charge or refund
    /// application-level costs in the same unit of work.
    pub fn meter_mut(&mut self) -> &mut M {
        &mut **self.meter.get_mut()
    }

    fn consume(&self, amount: Gas, descriptor: &str) -> Result<(), GasError> {
        self.meter.borrow_mut().consume_gas(amount, descriptor)
    }

    fn consume_bytes(&self, rate: Gas, byte_count: usize, descriptor: &str) -> Result<(), GasError> {
        consume_per_byte(&mut **self.meter.borrow_mut(), rate, byte_count, descriptor)
    }

    /// Iterate `start <= key < end` in ascending order, charging per entry.
    ///
    /// The iterator yields `Err` once, on the first entry whose gas cannot
    /// be paid, and then ends.
    pub fn iter(
        &mut self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<GasIterator<'_, M>, StoreError> {
        let entries = self.parent.range(start, end)?;
        Ok(GasIterator {
            entries: entries.into_iter(),
            meter: &mut **self.meter.get_mut(),
            config: self.config,
            done: false,
        })
    }
}

impl<'a, S, M> KvStore for GasKvStore<'a, S, M>
where
    S: KvStore + ?Sized,
    M: GasMeter + ?Sized,
{
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.consume(self.config.read_cost_flat, GAS_READ_COST_FLAT_DESC)?;
        let value = self.parent.get(key)?;

        let rate = self.config.read_cost_per_byte;
        self.consume_bytes(rate, key.len(), GAS_READ_PER_BYTE_DESC)?;
        let value_len = value.as_ref().map_or(0, Vec::len);
        self.consume_bytes(rate, value_len, GAS_READ_PER_BYTE_DESC)?;
        Ok(value)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.consume(self.config.has_cost, GAS_HAS_DESC)?;
        self.parent.has(key)
    }

    /// Set a key. Empty keys are rejected before any gas is charged.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.consume(self.config.write_cost_flat, GAS_WRITE_COST_FLAT_DESC)?;

        let rate = self.config.write_cost_per_byte;
        self.consume_bytes(rate, key.len(), GAS_WRITE_PER_BYTE_DESC)?;
        self.consume_bytes(rate, value.len(), GAS_WRITE_PER_BYTE_DESC)?;
        self.parent.set(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.consume(self.config.delete_cost, GAS_DELETE_DESC)?;
        self.parent.delete(key)
    }

    /// Collected form of [`GasKvStore::iter`]: every entry is charged, and
    /// the first one that cannot be paid fails the whole scan.
    fn range(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        let entries = self.parent.range(start, end)?;
        let mut meter = self.meter.borrow_mut();
        for (key, value) in &entries {
            consume_entry(&mut **meter, &self.config, key, value)?;
        }
        Ok(entries)
    }
}

/// Iterator over a range of a [`GasKvStore`], charging gas per entry.
pub struct GasIterator<'m, M: ?Sized> {
    entries: vec::IntoIter<KvPair>,
    meter: &'m mut M,
    config: GasConfig,
    done: bool,
}

impl<'m, M: GasMeter + ?Sized> Iterator for GasIterator<'m, M> {
    type Item = Result<KvPair, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, value) = self.entries.next()?;
        match consume_entry(&mut *self.meter, &self.config, &key, &value) {
            Ok(()) => Some(Ok((key, value))),
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas_meter::{new_gas_meter, new_infinite_gas_meter};
    use crate::mem_store::MemStore;
    use crate::overlay::OverlayStore;
    use storegas_primitives::{kv_gas_config, transient_gas_config, GasErrorKind};

    fn read_u64<S: KvStore + ?Sized>(store: &S, key: &[u8]) -> Result<u64, StoreError> {
        let raw = store.get(key)?.unwrap_or_default();
        Ok(raw.iter().fold(0, |acc, b| acc * 10 + u64::from(b - b'0')))
    }

    #[test]
    fn test_get_charges_flat_and_bytes() {
        let mut store = MemStore::new();
        store.set(b"key", b"value").unwrap();
        let mut meter = new_gas_meter(100_000, true);

        let mut gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());
        let value = gas_store.get(b"key").unwrap();
        assert_eq!(value, Some(b"value".to_vec()));

        // 1000 + 3 * 3 + 3 * 5
        assert_eq!(meter.gas_consumed(), 1024);
        let report = meter.report().unwrap();
        assert_eq!(report.get(GAS_READ_COST_FLAT_DESC), Some(1000));
        assert_eq!(report.get(GAS_READ_PER_BYTE_DESC), Some(24));
    }

    #[test]
    fn test_get_missing_key() {
        let mut store = MemStore::new();
        let mut meter = new_gas_meter(100_000, false);
        let mut gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());
        assert_eq!(gas_store.get(b"abcd").unwrap(), None);
        assert_eq!(meter.gas_consumed(), 1000 + 3 * 4);
    }

    #[test]
    fn test_set_charges_flat_and_bytes() {
        let mut store = MemStore::new();
        let mut meter = new_gas_meter(100_000, true);
        GasKvStore::new(&mut store, &mut meter, kv_gas_config())
            .set(b"key", b"value")
            .unwrap();

        // 2000 + 30 * 3 + 30 * 5
        assert_eq!(meter.gas_consumed(), 2240);
        let report = meter.report().unwrap();
        assert_eq!(report.get(GAS_WRITE_COST_FLAT_DESC), Some(2000));
        assert_eq!(report.get(GAS_WRITE_PER_BYTE_DESC), Some(240));
        assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn test_set_out_of_gas_leaves_parent_untouched() {
        let mut store = MemStore::new();
        let mut meter = new_gas_meter(2050, false);
        let err = GasKvStore::new(&mut store, &mut meter, kv_gas_config())
            .set(b"key", b"value")
            .unwrap_err();

        assert_eq!(err.gas_kind(), Some(GasErrorKind::OutOfGas));
        assert_eq!(err, StoreError::Gas(GasError::out_of_gas(GAS_WRITE_PER_BYTE_DESC)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_empty_key_rejected() {
        let mut store = MemStore::new();
        let mut meter = new_gas_meter(100_000, false);
        let err = GasKvStore::new(&mut store, &mut meter, kv_gas_config())
            .set(b"", b"value")
            .unwrap_err();
        assert_eq!(err, StoreError::EmptyKey);
        assert_eq!(meter.gas_consumed(), 0);
    }

    #[test]
    fn test_has_and_delete() {
        let mut store = MemStore::new();
        store.set(b"key", b"value").unwrap();
        let mut meter = new_gas_meter(100_000, true);
        let mut gas_store = GasKvStore::new(&mut store, &mut meter, transient_gas_config());

        assert!(gas_store.has(b"key").unwrap());
        gas_store.delete(b"key").unwrap();
        assert!(!gas_store.has(b"key").unwrap());

        assert_eq!(meter.gas_consumed(), 300);
        let report = meter.report().unwrap();
        assert_eq!(report.get(GAS_HAS_DESC), Some(200));
        assert_eq!(report.get(GAS_DELETE_DESC), Some(100));
    }

    #[test]
    fn test_iter_charges_per_entry() {
        let mut store = MemStore::new();
        store.set(b"a1", b"xyz").unwrap();
        store.set(b"a2", b"xy").unwrap();
        store.set(b"b1", b"x").unwrap();
        let mut meter = new_gas_meter(100_000, true);
        let mut gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());

        let entries: Vec<KvPair> = gas_store
            .iter(Some(b"a".as_slice()), Some(b"b".as_slice()))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 2);

        // ValuePerByte: 3 * (2 + 3) + 3 * (2 + 2); IterNextFlat: 2 * 30
        let report = meter.report().unwrap();
        assert_eq!(report.get(GAS_VALUE_PER_BYTE_DESC), Some(27));
        assert_eq!(report.get(GAS_ITER_NEXT_COST_FLAT_DESC), Some(60));
        assert_eq!(meter.gas_consumed(), 87);
    }

    #[test]
    fn test_iter_stops_after_gas_error() {
        let mut store = MemStore::new();
        for key in [b"a", b"b", b"c"] {
            store.set(key, b"v").unwrap();
        }
        // One entry costs 3 + 3 + 30 = 36.
        let mut meter = new_gas_meter(50, false);
        let mut gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());

        let results: Vec<_> = gas_store.iter(None, None).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.gas_kind(), Some(GasErrorKind::OutOfGas));
    }

    #[test]
    fn test_infinite_meter_through_store() {
        let mut store = MemStore::new();
        let mut meter = new_infinite_gas_meter();
        let mut gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());
        for i in 0u8..10 {
            gas_store.set(&[i + 1], b"v").unwrap();
        }
        assert_eq!(gas_store.meter().gas_consumed(), 10 * (2000 + 30 + 30));
        assert!(meter.report().is_none());
    }

    #[test]
    fn test_usable_as_kv_store() {
        let mut store = MemStore::new();
        store.set(b"n", b"42").unwrap();
        let mut meter = new_gas_meter(100_000, true);
        let gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());

        assert_eq!(read_u64(&gas_store, b"n").unwrap(), 42);
        // 1000 + 3 * 1 + 3 * 2
        assert_eq!(gas_store.meter().gas_consumed(), 1009);
    }

    #[test]
    fn test_overlay_over_metered_store() {
        let mut store = MemStore::new();
        store.set(b"a", b"1").unwrap();
        let mut meter = new_gas_meter(100_000, false);
        let gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());

        let mut view = OverlayStore::new(&gas_store);
        view.set(b"b", b"2").unwrap();
        assert_eq!(view.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(gas_store.meter().gas_consumed(), 0);

        assert_eq!(view.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(gas_store.meter().gas_consumed(), 1006);
    }

    #[test]
    fn test_range_charges_every_entry() {
        let mut store = MemStore::new();
        for key in [b"a", b"b", b"c"] {
            store.set(key, b"v").unwrap();
        }
        let mut meter = new_gas_meter(100_000, true);
        let gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());

        let entries = gas_store.range(None, Some(b"c".as_slice())).unwrap();
        assert_eq!(entries.len(), 2);
        drop(gas_store);
        assert_eq!(meter.gas_consumed(), 2 * 36);
        assert_eq!(meter.report().unwrap().get(GAS_ITER_NEXT_COST_FLAT_DESC), Some(60));
    }

    #[test]
    fn test_range_fails_on_unaffordable_entry() {
        let mut store = MemStore::new();
        for key in [b"a", b"b", b"c"] {
            store.set(key, b"v").unwrap();
        }
        let mut meter = new_gas_meter(50, false);
        let gas_store = GasKvStore::new(&mut store, &mut meter, kv_gas_config());

        let err = gas_store.range(None, None).unwrap_err();
        assert_eq!(err, StoreError::Gas(GasError::out_of_gas(GAS_ITER_NEXT_COST_FLAT_DESC)));
    }

    #[test]
    fn test_dyn_meter() {
        let mut store = MemStore::new();
        let mut meter: Box<dyn GasMeter> = Box::new(new_gas_meter(10_000, false));
        let mut gas_store = GasKvStore::new(&mut store, &mut *meter, transient_gas_config());
        assert_eq!(gas_store.gas_config(), &transient_gas_config());
        gas_store.has(b"k").unwrap();
        gas_store.meter_mut().refund_gas(40, "refund").unwrap();
        assert_eq!(meter.gas_consumed(), 60);
    }
}
