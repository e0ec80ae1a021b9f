//! Gas quantities, descriptors, and KV store cost tables.
//!
//! A store layer looks up its prices in a [`GasConfig`] and passes the
//! resulting amount, together with one of the descriptors below, to a gas
//! meter. The meter never sees the table itself.

use serde::{Deserialize, Serialize};

use crate::error::GasError;

/// Gas is an unsigned 64-bit quantity. Arithmetic on it must never wrap.
pub type Gas = u64;

// ── Canonical descriptors used by the KV store layer ──

/// Flat cost of advancing an iterator.
pub const GAS_ITER_NEXT_COST_FLAT_DESC: &str = "IterNextFlat";

/// Per-byte cost of a key or value yielded by an iterator.
pub const GAS_VALUE_PER_BYTE_DESC: &str = "ValuePerByte";

/// Per-byte cost of a written key or value.
pub const GAS_WRITE_PER_BYTE_DESC: &str = "WritePerByte";

/// Per-byte cost of a read key or value.
pub const GAS_READ_PER_BYTE_DESC: &str = "ReadPerByte";

/// Flat cost of a write.
pub const GAS_WRITE_COST_FLAT_DESC: &str = "WriteFlat";

/// Flat cost of a read.
pub const GAS_READ_COST_FLAT_DESC: &str = "ReadFlat";

/// Cost of an existence check.
pub const GAS_HAS_DESC: &str = "Has";

/// Cost of a delete.
pub const GAS_DELETE_DESC: &str = "Delete";

/// All canonical descriptors, in declaration order.
pub const CANONICAL_DESCRIPTORS: [&str; 8] = [
    GAS_ITER_NEXT_COST_FLAT_DESC,
    GAS_VALUE_PER_BYTE_DESC,
    GAS_WRITE_PER_BYTE_DESC,
    GAS_READ_PER_BYTE_DESC,
    GAS_WRITE_COST_FLAT_DESC,
    GAS_READ_COST_FLAT_DESC,
    GAS_HAS_DESC,
    GAS_DELETE_DESC,
];

/// Gas cost of each operation on a KV store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GasConfig {
    pub has_cost: Gas,
    pub delete_cost: Gas,
    pub read_cost_flat: Gas,
    pub read_cost_per_byte: Gas,
    pub write_cost_flat: Gas,
    pub write_cost_per_byte: Gas,
    pub iter_next_cost_flat: Gas,
}

/// Default gas config for persistent KV stores.
pub fn kv_gas_config() -> GasConfig {
    GasConfig {
        has_cost: 1000,
        delete_cost: 1000,
        read_cost_flat: 1000,
        read_cost_per_byte: 3,
        write_cost_flat: 2000,
        write_cost_per_byte: 30,
        iter_next_cost_flat: 30,
    }
}

/// Default gas config for transient stores.
pub fn transient_gas_config() -> GasConfig {
    GasConfig {
        has_cost: 100,
        delete_cost: 100,
        read_cost_flat: 100,
        read_cost_per_byte: 0,
        write_cost_flat: 200,
        write_cost_per_byte: 3,
        iter_next_cost_flat: 3,
    }
}

/// Which store a [`GasConfig`] prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Committed, persistent state.
    #[default]
    Persistent,
    /// Per-block scratch state, discarded after commit.
    Transient,
}

impl StoreKind {
    /// Returns the canonical preset for this store kind.
    pub fn gas_config(self) -> GasConfig {
        match self {
            Self::Persistent => kv_gas_config(),
            Self::Transient => transient_gas_config(),
        }
    }
}

/// Compute `rate * byte_count`.
///
/// Returns `GasOverflow` carrying `descriptor` instead of wrapping or
/// saturating, so an absurd length is reported like any other overflow.
pub fn per_byte_cost(rate: Gas, byte_count: usize, descriptor: &str) -> Result<Gas, GasError> {
    Gas::try_from(byte_count)
        .ok()
        .and_then(|len| rate.checked_mul(len))
        .ok_or_else(|| GasError::gas_overflow(descriptor))
}
