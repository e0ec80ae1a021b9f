//! `storegas-primitives`: shared gas types for the storegas meters.
//!
//! This crate provides the `Gas` quantity, the canonical descriptors used
//! by the KV store layer, the KV and transient cost tables, the fatal
//! [`GasError`] conditions, and the per-descriptor [`GasReport`].
//!
//! It has no knowledge of meters; `storegas-meter` builds on it.

pub mod error;
pub mod gas;
pub mod report;

// Re-export commonly used types at the crate root for convenience.
pub use error::{GasError, GasErrorKind};
pub use gas::{
    kv_gas_config, per_byte_cost, transient_gas_config, Gas, GasConfig, StoreKind,
    CANONICAL_DESCRIPTORS, GAS_DELETE_DESC, GAS_HAS_DESC, GAS_ITER_NEXT_COST_FLAT_DESC,
    GAS_READ_COST_FLAT_DESC, GAS_READ_PER_BYTE_DESC, GAS_VALUE_PER_BYTE_DESC,
    GAS_WRITE_COST_FLAT_DESC, GAS_WRITE_PER_BYTE_DESC,
};
pub use report::GasReport;
