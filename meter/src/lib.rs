//! `storegas-meter`: gas meters and gas-metered KV access.
//!
//! This crate provides:
//!
//! - `GasMeter` trait, with the bounded `BasicGasMeter` and the unbounded
//!   `InfiniteGasMeter`
//! - `MeterConfig`: selects the meter variant and cost table for a unit
//!   of work
//! - `KvStore` trait and the in-memory `MemStore`
//! - `GasKvStore`: prices every store access and charges the meter
//! - `execute_unit`: runs a unit of work over a write overlay, committing
//!   on success and aborting on any error
//!
//! Gas types, descriptors, cost tables, and `GasError` live in
//! `storegas-primitives` and are re-exported here.

pub mod error;
pub mod executor;
pub mod gas_kv;
pub mod gas_meter;
pub mod mem_store;
pub mod overlay;
pub mod state_store;
pub mod types;

// Re-export commonly used types at the crate root.
pub use error::{StoreError, WorkError};
pub use executor::{execute_unit, WorkOutcome};
pub use gas_kv::{GasIterator, GasKvStore};
pub use gas_meter::{
    new_gas_meter, new_infinite_gas_meter, BasicGasMeter, GasMeter, InfiniteGasMeter,
};
pub use mem_store::MemStore;
pub use overlay::{OverlayResult, OverlayStore, StateOverlay};
pub use state_store::{KvPair, KvStore, WriteBatch};
pub use types::{MeterConfig, DEFAULT_GAS_LIMIT};

pub use storegas_primitives::{
    kv_gas_config, transient_gas_config, Gas, GasConfig, GasError, GasErrorKind, GasReport,
    StoreKind,
};
