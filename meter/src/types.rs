//! Meter configuration.
//!
//! `MeterConfig` selects the meter variant and its limit for one unit of
//! work. It deserializes from the node's configuration file; omitted fields
//! take the defaults below.

use serde::{Deserialize, Serialize};
use storegas_primitives::{Gas, GasConfig, StoreKind};

use crate::gas_meter::{BasicGasMeter, GasMeter, InfiniteGasMeter};

/// Default per-unit-of-work gas limit.
pub const DEFAULT_GAS_LIMIT: Gas = 10_000_000;

/// Configuration for the meter of a single unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Maximum gas the unit of work may consume. Ignored when `unbounded`.
    pub limit: Gas,
    /// Keep a per-descriptor breakdown. Only honoured by the bounded meter.
    pub cost_breakdown: bool,
    /// Use the unbounded meter (simulation and gas estimation).
    pub unbounded: bool,
    /// Which cost table prices the store.
    pub store: StoreKind,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_GAS_LIMIT,
            cost_breakdown: false,
            unbounded: false,
            store: StoreKind::Persistent,
        }
    }
}

impl MeterConfig {
    /// A bounded config with the given limit.
    pub fn with_limit(limit: Gas) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// A config for simulation runs: unbounded, no breakdown.
    pub fn simulation() -> Self {
        Self {
            unbounded: true,
            ..Self::default()
        }
    }

    /// Build a fresh meter for one unit of work.
    pub fn build(&self) -> Box<dyn GasMeter> {
        if self.unbounded {
            Box::new(InfiniteGasMeter::new())
        } else {
            Box::new(BasicGasMeter::new(self.limit, self.cost_breakdown))
        }
    }

    /// The cost table for the configured store kind.
    pub fn gas_config(&self) -> GasConfig {
        self.store.gas_config()
    }
}
