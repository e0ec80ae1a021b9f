//! Store-layer and unit-of-work error types.

use storegas_primitives::{GasError, GasErrorKind};

/// Error returned by [`KvStore`](crate::KvStore) implementations and the
/// gas-metered store wrapper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A fatal gas condition raised while pricing the operation.
    #[error(transparent)]
    Gas(#[from] GasError),

    /// Keys must be non-empty.
    #[error("key is empty")]
    EmptyKey,

    /// Backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the gas error kind if this error is a gas condition.
    pub fn gas_kind(&self) -> Option<GasErrorKind> {
        match self {
            Self::Gas(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Reason a unit of work was aborted.
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    /// A fatal gas condition. Never retried within the same unit of work.
    #[error("gas error: {0}")]
    Gas(GasError),

    /// Store failure unrelated to gas.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Application logic rejected the unit of work.
    #[error("application error: {0}")]
    App(#[from] anyhow::Error),
}

impl WorkError {
    /// Returns the gas error kind if the unit of work ran out of gas,
    /// overflowed, or refunded too much.
    pub fn gas_kind(&self) -> Option<GasErrorKind> {
        match self {
            Self::Gas(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<GasError> for WorkError {
    fn from(err: GasError) -> Self {
        Self::Gas(err)
    }
}

// Gas conditions surfaced through the store are lifted to `WorkError::Gas`
// so the boundary matches on one variant.
impl From<StoreError> for WorkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Gas(gas) => Self::Gas(gas),
            other => Self::Store(other),
        }
    }
}
