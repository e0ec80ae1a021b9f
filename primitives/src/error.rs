//! Fatal gas conditions.
//!
//! Every [`GasError`] aborts the enclosing unit of work. None of them is
//! recoverable at the meter: retrying an out-of-gas charge cannot succeed,
//! and overflow or a negative refund is a pricing or caller bug.

use core::fmt;

/// Kind of a fatal gas condition, for matching at the unit-of-work boundary.
///
/// The `u32` codes are stable and may be surfaced in receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GasErrorKind {
    OutOfGas = 1,
    GasOverflow = 2,
    NegativeGasConsumed = 3,
}

impl GasErrorKind {
    /// Convert from a receipt code.
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::OutOfGas),
            2 => Some(Self::GasOverflow),
            3 => Some(Self::NegativeGasConsumed),
            _ => None,
        }
    }

    /// Return the `u32` representation of this kind.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for GasErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfGas => write!(f, "ERR_OUT_OF_GAS"),
            Self::GasOverflow => write!(f, "ERR_GAS_OVERFLOW"),
            Self::NegativeGasConsumed => write!(f, "ERR_NEGATIVE_GAS_CONSUMED"),
        }
    }
}

/// A fatal gas condition, carrying the descriptor of the charge or refund
/// that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GasError {
    /// Consumption exceeded the meter limit.
    #[error("out of gas in location: {descriptor}")]
    OutOfGas { descriptor: String },

    /// Consumption would have wrapped the 64-bit counter.
    #[error("gas overflow in location: {descriptor}")]
    GasOverflow { descriptor: String },

    /// A refund exceeded the gas consumed so far.
    #[error("negative gas consumed in location: {descriptor}")]
    NegativeGasConsumed { descriptor: String },
}

impl GasError {
    /// Create an out-of-gas error.
    pub fn out_of_gas(descriptor: impl Into<String>) -> Self {
        Self::OutOfGas {
            descriptor: descriptor.into(),
        }
    }

    /// Create a gas-overflow error.
    pub fn gas_overflow(descriptor: impl Into<String>) -> Self {
        Self::GasOverflow {
            descriptor: descriptor.into(),
        }
    }

    /// Create a negative-gas-consumed error.
    pub fn negative_gas_consumed(descriptor: impl Into<String>) -> Self {
        Self::NegativeGasConsumed {
            descriptor: descriptor.into(),
        }
    }

    pub fn kind(&self) -> GasErrorKind {
        match self {
            Self::OutOfGas { .. } => GasErrorKind::OutOfGas,
            Self::GasOverflow { .. } => GasErrorKind::GasOverflow,
            Self::NegativeGasConsumed { .. } => GasErrorKind::NegativeGasConsumed,
        }
    }

    /// The descriptor of the operation that raised this error.
    pub fn descriptor(&self) -> &str {
        match self {
            Self::OutOfGas { descriptor }
            | Self::GasOverflow { descriptor }
            | Self::NegativeGasConsumed { descriptor } => descriptor,
        }
    }
}
