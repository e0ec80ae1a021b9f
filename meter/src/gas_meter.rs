//! Gas meters for the KV store access layer.
//!
//! A meter is created once per unit of work (a transaction, or a gas
//! estimation run), charged by the store layer on every priced operation,
//! and read once at the end. Two variants share the [`GasMeter`] trait:
//!
//! - [`BasicGasMeter`] enforces a hard limit and can keep a per-descriptor
//!   breakdown.
//! - [`InfiniteGasMeter`] never runs out of gas; only 64-bit overflow of the
//!   counter is fatal. Used for simulation.
//!
//! Any `Err` returned by a meter is fatal for the unit of work and must be
//! propagated, not retried.

use std::fmt;

use storegas_primitives::{Gas, GasError, GasReport};
use tracing::trace;

/// Tracks gas consumption for one unit of work.
///
/// Not synchronized: a meter belongs to exactly one execution context.
pub trait GasMeter: fmt::Debug + fmt::Display {
    /// Cumulative gas consumed, including a charge that crossed the limit.
    fn gas_consumed(&self) -> Gas;

    /// Gas consumed, clamped to the limit. This is the billable amount.
    fn gas_consumed_to_limit(&self) -> Gas;

    /// The configured limit.
    fn limit(&self) -> Gas;

    /// Charge `amount` under `descriptor`.
    fn consume_gas(&mut self, amount: Gas, descriptor: &str) -> Result<(), GasError>;

    /// Return `amount` previously charged, attributing it to `descriptor`.
    fn refund_gas(&mut self, amount: Gas, descriptor: &str) -> Result<(), GasError>;

    /// True once consumed is strictly greater than the limit.
    fn is_past_limit(&self) -> bool;

    /// True once consumed has reached the limit.
    fn is_out_of_gas(&self) -> bool;

    /// Per-descriptor breakdown, if the meter tracks one.
    fn report(&self) -> Option<&GasReport>;
}

/// Bounded gas meter.
///
/// A charge that crosses the limit is still applied to `consumed` before
/// `OutOfGas` is returned, so `gas_consumed()` reflects the attempted
/// total. That charge is not added to the report: on the failing charge the
/// report under-counts relative to `gas_consumed()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicGasMeter {
    limit: Gas,
    consumed: Gas,
    report: Option<GasReport>,
}

impl BasicGasMeter {
    /// Create a new gas meter with the given limit.
    ///
    /// A limit of 0 is valid: only zero-cost charges succeed.
    pub fn new(limit: Gas, cost_breakdown: bool) -> Self {
        Self {
            limit,
            consumed: 0,
            report: cost_breakdown.then(GasReport::new),
        }
    }

    /// Returns the gas left before the limit is reached.
    pub fn remaining(&self) -> Gas {
        self.limit.saturating_sub(self.consumed)
    }

    /// Take the breakdown out of a finished meter.
    pub fn into_report(self) -> Option<GasReport> {
        self.report
    }
}

impl GasMeter for BasicGasMeter {
    fn gas_consumed(&self) -> Gas {
        self.consumed
    }

    fn gas_consumed_to_limit(&self) -> Gas {
        if self.is_past_limit() {
            return self.limit;
        }
        self.consumed
    }

    fn limit(&self) -> Gas {
        self.limit
    }

    fn consume_gas(&mut self, amount: Gas, descriptor: &str) -> Result<(), GasError> {
        let Some(consumed) = self.consumed.checked_add(amount) else {
            trace!(descriptor, amount, consumed = self.consumed, "gas overflow");
            self.consumed = Gas::MAX;
            return Err(GasError::gas_overflow(descriptor));
        };
        self.consumed = consumed;

        if self.consumed > self.limit {
            trace!(descriptor, amount, consumed, limit = self.limit, "out of gas");
            return Err(GasError::out_of_gas(descriptor));
        }

        if let Some(report) = self.report.as_mut() {
            report.add(descriptor, amount);
        }
        Ok(())
    }

    fn refund_gas(&mut self, amount: Gas, descriptor: &str) -> Result<(), GasError> {
        let Some(consumed) = self.consumed.checked_sub(amount) else {
            trace!(descriptor, amount, consumed = self.consumed, "refund exceeds consumed gas");
            return Err(GasError::negative_gas_consumed(descriptor));
        };
        self.consumed = consumed;

        if let Some(report) = self.report.as_mut() {
            report.sub(descriptor, amount);
        }
        Ok(())
    }

    fn is_past_limit(&self) -> bool {
        self.consumed > self.limit
    }

    fn is_out_of_gas(&self) -> bool {
        self.consumed >= self.limit
    }

    fn report(&self) -> Option<&GasReport> {
        self.report.as_ref()
    }
}

impl fmt::Display for BasicGasMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BasicGasMeter:\n  limit: {}\n  consumed: {}",
            self.limit, self.consumed
        )
    }
}

/// Unbounded gas meter.
///
/// `limit()` is always 0 and never enforced. Overflow clamps the counter to
/// `Gas::MAX` exactly as the bounded meter does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfiniteGasMeter {
    consumed: Gas,
}

impl InfiniteGasMeter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GasMeter for InfiniteGasMeter {
    fn gas_consumed(&self) -> Gas {
        self.consumed
    }

    fn gas_consumed_to_limit(&self) -> Gas {
        self.consumed
    }

    fn limit(&self) -> Gas {
        0
    }

    fn consume_gas(&mut self, amount: Gas, descriptor: &str) -> Result<(), GasError> {
        let Some(consumed) = self.consumed.checked_add(amount) else {
            trace!(descriptor, amount, consumed = self.consumed, "gas overflow");
            self.consumed = Gas::MAX;
            return Err(GasError::gas_overflow(descriptor));
        };
        self.consumed = consumed;
        Ok(())
    }

    fn refund_gas(&mut self, amount: Gas, descriptor: &str) -> Result<(), GasError> {
        let Some(consumed) = self.consumed.checked_sub(amount) else {
            trace!(descriptor, amount, consumed = self.consumed, "refund exceeds consumed gas");
            return Err(GasError::negative_gas_consumed(descriptor));
        };
        self.consumed = consumed;
        Ok(())
    }

    fn is_past_limit(&self) -> bool {
        false
    }

    fn is_out_of_gas(&self) -> bool {
        false
    }

    fn report(&self) -> Option<&GasReport> {
        None
    }
}

impl fmt::Display for InfiniteGasMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfiniteGasMeter:\n  consumed: {}", self.consumed)
    }
}

/// Create a bounded meter. See [`BasicGasMeter::new`].
pub fn new_gas_meter(limit: Gas, cost_breakdown: bool) -> BasicGasMeter {
    BasicGasMeter::new(limit, cost_breakdown)
}

/// Create an unbounded meter.
pub fn new_infinite_gas_meter() -> InfiniteGasMeter {
    InfiniteGasMeter::new()
}
