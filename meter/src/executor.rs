//! Unit-of-work boundary.
//!
//! `execute_unit` runs one unit of work (e.g. a transaction) against a
//! gas-metered overlay of the committed store. Writes are committed only if
//! the work succeeds, and then as one batch. Any error, and in particular
//! any gas error, aborts the whole unit: buffered writes are dropped and the
//! error is reported in the outcome. Gas errors are never retried here.

use storegas_primitives::{Gas, GasConfig, GasErrorKind, GasReport};
use tracing::{debug, warn};

use crate::error::WorkError;
use crate::gas_kv::GasKvStore;
use crate::gas_meter::GasMeter;
use crate::overlay::OverlayStore;
use crate::state_store::KvStore;

/// Outcome of a unit of work.
#[derive(Debug)]
pub enum WorkOutcome<T> {
    /// The work succeeded and its writes were committed.
    Committed {
        value: T,
        /// Gas consumed by the unit.
        gas_used: Gas,
        /// Breakdown, if the meter tracks one.
        report: Option<GasReport>,
    },
    /// The work failed; nothing was committed.
    Aborted {
        error: WorkError,
        /// Billable gas: consumed gas clamped to the meter limit.
        gas_used: Gas,
    },
}

impl<T> WorkOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn gas_used(&self) -> Gas {
        match self {
            Self::Committed { gas_used, .. } | Self::Aborted { gas_used, .. } => *gas_used,
        }
    }

    /// The gas error kind, if the unit was aborted by one.
    pub fn gas_error_kind(&self) -> Option<GasErrorKind> {
        match self {
            Self::Aborted { error, .. } => error.gas_kind(),
            Self::Committed { .. } => None,
        }
    }
}

/// Run `work` as one unit of work against `store`, charging `meter`.
///
/// The meter should be fresh for this unit; it is left in place so the
/// caller can inspect it afterwards.
pub fn execute_unit<S, M, T, F>(
    store: &mut S,
    meter: &mut M,
    gas_config: GasConfig,
    work: F,
) -> WorkOutcome<T>
where
    S: KvStore + ?Sized,
    M: GasMeter + ?Sized,
    F: FnOnce(&mut GasKvStore<'_, OverlayStore<'_, S>, M>) -> Result<T, WorkError>,
{
    let result = {
        let mut view = OverlayStore::new(&*store);
        let result = {
            let mut gas_store = GasKvStore::new(&mut view, &mut *meter, gas_config);
            work(&mut gas_store)
        };
        result.map(|value| (value, view.into_overlay()))
    };

    let committed = result.and_then(|(value, overlay)| {
        let writes = overlay.len();
        overlay.commit(store)?;
        Ok((value, writes))
    });

    match committed {
        Ok((value, writes)) => {
            let gas_used = meter.gas_consumed();
            debug!(gas_used, writes, "unit of work committed");
            WorkOutcome::Committed {
                value,
                gas_used,
                report: meter.report().cloned(),
            }
        }
        Err(error) => {
            let gas_used = meter.gas_consumed_to_limit();
            warn!(
                gas_used,
                gas_consumed = meter.gas_consumed(),
                limit = meter.limit(),
                %error,
                "unit of work aborted"
            );
            WorkOutcome::Aborted { error, gas_used }
        }
    }
}
