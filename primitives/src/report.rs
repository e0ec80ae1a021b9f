//! Per-descriptor gas breakdown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gas::Gas;

/// Cumulative gas charged under each descriptor.
///
/// Backed by a `BTreeMap` so iteration and serialization are in a
/// deterministic (sorted) order. Descriptors are an open vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GasReport {
    entries: BTreeMap<String, Gas>,
}

impl GasReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the entry for `descriptor`, creating it if absent.
    ///
    /// Entries saturate at `Gas::MAX`; the meter checks overflow of the
    /// total before recording, so this only matters for hand-built reports.
    pub fn add(&mut self, descriptor: &str, amount: Gas) {
        let entry = self.entry_mut(descriptor);
        *entry = entry.saturating_add(amount);
    }

    /// Subtract `amount` from the entry for `descriptor`, saturating at zero.
    ///
    /// A refund under a descriptor that was charged less (or never charged)
    /// leaves that entry at zero rather than wrapping.
    pub fn sub(&mut self, descriptor: &str, amount: Gas) {
        let entry = self.entry_mut(descriptor);
        *entry = entry.saturating_sub(amount);
    }

    /// Returns the gas recorded under `descriptor`, if any.
    pub fn get(&self, descriptor: &str) -> Option<Gas> {
        self.entries.get(descriptor).copied()
    }

    /// Sum of all entries, saturating.
    pub fn total(&self) -> Gas {
        self.entries
            .values()
            .fold(0, |acc: Gas, v| acc.saturating_add(*v))
    }

    /// Iterate entries in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Gas)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of descriptors recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, descriptor: &str) -> &mut Gas {
        self.entries.entry(descriptor.to_owned()).or_default()
    }
}
