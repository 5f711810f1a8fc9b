//! Duplicate-safe accumulation of candidate inputs
//!
//! A [`CandidateSet`] collects outputs one at a time, keeping the running
//! sum and the fee for the current input count in step. Outputs seen twice
//! (for example when pages overlap) are ignored.

use crate::fees::estimate_fee;
use crate::selection::types::Selection;
use crate::types::UnspentOutput;
use bitcoin::{Amount, OutPoint};
use std::collections::HashSet;

/// Working set of candidate inputs
#[derive(Debug, Clone)]
pub struct CandidateSet {
    outputs: Vec<UnspentOutput>,
    seen: HashSet<OutPoint>,
    sum: Amount,
    fee: Amount,
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            outputs: Vec::new(),
            seen: HashSet::new(),
            sum: Amount::ZERO,
            fee: estimate_fee(0),
        }
    }

    /// Add an output unless its outpoint is already present
    ///
    /// # Returns
    /// * true if the output was added
    pub fn add(&mut self, output: UnspentOutput) -> bool {
        if !self.seen.insert(output.outpoint) {
            return false;
        }

        self.sum = Amount::from_sat(self.sum.to_sat().saturating_add(output.value.to_sat()));
        self.outputs.push(output);
        self.fee = estimate_fee(self.outputs.len());
        true
    }

    /// Whether the sum covers `target` plus the fee for the current inputs
    pub fn is_complete(&self, target: Amount) -> bool {
        self.sum.to_sat() >= self.required(target)
    }

    /// Value left over after `target` and fee; zero while incomplete
    pub fn change(&self, target: Amount) -> Amount {
        Amount::from_sat(self.sum.to_sat().saturating_sub(self.required(target)))
    }

    /// Take the contents as a [`Selection`] if complete, leaving the set empty
    ///
    /// Returns `None` and leaves the set untouched while it is incomplete.
    pub fn take_complete(&mut self, target: Amount, tip_height: u32) -> Option<Selection> {
        if !self.is_complete(target) {
            return None;
        }

        let change = self.change(target);
        let taken = std::mem::take(self);
        Some(Selection {
            outputs: taken.outputs,
            target,
            total: taken.sum,
            fee: taken.fee,
            change,
            tip_height,
        })
    }

    /// Clear the set
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether `outpoint` is already part of the set
    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.seen.contains(outpoint)
    }

    /// Outputs in insertion order
    pub fn outputs(&self) -> &[UnspentOutput] {
        &self.outputs
    }

    /// Number of inputs
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Running sum of values
    pub fn sum(&self) -> Amount {
        self.sum
    }

    /// Fee for the current input count
    pub fn fee(&self) -> Amount {
        self.fee
    }

    fn required(&self, target: Amount) -> u64 {
        target.to_sat().saturating_add(self.fee.to_sat())
    }
}
