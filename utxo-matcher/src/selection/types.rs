//! Core types for UTXO selection
//!
//! - [`SelectionStrategy`]: how pages are ordered and when the search stops
//! - [`SelectionRequest`]: one selection call, created per request
//! - [`Selection`]: an accepted, immutable set of inputs with fee and change

use crate::types::UnspentOutput;
use bitcoin::{Amount, ScriptBuf};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// UTXO selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Randomized first fit
    ///
    /// Starts at a random page, shuffles every page and accepts the first
    /// combination that covers the target plus fee.
    Random,

    /// Greedy fewest inputs
    ///
    /// Starts at the first page, walks every page largest value first and
    /// keeps the combination with the fewest inputs until the full cycle is
    /// done or the time budget runs out.
    FewestInputs,
}

impl SelectionStrategy {
    /// Map the API's `random` flag to a strategy
    pub fn from_random_flag(random: bool) -> Self {
        if random {
            SelectionStrategy::Random
        } else {
            SelectionStrategy::FewestInputs
        }
    }
}

/// A single selection call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Destination script of the address whose outputs are spent
    pub script: ScriptBuf,
    /// Amount that must be covered on top of the fee
    pub target: Amount,
    /// Ordering and termination policy
    pub strategy: SelectionStrategy,
    /// Only accept outputs with enough confirmations for fast settlement
    pub fast_settlement: bool,
    /// Wall-clock budget for the whole search
    pub budget: Duration,
}

impl SelectionRequest {
    /// Create a request with the random strategy and no fast settlement
    pub fn new(script: ScriptBuf, target: Amount, budget: Duration) -> Self {
        Self {
            script,
            target,
            strategy: SelectionStrategy::Random,
            fast_settlement: false,
            budget,
        }
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Require fast settlement depth
    pub fn with_fast_settlement(mut self, fast_settlement: bool) -> Self {
        self.fast_settlement = fast_settlement;
        self
    }
}

/// An accepted input set
///
/// Invariants: no outpoint appears twice, `fee` is the fee for exactly
/// `outputs.len()` inputs and `total == target + fee + change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub(crate) outputs: Vec<UnspentOutput>,
    pub(crate) target: Amount,
    pub(crate) total: Amount,
    pub(crate) fee: Amount,
    pub(crate) change: Amount,
    pub(crate) tip_height: u32,
}

impl Selection {
    /// Selected outputs in the order they were added
    pub fn outputs(&self) -> &[UnspentOutput] {
        &self.outputs
    }

    /// Number of inputs
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether the selection holds no inputs
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Requested amount
    pub fn target(&self) -> Amount {
        self.target
    }

    /// Sum of the selected values
    pub fn total(&self) -> Amount {
        self.total
    }

    /// Fee for the selected input count
    pub fn fee(&self) -> Amount {
        self.fee
    }

    /// Value left over after target and fee
    pub fn change(&self) -> Amount {
        self.change
    }

    /// Tip height the selection was evaluated against
    pub fn tip_height(&self) -> u32 {
        self.tip_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_flag() {
        assert_eq!(SelectionStrategy::from_random_flag(true), SelectionStrategy::Random);
        assert_eq!(SelectionStrategy::from_random_flag(false), SelectionStrategy::FewestInputs);
    }

    #[test]
    fn test_request_builder() {
        let request = SelectionRequest::new(ScriptBuf::new(), Amount::from_sat(1), Duration::from_secs(1))
            .with_strategy(SelectionStrategy::FewestInputs)
            .with_fast_settlement(true);
        assert_eq!(request.strategy, SelectionStrategy::FewestInputs);
        assert!(request.fast_settlement);
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&SelectionStrategy::FewestInputs).unwrap();
        assert_eq!(json, "\"fewest_inputs\"");
    }
}
