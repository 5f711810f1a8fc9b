//! Page ordering strategies
//!
//! A strategy decides three things for the selection engine: which page the
//! search starts on, in which order a page's eligible outputs are offered to
//! the accumulator, and whether the first complete combination ends the
//! search. Everything else (filtering, budget checks, accumulation) is shared
//! and lives in [`crate::selection::engine`].

use crate::selection::types::{Selection, SelectionStrategy};
use crate::types::UnspentOutput;
use rand::RngCore;

pub mod fewest_inputs;
pub mod random;

pub use fewest_inputs::FewestInputsOrdering;
pub use random::RandomOrdering;

/// Trait defining how a strategy walks the pages of an address
pub trait PageOrdering: Send + Sync {
    /// Name of this strategy
    fn name(&self) -> &'static str;

    /// Page the search starts on
    ///
    /// # Arguments
    /// * `page_count` - Number of pages, at least 1
    /// * `rng` - Randomness source of the request
    fn start_page(&self, page_count: usize, rng: &mut dyn RngCore) -> usize;

    /// Reorder the eligible outputs of one page in place
    fn order(&self, outputs: &mut [UnspentOutput], rng: &mut dyn RngCore);

    /// Whether the first complete combination is accepted immediately
    fn stops_at_first_match(&self) -> bool;
}

/// Result of offering a new complete combination against the best so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The candidate becomes the new best
    Replaced,
    /// The current best is kept
    Kept,
}

/// Compare a new complete combination against the current best
///
/// Strictly fewer inputs wins; on a tie the earlier combination is kept.
pub fn compare(best: Option<&Selection>, candidate: &Selection) -> Outcome {
    match best {
        Some(best) if best.len() <= candidate.len() => Outcome::Kept,
        _ => Outcome::Replaced,
    }
}

/// Get the ordering for a strategy
pub fn ordering_for(strategy: SelectionStrategy) -> &'static dyn PageOrdering {
    match strategy {
        SelectionStrategy::Random => &RandomOrdering,
        SelectionStrategy::FewestInputs => &FewestInputsOrdering,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use bitcoin::{Amount, OutPoint, Txid};

    fn selection(inputs: u8) -> Selection {
        let outputs = (0..inputs)
            .map(|tag| {
                UnspentOutput::new(
                    OutPoint::new(Txid::from_byte_array([tag; 32]), 0),
                    Amount::from_sat(1),
                    1,
                )
            })
            .collect();
        Selection {
            outputs,
            target: Amount::ZERO,
            total: Amount::ZERO,
            fee: Amount::ZERO,
            change: Amount::ZERO,
            tip_height: 1,
        }
    }

    #[test]
    fn test_first_candidate_replaces_nothing() {
        assert_eq!(compare(None, &selection(3)), Outcome::Replaced);
    }

    #[test]
    fn test_fewer_inputs_replace() {
        let best = selection(3);
        assert_eq!(compare(Some(&best), &selection(2)), Outcome::Replaced);
        assert_eq!(compare(Some(&best), &selection(4)), Outcome::Kept);
    }

    #[test]
    fn test_tie_keeps_earlier() {
        let best = selection(2);
        assert_eq!(compare(Some(&best), &selection(2)), Outcome::Kept);
    }

    #[test]
    fn test_ordering_for() {
        assert_eq!(ordering_for(SelectionStrategy::Random).name(), "Random");
        assert!(ordering_for(SelectionStrategy::Random).stops_at_first_match());
        assert_eq!(ordering_for(SelectionStrategy::FewestInputs).name(), "FewestInputs");
        assert!(!ordering_for(SelectionStrategy::FewestInputs).stops_at_first_match());
    }
}
