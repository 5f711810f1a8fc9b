//! Fewest-inputs ordering
//!
//! Walks every page from the first one, offering outputs largest value first
//! so that each completed combination uses as few inputs as the page allows.
//! The search continues over all pages and keeps the smallest combination.

use crate::selection::strategies::PageOrdering;
use crate::types::UnspentOutput;
use rand::RngCore;
use std::cmp::Reverse;

/// Largest-first ordering from the first page
pub struct FewestInputsOrdering;

impl PageOrdering for FewestInputsOrdering {
    fn name(&self) -> &'static str {
        "FewestInputs"
    }

    fn start_page(&self, _page_count: usize, _rng: &mut dyn RngCore) -> usize {
        0
    }

    fn order(&self, outputs: &mut [UnspentOutput], _rng: &mut dyn RngCore) {
        // Stable: equal values keep their index order.
        outputs.sort_by_key(|output| Reverse(output.value));
    }

    fn stops_at_first_match(&self) -> bool {
        false
    }
}
