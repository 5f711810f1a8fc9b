//! Randomized first-fit ordering
//!
//! Starts on a uniformly drawn page and shuffles every page before it is
//! offered to the accumulator. The first complete combination is accepted.

use crate::selection::strategies::PageOrdering;
use crate::types::UnspentOutput;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Random page start with shuffled pages
pub struct RandomOrdering;

impl PageOrdering for RandomOrdering {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn start_page(&self, page_count: usize, rng: &mut dyn RngCore) -> usize {
        if page_count <= 1 {
            return 0;
        }
        rng.random_range(0..page_count)
    }

    fn order(&self, outputs: &mut [UnspentOutput], rng: &mut dyn RngCore) {
        outputs.shuffle(rng);
    }

    fn stops_at_first_match(&self) -> bool {
        true
    }
}
