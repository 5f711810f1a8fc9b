//! UTXO selection
//!
//! This module finds a set of an address's unspent outputs whose total covers
//! a requested amount plus the fee for that many inputs, within a wall-clock
//! budget. Outputs are visited page by page so that addresses with very large
//! output sets never have to be loaded at once.
//!
//! # Components
//!
//! - [`types`]: requests, strategies and the accepted [`Selection`]
//! - [`accumulator`]: duplicate-safe working set with fee tracking
//! - [`pages`]: page arithmetic and the cyclic page walk
//! - [`filter`]: lock, mempool and confirmation-depth eligibility
//! - [`strategies`]: page ordering for the random and fewest-inputs searches
//! - [`engine`]: the bounded search itself

pub mod accumulator;
pub mod engine;
pub mod filter;
pub mod pages;
pub mod strategies;
pub mod types;

pub use accumulator::CandidateSet;
pub use engine::SelectionEngine;
pub use types::{Selection, SelectionRequest, SelectionStrategy};
