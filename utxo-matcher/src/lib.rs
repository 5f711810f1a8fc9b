//! UTXO Matcher Library
//!
//! This crate finds a set of an address's unspent outputs that covers a
//! requested amount plus the fee for spending them, under a wall-clock budget,
//! over address indices too large to load at once.
//!
//! # Modules
//!
//! - `types`: Unspent output snapshots and amount constants
//! - `error`: The request-level error type and its categories
//! - `fees`: Input-count based fee estimation
//! - `chain`: Collaborator traits (UTXO index, locks, mempool, chain state) and in-memory implementations
//! - `selection`: Pagination, eligibility filtering, strategies and the bounded search
//! - `api`: Request validation and JSON responses
//! - `config`: Configuration management
//! - `logging`: Logging infrastructure
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use utxo_matcher::chain::{BlockLockOracle, ChainContext, MemoryChain, MemoryMempool, MemoryUtxoIndex};
//! use utxo_matcher::config::MatcherConfig;
//! use utxo_matcher::AddressService;
//!
//! let index = Arc::new(MemoryUtxoIndex::new());
//! let chain = Arc::new(MemoryChain::new(100, 0));
//! let locks = Arc::new(BlockLockOracle::new(chain.clone(), chain.clone()));
//! let context = ChainContext::new(index, locks, Arc::new(MemoryMempool::new()), chain);
//!
//! let service = AddressService::new(context, &MatcherConfig::default()).unwrap();
//! let response = service.handle_unspent_amount(&serde_json::json!({
//!     "address": "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2",
//!     "amount": 1000
//! }));
//! assert_eq!(response["error"]["code"], "no_data_available");
//! ```

/// Core domain types
pub mod types;

/// Error handling
pub mod error;

/// Fee estimation
pub mod fees;

/// Chain collaborators
pub mod chain;

/// UTXO selection
pub mod selection;

/// Request handling
pub mod api;

/// Configuration management
pub mod config;

/// Logging infrastructure
pub mod logging;

pub use api::{AddressService, ErrorResponse, ListUnspentRequest, UnspentAmountRequest};
pub use chain::{ChainContext, ChainError};
pub use config::MatcherConfig;
pub use error::{MatchError, MatchResult};
pub use selection::{Selection, SelectionEngine, SelectionRequest, SelectionStrategy};
pub use types::UnspentOutput;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
