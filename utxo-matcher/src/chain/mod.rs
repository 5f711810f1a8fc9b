//! Chain collaborators consumed by the matcher
//!
//! The matcher never owns ledger state. Everything it knows about an
//! address's outputs, pending spends and historical blocks comes through the
//! traits defined here. Implementations are shared, read-mostly services:
//! every method is an independent short-lived read, and an implementation
//! that cannot acquire its store promptly must return [`ChainError::Busy`]
//! instead of blocking.
//!
//! # Traits
//!
//! - [`UtxoSource`]: key-ordered, paginated unspent outputs per address script
//! - [`LockOracle`]: time-lock status of an output
//! - [`ConflictFilter`]: whether an output is already spent in the mempool
//! - [`ChainState`]: current tip height and median time past
//! - [`BlockSource`]: historical block bodies, used by [`locks::BlockLockOracle`]
//!
//! The [`memory`] module provides in-memory implementations of all of them.

use crate::types::UnspentOutput;
use bitcoin::{Amount, OutPoint, Script, ScriptBuf, Txid};
use std::sync::{Arc, RwLock, RwLockReadGuard, TryLockError};
use thiserror::Error;

pub mod locks;
pub mod memory;

pub use locks::BlockLockOracle;
pub use memory::{MemoryChain, MemoryMempool, MemoryUtxoIndex};

/// Errors reported by chain collaborators
#[derive(Debug, Error)]
pub enum ChainError {
    /// The underlying store is locked by a writer (e.g. an index rebuild)
    #[error("{0} is busy")]
    Busy(&'static str),

    /// The underlying store was left in an inconsistent state by a failed writer
    #[error("{0} is corrupted")]
    Corrupted(&'static str),

    /// The block at the given height could not be read
    #[error("Can't read block at height {height}")]
    BlockUnreadable { height: u32 },

    /// The creating transaction is not part of the block it was indexed under
    #[error("Can't find transaction {txid} in block at height {height}")]
    TransactionNotFound { txid: Txid, height: u32 },
}

/// Direction in which the key-ordered output index is walked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest key first
    Ascending,
    /// Largest key first
    Descending,
}

/// Total number of unspent outputs of an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnspentCount {
    /// Number of unspent outputs
    pub count: usize,
    /// Key of the last output in ascending order, if any
    pub last_key: Option<OutPoint>,
}

/// A request for one page of outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Key to start from (inclusive); `None` starts at the first key in `order`
    pub start: Option<OutPoint>,
    /// Number of outputs to skip after `start`
    pub offset: usize,
    /// Maximum number of outputs to return
    pub limit: usize,
    /// Walk direction
    pub order: SortOrder,
}

impl PageQuery {
    /// Ascending page at `offset` from the first key
    pub fn ascending(offset: usize, limit: usize) -> Self {
        Self {
            start: None,
            offset,
            limit,
            order: SortOrder::Ascending,
        }
    }

    /// Descending page at `offset`, walking backwards from `start`
    pub fn descending(start: Option<OutPoint>, offset: usize, limit: usize) -> Self {
        Self {
            start,
            offset,
            limit,
            order: SortOrder::Descending,
        }
    }
}

/// Paginated, key-ordered store of unspent outputs per address script
pub trait UtxoSource: Send + Sync {
    /// Count the unspent outputs paying to `script`
    fn unspent_count(&self, script: &Script) -> Result<UnspentCount, ChainError>;

    /// Fetch one page of unspent outputs paying to `script`
    fn fetch_page(&self, script: &Script, query: &PageQuery) -> Result<Vec<UnspentOutput>, ChainError>;
}

/// Time-lock status of outputs
pub trait LockOracle: Send + Sync {
    /// Whether the output of `txid` paying to `script`, mined at
    /// `block_height`, is still time-locked at the current chain state
    ///
    /// Fails when the creating block cannot be read; callers must treat that
    /// as fatal rather than as "unlocked".
    fn is_locked(&self, block_height: u32, txid: &Txid, script: &Script) -> Result<bool, ChainError>;
}

/// Pending-spend index of the mempool
pub trait ConflictFilter: Send + Sync {
    /// Whether `outpoint` is already spent by an unconfirmed transaction
    fn is_conflicted(&self, outpoint: &OutPoint) -> Result<bool, ChainError>;
}

/// Current best chain state
pub trait ChainState: Send + Sync {
    /// Height of the current tip
    fn tip_height(&self) -> Result<u32, ChainError>;

    /// Median time past of the current tip, as a unix timestamp
    fn median_time_past(&self) -> Result<i64, ChainError>;
}

/// Historical block bodies
pub trait BlockSource: Send + Sync {
    /// Read the block at `height` of the active chain
    fn read_block(&self, height: u32) -> Result<StoredBlock, ChainError>;
}

/// One transaction output as stored in a historical block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOutput {
    /// Destination script
    pub script_pubkey: ScriptBuf,
    /// Output value
    pub value: Amount,
    /// Per-output lock: 0 for none, a height below
    /// [`locks::LOCKTIME_THRESHOLD`], or a unix timestamp otherwise
    pub lock_time: u32,
}

/// A transaction as stored in a historical block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransaction {
    /// Transaction id
    pub txid: Txid,
    /// Outputs in index order
    pub outputs: Vec<StoredOutput>,
}

/// A historical block body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredBlock {
    /// Transactions in block order
    pub transactions: Vec<StoredTransaction>,
}

impl StoredBlock {
    /// Find a transaction by id
    pub fn transaction(&self, txid: &Txid) -> Option<&StoredTransaction> {
        self.transactions.iter().find(|tx| tx.txid == *txid)
    }
}

/// Shared collaborators used by one matcher instance
#[derive(Clone)]
pub struct ChainContext {
    /// Unspent output index
    pub utxos: Arc<dyn UtxoSource>,
    /// Time-lock oracle
    pub locks: Arc<dyn LockOracle>,
    /// Mempool spent index
    pub conflicts: Arc<dyn ConflictFilter>,
    /// Current chain state
    pub chain: Arc<dyn ChainState>,
}

impl ChainContext {
    /// Bundle the collaborators
    pub fn new(
        utxos: Arc<dyn UtxoSource>,
        locks: Arc<dyn LockOracle>,
        conflicts: Arc<dyn ConflictFilter>,
        chain: Arc<dyn ChainState>,
    ) -> Self {
        Self {
            utxos,
            locks,
            conflicts,
            chain,
        }
    }
}

/// Acquire a read guard without blocking
///
/// Returns [`ChainError::Busy`] when a writer holds the lock and
/// [`ChainError::Corrupted`] when a writer panicked while holding it.
pub(crate) fn read_or_busy<'a, T>(
    lock: &'a RwLock<T>,
    resource: &'static str,
) -> Result<RwLockReadGuard<'a, T>, ChainError> {
    match lock.try_read() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::WouldBlock) => Err(ChainError::Busy(resource)),
        Err(TryLockError::Poisoned(_)) => Err(ChainError::Corrupted(resource)),
    }
}
