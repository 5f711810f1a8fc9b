//! In-memory chain collaborators
//!
//! These implementations hold a snapshot of an address index, a mempool
//! spent index and a set of historical blocks behind `RwLock`s. Readers never
//! wait: if a writer currently holds a lock (for example while an index is
//! rebuilt through [`MemoryUtxoIndex::begin_rebuild`]) reads fail with
//! [`ChainError::Busy`].
//!
//! They back the test suite and are suitable for embedders that already keep
//! a snapshot in memory.

use super::{
    read_or_busy, BlockSource, ChainError, ChainState, ConflictFilter, PageQuery, SortOrder,
    StoredBlock, StoredOutput, StoredTransaction, UnspentCount, UtxoSource,
};
use crate::logging::{log_chain, LogLevel};
use crate::types::UnspentOutput;
use bitcoin::{Amount, OutPoint, Script, ScriptBuf, Txid};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::{RwLock, RwLockWriteGuard};

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    value: Amount,
    height: u32,
}

type AddressIndex = HashMap<ScriptBuf, BTreeMap<OutPoint, IndexEntry>>;

/// Key-ordered unspent output index per address script
#[derive(Default)]
pub struct MemoryUtxoIndex {
    entries: RwLock<AddressIndex>,
}

/// Exclusive access to a [`MemoryUtxoIndex`] while it is being rebuilt
///
/// Readers fail with [`ChainError::Busy`] until the guard is dropped.
pub struct RebuildGuard<'a> {
    entries: RwLockWriteGuard<'a, AddressIndex>,
}

impl RebuildGuard<'_> {
    /// Drop every entry of the index
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insert an output while rebuilding
    pub fn insert(&mut self, script: ScriptBuf, output: UnspentOutput) {
        insert_entry(&mut self.entries, script, output);
    }
}

fn insert_entry(entries: &mut AddressIndex, script: ScriptBuf, output: UnspentOutput) {
    entries.entry(script).or_default().insert(
        output.outpoint,
        IndexEntry {
            value: output.value,
            height: output.height,
        },
    );
}

impl MemoryUtxoIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unspent output paying to `script`
    ///
    /// Blocks while readers hold the index; intended for setup and tests.
    pub fn insert(&self, script: ScriptBuf, output: UnspentOutput) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        insert_entry(&mut entries, script, output);
    }

    /// Remove a spent output
    ///
    /// # Returns
    /// * true if the output was present
    pub fn remove(&self, script: &Script, outpoint: &OutPoint) -> bool {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .get_mut(script)
            .map(|outputs| outputs.remove(outpoint).is_some())
            .unwrap_or(false)
    }

    /// Take the index for rebuilding; concurrent reads report busy
    pub fn begin_rebuild(&self) -> RebuildGuard<'_> {
        let entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        log_chain(LogLevel::Info, "utxo_index_rebuild_started", None);
        RebuildGuard { entries }
    }
}

impl UtxoSource for MemoryUtxoIndex {
    fn unspent_count(&self, script: &Script) -> Result<UnspentCount, ChainError> {
        let entries = read_or_busy(&self.entries, "utxo index")?;
        Ok(match entries.get(script) {
            Some(outputs) => UnspentCount {
                count: outputs.len(),
                last_key: outputs.keys().next_back().copied(),
            },
            None => UnspentCount {
                count: 0,
                last_key: None,
            },
        })
    }

    fn fetch_page(&self, script: &Script, query: &PageQuery) -> Result<Vec<UnspentOutput>, ChainError> {
        let entries = read_or_busy(&self.entries, "utxo index")?;
        let outputs = match entries.get(script) {
            Some(outputs) => outputs,
            None => return Ok(Vec::new()),
        };

        let to_output = |(outpoint, entry): (&OutPoint, &IndexEntry)| {
            UnspentOutput::new(*outpoint, entry.value, entry.height)
        };

        let page = match (query.order, query.start) {
            (SortOrder::Ascending, None) => outputs
                .iter()
                .skip(query.offset)
                .take(query.limit)
                .map(to_output)
                .collect(),
            (SortOrder::Ascending, Some(start)) => outputs
                .range((Bound::Included(start), Bound::Unbounded))
                .skip(query.offset)
                .take(query.limit)
                .map(to_output)
                .collect(),
            (SortOrder::Descending, None) => outputs
                .iter()
                .rev()
                .skip(query.offset)
                .take(query.limit)
                .map(to_output)
                .collect(),
            (SortOrder::Descending, Some(start)) => outputs
                .range((Bound::Unbounded, Bound::Included(start)))
                .rev()
                .skip(query.offset)
                .take(query.limit)
                .map(to_output)
                .collect(),
        };

        Ok(page)
    }
}

/// Mempool spent index: outpoints consumed by unconfirmed transactions
#[derive(Default)]
pub struct MemoryMempool {
    spent: RwLock<HashSet<OutPoint>>,
}

impl MemoryMempool {
    /// Create an empty mempool
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an unconfirmed transaction spends `outpoint`
    pub fn add_spend(&self, outpoint: OutPoint) {
        let mut spent = match self.spent.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        spent.insert(outpoint);
    }

    /// Forget a pending spend (mined or evicted)
    pub fn remove_spend(&self, outpoint: &OutPoint) -> bool {
        let mut spent = match self.spent.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        spent.remove(outpoint)
    }
}

impl ConflictFilter for MemoryMempool {
    fn is_conflicted(&self, outpoint: &OutPoint) -> Result<bool, ChainError> {
        let spent = read_or_busy(&self.spent, "mempool")?;
        Ok(spent.contains(outpoint))
    }
}

#[derive(Debug, Clone, Copy)]
struct Tip {
    height: u32,
    median_time_past: i64,
}

/// Chain tip plus historical block bodies
pub struct MemoryChain {
    tip: RwLock<Tip>,
    blocks: RwLock<HashMap<u32, StoredBlock>>,
}

impl MemoryChain {
    /// Create a chain with the given tip and no blocks
    pub fn new(tip_height: u32, median_time_past: i64) -> Self {
        Self {
            tip: RwLock::new(Tip {
                height: tip_height,
                median_time_past,
            }),
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Move the tip
    pub fn set_tip(&self, height: u32, median_time_past: i64) {
        let mut tip = match self.tip.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *tip = Tip {
            height,
            median_time_past,
        };
    }

    /// Store the block body at `height`, replacing any previous one
    pub fn insert_block(&self, height: u32, block: StoredBlock) {
        let mut blocks = match self.blocks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        blocks.insert(height, block);
    }

    /// Make the block at `height` unreadable
    pub fn remove_block(&self, height: u32) -> bool {
        let mut blocks = match self.blocks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        blocks.remove(&height).is_some()
    }

    /// Record an output in the block at `height`
    ///
    /// Appends to the transaction `txid` if the block already contains it,
    /// otherwise adds a new transaction; creates the block when missing.
    pub fn record_output(&self, height: u32, txid: Txid, output: StoredOutput) {
        let mut blocks = match self.blocks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let block = blocks.entry(height).or_default();
        match block.transactions.iter_mut().find(|tx| tx.txid == txid) {
            Some(tx) => tx.outputs.push(output),
            None => block.transactions.push(StoredTransaction {
                txid,
                outputs: vec![output],
            }),
        }
    }
}

impl ChainState for MemoryChain {
    fn tip_height(&self) -> Result<u32, ChainError> {
        Ok(read_or_busy(&self.tip, "chain tip")?.height)
    }

    fn median_time_past(&self) -> Result<i64, ChainError> {
        Ok(read_or_busy(&self.tip, "chain tip")?.median_time_past)
    }
}

impl BlockSource for MemoryChain {
    fn read_block(&self, height: u32) -> Result<StoredBlock, ChainError> {
        let blocks = read_or_busy(&self.blocks, "block store")?;
        blocks
            .get(&height)
            .cloned()
            .ok_or(ChainError::BlockUnreadable { height })
    }
}
