//! Time-lock evaluation against historical blocks
//!
//! Outputs may carry their own lock: a block height or a unix timestamp
//! before which they cannot be spent. The lock lives in the creating
//! transaction, so deciding it requires reading the block that mined the
//! output. A block that cannot be read, or a transaction missing from the
//! block it was indexed under, is an integrity failure and is reported as an
//! error rather than treated as unlocked.

use super::{BlockSource, ChainError, ChainState, LockOracle};
use bitcoin::{Script, Txid};
use log::trace;
use std::sync::Arc;

/// Lock values below this threshold are block heights, values at or above
/// it are unix timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Decide whether a lock value is still in force
///
/// # Arguments
/// * `lock_time` - Lock value of the output (0 means no lock)
/// * `tip_height` - Height of the current tip
/// * `median_time_past` - Median time past of the current tip
pub fn lock_in_force(lock_time: u32, tip_height: u32, median_time_past: i64) -> bool {
    if lock_time == 0 {
        return false;
    }

    if lock_time < LOCKTIME_THRESHOLD {
        tip_height < lock_time
    } else {
        median_time_past < i64::from(lock_time)
    }
}

/// [`LockOracle`] backed by historical blocks and the current chain state
pub struct BlockLockOracle {
    blocks: Arc<dyn BlockSource>,
    chain: Arc<dyn ChainState>,
}

impl BlockLockOracle {
    /// Create an oracle reading blocks from `blocks` and the tip from `chain`
    pub fn new(blocks: Arc<dyn BlockSource>, chain: Arc<dyn ChainState>) -> Self {
        Self { blocks, chain }
    }
}

impl LockOracle for BlockLockOracle {
    fn is_locked(&self, block_height: u32, txid: &Txid, script: &Script) -> Result<bool, ChainError> {
        let block = self.blocks.read_block(block_height)?;

        let tx = block
            .transaction(txid)
            .ok_or(ChainError::TransactionNotFound {
                txid: *txid,
                height: block_height,
            })?;

        // Only the first output paying to the address decides the lock.
        let output = match tx.outputs.iter().find(|out| out.script_pubkey.as_script() == script) {
            Some(output) => output,
            None => return Ok(false),
        };

        if output.lock_time == 0 {
            return Ok(false);
        }

        let locked = lock_in_force(
            output.lock_time,
            self.chain.tip_height()?,
            self.chain.median_time_past()?,
        );

        trace!("Output of {} locked until {}: {}", txid, output.lock_time, locked);

        Ok(locked)
    }
}
