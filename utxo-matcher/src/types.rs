//! Core domain types for UTXO matching
//!
//! This module defines the unspent output snapshot shared by the chain
//! collaborators, the selection engine and the API layer, together with the
//! amount constants and conversions used when rendering results.
//!
//! # Key Types
//!
//! - [`UnspentOutput`]: A single unspent output as seen in one page fetch
//!
//! All arithmetic on amounts is integer arithmetic in minor units
//! (`bitcoin::Amount`). Decimal coin values are only produced at the edge,
//! for display and JSON responses.

use bitcoin::{Amount, OutPoint, Txid};
use rust_decimal::Decimal;

/// Number of minor units in one coin
pub const COIN: u64 = 100_000_000;

/// Maximum amount of money that can ever exist, in minor units
pub const MAX_MONEY: u64 = 21_000_000 * COIN;

/// Number of fractional digits used when rendering coin amounts
pub const COIN_DECIMALS: u32 = 8;

/// Unspent transaction output snapshot
///
/// Identity is the `(txid, index)` pair carried by `outpoint`. Instances are
/// produced by a [`crate::chain::UtxoSource`] for one page fetch and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnspentOutput {
    /// Reference to the transaction output (txid and vout)
    pub outpoint: OutPoint,

    /// Value held by this output
    pub value: Amount,

    /// Height of the block that created this output
    pub height: u32,
}

impl UnspentOutput {
    /// Create a new unspent output snapshot
    ///
    /// # Arguments
    /// * `outpoint` - The transaction outpoint (txid and vout)
    /// * `value` - The value held by the output
    /// * `height` - Height of the block containing the creating transaction
    pub fn new(outpoint: OutPoint, value: Amount, height: u32) -> Self {
        Self {
            outpoint,
            value,
            height,
        }
    }

    /// Transaction id of the creating transaction
    pub fn txid(&self) -> Txid {
        self.outpoint.txid
    }

    /// Output index inside the creating transaction
    pub fn index(&self) -> u32 {
        self.outpoint.vout
    }

    /// Number of confirmations at the given tip height
    ///
    /// An output mined in the tip block has one confirmation. Outputs that
    /// claim a height above the tip report zero.
    pub fn confirmations(&self, tip_height: u32) -> u32 {
        if self.height > tip_height {
            0
        } else {
            tip_height - self.height + 1
        }
    }

    /// Get a unique identifier for this output
    pub fn id(&self) -> String {
        format!("{}:{}", self.outpoint.txid, self.outpoint.vout)
    }
}

/// Convert an amount in minor units to a decimal coin value with 8 digits
pub fn amount_to_coins(amount: Amount) -> Decimal {
    let sats = i64::try_from(amount.to_sat()).unwrap_or(i64::MAX);
    Decimal::new(sats, COIN_DECIMALS)
}

/// Check whether an amount lies in the valid money range `0..=MAX_MONEY`
pub fn money_range(amount: Amount) -> bool {
    amount.to_sat() <= MAX_MONEY
}
