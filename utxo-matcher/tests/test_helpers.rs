//! Shared fixtures for integration tests
#![allow(dead_code)]

use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, Network, OutPoint, ScriptBuf, Txid};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};
use utxo_matcher::chain::{
    BlockLockOracle, ChainContext, MemoryChain, MemoryMempool, MemoryUtxoIndex, StoredOutput,
};
use utxo_matcher::config::MatcherConfig;
use utxo_matcher::logging::{self, LogConfig, LogLevel};
use utxo_matcher::types::{UnspentOutput, COIN};
use utxo_matcher::{AddressService, SelectionEngine};

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn setup() {
    INIT.call_once(|| {
        let config = LogConfig {
            level: LogLevel::Debug,
            ..LogConfig::default()
        };
        let _ = logging::init(&config);
    });
}

/// Tip height every fixture starts at
pub const TIP_HEIGHT: u32 = 1_000;

/// Coins to minor units
pub fn coins(n: u64) -> u64 {
    n * COIN
}

/// A regtest address derived from `tag`
pub fn address(tag: u8) -> Address {
    Address::p2wsh(&ScriptBuf::from(vec![0x51, tag]), Network::Regtest)
}

/// Configuration for regtest fixtures
pub fn regtest_config() -> MatcherConfig {
    let mut config = MatcherConfig::default();
    config.network.network = "regtest".to_string();
    config.selection.rng_seed = Some(7);
    config
}

/// In-memory chain with an address index, a mempool and historical blocks
pub struct Fixture {
    pub index: Arc<MemoryUtxoIndex>,
    pub chain: Arc<MemoryChain>,
    pub mempool: Arc<MemoryMempool>,
    pub context: ChainContext,
    next_tx: AtomicU32,
}

impl Fixture {
    pub fn new() -> Self {
        setup();

        let index = Arc::new(MemoryUtxoIndex::new());
        let chain = Arc::new(MemoryChain::new(TIP_HEIGHT, 1_700_000_000));
        let mempool = Arc::new(MemoryMempool::new());
        let locks = Arc::new(BlockLockOracle::new(chain.clone(), chain.clone()));
        let context = ChainContext::new(index.clone(), locks, mempool.clone(), chain.clone());

        Self {
            index,
            chain,
            mempool,
            context,
            next_tx: AtomicU32::new(1),
        }
    }

    /// Next transaction id; ids sort in creation order
    pub fn next_txid(&self) -> Txid {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&n.to_be_bytes());
        Txid::from_byte_array(bytes)
    }

    /// Mine an output paying `sats` to `address` at `height` with `lock_time`
    pub fn fund_locked(&self, address: &Address, sats: u64, height: u32, lock_time: u32) -> UnspentOutput {
        let txid = self.next_txid();
        let script = address.script_pubkey();
        self.chain.record_output(
            height,
            txid,
            StoredOutput {
                script_pubkey: script.clone(),
                value: Amount::from_sat(sats),
                lock_time,
            },
        );
        let output = UnspentOutput::new(OutPoint::new(txid, 0), Amount::from_sat(sats), height);
        self.index.insert(script, output.clone());
        output
    }

    /// Mine an unlocked output at height 10
    pub fn fund(&self, address: &Address, sats: u64) -> UnspentOutput {
        self.fund_locked(address, sats, 10, 0)
    }

    /// Mine one unlocked output per value
    pub fn fund_all(&self, address: &Address, values: &[u64]) -> Vec<UnspentOutput> {
        values.iter().map(|sats| self.fund(address, *sats)).collect()
    }

    /// Selection engine with the given page size
    pub fn engine(&self, page_size: usize) -> SelectionEngine {
        let mut config = regtest_config();
        config.selection.page_size = page_size;
        SelectionEngine::new(self.context.clone(), &config.selection)
    }

    /// Address service with the regtest configuration
    pub fn service(&self) -> AddressService {
        self.service_with(regtest_config())
    }

    /// Address service with a custom configuration
    pub fn service_with(&self, config: MatcherConfig) -> AddressService {
        AddressService::new(self.context.clone(), &config).expect("valid test config")
    }
}
