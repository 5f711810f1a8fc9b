//! Address request handling
//!
//! [`AddressService`] is the outer surface of the crate. It validates incoming
//! requests, resolves the address to its script, runs the selection engine or
//! the unspent listing, and renders results as JSON-ready response types.
//! Amounts in responses are decimal coin values with eight fractional digits,
//! serialized as strings.
//!
//! Every call yields either a complete response or a single
//! [`ErrorResponse`]; partial results are never produced.

use crate::chain::{ChainContext, PageQuery};
use crate::config::{MatcherConfig, MAX_LISTING_PAGE_SIZE};
use crate::error::{MatchError, MatchResult};
use crate::logging::{log_api, log_params, sanitize_for_logging, LogLevel};
use crate::selection::pages::{page_bounds, page_count};
use crate::selection::strategies::ordering_for;
use crate::selection::{Selection, SelectionEngine, SelectionRequest, SelectionStrategy};
use crate::types::{amount_to_coins, money_range, MAX_MONEY};
use anyhow::Result;
use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Amount, Network, ScriptBuf};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Request for a set of outputs covering an amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentAmountRequest {
    /// Address whose outputs are spent
    pub address: String,
    /// Requested amount in minor units
    pub amount: i64,
    /// Random first fit when true, fewest inputs otherwise
    #[serde(default = "default_true")]
    pub random: bool,
    /// Only use outputs deep enough for fast settlement
    #[serde(default)]
    pub fast_settlement: bool,
}

/// Request for one page of an address's unspent outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUnspentRequest {
    /// Address to list
    pub address: String,
    /// 1-based page number
    pub page_number: i64,
    /// Outputs per page, 1 to 1000
    pub page_size: i64,
    /// Oldest keys first when true, newest first otherwise
    #[serde(default)]
    pub ascending: bool,
}

fn default_true() -> bool {
    true
}

/// One selected input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOutput {
    pub txid: String,
    pub index: u32,
    pub confirmations: u32,
    pub amount: Decimal,
}

/// Successful selection response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentAmountResponse {
    pub block_height: u32,
    pub script_pub_key: String,
    pub address: String,
    pub requested_amount: Decimal,
    pub final_amount: Decimal,
    pub fee: Decimal,
    pub change: Decimal,
    pub utxos: Vec<SelectedOutput>,
}

impl UnspentAmountResponse {
    fn from_selection(address: &str, script: &ScriptBuf, selection: &Selection) -> Self {
        let utxos = selection
            .outputs()
            .iter()
            .map(|output| SelectedOutput {
                txid: output.txid().to_string(),
                index: output.index(),
                confirmations: output.confirmations(selection.tip_height()),
                amount: amount_to_coins(output.value),
            })
            .collect();

        Self {
            block_height: selection.tip_height(),
            script_pub_key: hex::encode(script.as_bytes()),
            address: address.to_string(),
            requested_amount: amount_to_coins(selection.target()),
            final_amount: amount_to_coins(selection.total()),
            fee: amount_to_coins(selection.fee()),
            change: amount_to_coins(selection.change()),
            utxos,
        }
    }
}

/// One listed output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedOutput {
    pub txid: String,
    pub index: u32,
    pub value: Decimal,
    pub height: u32,
    /// Already spent by a mempool transaction
    pub in_mempool: bool,
    /// Not time-locked
    pub spendable: bool,
}

/// One page of an address's unspent outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUnspentResponse {
    pub count: usize,
    pub pages: usize,
    pub page: usize,
    pub block_height: u32,
    pub address: String,
    pub script: String,
    pub utxos: Vec<ListedOutput>,
}

/// Error body of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Code, message and retry hint of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&MatchError> for ErrorResponse {
    fn from(error: &MatchError) -> Self {
        Self {
            error: ErrorBody {
                code: error.code().to_string(),
                message: error.user_message(),
                retryable: error.is_retry_safe(),
            },
        }
    }
}

/// Request handler for address queries
pub struct AddressService {
    engine: SelectionEngine,
    network: Network,
    match_timeout: Duration,
    rng: Mutex<StdRng>,
}

impl AddressService {
    /// Create a service over `context`
    ///
    /// Fails when the configuration does not validate.
    pub fn new(context: ChainContext, config: &MatcherConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.selection.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            engine: SelectionEngine::new(context, &config.selection),
            network: config.network.network()?,
            match_timeout: config.selection.match_timeout(),
            rng: Mutex::new(rng),
        })
    }

    /// Network addresses are parsed for
    pub fn network(&self) -> Network {
        self.network
    }

    /// Find outputs of an address covering the requested amount plus fee
    ///
    /// # Arguments
    /// * `request` - Address, amount, strategy flag and fast-settlement flag
    ///
    /// # Returns
    /// * The selected outputs with fee and change, or the error that ended the search
    pub fn unspent_amount(&self, request: &UnspentAmountRequest) -> MatchResult<UnspentAmountResponse> {
        let target = validate_amount(request.amount)?;
        let script = self.resolve_script(&request.address)?;
        let strategy = SelectionStrategy::from_random_flag(request.random);

        log_api(
            LogLevel::Debug,
            "unspent_amount",
            Some(log_params(vec![
                ("address", sanitize_for_logging(&request.address)),
                ("amount", request.amount.to_string()),
                ("strategy", ordering_for(strategy).name().to_string()),
            ])),
        );

        let selection_request = SelectionRequest::new(script.clone(), target, self.match_timeout)
            .with_strategy(strategy)
            .with_fast_settlement(request.fast_settlement);

        let mut rng = self.request_rng();
        let selection = self.engine.select(&selection_request, &mut rng)?;

        Ok(UnspentAmountResponse::from_selection(&request.address, &script, &selection))
    }

    /// List one page of an address's unspent outputs
    pub fn list_unspent(&self, request: &ListUnspentRequest) -> MatchResult<ListUnspentResponse> {
        if request.page_number < 1 {
            return Err(MatchError::validation("pageNumber must be at least 1"));
        }
        let page_size = usize::try_from(request.page_size)
            .ok()
            .filter(|size| (1..=MAX_LISTING_PAGE_SIZE).contains(size))
            .ok_or_else(|| {
                MatchError::validation(format!("pageSize must be between 1 and {}", MAX_LISTING_PAGE_SIZE))
            })?;

        let script = self.resolve_script(&request.address)?;
        let context = self.engine.context();

        let summary = context.utxos.unspent_count(&script)?;
        if summary.count == 0 {
            return Err(MatchError::NoDataAvailable);
        }

        let pages = page_count(summary.count, page_size);
        let page = usize::try_from(request.page_number).unwrap_or(usize::MAX);
        if page > pages {
            return Err(MatchError::PageOutOfRange { pages });
        }

        let bounds = page_bounds(page - 1, summary.count, page_size);
        let query = if request.ascending {
            PageQuery::ascending(bounds.offset, bounds.limit)
        } else {
            PageQuery::descending(summary.last_key, bounds.offset, bounds.limit)
        };

        let mut utxos = Vec::with_capacity(bounds.limit);
        for output in context.utxos.fetch_page(&script, &query)? {
            let in_mempool = context.conflicts.is_conflicted(&output.outpoint)?;
            let locked = context.locks.is_locked(output.height, &output.outpoint.txid, &script)?;
            utxos.push(ListedOutput {
                txid: output.txid().to_string(),
                index: output.index(),
                value: amount_to_coins(output.value),
                height: output.height,
                in_mempool,
                spendable: !locked,
            });
        }

        Ok(ListUnspentResponse {
            count: summary.count,
            pages,
            page,
            block_height: context.chain.tip_height()?,
            address: request.address.clone(),
            script: hex::encode(script.as_bytes()),
            utxos,
        })
    }

    /// Handle a JSON selection request body
    ///
    /// Returns the success response or an [`ErrorResponse`] as JSON.
    pub fn handle_unspent_amount(&self, body: &serde_json::Value) -> serde_json::Value {
        respond(parse_body(body).and_then(|request| self.unspent_amount(&request)))
    }

    /// Handle a JSON listing request body
    pub fn handle_list_unspent(&self, body: &serde_json::Value) -> serde_json::Value {
        respond(parse_body(body).and_then(|request| self.list_unspent(&request)))
    }

    fn resolve_script(&self, address: &str) -> MatchResult<ScriptBuf> {
        let unchecked: Address<NetworkUnchecked> = address
            .parse()
            .map_err(|_| MatchError::InvalidAddress(address.to_string()))?;
        let checked = unchecked
            .require_network(self.network)
            .map_err(|_| MatchError::InvalidAddress(address.to_string()))?;
        Ok(checked.script_pubkey())
    }

    /// Derive a per-request generator so requests never share one lock for a whole search
    fn request_rng(&self) -> StdRng {
        let mut shared = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        StdRng::from_rng(&mut *shared)
    }
}

fn validate_amount(amount: i64) -> MatchResult<Amount> {
    match u64::try_from(amount) {
        Ok(sats) if sats >= 1 && money_range(Amount::from_sat(sats)) => Ok(Amount::from_sat(sats)),
        _ => Err(MatchError::validation(format!(
            "amount must be between 1 and {}",
            MAX_MONEY
        ))),
    }
}

fn parse_body<T: DeserializeOwned>(body: &serde_json::Value) -> MatchResult<T> {
    T::deserialize(body).map_err(|e| MatchError::validation(e.to_string()))
}

fn respond<T: Serialize>(result: MatchResult<T>) -> serde_json::Value {
    let rendered = match &result {
        Ok(response) => serde_json::to_value(response),
        Err(error) => {
            log_api(
                LogLevel::Info,
                "request_failed",
                Some(log_params(vec![
                    ("code", error.code().to_string()),
                    ("category", error.category().as_str().to_string()),
                ])),
            );
            serde_json::to_value(ErrorResponse::from(error))
        }
    };

    rendered.unwrap_or_else(|e| {
        serde_json::json!({
            "error": { "code": "internal_error", "message": e.to_string(), "retryable": false }
        })
    })
}
