//! Bounded selection search
//!
//! [`SelectionEngine::select`] runs one search over the outputs of an
//! address:
//!
//! 1. count the outputs and derive the page count
//! 2. pick a start page according to the strategy
//! 3. for each page in ring order: fetch, filter, order, then offer outputs
//!    to the working [`CandidateSet`] one by one
//! 4. on completion, either accept (random) or record the best and move on
//!    to the next page (fewest inputs)
//!
//! The working set carries over between pages until it completes. The time
//! budget is checked before every page fetch and before every output is
//! added; when it runs out the best combination found so far is returned.

use crate::chain::{ChainContext, PageQuery};
use crate::config::SelectionConfig;
use crate::error::{MatchError, MatchResult};
use crate::logging::{log_params, log_selection, LogLevel};
use crate::selection::accumulator::CandidateSet;
use crate::selection::filter::EligibilityFilter;
use crate::selection::pages::{page_bounds, page_count, PageRing};
use crate::selection::strategies::{compare, ordering_for, Outcome};
use crate::selection::types::{Selection, SelectionRequest};
use bitcoin::Amount;
use log::{debug, info};
use rand::RngCore;
use std::time::{Duration, Instant};

/// Log target for search timings
pub const BENCHMARK_TARGET: &str = "utxo_matcher::benchmark";

/// Wall-clock budget of one search
#[derive(Debug, Clone, Copy)]
struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// How the page loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchEnd {
    Accepted,
    Exhausted,
    TimedOut,
}

/// Selection engine over shared chain collaborators
pub struct SelectionEngine {
    context: ChainContext,
    page_size: usize,
    fast_settlement_confirmations: u32,
}

impl SelectionEngine {
    /// Create an engine
    ///
    /// # Arguments
    /// * `context` - Chain collaborators
    /// * `config` - Page size and fast-settlement depth
    pub fn new(context: ChainContext, config: &SelectionConfig) -> Self {
        Self {
            context,
            page_size: config.page_size.max(1),
            fast_settlement_confirmations: config.fast_settlement_confirmations,
        }
    }

    /// Number of outputs fetched per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Collaborators used by this engine
    pub fn context(&self) -> &ChainContext {
        &self.context
    }

    /// Run one selection search
    ///
    /// # Arguments
    /// * `request` - Script, target, strategy and budget
    /// * `rng` - Randomness for the start page and shuffles
    ///
    /// # Returns
    /// * The accepted selection, or the single error that ended the search
    pub fn select(&self, request: &SelectionRequest, rng: &mut dyn RngCore) -> MatchResult<Selection> {
        if request.target == Amount::ZERO {
            return Err(MatchError::validation("target amount must be positive"));
        }

        let deadline = Deadline::new(request.budget);
        let ordering = ordering_for(request.strategy);
        let script = request.script.as_script();

        let count = self.context.utxos.unspent_count(script)?.count;
        let counted_in = deadline.elapsed();
        if count == 0 {
            return Err(MatchError::NoDataAvailable);
        }

        let tip_height = self.context.chain.tip_height()?;
        let pages = page_count(count, self.page_size);
        let start = ordering.start_page(pages, rng);
        let required = request.fast_settlement.then_some(self.fast_settlement_confirmations);
        let filter = EligibilityFilter::new(&self.context, script, tip_height, required);

        log_selection(
            LogLevel::Debug,
            "search_started",
            Some(log_params(vec![
                ("target", request.target.to_sat().to_string()),
                ("strategy", ordering.name().to_string()),
                ("outputs", count.to_string()),
                ("pages", pages.to_string()),
                ("start_page", start.to_string()),
            ])),
        );

        let mut working = CandidateSet::new();
        let mut best: Option<Selection> = None;
        let mut ring = PageRing::new(pages, start);
        let mut end = SearchEnd::Exhausted;

        'pages: for page in ring.by_ref() {
            if deadline.expired() {
                end = SearchEnd::TimedOut;
                break;
            }

            let bounds = page_bounds(page, count, self.page_size);
            let fetched = self
                .context
                .utxos
                .fetch_page(script, &PageQuery::ascending(bounds.offset, bounds.limit))?;
            let mut eligible = filter.retain_eligible(fetched)?;
            ordering.order(&mut eligible, rng);

            for output in eligible {
                if deadline.expired() {
                    end = SearchEnd::TimedOut;
                    break 'pages;
                }

                working.add(output);
                let Some(candidate) = working.take_complete(request.target, tip_height) else {
                    continue;
                };

                debug!(
                    "Complete combination on page {} with {} inputs",
                    page,
                    candidate.len()
                );

                if compare(best.as_ref(), &candidate) == Outcome::Replaced {
                    best = Some(candidate);
                }

                if ordering.stops_at_first_match() {
                    end = SearchEnd::Accepted;
                    break 'pages;
                }
                continue 'pages;
            }
        }

        let total = deadline.elapsed();
        debug!(
            target: BENCHMARK_TARGET,
            "{} search ended {:?} after {} of {} pages: count {}us, scan {}us, total {}us",
            ordering.name(),
            end,
            ring.visited(),
            ring.pages(),
            counted_in.as_micros(),
            total.saturating_sub(counted_in).as_micros(),
            total.as_micros()
        );

        match (best, end) {
            (Some(selection), _) => {
                info!(
                    "Selected {} inputs totalling {} for {} (fee {}, change {})",
                    selection.len(),
                    selection.total(),
                    selection.target(),
                    selection.fee(),
                    selection.change()
                );
                Ok(selection)
            }
            (None, SearchEnd::TimedOut) => Err(MatchError::SearchTimedOut {
                budget_ms: request.budget.as_millis(),
            }),
            (None, _) => Err(MatchError::InsufficientBalance),
        }
    }
}
