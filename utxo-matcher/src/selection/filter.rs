//! Spendability filter for fetched pages
//!
//! An output is eligible when it is not time-locked, not already spent by a
//! mempool transaction and, for fast-settlement requests, deep enough in the
//! chain. Lock checks run over the whole page first so that an unreadable
//! block aborts the search even when the output would have been excluded for
//! another reason.

use crate::chain::{ChainContext, ChainError};
use crate::types::UnspentOutput;
use bitcoin::Script;
use log::trace;

/// Eligibility rules for one search
pub struct EligibilityFilter<'a> {
    context: &'a ChainContext,
    script: &'a Script,
    tip_height: u32,
    required_confirmations: Option<u32>,
}

impl<'a> EligibilityFilter<'a> {
    /// Create a filter for outputs paying to `script`
    ///
    /// # Arguments
    /// * `context` - Chain collaborators
    /// * `script` - Address script the outputs pay to
    /// * `tip_height` - Tip height the search is evaluated against
    /// * `required_confirmations` - Minimum depth, or `None` without fast settlement
    pub fn new(
        context: &'a ChainContext,
        script: &'a Script,
        tip_height: u32,
        required_confirmations: Option<u32>,
    ) -> Self {
        Self {
            context,
            script,
            tip_height,
            required_confirmations,
        }
    }

    /// Keep the eligible outputs of a page, preserving their order
    ///
    /// Any collaborator failure is returned as is; a page is never partially
    /// filtered.
    pub fn retain_eligible(&self, outputs: Vec<UnspentOutput>) -> Result<Vec<UnspentOutput>, ChainError> {
        let mut unlocked = Vec::with_capacity(outputs.len());
        for output in outputs {
            if self
                .context
                .locks
                .is_locked(output.height, &output.outpoint.txid, self.script)?
            {
                trace!("Skipping locked output {}", output.id());
                continue;
            }
            unlocked.push(output);
        }

        let mut eligible = Vec::with_capacity(unlocked.len());
        for output in unlocked {
            if self.context.conflicts.is_conflicted(&output.outpoint)? {
                trace!("Skipping output {} spent in mempool", output.id());
                continue;
            }
            if !self.is_deep_enough(&output) {
                trace!("Skipping output {} below fast settlement depth", output.id());
                continue;
            }
            eligible.push(output);
        }

        Ok(eligible)
    }

    fn is_deep_enough(&self, output: &UnspentOutput) -> bool {
        match self.required_confirmations {
            Some(required) => output.confirmations(self.tip_height) >= required,
            None => true,
        }
    }
}
