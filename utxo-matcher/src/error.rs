//! Standardized error handling for UTXO matching
//!
//! This module defines the single error type returned by every public
//! operation of the crate. Each variant maps to one failure outcome of a
//! request; a request produces either a complete result or exactly one of
//! these errors, never a partial result.
//!
//! # Retry semantics
//!
//! - [`MatchError::ResourceBusy`] and [`MatchError::SearchTimedOut`] are
//!   retry-safe: the same request may succeed later.
//! - All other variants are deterministic for identical input.
//!
//! # Usage
//!
//! ```
//! use utxo_matcher::error::{MatchError, MatchResult};
//!
//! fn check_target(sats: u64) -> MatchResult<u64> {
//!     if sats == 0 {
//!         return Err(MatchError::validation("target amount must be positive"));
//!     }
//!     Ok(sats)
//! }
//!
//! assert!(check_target(0).is_err());
//! ```

use crate::chain::ChainError;
use thiserror::Error;

/// The main error type for UTXO matching operations
#[derive(Debug, Error)]
pub enum MatchError {
    /// The request was rejected before any search started
    #[error("Validation error: {0}")]
    Validation(String),

    /// A collaborator's store could not be locked promptly
    #[error("Resource busy: {resource}")]
    ResourceBusy { resource: String },

    /// The address could not be parsed for the configured network
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The address has no unspent outputs at all
    #[error("No unspent outputs available for address")]
    NoDataAvailable,

    /// A full pass over all outputs found no combination covering the target
    #[error("Requested amount exceeds balance")]
    InsufficientBalance,

    /// The wall-clock budget ran out before any combination was found
    #[error("No solution found within {budget_ms}ms")]
    SearchTimedOut { budget_ms: u128 },

    /// Historical chain data required for a decision could not be read
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// A requested listing page lies outside the available range
    #[error("Page number out of range: 1 - {pages}")]
    PageOutOfRange { pages: usize },
}

/// Type alias for a Result with MatchError
pub type MatchResult<T> = Result<T, MatchError>;

/// Error category for logging purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected input
    Validation,
    /// Temporary unavailability of a collaborator
    Availability,
    /// Outcome of a completed or interrupted search
    Search,
    /// Corrupt or missing chain data
    Integrity,
}

impl ErrorCategory {
    /// Convert the error category to a string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Availability => "Availability",
            ErrorCategory::Search => "Search",
            ErrorCategory::Integrity => "Integrity",
        }
    }
}

impl MatchError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        MatchError::Validation(message.into())
    }

    /// Create a new resource busy error
    pub fn busy<S: Into<String>>(resource: S) -> Self {
        MatchError::ResourceBusy {
            resource: resource.into(),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::Validation(_) => "validation_error",
            MatchError::ResourceBusy { .. } => "resource_busy",
            MatchError::InvalidAddress(_) => "invalid_address",
            MatchError::NoDataAvailable => "no_data_available",
            MatchError::InsufficientBalance => "insufficient_balance",
            MatchError::SearchTimedOut { .. } => "search_timed_out",
            MatchError::DataIntegrity(_) => "data_integrity_error",
            MatchError::PageOutOfRange { .. } => "page_out_of_range",
        }
    }

    /// Get the category of this error for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            MatchError::Validation(_)
            | MatchError::InvalidAddress(_)
            | MatchError::PageOutOfRange { .. } => ErrorCategory::Validation,
            MatchError::ResourceBusy { .. } => ErrorCategory::Availability,
            MatchError::NoDataAvailable
            | MatchError::InsufficientBalance
            | MatchError::SearchTimedOut { .. } => ErrorCategory::Search,
            MatchError::DataIntegrity(_) => ErrorCategory::Integrity,
        }
    }

    /// Whether retrying the identical request may produce a different outcome
    pub fn is_retry_safe(&self) -> bool {
        matches!(
            self,
            MatchError::ResourceBusy { .. } | MatchError::SearchTimedOut { .. }
        )
    }

    /// Get a message suitable for returning to API clients
    ///
    /// Integrity failures do not expose chain internals such as block heights.
    pub fn user_message(&self) -> String {
        match self {
            MatchError::DataIntegrity(_) => "Can't read chain data required for this request".to_string(),
            MatchError::ResourceBusy { .. } => "Service busy, try again later".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ChainError> for MatchError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Busy(resource) => MatchError::ResourceBusy {
                resource: resource.to_string(),
            },
            other => MatchError::DataIntegrity(other.to_string()),
        }
    }
}
