//! Core error types.
//!
//! Configuration problems are fatal and rejected before a session starts.
//! A duplicate outcome is an internal sequencing bug, not a user-visible
//! condition: the clock guards every commit against the ledger first.

use thiserror::Error;

/// Errors from validating a [`crate::model::SessionConfig`].
// No Eq: MatchRateOutOfRange carries an f64.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The trial count must be positive.
    #[error("trial count must be positive")]
    EmptySession,

    /// The lag must be at least 1.
    #[error("lag must be at least 1")]
    LagZero,

    /// The lag leaves no eligible trials.
    #[error("lag {lag} must be smaller than trial count {trial_count}")]
    LagTooLarge { lag: usize, trial_count: usize },

    /// The lag exceeds the configured maximum.
    #[error("lag {lag} exceeds maximum {max_lag}")]
    LagAboveMax { lag: usize, max_lag: usize },

    /// At least `lag + 1` distinct symbols are needed for non-trivial sequences.
    #[error("alphabet has {len} symbols, need at least {needed}")]
    AlphabetTooSmall { len: usize, needed: usize },

    /// The target match rate must be a ratio.
    #[error("target match rate {0} is outside [0, 1]")]
    MatchRateOutOfRange(f64),

    /// The response window must close before the next stimulus.
    #[error("response window {response_ms}ms must be shorter than stimulus interval {stimulus_ms}ms")]
    ResponseWindowTooLong { response_ms: u64, stimulus_ms: u64 },
}

/// Errors from the response ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// An outcome already exists for this trial index.
    #[error("outcome already recorded for trial {0}")]
    DuplicateOutcome(usize),
}
