//! Write-once record of per-trial outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::model::Symbol;

/// What the subject did for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Claimed the stimulus matches the one `lag` positions back.
    Match,
    /// Claimed it does not.
    NoMatch,
    /// The response window expired with no input.
    Timeout,
}

impl Response {
    pub fn from_claim(is_match: bool) -> Self {
        if is_match {
            Response::Match
        } else {
            Response::NoMatch
        }
    }
}

/// The recorded result for one eligible trial. Write-once per index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub index: usize,
    pub stimulus: Symbol,
    pub lagged_stimulus: Symbol,
    pub actual_match: bool,
    pub response: Response,
    pub is_correct: bool,
}

/// One outcome per eligible trial index, duplicates rejected.
#[derive(Debug, Clone, Default)]
pub struct ResponseLedger {
    outcomes: BTreeMap<usize, Outcome>,
}

impl ResponseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome. Fails if the index already has one; given correct
    /// clock sequencing this never happens.
    pub fn record(&mut self, outcome: Outcome) -> Result<(), LedgerError> {
        if self.outcomes.contains_key(&outcome.index) {
            return Err(LedgerError::DuplicateOutcome(outcome.index));
        }
        self.outcomes.insert(outcome.index, outcome);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Outcome> {
        self.outcomes.get(&index)
    }

    /// Used by the clock to decide whether a timeout still applies.
    pub fn contains(&self, index: usize) -> bool {
        self.outcomes.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcomes in trial order.
    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize) -> Outcome {
        Outcome {
            index,
            stimulus: 'A',
            lagged_stimulus: 'A',
            actual_match: true,
            response: Response::Match,
            is_correct: true,
        }
    }

    #[test]
    fn record_and_query() {
        let mut ledger = ResponseLedger::new();
        assert!(ledger.get(2).is_none());
        ledger.record(outcome(2)).unwrap();
        assert_eq!(ledger.get(2).unwrap().index, 2);
        assert!(ledger.contains(2));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut ledger = ResponseLedger::new();
        ledger.record(outcome(3)).unwrap();
        assert_eq!(
            ledger.record(outcome(3)),
            Err(LedgerError::DuplicateOutcome(3))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn iterates_in_trial_order() {
        let mut ledger = ResponseLedger::new();
        ledger.record(outcome(5)).unwrap();
        ledger.record(outcome(2)).unwrap();
        ledger.record(outcome(4)).unwrap();
        let indices: Vec<usize> = ledger.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![2, 4, 5]);
    }
}
