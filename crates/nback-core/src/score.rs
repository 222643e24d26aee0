//! Running and final score derivation.

use serde::{Deserialize, Serialize};

use crate::ledger::ResponseLedger;

/// Correct/incorrect/total counts for one session. `total` counts eligible
/// trials with a recorded outcome, whether answered or timed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScore {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
}

impl SessionScore {
    /// Fold the ledger into counts. Pure and cheap enough to recompute on
    /// every outcome.
    pub fn tally(ledger: &ResponseLedger) -> Self {
        ledger.iter().fold(Self::default(), |mut score, outcome| {
            if outcome.is_correct {
                score.correct += 1;
            } else {
                score.incorrect += 1;
            }
            score.total += 1;
            score
        })
    }

    /// Percentage accuracy, 0 when nothing was recorded.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Outcome, Response};

    fn push(ledger: &mut ResponseLedger, index: usize, is_correct: bool, response: Response) {
        ledger
            .record(Outcome {
                index,
                stimulus: 'A',
                lagged_stimulus: 'B',
                actual_match: false,
                response,
                is_correct,
            })
            .unwrap();
    }

    #[test]
    fn empty_ledger_scores_zero() {
        let score = SessionScore::tally(&ResponseLedger::new());
        assert_eq!(score, SessionScore::default());
        assert_eq!(score.accuracy(), 0.0);
    }

    #[test]
    fn counts_are_consistent() {
        let mut ledger = ResponseLedger::new();
        push(&mut ledger, 2, true, Response::NoMatch);
        push(&mut ledger, 3, false, Response::Match);
        push(&mut ledger, 4, false, Response::Timeout);
        push(&mut ledger, 5, true, Response::NoMatch);

        let score = SessionScore::tally(&ledger);
        assert_eq!(score.correct, 2);
        assert_eq!(score.incorrect, 2);
        assert_eq!(score.total, 4);
        assert_eq!(score.correct + score.incorrect, score.total);
        assert!((score.accuracy() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_is_percentage() {
        let mut ledger = ResponseLedger::new();
        push(&mut ledger, 2, true, Response::Match);
        push(&mut ledger, 3, true, Response::NoMatch);
        push(&mut ledger, 4, true, Response::NoMatch);
        push(&mut ledger, 5, false, Response::Match);

        let score = SessionScore::tally(&ledger);
        assert!((score.accuracy() - 75.0).abs() < 1e-9);
    }
}
