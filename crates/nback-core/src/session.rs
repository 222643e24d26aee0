//! Session state machine.
//!
//! A [`Session`] owns one run's sequence, ledger, and state, and is
//! discarded when a new run starts; there is no shared state between runs.
//! All methods are synchronous and total: calls that arrive outside their
//! valid window (a response before enough stimuli were shown, after the
//! window expired, for a stale index) are silently ignored rather than
//! treated as errors. The async pacing lives in [`crate::clock`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;
use crate::ledger::{Outcome, Response, ResponseLedger};
use crate::model::{SessionConfig, SessionStatus, Subject, Symbol};
use crate::score::SessionScore;
use crate::sequence::Sequence;
use crate::summary::SessionSummary;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Presenting(usize),
    Finished,
    Aborted,
}

/// Result of submitting a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    Recorded(Outcome),
    /// Too early, wrong index, already answered, or session not presenting.
    Ignored,
}

/// Result of a response window expiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Recorded(Outcome),
    /// An outcome already exists for the index, or the session moved on.
    Ignored,
}

/// Result of a presentation interval elapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(usize),
    Finished,
    /// Stale advance for an index the session is no longer presenting.
    Ignored,
}

/// One session's state machine: sequence, ledger, lifecycle.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    sequence: Sequence,
    ledger: ResponseLedger,
    state: SessionState,
}

impl Session {
    /// Validate the configuration and generate a fresh sequence.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let mut rng = StdRng::from_entropy();
        Self::with_rng(config, &mut rng)
    }

    /// As [`Session::new`] with an injected randomness source.
    pub fn with_rng<R: Rng>(config: SessionConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let sequence = Sequence::generate(&config, rng);
        Ok(Self {
            config,
            sequence,
            ledger: ResponseLedger::new(),
            state: SessionState::NotStarted,
        })
    }

    /// As [`Session::new`] with an explicit sequence. Lets tests pin the
    /// exact stimulus order.
    pub fn with_sequence(config: SessionConfig, sequence: Sequence) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            sequence,
            ledger: ResponseLedger::new(),
            state: SessionState::NotStarted,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn ledger(&self) -> &ResponseLedger {
        &self.ledger
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn lag(&self) -> usize {
        self.config.lag
    }

    /// Transition to presenting the first stimulus. `None` if the session
    /// already ran.
    pub fn begin(&mut self) -> Option<usize> {
        match self.state {
            SessionState::NotStarted => {
                self.state = SessionState::Presenting(0);
                Some(0)
            }
            _ => None,
        }
    }

    pub fn stimulus(&self, index: usize) -> Option<Symbol> {
        self.sequence.symbol(index)
    }

    /// Whether the response window is open for `index`: the session is
    /// presenting it, it is eligible, and no outcome exists yet.
    pub fn awaiting_response(&self, index: usize) -> bool {
        self.state == SessionState::Presenting(index)
            && self.sequence.is_eligible(index)
            && !self.ledger.contains(index)
    }

    /// Commit the subject's match claim for `index`. Valid only while the
    /// response window is open; everything else is a silent no-op.
    pub fn submit(&mut self, index: usize, is_match_claim: bool) -> Submit {
        if !self.awaiting_response(index) {
            return Submit::Ignored;
        }
        let Some(outcome) = self.outcome_for(index, Response::from_claim(is_match_claim)) else {
            return Submit::Ignored;
        };
        self.commit(outcome)
            .map_or(Submit::Ignored, Submit::Recorded)
    }

    /// The response window for `index` expired without input. Records the
    /// timeout outcome unless one was already committed or the session
    /// moved on, in which case the expiry is stale and dropped.
    pub fn window_expired(&mut self, index: usize) -> Expiry {
        if !self.awaiting_response(index) {
            return Expiry::Ignored;
        }
        let Some(outcome) = self.outcome_for(index, Response::Timeout) else {
            return Expiry::Ignored;
        };
        self.commit(outcome)
            .map_or(Expiry::Ignored, Expiry::Recorded)
    }

    /// The presentation interval for `index` elapsed. Moves to the next
    /// stimulus or finishes after the last one.
    pub fn advance(&mut self, index: usize) -> Advance {
        if self.state != SessionState::Presenting(index) {
            return Advance::Ignored;
        }
        let next = index + 1;
        if next >= self.sequence.len() {
            self.state = SessionState::Finished;
            Advance::Finished
        } else {
            self.state = SessionState::Presenting(next);
            Advance::Next(next)
        }
    }

    /// Terminal. The ledger keeps whatever was recorded; nothing further
    /// is accepted.
    pub fn abort(&mut self) {
        if !matches!(self.state, SessionState::Finished | SessionState::Aborted) {
            self.state = SessionState::Aborted;
        }
    }

    /// Current score, folded from the ledger.
    pub fn score(&self) -> SessionScore {
        SessionScore::tally(&self.ledger)
    }

    /// Lifecycle status as reported to collectors.
    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::NotStarted => SessionStatus::NotStarted,
            SessionState::Presenting(_) => SessionStatus::Started,
            SessionState::Finished => SessionStatus::Completed,
            SessionState::Aborted => SessionStatus::Abandoned,
        }
    }

    /// Build the delivery record for this session as it stands.
    pub fn summary(&self, subject: &Subject) -> SessionSummary {
        SessionSummary::build(subject, self.config.lag, self.score(), self.status())
    }

    /// Assemble the outcome for an eligible index. `None` only for
    /// out-of-range indices, which `awaiting_response` already excludes.
    fn outcome_for(&self, index: usize, response: Response) -> Option<Outcome> {
        let actual_match = self.sequence.is_match(index)?;
        let is_correct = match response {
            Response::Match => actual_match,
            Response::NoMatch => !actual_match,
            Response::Timeout => false,
        };
        Some(Outcome {
            index,
            stimulus: self.sequence.symbol(index)?,
            lagged_stimulus: self.sequence.lagged_symbol(index)?,
            actual_match,
            response,
            is_correct,
        })
    }

    fn commit(&mut self, outcome: Outcome) -> Option<Outcome> {
        match self.ledger.record(outcome) {
            Ok(()) => Some(outcome),
            Err(e) => {
                // awaiting_response checked the ledger, so this indicates a
                // sequencing bug in the caller.
                debug_assert!(false, "unreachable duplicate commit: {e}");
                tracing::warn!("dropped duplicate outcome: {e}");
                None
            }
        }
    }
}
