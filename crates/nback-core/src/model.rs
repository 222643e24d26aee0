//! Core data model types for nback.
//!
//! These are the fundamental types the rest of the system uses to describe
//! a session: the stimulus alphabet, the configuration knobs, the subject,
//! and the lifecycle status reported to collectors.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single stimulus drawn from the session alphabet.
pub type Symbol = char;

/// Letters used by default. I and O are omitted to avoid confusion with
/// digits on screen.
pub const DEFAULT_ALPHABET: &[Symbol] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T',
];

/// Presentation and response pacing for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// How long each stimulus stays on screen before the next one.
    #[serde(default = "default_stimulus_ms")]
    pub stimulus_ms: u64,
    /// How long the subject has to respond, measured from stimulus onset.
    /// Must be strictly shorter than `stimulus_ms`.
    #[serde(default = "default_response_window_ms")]
    pub response_window_ms: u64,
    /// How long the display layer shows correct/incorrect feedback.
    /// A presentation hint only; the engine never waits on it.
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u64,
}

fn default_stimulus_ms() -> u64 {
    2_500
}
fn default_response_window_ms() -> u64 {
    2_200
}
fn default_feedback_ms() -> u64 {
    500
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            stimulus_ms: default_stimulus_ms(),
            response_window_ms: default_response_window_ms(),
            feedback_ms: default_feedback_ms(),
        }
    }
}

impl Timing {
    pub fn stimulus(&self) -> Duration {
        Duration::from_millis(self.stimulus_ms)
    }

    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.response_window_ms)
    }

    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}

/// Everything needed to run one session. All knobs are injectable; the
/// defaults match the standard 2-back protocol (30 trials, 30% matches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Stimulus alphabet. Needs at least `lag + 1` symbols.
    #[serde(default = "default_alphabet")]
    pub alphabet: Vec<Symbol>,
    /// Number of stimuli shown.
    #[serde(default = "default_trial_count")]
    pub trial_count: usize,
    /// How many positions back the comparison reaches.
    #[serde(default = "default_lag")]
    pub lag: usize,
    /// Largest lag the configuration surface accepts.
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,
    /// Fraction of trials forced to be matches, approximately.
    #[serde(default = "default_match_rate")]
    pub target_match_rate: f64,
    /// Presentation pacing.
    #[serde(default)]
    pub timing: Timing,
}

fn default_alphabet() -> Vec<Symbol> {
    DEFAULT_ALPHABET.to_vec()
}
fn default_trial_count() -> usize {
    30
}
fn default_lag() -> usize {
    2
}
fn default_max_lag() -> usize {
    9
}
fn default_match_rate() -> f64 {
    0.3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            trial_count: default_trial_count(),
            lag: default_lag(),
            max_lag: default_max_lag(),
            target_match_rate: default_match_rate(),
            timing: Timing::default(),
        }
    }
}

impl SessionConfig {
    /// Validate the configuration. Called once at session start; any
    /// violation is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trial_count == 0 {
            return Err(ConfigError::EmptySession);
        }
        if self.lag == 0 {
            return Err(ConfigError::LagZero);
        }
        if self.lag >= self.trial_count {
            return Err(ConfigError::LagTooLarge {
                lag: self.lag,
                trial_count: self.trial_count,
            });
        }
        if self.lag > self.max_lag {
            return Err(ConfigError::LagAboveMax {
                lag: self.lag,
                max_lag: self.max_lag,
            });
        }
        let needed = self.lag + 1;
        if self.alphabet.len() < needed {
            return Err(ConfigError::AlphabetTooSmall {
                len: self.alphabet.len(),
                needed,
            });
        }
        if !(0.0..=1.0).contains(&self.target_match_rate) {
            return Err(ConfigError::MatchRateOutOfRange(self.target_match_rate));
        }
        if self.timing.response_window_ms >= self.timing.stimulus_ms {
            return Err(ConfigError::ResponseWindowTooLong {
                response_ms: self.timing.response_window_ms,
                stimulus_ms: self.timing.stimulus_ms,
            });
        }
        Ok(())
    }

    /// Number of trials for which an n-back comparison is defined.
    pub fn eligible_trials(&self) -> usize {
        self.trial_count - self.lag
    }
}

/// Who is taking the test. Collected by the registration layer; the engine
/// only carries it through to the summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subject {
    pub first_name: String,
    pub email: String,
}

/// Lifecycle status reported to collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Registered,
    Started,
    Completed,
    Abandoned,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::NotStarted => write!(f, "not_started"),
            SessionStatus::Registered => write!(f, "registered"),
            SessionStatus::Started => write!(f, "started"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}
