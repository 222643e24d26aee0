//! Trial clock: paced presentation and response windows.
//!
//! The clock drives one [`Session`] on a single spawned task. External
//! calls arrive as commands on a channel and timer waits happen inside the
//! same `select!` loop, so exactly one session mutation is ever in flight:
//! whichever of "subject responds" and "window expires" wins commits the
//! outcome, and the loser is dropped by the state machine. Each run owns
//! its task and channels outright, so a timer from a replaced session has
//! nothing left to fire into.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::error::ConfigError;
use crate::model::{SessionConfig, Symbol};
use crate::score::SessionScore;
use crate::session::{Advance, Expiry, Session, Submit};

/// What the display layer observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new stimulus is on screen.
    Stimulus {
        index: usize,
        symbol: Symbol,
        /// Whether the response window is open for this trial.
        awaiting_response: bool,
    },
    /// The subject responded inside the window and the outcome is recorded.
    Feedback { index: usize, correct: bool },
    /// The window expired with no response; a timeout outcome is recorded.
    TimedOut { index: usize },
    /// The last trial's presentation interval elapsed.
    Finished { score: SessionScore },
    /// The session was aborted.
    Aborted { score: SessionScore },
}

/// What the display layer issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Respond { index: usize, is_match: bool },
    Abort,
}

/// Handle to a running session: issue commands, observe events, and
/// reclaim the [`Session`] when it ends.
///
/// Dropping the handle (or calling [`SessionHandle::join`] before the run
/// ends) counts as an abort: the clock task sees its channels close,
/// cancels all pending waits, and records nothing further.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::Receiver<SessionEvent>,
    task: JoinHandle<Session>,
}

impl SessionHandle {
    /// Validate the configuration, generate a sequence, and start the run.
    pub fn start(config: SessionConfig) -> Result<Self, ConfigError> {
        let session = Session::new(config)?;
        Ok(Self::spawn(session))
    }

    /// As [`SessionHandle::start`] with a seeded sequence, for
    /// reproducible runs.
    pub fn start_seeded(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let session = Session::with_rng(config, &mut rng)?;
        Ok(Self::spawn(session))
    }

    /// Start the clock for an already-built session.
    pub fn spawn(session: Session) -> Self {
        let (commands, command_rx) = mpsc::channel(16);
        let (event_tx, events) = mpsc::channel(64);
        let clock = TrialClock {
            session,
            commands: command_rx,
            events: event_tx,
        };
        let task = tokio::spawn(clock.drive());
        Self {
            commands,
            events,
            task,
        }
    }

    /// Submit a match claim for a trial index. Ignored by the engine when
    /// the window is not open, mirroring "too early to respond".
    pub async fn respond(&self, index: usize, is_match: bool) {
        let _ = self
            .commands
            .send(SessionCommand::Respond { index, is_match })
            .await;
    }

    /// Abort the run. Idempotent; late calls on a finished run are no-ops.
    pub async fn abort(&self) {
        let _ = self.commands.send(SessionCommand::Abort).await;
    }

    /// Next event, or `None` once the clock task has ended and drained.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Wait for the clock task and reclaim the session. Call after
    /// observing `Finished` or `Aborted` to inspect the final ledger.
    pub async fn join(self) -> anyhow::Result<Session> {
        drop(self.commands);
        drop(self.events);
        self.task.await.map_err(Into::into)
    }
}

enum Pump {
    Elapsed,
    Abort,
}

/// The single-task scheduler that owns a running session.
struct TrialClock {
    session: Session,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::Sender<SessionEvent>,
}

impl TrialClock {
    async fn drive(mut self) -> Session {
        let timing = self.session.config().timing;
        let Some(mut index) = self.session.begin() else {
            return self.session;
        };

        let mut aborted = false;
        'run: loop {
            let Some(symbol) = self.session.stimulus(index) else {
                break;
            };
            let shown = Instant::now();
            let advance_at = shown + timing.stimulus();
            let awaiting_response = self.session.awaiting_response(index);

            if self
                .emit(SessionEvent::Stimulus {
                    index,
                    symbol,
                    awaiting_response,
                })
                .await
                .is_err()
            {
                aborted = true;
                break;
            }

            if awaiting_response {
                let window_closes = shown + timing.response_window();
                if matches!(self.pump_until(window_closes).await, Pump::Abort) {
                    aborted = true;
                    break;
                }
                if let Expiry::Recorded(outcome) = self.session.window_expired(index) {
                    if self
                        .emit(SessionEvent::TimedOut {
                            index: outcome.index,
                        })
                        .await
                        .is_err()
                    {
                        aborted = true;
                        break;
                    }
                }
            }

            // Keep the stimulus up (and keep servicing commands) until the
            // presentation interval ends; late responses are no-ops inside
            // the state machine.
            if matches!(self.pump_until(advance_at).await, Pump::Abort) {
                aborted = true;
                break;
            }

            match self.session.advance(index) {
                Advance::Next(next) => index = next,
                Advance::Finished => break 'run,
                Advance::Ignored => {
                    tracing::warn!(index, "stale advance, stopping clock");
                    break 'run;
                }
            }
        }

        if aborted {
            self.session.abort();
            let _ = self
                .events
                .send(SessionEvent::Aborted {
                    score: self.session.score(),
                })
                .await;
        } else {
            let _ = self
                .events
                .send(SessionEvent::Finished {
                    score: self.session.score(),
                })
                .await;
        }
        self.session
    }

    /// Service commands until `deadline`. Returns `Pump::Abort` when an
    /// abort arrives or every handle is gone.
    async fn pump_until(&mut self, deadline: Instant) -> Pump {
        loop {
            tokio::select! {
                () = sleep_until(deadline) => return Pump::Elapsed,
                command = self.commands.recv() => match command {
                    None | Some(SessionCommand::Abort) => return Pump::Abort,
                    Some(SessionCommand::Respond { index, is_match }) => {
                        match self.session.submit(index, is_match) {
                            Submit::Recorded(outcome) => {
                                if self
                                    .emit(SessionEvent::Feedback {
                                        index: outcome.index,
                                        correct: outcome.is_correct,
                                    })
                                    .await
                                    .is_err()
                                {
                                    return Pump::Abort;
                                }
                            }
                            Submit::Ignored => {
                                tracing::debug!(index, "response outside its window, ignored");
                            }
                        }
                    }
                },
            }
        }
    }

    async fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<(), mpsc::error::SendError<SessionEvent>> {
        self.events.send(event).await
    }
}
