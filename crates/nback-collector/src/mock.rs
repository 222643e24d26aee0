//! Mock collector for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use nback_core::summary::SessionSummary;
use nback_core::traits::ResultsCollector;

use crate::error::CollectorError;

enum FailureMode {
    None,
    /// Fail the first `n` calls with a transient error, then succeed.
    Transient(u32),
    /// Fail every call with a transient error.
    Always,
    /// Fail every call with a permanent rejection.
    Reject,
}

/// A collector that records deliveries in memory instead of sending them.
pub struct MockCollector {
    delivered: Mutex<Vec<SessionSummary>>,
    call_count: AtomicU32,
    failure: FailureMode,
}

impl MockCollector {
    pub fn new() -> Self {
        Self::with_failure(FailureMode::None)
    }

    /// Fail the first `n` deliveries transiently, then accept.
    pub fn failing_times(n: u32) -> Self {
        Self::with_failure(FailureMode::Transient(n))
    }

    pub fn always_failing() -> Self {
        Self::with_failure(FailureMode::Always)
    }

    pub fn rejecting() -> Self {
        Self::with_failure(FailureMode::Reject)
    }

    fn with_failure(failure: FailureMode) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
            failure,
        }
    }

    /// Summaries accepted so far.
    pub fn delivered(&self) -> Vec<SessionSummary> {
        self.delivered.lock().unwrap().clone()
    }

    /// Number of delivery attempts, including failed ones.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for MockCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultsCollector for MockCollector {
    fn name(&self) -> &str {
        "mock"
    }

    async fn deliver(&self, summary: &SessionSummary) -> anyhow::Result<()> {
        let attempt = self.call_count.fetch_add(1, Ordering::Relaxed);

        match self.failure {
            FailureMode::None => {}
            FailureMode::Transient(n) if attempt < n => {
                return Err(CollectorError::EndpointError {
                    status: 503,
                    message: "mock transient failure".into(),
                }
                .into());
            }
            FailureMode::Transient(_) => {}
            FailureMode::Always => {
                return Err(CollectorError::EndpointError {
                    status: 503,
                    message: "mock permanent outage".into(),
                }
                .into());
            }
            FailureMode::Reject => {
                return Err(CollectorError::Rejected {
                    status: 400,
                    message: "mock rejection".into(),
                }
                .into());
            }
        }

        self.delivered.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_core::model::{SessionStatus, Subject};
    use nback_core::score::SessionScore;

    fn sample_summary() -> SessionSummary {
        SessionSummary::build(
            &Subject {
                first_name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            3,
            SessionScore {
                correct: 10,
                incorrect: 2,
                total: 12,
            },
            SessionStatus::Completed,
        )
    }

    #[tokio::test]
    async fn records_deliveries() {
        let collector = MockCollector::new();
        collector.deliver(&sample_summary()).await.unwrap();
        collector.deliver(&sample_summary()).await.unwrap();

        assert_eq!(collector.call_count(), 2);
        let delivered = collector.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].lag, 3);
    }

    #[tokio::test]
    async fn transient_mode_recovers() {
        let collector = MockCollector::failing_times(1);
        assert!(collector.deliver(&sample_summary()).await.is_err());
        assert!(collector.deliver(&sample_summary()).await.is_ok());
        assert_eq!(collector.delivered().len(), 1);
    }
}
