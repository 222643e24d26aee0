//! Retry policy for transient delivery failures.

use std::time::Duration;

use nback_core::summary::SessionSummary;
use nback_core::traits::ResultsCollector;

use crate::error::CollectorError;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Deliver a summary, retrying transient failures with capped exponential
/// backoff. Permanent rejections and exhausted retries surface the last
/// error; the caller decides whether that matters (for the trial engine it
/// never does).
pub async fn deliver_with_retry(
    collector: &dyn ResultsCollector,
    summary: &SessionSummary,
    max_retries: u32,
    initial_delay: Duration,
) -> anyhow::Result<()> {
    let mut delay = initial_delay;
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_BACKOFF);
        }

        match collector.deliver(summary).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                if let Some(collector_err) = e.downcast_ref::<CollectorError>() {
                    if collector_err.is_permanent() {
                        return Err(e);
                    }
                    // Honor the endpoint's retry-after hint when present.
                    if let Some(ms) = collector_err.retry_after_ms() {
                        delay = Duration::from_millis(ms);
                    }
                }
                tracing::warn!(
                    collector = collector.name(),
                    attempt,
                    error = %e,
                    "delivery failed"
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("delivery failed with no attempts made")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCollector;
    use nback_core::model::{SessionStatus, Subject};
    use nback_core::score::SessionScore;

    fn sample_summary() -> SessionSummary {
        SessionSummary::build(
            &Subject::default(),
            2,
            SessionScore::default(),
            SessionStatus::Abandoned,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try() {
        let collector = MockCollector::new();
        deliver_with_retry(&collector, &sample_summary(), 3, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(collector.delivered().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures() {
        let collector = MockCollector::failing_times(2);
        deliver_with_retry(&collector, &sample_summary(), 3, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(collector.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let collector = MockCollector::always_failing();
        let err =
            deliver_with_retry(&collector, &sample_summary(), 2, Duration::from_millis(100))
                .await
                .unwrap_err();
        assert!(err.to_string().contains("endpoint error"));
        assert_eq!(collector.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_rejection_short_circuits() {
        let collector = MockCollector::rejecting();
        let err =
            deliver_with_retry(&collector, &sample_summary(), 5, Duration::from_millis(100))
                .await
                .unwrap_err();
        assert!(err.to_string().contains("rejected"));
        assert_eq!(collector.call_count(), 1);
    }
}
