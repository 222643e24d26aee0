//! Webhook collector: POSTs the session summary to a remote endpoint.

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use nback_core::summary::SessionSummary;
use nback_core::traits::ResultsCollector;

use crate::error::CollectorError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Delivers summaries to an HTTP endpoint as a JSON POST.
pub struct WebhookCollector {
    url: String,
    client: reqwest::Client,
}

impl WebhookCollector {
    pub fn new(url: &str) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            url: url.to_string(),
            client,
        }
    }
}

/// Wire format expected by the collector endpoint. Accuracy goes out as a
/// two-decimal string, matching what downstream automations key on.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    first_name: String,
    email: String,
    test_type: String,
    total_trials: u32,
    correct_responses: u32,
    incorrect_responses: u32,
    accuracy: String,
    status: String,
    date: String,
}

impl WebhookPayload {
    fn from_summary(summary: &SessionSummary) -> Self {
        Self {
            first_name: summary.subject_first_name.clone(),
            email: summary.subject_email.clone(),
            test_type: summary.test_type(),
            total_trials: summary.total_trials,
            correct_responses: summary.correct,
            incorrect_responses: summary.incorrect,
            accuracy: format!("{:.2}", summary.accuracy),
            status: summary.status.to_string(),
            date: summary.recorded_at.to_rfc3339(),
        }
    }
}

#[async_trait]
impl ResultsCollector for WebhookCollector {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip(self, summary), fields(session = %summary.id))]
    async fn deliver(&self, summary: &SessionSummary) -> anyhow::Result<()> {
        let payload = WebhookPayload::from_summary(summary);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollectorError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    CollectorError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(CollectorError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if (400..500).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            return Err(CollectorError::Rejected { status, message }.into());
        }
        if status >= 500 {
            let message = response.text().await.unwrap_or_default();
            return Err(CollectorError::EndpointError { status, message }.into());
        }

        tracing::debug!(status, "summary delivered");
        Ok(())
    }
}
