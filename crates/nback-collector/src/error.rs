//! Collector error types.
//!
//! Typed so the retry layer can classify failures without string matching.

use thiserror::Error;

/// Errors that can occur when delivering a session summary.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The endpoint returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The endpoint rejected the payload outright (4xx other than 429).
    #[error("delivery rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The endpoint failed transiently (5xx).
    #[error("endpoint error (HTTP {status}): {message}")]
    EndpointError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl CollectorError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(self, CollectorError::Rejected { .. })
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            CollectorError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_permanent() {
        let err = CollectorError::Rejected {
            status: 400,
            message: "bad payload".into(),
        };
        assert!(err.is_permanent());
        assert!(err.retry_after_ms().is_none());
    }

    #[test]
    fn rate_limit_carries_delay() {
        let err = CollectorError::RateLimited {
            retry_after_ms: 5_000,
        };
        assert!(!err.is_permanent());
        assert_eq!(err.retry_after_ms(), Some(5_000));
    }
}
