//! The delivery seam between the engine and the outside world.
//!
//! Implemented by the `nback-collector` crate. The engine only produces a
//! [`SessionSummary`]; whether and how it reaches a remote collector is
//! entirely the implementor's concern, and a failed delivery never affects
//! session state.

use async_trait::async_trait;

use crate::summary::SessionSummary;

/// A sink for finished (or abandoned) session summaries.
#[async_trait]
pub trait ResultsCollector: Send + Sync {
    /// Human-readable collector name (e.g. "webhook").
    fn name(&self) -> &str;

    /// Deliver one summary. Implementations decide their own retry policy.
    async fn deliver(&self, summary: &SessionSummary) -> anyhow::Result<()>;
}
