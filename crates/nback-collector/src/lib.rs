//! nback-collector — results delivery backends.
//!
//! Implements the `ResultsCollector` trait for a remote webhook, plus a
//! mock for tests. Delivery is best-effort by contract: a failure here is
//! logged and never fed back into the trial engine.

pub mod config;
pub mod error;
pub mod mock;
pub mod retry;
pub mod webhook;

pub use config::{create_collector, load_config, CollectorConfig, NbackConfig};
pub use error::CollectorError;
pub use retry::deliver_with_retry;
