//! nback-core — Trial engine for a working-memory n-back assessment.
//!
//! This crate defines the session state machine, sequence generation,
//! response ledger, and scoring logic that the rest of the nback system
//! builds on.

pub mod clock;
pub mod error;
pub mod ledger;
pub mod model;
pub mod score;
pub mod sequence;
pub mod session;
pub mod summary;
pub mod traits;
