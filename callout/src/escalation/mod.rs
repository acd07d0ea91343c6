//! Escalation controller
//!
//! Owns the retry loop for one incident: create or load the record,
//! ring every target, persist the attempt, wait, re-check for
//! acknowledgment, repeat until acknowledged or the attempt ceiling
//! is hit.

pub mod engine;

pub use engine::{EscalationConfig, Escalator};

use crate::state::StoreError;

/// Error types for an escalation run
#[derive(Debug, thiserror::Error)]
pub enum EscalationError {
    /// Malformed trigger input; reported to the caller, never retried
    #[error("invalid trigger payload: {0}")]
    Validation(String),

    /// Persistence failure; the loop aborts rather than running on
    /// stale in-memory state
    #[error(transparent)]
    Store(#[from] StoreError),
}
