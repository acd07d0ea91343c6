//! Persistent incident types
//!
//! These types are stored as JSON documents in the state store and
//! represent the durable state of one escalating incident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an incident ticket
pub type TicketId = String;

/// Logical subset of the state store a record lives in.
///
/// A record resides in at most one partition at a time; moving to
/// `Acknowledged` deletes the `Pending` copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Incidents still being escalated
    Pending,
    /// Incidents a responder has acknowledged
    Acknowledged,
}

impl Partition {
    /// Directory / key-prefix name for this partition
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable status of an incident record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    /// Created, responders still being rung
    Pending,
    /// A responder pressed 1; terminal
    Acknowledged,
    /// Retry budget exhausted without acknowledgment
    MaxAttemptsReached,
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Acknowledged => write!(f, "ACKNOWLEDGED"),
            Self::MaxAttemptsReached => write!(f, "MAX_ATTEMPTS_REACHED"),
        }
    }
}

/// Outcome reported to the caller when an escalation run finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    /// A responder acknowledged before the budget ran out
    Acknowledged,
    /// All attempts used without acknowledgment
    MaxAttemptsReached,
    /// The loop exited without a determinable terminal status
    Unknown,
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acknowledged => write!(f, "ACKNOWLEDGED"),
            Self::MaxAttemptsReached => write!(f, "MAX_ATTEMPTS_REACHED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One incident being escalated
///
/// `ticket_id`, `summary`, and `target_numbers` are immutable after
/// creation; `call_attempts` only grows and `timestamp` is refreshed on
/// every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Unique ticket identifier
    pub ticket_id: TicketId,

    /// Current lifecycle status
    pub status: IncidentStatus,

    /// Human-readable incident description, spoken to responders
    pub summary: String,

    /// Ordered responder numbers to ring each wave
    pub target_numbers: Vec<String>,

    /// Completed notification waves
    pub call_attempts: u32,

    /// Last mutation time
    pub timestamp: DateTime<Utc>,
}

impl IncidentRecord {
    /// Create a fresh pending record.
    ///
    /// Callers validate that `target_numbers` is non-empty before
    /// construction (see [`split_targets`]).
    pub fn new(ticket_id: &str, summary: &str, target_numbers: Vec<String>) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            status: IncidentStatus::Pending,
            summary: summary.to_string(),
            target_numbers,
            call_attempts: 0,
            timestamp: Utc::now(),
        }
    }

    /// Record one completed notification wave
    pub fn record_attempt(&mut self) {
        self.call_attempts += 1;
        self.timestamp = Utc::now();
    }

    /// Flip to the terminal acknowledged status
    pub fn acknowledge(&mut self) {
        self.status = IncidentStatus::Acknowledged;
        self.timestamp = Utc::now();
    }

    /// Mark the retry budget as exhausted
    pub fn mark_exhausted(&mut self) {
        self.status = IncidentStatus::MaxAttemptsReached;
        self.timestamp = Utc::now();
    }

    /// Whether a responder has acknowledged this incident
    pub fn is_acknowledged(&self) -> bool {
        self.status == IncidentStatus::Acknowledged
    }
}

/// Split a raw comma-delimited target list, dropping empty entries.
///
/// An empty result means the input cannot seed a record; record
/// creation must fail rather than escalate with nobody to ring.
pub fn split_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
