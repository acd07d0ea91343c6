//! Trigger entry point
//!
//! Validates an inbound alert payload, short-circuits tickets a
//! responder already acknowledged, and otherwise hands off to the
//! escalation loop. Validation failures are reported to the caller;
//! anything unexpected is reported generically without leaking
//! internals.

use serde::{Deserialize, Serialize};

use crate::escalation::{EscalationError, Escalator};
use crate::notify::Notifier;
use crate::state::{FinalStatus, Partition, StateStore};

/// Normalized alert payload; unrecognized fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerPayload {
    pub ticket_id: String,
    pub summary: String,
    /// Optional comma-delimited responder override; the configured
    /// default list is used when absent
    #[serde(default)]
    pub target_numbers: Option<String>,
}

/// Result reported back through the routing layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum TriggerOutcome {
    /// Escalation ran (or was already resolved) to a terminal status
    Completed { final_status: FinalStatus },
    /// Malformed payload; 4xx-equivalent, not retried
    Rejected { error: String },
    /// Internal failure; 5xx-equivalent, detail withheld
    Failed { error: String },
}

/// Normalize a trigger body into a payload.
///
/// Accepts either a structured JSON object or a raw JSON string still
/// carrying its encoded form; both shapes must yield `ticket_id` and
/// `summary`.
pub fn normalize_payload(body: &serde_json::Value) -> Result<TriggerPayload, EscalationError> {
    let value = match body {
        serde_json::Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| EscalationError::Validation(format!("invalid JSON in trigger body: {e}")))?,
        serde_json::Value::Object(_) => body.clone(),
        _ => {
            return Err(EscalationError::Validation(
                "trigger body must be a JSON object or an encoded JSON string".to_string(),
            ))
        }
    };

    let payload: TriggerPayload = serde_json::from_value(value)
        .map_err(|e| EscalationError::Validation(format!("trigger payload invalid: {e}")))?;

    if payload.ticket_id.trim().is_empty() {
        return Err(EscalationError::Validation(
            "trigger payload has empty ticket_id".to_string(),
        ));
    }
    if payload.summary.trim().is_empty() {
        return Err(EscalationError::Validation(
            "trigger payload has empty summary".to_string(),
        ));
    }
    Ok(payload)
}

/// Validate a trigger body and run the escalation loop for it.
///
/// A ticket already sitting acknowledged returns immediately without
/// creating or restarting a pending record and without ringing anyone.
pub async fn handle_trigger<S: StateStore, N: Notifier>(
    escalator: &Escalator<S, N>,
    body: &serde_json::Value,
) -> TriggerOutcome {
    let payload = match normalize_payload(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "rejected trigger payload");
            return TriggerOutcome::Rejected {
                error: e.to_string(),
            };
        }
    };

    match escalator
        .store()
        .get(Partition::Acknowledged, &payload.ticket_id)
        .await
    {
        Ok(Some(record)) if record.is_acknowledged() => {
            tracing::info!(
                ticket_id = %payload.ticket_id,
                "ticket already acknowledged, ignoring trigger"
            );
            return TriggerOutcome::Completed {
                final_status: FinalStatus::Acknowledged,
            };
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(ticket_id = %payload.ticket_id, error = %e, "trigger pre-check failed");
            return TriggerOutcome::Failed {
                error: "an unexpected error occurred".to_string(),
            };
        }
    }

    match escalator
        .escalate(
            &payload.ticket_id,
            &payload.summary,
            payload.target_numbers.as_deref(),
        )
        .await
    {
        Ok(final_status) => TriggerOutcome::Completed { final_status },
        Err(EscalationError::Validation(e)) => TriggerOutcome::Rejected { error: e },
        Err(e) => {
            tracing::error!(ticket_id = %payload.ticket_id, error = %e, "escalation run failed");
            TriggerOutcome::Failed {
                error: "an unexpected error occurred".to_string(),
            }
        }
    }
}
