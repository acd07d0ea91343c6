//! Escalation loop
//!
//! One long-lived async task per incident: ring every target, persist
//! the attempt, wait, repeat — until a responder acknowledges or the
//! retry budget runs out. The acknowledgment path runs concurrently
//! and uncoordinated; the loop re-reads the store before every wave
//! rather than trusting any in-memory copy across a wait window.

use std::time::Duration;

use crate::notify::Notifier;
use crate::state::{
    split_targets, FinalStatus, IncidentRecord, IncidentStatus, Partition, StateStore,
};

use super::EscalationError;

/// Configuration for the escalation loop
#[derive(Debug, Clone)]
pub struct EscalationConfig {
    /// Retry ceiling: maximum notification waves per incident
    pub max_attempts: u32,
    /// Delay between waves, giving a human time to pick up and respond
    pub wait_interval: Duration,
    /// Fallback responder list when the trigger payload carries none
    pub default_targets: Vec<String>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            wait_interval: Duration::from_secs(120),
            default_targets: Vec::new(),
        }
    }
}

impl EscalationConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("CALLOUT_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_attempts),
            wait_interval: std::env::var("CALLOUT_WAIT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.wait_interval),
            default_targets: std::env::var("CALLOUT_TARGETS")
                .map(|v| split_targets(&v))
                .unwrap_or(defaults.default_targets),
        }
    }
}

/// Drives repeated notification waves for one incident
pub struct Escalator<S, N> {
    store: S,
    notifier: N,
    config: EscalationConfig,
}

impl<S: StateStore, N: Notifier> Escalator<S, N> {
    pub fn new(store: S, notifier: N, config: EscalationConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// The state store this escalator persists through
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the escalation loop for one ticket to a terminal status.
    ///
    /// Creates the pending record lazily if absent, seeding targets
    /// from `raw_targets` (comma-delimited) or the configured default
    /// list. The acknowledged partition is checked before every wave
    /// so an already-resolved responder is not rung again; an
    /// acknowledgment landing between that check and the wave still
    /// produces one spurious wave, a known bounded race.
    ///
    /// Store failures abort the run rather than continuing on stale
    /// in-memory state.
    pub async fn escalate(
        &self,
        ticket_id: &str,
        summary: &str,
        raw_targets: Option<&str>,
    ) -> Result<FinalStatus, EscalationError> {
        let mut record = match self.store.get(Partition::Pending, ticket_id).await? {
            Some(existing) => existing,
            None => {
                let targets = match raw_targets {
                    Some(raw) => split_targets(raw),
                    None => self.config.default_targets.clone(),
                };
                if targets.is_empty() {
                    return Err(EscalationError::Validation(
                        "no notification targets for incident".to_string(),
                    ));
                }
                let record = IncidentRecord::new(ticket_id, summary, targets);
                self.store.commit(&record).await?;
                tracing::info!(
                    ticket_id,
                    targets = record.target_numbers.len(),
                    "created incident record"
                );
                record
            }
        };

        while record.call_attempts < self.config.max_attempts {
            // Acknowledgment check comes before any further ringing
            if let Some(acked) = self.store.get(Partition::Acknowledged, ticket_id).await? {
                if acked.is_acknowledged() {
                    tracing::info!(ticket_id, "incident acknowledged, stopping escalation");
                    return Ok(FinalStatus::Acknowledged);
                }
            }
            // Another process may have advanced the attempt count
            if let Some(fresh) = self.store.get(Partition::Pending, ticket_id).await? {
                record = fresh;
            }

            tracing::info!(
                ticket_id,
                attempt = record.call_attempts + 1,
                max_attempts = self.config.max_attempts,
                "starting notification wave"
            );
            for target in &record.target_numbers {
                match self
                    .notifier
                    .place_call(target, &record.ticket_id, &record.summary)
                    .await
                {
                    Ok(call_id) => {
                        tracing::info!(ticket_id, target = %target, call_id = %call_id, "call placed")
                    }
                    Err(e) => {
                        tracing::warn!(
                            ticket_id,
                            target = %target,
                            error = %e,
                            "call failed, continuing with remaining targets"
                        )
                    }
                }
            }

            record.record_attempt();
            if record.call_attempts >= self.config.max_attempts {
                record.mark_exhausted();
                self.store.commit(&record).await?;
                tracing::info!(ticket_id, "maximum call attempts reached");
                return Ok(FinalStatus::MaxAttemptsReached);
            }
            self.store.commit(&record).await?;

            tracing::debug!(
                ticket_id,
                wait = ?self.config.wait_interval,
                "waiting for acknowledgment before next wave"
            );
            tokio::time::sleep(self.config.wait_interval).await;
        }

        // Reached only when the loaded record already carried a spent
        // attempt budget; report whatever terminal status it holds.
        Ok(match record.status {
            IncidentStatus::Acknowledged => FinalStatus::Acknowledged,
            IncidentStatus::MaxAttemptsReached => FinalStatus::MaxAttemptsReached,
            IncidentStatus::Pending => FinalStatus::Unknown,
        })
    }
}
