//! Response state machine
//!
//! Maps a responder's keypad digit to a voice prompt and, for "1", a
//! store mutation. Each callback is computed fresh from the digit and
//! the ticket context carried in the webhook query string; no session
//! state is held between the initial prompt and the digit response.
//!
//! ```text
//! offer ──1──▶ acknowledged (record moved, goodbye)
//!   │ └──2──▶ offer (repeat summary, same state)
//!   └──other/none──▶ invalid (goodbye)
//! ```

use crate::state::{Partition, StateStore};

/// What a digit asks the system to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitAction {
    /// "1" — record the acknowledgment and hang up
    Acknowledge,
    /// "2" — re-issue the offer prompt, no state change
    Repeat,
    /// Anything else, including no input at all
    Invalid,
}

/// Classify raw gathered digits.
///
/// Everything outside `"1"` and `"2"` — multi-digit input, letters,
/// the empty string from a gather timeout — is invalid and mutates
/// nothing.
pub fn classify_digits(digits: &str) -> DigitAction {
    match digits {
        "1" => DigitAction::Acknowledge,
        "2" => DigitAction::Repeat,
        _ => DigitAction::Invalid,
    }
}

/// Spoken response handed back to the telephony provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoicePrompt {
    /// Read the alert, gather one digit, offer 1/2
    Offer { ticket_id: String, summary: String },
    /// Thank the responder and hang up
    Acknowledged,
    /// Reject the input and hang up
    Invalid,
}

impl VoicePrompt {
    /// Render as TwiML for the provider
    pub fn to_twiml(&self) -> String {
        match self {
            Self::Offer { ticket_id, summary } => format!(
                "<Response>\
                 <Gather numDigits=\"1\" action=\"/acknowledge\" method=\"POST\">\
                 <Say>Hi, this is an alert call for ticket number {}. \
                 Summary: {}. \
                 Press 1 to acknowledge. Press 2 to repeat.</Say>\
                 </Gather>\
                 <Say>No input received. Goodbye.</Say>\
                 <Hangup/>\
                 </Response>",
                xml_escape(ticket_id),
                xml_escape(summary)
            ),
            Self::Acknowledged => "<Response>\
                 <Say>Thank you. Your acknowledgement is recorded.</Say>\
                 <Hangup/>\
                 </Response>"
                .to_string(),
            Self::Invalid => "<Response>\
                 <Say>Invalid input. Goodbye.</Say>\
                 <Hangup/>\
                 </Response>"
                .to_string(),
        }
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Initial prompt issued when a call connects
pub fn offer_prompt(ticket_id: &str, summary: &str) -> VoicePrompt {
    VoicePrompt::Offer {
        ticket_id: ticket_id.to_string(),
        summary: summary.to_string(),
    }
}

/// Handle one gathered digit for a ticket.
///
/// "1" loads the pending record, flips it to acknowledged, and commits
/// the move; a record already past its attempt ceiling still flips, so
/// a late acknowledgment is honored. Store failures degrade to the
/// invalid-input prompt rather than failing the call.
pub async fn acknowledge_response<S: StateStore + ?Sized>(
    store: &S,
    digits: &str,
    ticket_id: &str,
    summary: &str,
) -> VoicePrompt {
    match classify_digits(digits) {
        DigitAction::Acknowledge => match store.get(Partition::Pending, ticket_id).await {
            Ok(Some(mut record)) => {
                record.acknowledge();
                match store.commit(&record).await {
                    Ok(()) => {
                        tracing::info!(ticket_id, "acknowledgment recorded");
                        VoicePrompt::Acknowledged
                    }
                    Err(e) => {
                        tracing::error!(ticket_id, error = %e, "failed to persist acknowledgment");
                        VoicePrompt::Invalid
                    }
                }
            }
            // Nothing left to mutate; the responder still hears success
            Ok(None) => {
                tracing::info!(ticket_id, "acknowledgment for ticket with no pending record");
                VoicePrompt::Acknowledged
            }
            Err(e) => {
                tracing::error!(ticket_id, error = %e, "failed to load record for acknowledgment");
                VoicePrompt::Invalid
            }
        },
        DigitAction::Repeat => offer_prompt(ticket_id, summary),
        DigitAction::Invalid => {
            tracing::debug!(ticket_id, digits, "invalid digit input");
            VoicePrompt::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        split_targets, IncidentRecord, IncidentStatus, MemoryStore, StoreError, StoreResult,
        TicketId,
    };
    use async_trait::async_trait;

    /// Delegates to a `MemoryStore` but errors on the selected ops
    struct BrokenStore {
        inner: MemoryStore,
        fail_get: bool,
        fail_put: bool,
    }

    #[async_trait]
    impl StateStore for BrokenStore {
        async fn get(
            &self,
            partition: Partition,
            ticket_id: &str,
        ) -> StoreResult<Option<IncidentRecord>> {
            if self.fail_get {
                return Err(StoreError::Unavailable("store offline".to_string()));
            }
            self.inner.get(partition, ticket_id).await
        }

        async fn put(&self, partition: Partition, record: &IncidentRecord) -> StoreResult<()> {
            if self.fail_put {
                return Err(StoreError::Unavailable("store offline".to_string()));
            }
            self.inner.put(partition, record).await
        }

        async fn delete(&self, partition: Partition, ticket_id: &str) -> StoreResult<()> {
            self.inner.delete(partition, ticket_id).await
        }

        async fn list(&self, partition: Partition) -> StoreResult<Vec<TicketId>> {
            self.inner.list(partition).await
        }
    }

    #[test]
    fn test_digit_table_completeness() {
        assert_eq!(classify_digits("1"), DigitAction::Acknowledge);
        assert_eq!(classify_digits("2"), DigitAction::Repeat);
        for digits in ["", "0", "3", "9", "12", "21", "#", "*", "one"] {
            assert_eq!(classify_digits(digits), DigitAction::Invalid, "{digits:?}");
        }
    }

    #[test]
    fn test_offer_twiml_gathers_one_digit() {
        let twiml = offer_prompt("T-1", "disk full").to_twiml();
        assert!(twiml.contains("<Gather numDigits=\"1\""));
        assert!(twiml.contains("ticket number T-1"));
        assert!(twiml.contains("disk full"));
        assert!(twiml.contains("No input received"));
    }

    #[test]
    fn test_twiml_escapes_summary() {
        let twiml = offer_prompt("T-1", "load <avg> & climbing").to_twiml();
        assert!(twiml.contains("load &lt;avg&gt; &amp; climbing"));
    }

    #[tokio::test]
    async fn test_digit_one_moves_record() {
        let store = MemoryStore::new();
        let record = IncidentRecord::new("T-1", "disk full", split_targets("+15550001"));
        store.commit(&record).await.unwrap();

        let prompt = acknowledge_response(&store, "1", "T-1", "disk full").await;
        assert_eq!(prompt, VoicePrompt::Acknowledged);

        assert!(store.get(Partition::Pending, "T-1").await.unwrap().is_none());
        let acked = store
            .get(Partition::Acknowledged, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(acked.status, IncidentStatus::Acknowledged);
    }

    #[tokio::test]
    async fn test_digit_two_reissues_offer_without_mutation() {
        let store = MemoryStore::new();
        let record = IncidentRecord::new("T-1", "cpu high", split_targets("+15550001"));
        store.commit(&record).await.unwrap();

        let prompt = acknowledge_response(&store, "2", "T-1", "cpu high").await;
        assert_eq!(
            prompt,
            VoicePrompt::Offer {
                ticket_id: "T-1".to_string(),
                summary: "cpu high".to_string()
            }
        );

        let pending = store
            .get(Partition::Pending, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.status, IncidentStatus::Pending);
    }

    #[tokio::test]
    async fn test_invalid_digits_mutate_nothing() {
        let store = MemoryStore::new();
        let record = IncidentRecord::new("T-1", "cpu high", split_targets("+15550001"));
        store.commit(&record).await.unwrap();

        for digits in ["", "9", "11"] {
            let prompt = acknowledge_response(&store, digits, "T-1", "cpu high").await;
            assert_eq!(prompt, VoicePrompt::Invalid);
        }

        let pending = store
            .get(Partition::Pending, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.status, IncidentStatus::Pending);
    }

    #[tokio::test]
    async fn test_digit_one_without_pending_record() {
        let store = MemoryStore::new();
        let prompt = acknowledge_response(&store, "1", "T-ghost", "gone").await;
        assert_eq!(prompt, VoicePrompt::Acknowledged);
        assert!(store
            .get(Partition::Acknowledged, "T-ghost")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_store_load_failure_degrades_to_invalid() {
        let store = BrokenStore {
            inner: MemoryStore::new(),
            fail_get: true,
            fail_put: false,
        };

        let prompt = acknowledge_response(&store, "1", "T-1", "disk full").await;
        assert_eq!(prompt, VoicePrompt::Invalid);
    }

    #[tokio::test]
    async fn test_store_commit_failure_degrades_to_invalid() {
        let inner = MemoryStore::new();
        let record = IncidentRecord::new("T-1", "disk full", split_targets("+15550001"));
        inner.put(Partition::Pending, &record).await.unwrap();

        let store = BrokenStore {
            inner: inner.clone(),
            fail_get: false,
            fail_put: true,
        };

        let prompt = acknowledge_response(&store, "1", "T-1", "disk full").await;
        assert_eq!(prompt, VoicePrompt::Invalid);

        // The record must be left where it was, still pending
        let pending = inner
            .get(Partition::Pending, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.status, IncidentStatus::Pending);
    }

    #[tokio::test]
    async fn test_late_acknowledgment_after_exhaustion() {
        let store = MemoryStore::new();
        let mut record = IncidentRecord::new("T-1", "disk full", split_targets("+15550001"));
        record.record_attempt();
        record.mark_exhausted();
        store.commit(&record).await.unwrap();

        let prompt = acknowledge_response(&store, "1", "T-1", "disk full").await;
        assert_eq!(prompt, VoicePrompt::Acknowledged);

        let acked = store
            .get(Partition::Acknowledged, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(acked.status, IncidentStatus::Acknowledged);
        assert!(store.get(Partition::Pending, "T-1").await.unwrap().is_none());
    }
}
