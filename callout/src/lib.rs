//! Callout — voice-call incident escalation
//!
//! Given an alert, repeatedly ring a ranked list of responders until
//! one acknowledges by keypad or the retry budget runs out. Two
//! concurrent, uncoordinated flows meet only in the state store:
//!
//! - the escalation loop ([`Escalator`]), one long-lived task per
//!   incident, ringing every target each wave and sleeping between
//!   waves;
//! - the response path ([`response::acknowledge_response`]), one
//!   short-lived task per telephony callback, turning a gathered
//!   digit into a prompt and (for "1") a persisted acknowledgment.
//!
//! The store holds one record per ticket in one of two partitions,
//! `pending` or `acknowledged`; acknowledging moves the record. Reads
//! treat `acknowledged` as authoritative when both copies exist, and
//! [`state::reconcile`] sweeps up leftovers from interrupted moves.

pub mod config;
pub mod escalation;
pub mod notify;
pub mod response;
pub mod state;
pub mod trigger;

pub use config::{CalloutConfig, NotifierConfig};
pub use escalation::{EscalationConfig, EscalationError, Escalator};
pub use notify::{HttpVoiceNotifier, Notifier, NotifierError};
pub use response::{acknowledge_response, classify_digits, offer_prompt, DigitAction, VoicePrompt};
pub use state::{
    reconcile, FinalStatus, IncidentRecord, IncidentStatus, JsonFileStore, MemoryStore, Partition,
    StateStore, StoreError, StoreResult,
};
pub use trigger::{handle_trigger, normalize_payload, TriggerOutcome, TriggerPayload};
