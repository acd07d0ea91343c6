//! Outbound notification boundary
//!
//! One notifier call places one voice call to one responder and hands
//! back the provider's call id. The escalation loop treats each call
//! as best-effort: a failed target is logged and skipped, never fatal
//! to the rest of the wave.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::NotifierConfig;

/// Provider-assigned identifier for one placed call
pub type CallId = String;

/// Error types for notification attempts
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("call request failed: {0}")]
    Request(String),

    #[error("provider rejected call: status {0}")]
    Rejected(reqwest::StatusCode),

    #[error("invalid prompt callback url: {0}")]
    CallbackUrl(String),
}

/// Places one outbound notification attempt to one target
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn place_call(
        &self,
        target: &str,
        ticket_id: &str,
        summary: &str,
    ) -> Result<CallId, NotifierError>;
}

/// Call resource returned by the provider's REST API
#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
}

/// Twilio-style REST notifier.
///
/// POSTs a form-encoded call-creation request; the provider then
/// fetches the voice prompt from the configured answer-webhook URL,
/// which carries the ticket id and summary as query parameters since
/// no server-side session survives between the prompt and the digit
/// callback.
pub struct HttpVoiceNotifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl HttpVoiceNotifier {
    /// Build a notifier, returning an error if the HTTP client cannot
    /// be created
    pub fn new(config: NotifierConfig) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| NotifierError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Answer-webhook URL with the ticket context threaded through
    fn prompt_url(&self, ticket_id: &str, summary: &str) -> Result<reqwest::Url, NotifierError> {
        reqwest::Url::parse_with_params(
            &self.config.prompt_url,
            &[("ticket_id", ticket_id), ("summary", summary)],
        )
        .map_err(|e| NotifierError::CallbackUrl(e.to_string()))
    }
}

#[async_trait]
impl Notifier for HttpVoiceNotifier {
    async fn place_call(
        &self,
        target: &str,
        ticket_id: &str,
        summary: &str,
    ) -> Result<CallId, NotifierError> {
        let prompt_url = self.prompt_url(ticket_id, summary)?;
        let endpoint = format!(
            "{}/Accounts/{}/Calls.json",
            self.config.api_base, self.config.account_sid
        );

        let response = self
            .client
            .post(&endpoint)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", target),
                ("From", self.config.from_number.as_str()),
                ("Url", prompt_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NotifierError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifierError::Rejected(response.status()));
        }

        let call: CallResource = response
            .json()
            .await
            .map_err(|e| NotifierError::Request(e.to_string()))?;

        tracing::info!(
            ticket_id,
            target = %target,
            call_id = %call.sid,
            "outbound call initiated"
        );
        Ok(call.sid)
    }
}
