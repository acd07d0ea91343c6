//! Runtime configuration
//!
//! All knobs the engine and notifier need are carried in explicit
//! config structs built once at startup; nothing reads process globals
//! after construction. Defaults can be overridden from the
//! environment, then again from CLI flags in the binary.

use std::path::PathBuf;
use std::time::Duration;

use crate::escalation::EscalationConfig;

/// Credentials and endpoints for the outbound voice provider
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Provider REST base, e.g. `https://api.twilio.com/2010-04-01`
    pub api_base: String,
    /// Provider account identifier
    pub account_sid: String,
    /// Provider auth token
    pub auth_token: String,
    /// Caller identity presented to responders
    pub from_number: String,
    /// Public answer-webhook base the provider fetches the prompt from
    pub prompt_url: String,
    /// HTTP connect timeout for call-creation requests
    pub connect_timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twilio.com/2010-04-01".to_string(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            prompt_url: String::new(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl NotifierConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("CALLOUT_API_BASE").unwrap_or(defaults.api_base),
            account_sid: std::env::var("CALLOUT_ACCOUNT_SID").unwrap_or(defaults.account_sid),
            auth_token: std::env::var("CALLOUT_AUTH_TOKEN").unwrap_or(defaults.auth_token),
            from_number: std::env::var("CALLOUT_FROM_NUMBER").unwrap_or(defaults.from_number),
            prompt_url: std::env::var("CALLOUT_PROMPT_URL").unwrap_or(defaults.prompt_url),
            connect_timeout: std::env::var("CALLOUT_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }
}

/// Top-level configuration for the service
#[derive(Debug, Clone)]
pub struct CalloutConfig {
    /// Root directory for the file-backed state store
    pub state_root: PathBuf,
    /// Retry ceiling, wait window, and fallback responder list
    pub escalation: EscalationConfig,
    /// Voice provider credentials and endpoints
    pub notifier: NotifierConfig,
}

impl Default for CalloutConfig {
    fn default() -> Self {
        Self {
            state_root: PathBuf::from("./callout-state"),
            escalation: EscalationConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl CalloutConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            state_root: std::env::var("CALLOUT_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_root),
            escalation: EscalationConfig::from_env(),
            notifier: NotifierConfig::from_env(),
        }
    }
}
