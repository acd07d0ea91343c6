//! Callout CLI
//!
//! Thin dispatch over the three entry operations plus the maintenance
//! sweep. The routing layer that maps real telephony callbacks onto
//! these operations lives outside this binary.
//!
//! ```bash
//! # Start escalating an incident
//! callout --trigger '{"ticket_id":"T-1","summary":"disk full"}'
//!
//! # Render the answer prompt for a connecting call
//! callout --offer --ticket-id T-1 --summary "disk full"
//!
//! # Handle a gathered digit
//! callout --digits 1 --ticket-id T-1 --summary "disk full"
//!
//! # Sweep pending leftovers for acknowledged tickets
//! callout --reconcile
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use callout::{
    acknowledge_response, handle_trigger, offer_prompt, reconcile, CalloutConfig, Escalator,
    HttpVoiceNotifier, JsonFileStore,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trigger payload as JSON, e.g. '{"ticket_id":"T-1","summary":"disk full"}'
    #[arg(long)]
    trigger: Option<String>,

    /// Render the initial offer prompt for --ticket-id
    #[arg(long, default_value_t = false)]
    offer: bool,

    /// Gathered keypad digits to handle for --ticket-id
    #[arg(long)]
    digits: Option<String>,

    /// Ticket id for --offer / --digits
    #[arg(long)]
    ticket_id: Option<String>,

    /// Incident summary for --offer / --digits
    #[arg(long, default_value = "")]
    summary: String,

    /// Remove pending leftovers for tickets already acknowledged
    #[arg(long, default_value_t = false)]
    reconcile: bool,

    /// State directory (overrides CALLOUT_STATE_PATH)
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// Retry ceiling (overrides CALLOUT_MAX_ATTEMPTS)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds between notification waves (overrides CALLOUT_WAIT_SECS)
    #[arg(long)]
    wait_secs: Option<u64>,

    /// Comma-separated responder numbers (overrides CALLOUT_TARGETS)
    #[arg(long)]
    targets: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("callout=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Build config from env, then apply CLI overrides
    let mut config = CalloutConfig::from_env();
    if let Some(path) = args.state_path {
        config.state_root = path;
    }
    if let Some(max) = args.max_attempts {
        config.escalation.max_attempts = max;
    }
    if let Some(secs) = args.wait_secs {
        config.escalation.wait_interval = std::time::Duration::from_secs(secs);
    }
    if let Some(targets) = args.targets {
        config.escalation.default_targets = callout::state::split_targets(&targets);
    }

    let store = JsonFileStore::open(&config.state_root)
        .with_context(|| format!("opening state store at {}", config.state_root.display()))?;

    if args.reconcile {
        let removed = reconcile(&store).await.context("reconcile sweep failed")?;
        println!("removed {removed} pending leftover(s)");
        return Ok(());
    }

    if args.offer {
        let ticket_id = args
            .ticket_id
            .as_deref()
            .context("--offer requires --ticket-id")?;
        println!("{}", offer_prompt(ticket_id, &args.summary).to_twiml());
        return Ok(());
    }

    if let Some(digits) = args.digits {
        let ticket_id = args
            .ticket_id
            .as_deref()
            .context("--digits requires --ticket-id")?;
        let prompt = acknowledge_response(&store, &digits, ticket_id, &args.summary).await;
        println!("{}", prompt.to_twiml());
        return Ok(());
    }

    if let Some(raw) = args.trigger {
        let notifier =
            HttpVoiceNotifier::new(config.notifier.clone()).context("building voice notifier")?;
        let escalator = Escalator::new(store, notifier, config.escalation.clone());

        // Hand the raw body through as-is; normalization decodes it
        let body = serde_json::Value::String(raw);
        let outcome = handle_trigger(&escalator, &body).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    bail!("nothing to do: pass --trigger, --offer, --digits, or --reconcile (see --help)");
}
