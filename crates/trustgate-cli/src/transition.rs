//! # Transition Subcommand
//!
//! Checks one escrow step against the state machine without touching any
//! ledger.

use clap::Args;
use serde::Serialize;

use trustgate_escrow::{EscrowEvent, EscrowStatus};

/// Arguments for the transition subcommand.
#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Current status, e.g. `held` or `release_window`.
    #[arg(long)]
    pub status: String,

    /// Event name, e.g. `deliveryOrMoveInConfirmed`.
    #[arg(long)]
    pub event: String,
}

/// Outcome of a single step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub from: EscrowStatus,
    pub event: EscrowEvent,
    pub accepted: bool,
    /// Resulting status when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<EscrowStatus>,
}

pub fn run(args: &TransitionArgs) -> anyhow::Result<String> {
    let from: EscrowStatus = args.status.parse()?;
    let event: EscrowEvent = args.event.parse()?;
    let to = from.after(event);
    if to.is_none() {
        tracing::warn!(status = %from, event = %event, "transition rejected");
    }
    let outcome = TransitionOutcome {
        from,
        event,
        accepted: to.is_some(),
        to,
    };
    Ok(serde_json::to_string_pretty(&outcome)?)
}
