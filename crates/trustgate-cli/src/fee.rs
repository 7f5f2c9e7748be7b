//! # Fee Subcommand
//!
//! Prints the gross/fee/net split for an amount in minor units.

use clap::Args;

use trustgate_core::TrustGateConfig;
use trustgate_escrow::FeeRate;

/// Arguments for the fee subcommand.
#[derive(Args, Debug)]
pub struct FeeArgs {
    /// Gross amount in minor currency units.
    #[arg(long)]
    pub amount: u64,

    /// Fee rate in basis points. Defaults to the configured platform rate.
    #[arg(long)]
    pub bps: Option<u32>,
}

/// Compute the split and render it as pretty JSON.
pub fn run(args: &FeeArgs, config: &TrustGateConfig) -> anyhow::Result<String> {
    let rate = FeeRate::new(args.bps.unwrap_or(config.escrow.default_platform_fee_bps))?;
    let split = rate.split(args.amount);
    Ok(serde_json::to_string_pretty(&split)?)
}
