//! # trustgate-cli — Trust Gate Command-Line Interface
//!
//! ## Subcommands
//!
//! - `fee` — platform fee split for an amount
//! - `transition` — check one escrow state-machine step
//! - `evaluate` — run a JSON scenario through the gate and obfuscator
//!
//! ## Crate Policy
//!
//! - Argument structs live next to their handlers; `main.rs` only parses
//!   and dispatches.
//! - Handlers return their output as a `String` so tests can check it
//!   without capturing stdout.
//! - Domain rules stay in the domain crates.

pub mod evaluate;
pub mod fee;
pub mod transition;

use std::path::Path;

use trustgate_core::TrustGateConfig;

/// Load configuration from `path`, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TrustGateConfig> {
    match path {
        Some(path) => {
            let config = TrustGateConfig::load(path)?;
            tracing::info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(TrustGateConfig::default()),
    }
}
