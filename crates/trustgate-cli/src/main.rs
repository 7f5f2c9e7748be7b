//! # trustgate CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::path::PathBuf;

use clap::Parser;

/// Trust gate toolchain.
///
/// Computes fee splits, checks escrow transitions, and evaluates visibility
/// scenarios.
#[derive(Parser, Debug)]
#[command(name = "trustgate", version, about)]
struct Cli {
    /// YAML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Platform fee split for an amount.
    Fee(trustgate_cli::fee::FeeArgs),
    /// Check one escrow state-machine step.
    Transition(trustgate_cli::transition::TransitionArgs),
    /// Evaluate a visibility scenario file.
    Evaluate(trustgate_cli::evaluate::EvaluateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = trustgate_cli::load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Fee(args) => trustgate_cli::fee::run(&args, &config)?,
        Commands::Transition(args) => trustgate_cli::transition::run(&args)?,
        Commands::Evaluate(args) => trustgate_cli::evaluate::run(&args, &config)?,
    };
    println!("{output}");

    Ok(())
}
