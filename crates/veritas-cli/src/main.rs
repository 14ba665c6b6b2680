//! Veritas CLI — offline tooling for circuit public signals and verifier
//! configuration.
//!
//! Subcommands: decode, params, init.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Veritas — zero-knowledge credential proofs.
#[derive(Parser, Debug)]
#[command(name = "veritas", version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (text, json).
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a public signal array into typed signals.
    Decode(commands::decode::DecodeArgs),
    /// Print the effective parameters of a circuit.
    Params(commands::params::ParamsArgs),
    /// Write a default verifier configuration.
    Init(commands::init::InitArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    match cli.log_format.as_str() {
        "json" => builder.json().init(),
        "text" => builder.init(),
        other => anyhow::bail!("unknown log format {:?} (expected text or json)", other),
    }

    match &cli.command {
        Commands::Decode(args) => commands::decode::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Init(args) => commands::init::run(args),
    }
}
