//! `veritas decode` — Decode a public signal array into typed signals.

use clap::Args;
use std::path::{Path, PathBuf};
use veritas_core::CircuitId;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Circuit id, optionally with a version suffix.
    #[arg(short, long)]
    pub circuit: String,

    /// Signal array as JSON (as string or path to file).
    #[arg(short, long)]
    pub signals: String,

    /// Verifier config with circuit parameter overrides.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Read `input` as a file when one exists at that path, inline JSON otherwise.
pub(crate) fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if Path::new(input).exists() {
        Ok(std::fs::read(input)?)
    } else {
        Ok(input.as_bytes().to_vec())
    }
}

pub fn run(args: &DecodeArgs) -> anyhow::Result<()> {
    let circuit = CircuitId::parse(&args.circuit)?;
    let params = super::effective_params(circuit, args.config.as_deref())?;
    let bytes = read_input(&args.signals)?;

    let decoded = veritas_circuits::decode(circuit, &params, &bytes)?;
    tracing::info!(circuit = %circuit, "decoded public signals");
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}
