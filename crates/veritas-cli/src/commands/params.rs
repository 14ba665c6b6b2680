//! `veritas params` — Print the effective parameters of a circuit.

use clap::Args;
use std::path::PathBuf;
use veritas_core::CircuitId;

#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Circuit id, optionally with a version suffix.
    #[arg(short, long)]
    pub circuit: String,

    /// Verifier config with circuit parameter overrides.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub(crate) fn describe(circuit: CircuitId, params: &veritas_core::CircuitParams) -> serde_json::Value {
    let operators: Vec<&str> = circuit
        .supported_operators()
        .iter()
        .map(|op| op.name())
        .collect();
    serde_json::json!({
        "circuit": circuit,
        "mtLevel": params.mt_level(),
        "mtLevelOnChain": params.mt_level_on_chain(),
        "mtLevelClaim": params.mt_level_claim(),
        "valueArraySize": params.value_array_size(),
        "maxQueries": circuit.max_queries(),
        "operators": operators,
    })
}

pub fn run(args: &ParamsArgs) -> anyhow::Result<()> {
    let circuit = CircuitId::parse(&args.circuit)?;
    let params = super::effective_params(circuit, args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&describe(circuit, &params))?);
    Ok(())
}
