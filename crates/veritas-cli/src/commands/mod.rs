pub mod decode;
pub mod init;
pub mod params;

use std::path::Path;

use veritas_core::{CircuitId, CircuitParams};
use veritas_verifier::VerifierConfig;

/// Parameters of `circuit`, from the config file when one is given.
pub(crate) fn effective_params(circuit: CircuitId, config: Option<&Path>) -> anyhow::Result<CircuitParams> {
    match config {
        Some(path) => Ok(VerifierConfig::load(path)?.circuit_params(circuit)),
        None => Ok(circuit.default_params()),
    }
}
