use veritas_core::{CircuitId, CoreError};

/// Errors raised while encoding prover inputs or decoding public signals.
#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("missing proof: {0}")]
    MissingProof(&'static str),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("value array holds at most {max} values, got {actual}")]
    ValueArraySize { max: usize, actual: usize },

    #[error("invalid public signal {name}: {reason}")]
    InvalidSignal { name: &'static str, reason: String },

    #[error("circuit {circuit} does not take {material} inputs")]
    MaterialMismatch {
        circuit: CircuitId,
        material: &'static str,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for CircuitError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
