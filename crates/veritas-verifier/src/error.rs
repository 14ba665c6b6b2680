use veritas_circuits::CircuitError;
use veritas_core::CoreError;
use veritas_query::QueryError;

/// Proof verification errors.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("unsupported circuit: {0}")]
    UnsupportedCircuit(String),

    #[error("missing verification input: {0}")]
    MissingInput(&'static str),

    #[error("{kind} state is stale: replaced {age_ms} ms ago, accepted {max_ms} ms")]
    StaleState {
        kind: &'static str,
        age_ms: i64,
        max_ms: i64,
    },

    #[error("unknown state: {0}")]
    UnknownState(String),

    #[error("{axis} mismatch: expected {expected}, proof has {actual}")]
    OwnershipMismatch {
        axis: &'static str,
        expected: String,
        actual: String,
    },

    #[error("no state resolver for network {0}")]
    UnsupportedNetwork(String),

    #[error("state resolver error: {0}")]
    Resolver(String),

    #[error("circuit error: {0}")]
    Circuit(#[from] CircuitError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
