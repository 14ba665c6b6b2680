use crate::operator::Operator;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid field element: {0}")]
    InvalidField(String),

    #[error("invalid identity id: {0}")]
    InvalidId(String),

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unsupported DID network: {0}")]
    UnsupportedNetwork(String),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("operator {operator} expects {expected} value(s), got {actual}")]
    OperatorArity {
        operator: Operator,
        expected: &'static str,
        actual: usize,
    },

    #[error("circuit {circuit} accepts at most {max} queries, got {actual}")]
    QueryLimit {
        circuit: String,
        max: usize,
        actual: usize,
    },

    #[error("unknown circuit: {0}")]
    UnknownCircuit(String),

    #[error("invalid proof type: {0}")]
    InvalidProofType(u64),

    #[error("hash error: {0}")]
    Hash(String),
}
