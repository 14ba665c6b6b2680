use std::fmt;

use veritas_core::{CoreError, Field, ProofType};

/// Which addressing axis of a query disagreed with the proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    Path,
    Slot,
    Value,
    Operator,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Path => "claim path",
            Self::Slot => "slot index",
            Self::Value => "value",
            Self::Operator => "operator",
        };
        f.write_str(s)
    }
}

/// Query layer errors.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("issuer {0} is not allowed by the request")]
    IssuerNotAllowed(String),

    #[error("schema mismatch: expected {expected}, proof has {actual}")]
    SchemaMismatch { expected: Field, actual: Field },

    #[error("claim revocation status was not checked")]
    RevocationRequired,

    #[error("proof outdated: generated {age_ms} ms ago, accepted {max_ms} ms")]
    StaleProof { age_ms: i64, max_ms: i64 },

    #[error("{kind} mismatch: {detail}")]
    QueryMismatch { kind: MismatchKind, detail: String },

    #[error("proof type mismatch: requested {expected}, proof has {actual}")]
    ProofTypeMismatch {
        expected: ProofType,
        actual: ProofType,
    },

    #[error("nullifier check failed: {0}")]
    Nullifier(String),

    #[error("link id check failed: {0}")]
    Link(String),

    #[error("selective disclosure requires the presented credential")]
    MissingDisclosure,

    #[error("schema loader error: {0}")]
    Loader(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl QueryError {
    pub(crate) fn mismatch(kind: MismatchKind, detail: impl Into<String>) -> Self {
        Self::QueryMismatch {
            kind,
            detail: detail.into(),
        }
    }
}
