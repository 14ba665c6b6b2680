//! Veritas Circuits — builds the private-input object each proving circuit
//! consumes and parses the public signals it outputs.
//!
//! Every circuit has a fixed input arity and a fixed public-output order, so
//! encoders always emit every key (zero-filled where unused) and decoders
//! read strictly by position.

pub mod atomic_mtp_v2;
pub mod atomic_mtp_v2_on_chain;
pub mod atomic_sig_v2;
pub mod atomic_sig_v2_on_chain;
pub mod atomic_v3;
pub mod atomic_v3_on_chain;
pub mod auth;
pub mod auth_v2;
pub mod common;
pub mod error;
pub mod linked_multi_query;
pub mod state_transition;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams};

pub use atomic_mtp_v2::{AtomicQueryMtpV2Inputs, AtomicQueryMtpV2PubSignals};
pub use atomic_mtp_v2_on_chain::{AtomicQueryMtpV2OnChainInputs, AtomicQueryMtpV2OnChainPubSignals};
pub use atomic_sig_v2::{AtomicQuerySigV2Inputs, AtomicQuerySigV2PubSignals};
pub use atomic_sig_v2_on_chain::{AtomicQuerySigV2OnChainInputs, AtomicQuerySigV2OnChainPubSignals};
pub use atomic_v3::{AtomicQueryV3Inputs, AtomicQueryV3PubSignals};
pub use atomic_v3_on_chain::{AtomicQueryV3OnChainInputs, AtomicQueryV3OnChainPubSignals};
pub use auth::{AuthInputs, AuthPubSignals};
pub use auth_v2::{AuthV2Inputs, AuthV2PubSignals};
pub use common::{
    check_signal_count, parse_signals, prepare_values, BjjSignatureProof, ClaimWithMtp,
    ClaimWithSig, ClaimWithSigAndMtp, Query, Requester, UserAuthProof, ValueProof,
};
pub use error::CircuitError;
pub use linked_multi_query::{LinkedMultiQueryInputs, LinkedMultiQueryPubSignals};
pub use state_transition::{StateTransitionInputs, StateTransitionPubSignals};

/// Assembled proof material for one circuit.
#[derive(Debug, Clone)]
pub enum ProofMaterial {
    Auth(AuthInputs),
    AuthV2(AuthV2Inputs),
    StateTransition(StateTransitionInputs),
    AtomicQueryMtpV2(AtomicQueryMtpV2Inputs),
    AtomicQueryMtpV2OnChain(AtomicQueryMtpV2OnChainInputs),
    AtomicQuerySigV2(AtomicQuerySigV2Inputs),
    AtomicQuerySigV2OnChain(AtomicQuerySigV2OnChainInputs),
    AtomicQueryV3(AtomicQueryV3Inputs),
    AtomicQueryV3OnChain(AtomicQueryV3OnChainInputs),
    LinkedMultiQuery(LinkedMultiQueryInputs),
}

impl ProofMaterial {
    fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::AuthV2(_) => "authV2",
            Self::StateTransition(_) => "stateTransition",
            Self::AtomicQueryMtpV2(_) => "credentialAtomicQueryMTPV2",
            Self::AtomicQueryMtpV2OnChain(_) => "credentialAtomicQueryMTPV2OnChain",
            Self::AtomicQuerySigV2(_) => "credentialAtomicQuerySigV2",
            Self::AtomicQuerySigV2OnChain(_) => "credentialAtomicQuerySigV2OnChain",
            Self::AtomicQueryV3(_) => "credentialAtomicQueryV3",
            Self::AtomicQueryV3OnChain(_) => "credentialAtomicQueryV3OnChain",
            Self::LinkedMultiQuery(_) => "linkedMultiQuery10",
        }
    }
}

/// Decoded public signals of one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PubSignals {
    Auth(AuthPubSignals),
    AuthV2(AuthV2PubSignals),
    StateTransition(StateTransitionPubSignals),
    AtomicQueryMtpV2(AtomicQueryMtpV2PubSignals),
    AtomicQueryMtpV2OnChain(AtomicQueryMtpV2OnChainPubSignals),
    AtomicQuerySigV2(AtomicQuerySigV2PubSignals),
    AtomicQuerySigV2OnChain(AtomicQuerySigV2OnChainPubSignals),
    AtomicQueryV3(AtomicQueryV3PubSignals),
    AtomicQueryV3OnChain(AtomicQueryV3OnChainPubSignals),
    LinkedMultiQuery(LinkedMultiQueryPubSignals),
}

/// Encode proof material with the circuit's default parameters.
pub fn encode(circuit: CircuitId, material: &ProofMaterial) -> Result<Vec<u8>, CircuitError> {
    encode_with_params(circuit, &CircuitParams::new(), material)
}

/// Encode proof material into the prover's input JSON. `params` override the
/// circuit's own defaults.
pub fn encode_with_params(
    circuit: CircuitId,
    params: &CircuitParams,
    material: &ProofMaterial,
) -> Result<Vec<u8>, CircuitError> {
    let params = circuit.default_params().merged(params);
    tracing::debug!(circuit = %circuit, material = material.kind(), "encoding circuit inputs");

    use CircuitId as C;
    use ProofMaterial as M;
    match (circuit, material) {
        (C::Auth, M::Auth(m)) => m.marshal(&params),
        (C::AuthV2 | C::AuthV3 | C::AuthV3_8_32, M::AuthV2(m)) => m.marshal(&params),
        (C::StateTransition, M::StateTransition(m)) => m.marshal(&params),
        (C::AtomicQueryMtpV2, M::AtomicQueryMtpV2(m)) => m.marshal(&params),
        (C::AtomicQueryMtpV2OnChain, M::AtomicQueryMtpV2OnChain(m)) => m.marshal(&params),
        (C::AtomicQuerySigV2, M::AtomicQuerySigV2(m)) => m.marshal(&params),
        (C::AtomicQuerySigV2OnChain, M::AtomicQuerySigV2OnChain(m)) => m.marshal(&params),
        (C::AtomicQueryV3, M::AtomicQueryV3(m)) => m.marshal(&params),
        (C::AtomicQueryV3OnChain, M::AtomicQueryV3OnChain(m)) => m.marshal(&params),
        (C::LinkedMultiQuery10, M::LinkedMultiQuery(m)) => m.marshal(&params),
        _ => Err(CircuitError::MaterialMismatch {
            circuit,
            material: material.kind(),
        }),
    }
}

/// Decode a public-signal JSON array. `params` must match the ones the
/// proof's inputs were encoded with; they override the circuit's defaults.
pub fn decode(
    circuit: CircuitId,
    params: &CircuitParams,
    bytes: &[u8],
) -> Result<PubSignals, CircuitError> {
    let signals = parse_signals(bytes)?;
    decode_signals(circuit, params, &signals)
}

/// [`decode`] over an already parsed signal array.
pub fn decode_signals(
    circuit: CircuitId,
    params: &CircuitParams,
    signals: &[String],
) -> Result<PubSignals, CircuitError> {
    let params = circuit.default_params().merged(params);
    tracing::debug!(circuit = %circuit, count = signals.len(), "decoding public signals");

    let decoded = match circuit {
        CircuitId::Auth => PubSignals::Auth(AuthPubSignals::decode(signals)?),
        CircuitId::AuthV2 | CircuitId::AuthV3 | CircuitId::AuthV3_8_32 => {
            PubSignals::AuthV2(AuthV2PubSignals::decode(signals)?)
        }
        CircuitId::StateTransition => {
            PubSignals::StateTransition(StateTransitionPubSignals::decode(signals)?)
        }
        CircuitId::AtomicQueryMtpV2 => {
            PubSignals::AtomicQueryMtpV2(AtomicQueryMtpV2PubSignals::decode(signals, &params)?)
        }
        CircuitId::AtomicQueryMtpV2OnChain => PubSignals::AtomicQueryMtpV2OnChain(
            AtomicQueryMtpV2OnChainPubSignals::decode(signals)?,
        ),
        CircuitId::AtomicQuerySigV2 => {
            PubSignals::AtomicQuerySigV2(AtomicQuerySigV2PubSignals::decode(signals, &params)?)
        }
        CircuitId::AtomicQuerySigV2OnChain => PubSignals::AtomicQuerySigV2OnChain(
            AtomicQuerySigV2OnChainPubSignals::decode(signals)?,
        ),
        CircuitId::AtomicQueryV3 => {
            PubSignals::AtomicQueryV3(AtomicQueryV3PubSignals::decode(signals, &params)?)
        }
        CircuitId::AtomicQueryV3OnChain => {
            PubSignals::AtomicQueryV3OnChain(AtomicQueryV3OnChainPubSignals::decode(signals)?)
        }
        CircuitId::LinkedMultiQuery10 => {
            PubSignals::LinkedMultiQuery(LinkedMultiQueryPubSignals::decode(signals)?)
        }
    };
    Ok(decoded)
}
