//! `credentialAtomicQuerySigV2OnChain`: the signature query bundled with the
//! requester's ownership proof.

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams, Field, Hash, Id};

use crate::atomic_mtp_v2_on_chain::OnChainCircuitInputs;
use crate::atomic_sig_v2::AtomicQuerySigV2Inputs;
use crate::common::{to_json, SignalReader, UserAuthFields, UserAuthProof};
use crate::error::CircuitError;

/// Proof material for `credentialAtomicQuerySigV2OnChain`.
#[derive(Debug, Clone)]
pub struct AtomicQuerySigV2OnChainInputs {
    pub atomic: AtomicQuerySigV2Inputs,
    pub auth: UserAuthProof,
    pub challenge: Field,
}

impl AtomicQuerySigV2OnChainInputs {
    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        if !self.auth.inc_mtp.existence {
            return Err(CircuitError::MissingProof("auth claim inclusion proof"));
        }
        let inputs = OnChainCircuitInputs {
            atomic: self
                .atomic
                .circuit_inputs(CircuitId::AtomicQuerySigV2OnChain, params)?,
            auth: UserAuthFields::new(&self.auth, &self.challenge, params)?,
        };
        to_json(&inputs)
    }
}

/// Public output of `credentialAtomicQuerySigV2OnChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQuerySigV2OnChainPubSignals {
    pub merklized: bool,
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub issuer_auth_state: Hash,
    pub circuit_query_hash: Field,
    #[serde(rename = "requestID")]
    pub request_id: Field,
    pub challenge: Field,
    pub gist_root: Hash,
    #[serde(rename = "issuerID")]
    pub issuer_id: Id,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
}

impl AtomicQuerySigV2OnChainPubSignals {
    pub const SIGNAL_COUNT: usize = 11;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            merklized: r.flag("merklized")?,
            user_id: r.id("userID")?,
            issuer_auth_state: r.field("issuerAuthState")?,
            circuit_query_hash: r.field("circuitQueryHash")?,
            request_id: r.field("requestID")?,
            challenge: r.field("challenge")?,
            gist_root: r.field("gistRoot")?,
            issuer_id: r.id("issuerID")?,
            is_revocation_checked: r.flag("isRevocationChecked")?,
            issuer_claim_non_rev_state: r.field("issuerClaimNonRevState")?,
            timestamp: r.u64("timestamp")?,
        })
    }
}
