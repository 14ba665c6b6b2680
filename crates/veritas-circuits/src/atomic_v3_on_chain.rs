//! `credentialAtomicQueryV3OnChain`: the V3 query for contracts, with an
//! optional ownership sub-proof.

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams, Field, Hash, Id, ProofType};

use crate::atomic_v3::{AtomicQueryV3CircuitInputs, AtomicQueryV3Inputs};
use crate::common::{to_json, SignalReader, UserAuthFields, UserAuthProof};
use crate::error::CircuitError;

/// Proof material for `credentialAtomicQueryV3OnChain`.
#[derive(Debug, Clone)]
pub struct AtomicQueryV3OnChainInputs {
    pub atomic: AtomicQueryV3Inputs,
    /// `None` when ownership was established out of band; the ownership
    /// inputs are then zero-filled and `isBJJAuthEnabled` is 0.
    pub auth: Option<UserAuthProof>,
    pub challenge: Field,
}

#[derive(Serialize)]
struct AtomicQueryV3OnChainCircuitInputs {
    #[serde(flatten)]
    atomic: AtomicQueryV3CircuitInputs,
    #[serde(flatten)]
    auth: UserAuthFields,
    #[serde(rename = "isBJJAuthEnabled")]
    is_bjj_auth_enabled: Field,
}

impl AtomicQueryV3OnChainInputs {
    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        let auth = match &self.auth {
            Some(auth) => {
                if !auth.inc_mtp.existence {
                    return Err(CircuitError::MissingProof("auth claim inclusion proof"));
                }
                UserAuthFields::new(auth, &self.challenge, params)?
            }
            None => UserAuthFields::zeroed(&self.challenge, params),
        };
        let inputs = AtomicQueryV3OnChainCircuitInputs {
            atomic: self
                .atomic
                .circuit_inputs(CircuitId::AtomicQueryV3OnChain, params)?,
            auth,
            is_bjj_auth_enabled: Field::from(self.auth.is_some()),
        };
        to_json(&inputs)
    }
}

/// Public output of `credentialAtomicQueryV3OnChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryV3OnChainPubSignals {
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub circuit_query_hash: Field,
    pub issuer_state: Hash,
    #[serde(rename = "linkID")]
    pub link_id: Field,
    pub nullifier: Field,
    pub operator_output: Field,
    pub proof_type: ProofType,
    #[serde(rename = "requestID")]
    pub request_id: Field,
    pub challenge: Field,
    pub gist_root: Hash,
    #[serde(rename = "issuerID")]
    pub issuer_id: Id,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
    #[serde(rename = "isBJJAuthEnabled")]
    pub is_bjj_auth_enabled: bool,
}

impl AtomicQueryV3OnChainPubSignals {
    pub const SIGNAL_COUNT: usize = 15;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            user_id: r.id("userID")?,
            circuit_query_hash: r.field("circuitQueryHash")?,
            issuer_state: r.field("issuerState")?,
            link_id: r.field("linkID")?,
            nullifier: r.field("nullifier")?,
            operator_output: r.field("operatorOutput")?,
            proof_type: r.proof_type("proofType")?,
            request_id: r.field("requestID")?,
            challenge: r.field("challenge")?,
            gist_root: r.field("gistRoot")?,
            issuer_id: r.id("issuerID")?,
            is_revocation_checked: r.flag("isRevocationChecked")?,
            issuer_claim_non_rev_state: r.field("issuerClaimNonRevState")?,
            timestamp: r.u64("timestamp")?,
            is_bjj_auth_enabled: r.flag("isBJJAuthEnabled")?,
        })
    }
}
