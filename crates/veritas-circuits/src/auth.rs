//! `auth`: the first identity-ownership circuit.

use serde::Serialize;
use veritas_core::{CircuitParams, Claim, Field, Hash, Id, MtpWithState, Signature};

use crate::common::{padded, to_json, SignalReader};
use crate::error::CircuitError;

/// Proof material for `auth`.
#[derive(Debug, Clone)]
pub struct AuthInputs {
    pub id: Id,
    pub auth_claim: Claim,
    /// Inclusion of the auth claim; its tree state is the user's state.
    pub inc_proof: MtpWithState,
    pub non_rev_proof: MtpWithState,
    pub signature: Signature,
    pub challenge: Field,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthCircuitInputs {
    user_auth_claim: Claim,
    user_auth_claim_mtp: Vec<Hash>,
    user_auth_claim_non_rev_mtp: Vec<Hash>,
    user_auth_claim_non_rev_mtp_aux_hi: Hash,
    user_auth_claim_non_rev_mtp_aux_hv: Hash,
    user_auth_claim_non_rev_mtp_no_aux: Field,
    challenge: Field,
    challenge_signature_r8x: Field,
    challenge_signature_r8y: Field,
    challenge_signature_s: Field,
    user_claims_tree_root: Hash,
    #[serde(rename = "userID")]
    user_id: Field,
    user_rev_tree_root: Hash,
    user_roots_tree_root: Hash,
    user_state: Hash,
}

impl AuthInputs {
    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        if !self.inc_proof.proof.existence {
            return Err(CircuitError::MissingProof("auth claim inclusion proof"));
        }
        let aux = self.non_rev_proof.proof.aux();
        let state = &self.inc_proof.tree_state;
        let inputs = AuthCircuitInputs {
            user_auth_claim: self.auth_claim.clone(),
            user_auth_claim_mtp: padded(&self.inc_proof.proof, params.mt_level())?,
            user_auth_claim_non_rev_mtp: padded(&self.non_rev_proof.proof, params.mt_level())?,
            user_auth_claim_non_rev_mtp_aux_hi: aux.key,
            user_auth_claim_non_rev_mtp_aux_hv: aux.value,
            user_auth_claim_non_rev_mtp_no_aux: Field::from(aux.no_aux),
            challenge: self.challenge.clone(),
            challenge_signature_r8x: self.signature.r8x.clone(),
            challenge_signature_r8y: self.signature.r8y.clone(),
            challenge_signature_s: self.signature.s.clone(),
            user_claims_tree_root: state.claims_root.clone(),
            user_id: self.id.to_field(),
            user_rev_tree_root: state.revocation_root.clone(),
            user_roots_tree_root: state.root_of_roots.clone(),
            user_state: state.state.clone(),
        };
        to_json(&inputs)
    }
}

/// Public output of `auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPubSignals {
    pub challenge: Field,
    pub user_state: Hash,
    #[serde(rename = "userID")]
    pub user_id: Id,
}

impl AuthPubSignals {
    pub const SIGNAL_COUNT: usize = 3;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            challenge: r.field("challenge")?,
            user_state: r.field("userState")?,
            user_id: r.id("userID")?,
        })
    }
}
