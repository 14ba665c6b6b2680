//! `stateTransition`: proves an identity moved from one state to the next.

use serde::Serialize;
use veritas_core::{CircuitParams, Claim, Field, Hash, Id, MerkleProof, Signature, TreeState};

use crate::common::{padded, to_json, SignalReader};
use crate::error::CircuitError;

/// Proof material for `stateTransition`.
#[derive(Debug, Clone)]
pub struct StateTransitionInputs {
    pub id: Id,
    pub old_tree_state: TreeState,
    pub new_tree_state: TreeState,
    pub is_old_state_genesis: bool,
    pub auth_claim: Claim,
    /// Inclusion of the auth claim in the old state.
    pub auth_claim_inc_mtp: MerkleProof,
    /// Non-revocation of the auth claim in the old state.
    pub auth_claim_non_rev_mtp: MerkleProof,
    /// Inclusion of the auth claim in the new state.
    pub auth_claim_new_state_inc_mtp: MerkleProof,
    /// Signature over the old and new state.
    pub signature: Signature,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateTransitionCircuitInputs {
    auth_claim: Claim,
    auth_claim_mtp: Vec<Hash>,
    auth_claim_non_rev_mtp: Vec<Hash>,
    auth_claim_non_rev_mtp_aux_hi: Hash,
    auth_claim_non_rev_mtp_aux_hv: Hash,
    auth_claim_non_rev_mtp_no_aux: Field,
    #[serde(rename = "userID")]
    user_id: Field,
    new_user_state: Hash,
    old_user_state: Hash,
    is_old_state_genesis: Field,
    claims_tree_root: Hash,
    rev_tree_root: Hash,
    roots_tree_root: Hash,
    signature_r8x: Field,
    signature_r8y: Field,
    signature_s: Field,
    new_auth_claim_mtp: Vec<Hash>,
    new_claims_tree_root: Hash,
    new_rev_tree_root: Hash,
    new_roots_tree_root: Hash,
}

impl StateTransitionInputs {
    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        if !self.auth_claim_inc_mtp.existence {
            return Err(CircuitError::MissingProof("auth claim inclusion proof in old state"));
        }
        if !self.auth_claim_new_state_inc_mtp.existence {
            return Err(CircuitError::MissingProof("auth claim inclusion proof in new state"));
        }
        let aux = self.auth_claim_non_rev_mtp.aux();
        let old = &self.old_tree_state;
        let new = &self.new_tree_state;
        let inputs = StateTransitionCircuitInputs {
            auth_claim: self.auth_claim.clone(),
            auth_claim_mtp: padded(&self.auth_claim_inc_mtp, params.mt_level())?,
            auth_claim_non_rev_mtp: padded(&self.auth_claim_non_rev_mtp, params.mt_level())?,
            auth_claim_non_rev_mtp_aux_hi: aux.key,
            auth_claim_non_rev_mtp_aux_hv: aux.value,
            auth_claim_non_rev_mtp_no_aux: Field::from(aux.no_aux),
            user_id: self.id.to_field(),
            new_user_state: new.state.clone(),
            old_user_state: old.state.clone(),
            is_old_state_genesis: Field::from(self.is_old_state_genesis),
            claims_tree_root: old.claims_root.clone(),
            rev_tree_root: old.revocation_root.clone(),
            roots_tree_root: old.root_of_roots.clone(),
            signature_r8x: self.signature.r8x.clone(),
            signature_r8y: self.signature.r8y.clone(),
            signature_s: self.signature.s.clone(),
            new_auth_claim_mtp: padded(&self.auth_claim_new_state_inc_mtp, params.mt_level())?,
            new_claims_tree_root: new.claims_root.clone(),
            new_rev_tree_root: new.revocation_root.clone(),
            new_roots_tree_root: new.root_of_roots.clone(),
        };
        to_json(&inputs)
    }
}

/// Public output of `stateTransition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransitionPubSignals {
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub old_user_state: Hash,
    pub new_user_state: Hash,
    pub is_old_state_genesis: bool,
}

impl StateTransitionPubSignals {
    pub const SIGNAL_COUNT: usize = 4;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            user_id: r.id("userID")?,
            old_user_state: r.field("oldUserState")?,
            new_user_state: r.field("newUserState")?,
            is_old_state_genesis: r.flag("isOldStateGenesis")?,
        })
    }
}
