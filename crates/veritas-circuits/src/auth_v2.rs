//! `authV2` and its parameter presets (`authV3`, `authV3-8-32`): identity
//! ownership with the state proven in the global identity-state tree.

use serde::Serialize;
use veritas_core::{CircuitParams, Claim, Field, Hash, Id};

use crate::common::{padded, to_json, SignalReader, UserAuthProof};
use crate::error::CircuitError;

/// Proof material for `authV2`.
#[derive(Debug, Clone)]
pub struct AuthV2Inputs {
    pub genesis_id: Id,
    pub profile_nonce: Field,
    pub auth: UserAuthProof,
    pub challenge: Field,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthV2CircuitInputs {
    #[serde(rename = "genesisID")]
    genesis_id: Field,
    profile_nonce: Field,
    auth_claim: Claim,
    auth_claim_inc_mtp: Vec<Hash>,
    auth_claim_non_rev_mtp: Vec<Hash>,
    auth_claim_non_rev_mtp_aux_hi: Hash,
    auth_claim_non_rev_mtp_aux_hv: Hash,
    auth_claim_non_rev_mtp_no_aux: Field,
    challenge: Field,
    challenge_signature_r8x: Field,
    challenge_signature_r8y: Field,
    challenge_signature_s: Field,
    claims_tree_root: Hash,
    rev_tree_root: Hash,
    roots_tree_root: Hash,
    state: Hash,
    gist_root: Hash,
    gist_mtp: Vec<Hash>,
    gist_mtp_aux_hi: Hash,
    gist_mtp_aux_hv: Hash,
    gist_mtp_no_aux: Field,
}

impl AuthV2Inputs {
    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        let auth = &self.auth;
        if !auth.inc_mtp.existence {
            return Err(CircuitError::MissingProof("auth claim inclusion proof"));
        }
        let non_rev_aux = auth.non_rev_mtp.aux();
        let gist_aux = auth.gist_proof.proof.aux();
        let inputs = AuthV2CircuitInputs {
            genesis_id: self.genesis_id.to_field(),
            profile_nonce: self.profile_nonce.clone(),
            auth_claim: auth.auth_claim.clone(),
            auth_claim_inc_mtp: padded(&auth.inc_mtp, params.mt_level())?,
            auth_claim_non_rev_mtp: padded(&auth.non_rev_mtp, params.mt_level())?,
            auth_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            auth_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            auth_claim_non_rev_mtp_no_aux: Field::from(non_rev_aux.no_aux),
            challenge: self.challenge.clone(),
            challenge_signature_r8x: auth.signature.r8x.clone(),
            challenge_signature_r8y: auth.signature.r8y.clone(),
            challenge_signature_s: auth.signature.s.clone(),
            claims_tree_root: auth.tree_state.claims_root.clone(),
            rev_tree_root: auth.tree_state.revocation_root.clone(),
            roots_tree_root: auth.tree_state.root_of_roots.clone(),
            state: auth.tree_state.state.clone(),
            gist_root: auth.gist_proof.root.clone(),
            gist_mtp: padded(&auth.gist_proof.proof, params.mt_level_on_chain())?,
            gist_mtp_aux_hi: gist_aux.key,
            gist_mtp_aux_hv: gist_aux.value,
            gist_mtp_no_aux: Field::from(gist_aux.no_aux),
        };
        to_json(&inputs)
    }
}

/// Public output of `authV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthV2PubSignals {
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub challenge: Field,
    pub gist_root: Hash,
}

impl AuthV2PubSignals {
    pub const SIGNAL_COUNT: usize = 3;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            user_id: r.id("userID")?,
            challenge: r.field("challenge")?,
            gist_root: r.field("gistRoot")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_core::id::GENESIS_LEN;
    use veritas_core::{CircuitId, GistProof, MerkleProof, NodeAux, Signature, TreeState};

    fn inputs() -> AuthV2Inputs {
        AuthV2Inputs {
            genesis_id: Id::new([0x01, 0x13], [4u8; GENESIS_LEN]),
            profile_nonce: Field::zero(),
            auth: UserAuthProof {
                auth_claim: Claim::empty(),
                inc_mtp: MerkleProof::inclusion(vec![Field::from(5u64)]),
                non_rev_mtp: MerkleProof::non_inclusion(
                    vec![],
                    Some(NodeAux {
                        key: Field::from(8u64),
                        value: Field::from(9u64),
                    }),
                ),
                tree_state: TreeState {
                    state: Field::from(100u64),
                    claims_root: Field::from(101u64),
                    revocation_root: Field::from(102u64),
                    root_of_roots: Field::from(103u64),
                },
                gist_proof: GistProof {
                    root: Field::from(500u64),
                    proof: MerkleProof::inclusion(vec![Field::from(7u64); 3]),
                },
                signature: Signature::zero(),
            },
            challenge: Field::from(10u64),
        }
    }

    #[test]
    fn test_marshal_default_depths() {
        let bytes = inputs().marshal(&CircuitParams::new()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["authClaimIncMtp"].as_array().unwrap().len(), 40);
        assert_eq!(json["gistMtp"].as_array().unwrap().len(), 64);
        assert_eq!(json["gistMtp"][2], "7");
        assert_eq!(json["gistMtp"][3], "0");
        assert_eq!(json["authClaimNonRevMtpAuxHi"], "8");
        assert_eq!(json["authClaimNonRevMtpNoAux"], "0");
        assert_eq!(json["gistMtpNoAux"], "0");
        assert_eq!(json["state"], "100");
        assert_eq!(json["gistRoot"], "500");
    }

    #[test]
    fn test_marshal_small_preset() {
        let params = CircuitId::AuthV3_8_32.default_params();
        let bytes = inputs().marshal(&params).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["authClaimIncMtp"].as_array().unwrap().len(), 8);
        assert_eq!(json["gistMtp"].as_array().unwrap().len(), 32);
    }

    #[test]
    fn test_sibling_overflow() {
        let mut material = inputs();
        material.auth.inc_mtp = MerkleProof::inclusion(vec![Field::one(); 9]);
        let params = CircuitId::AuthV3_8_32.default_params();
        assert!(material.marshal(&params).is_err());
    }

    #[test]
    fn test_decode_order() {
        let id = Id::new([0x01, 0x13], [4u8; GENESIS_LEN]);
        let signals = vec![id.to_field().to_string(), "10".into(), "500".into()];
        let decoded = AuthV2PubSignals::decode(&signals).unwrap();
        assert_eq!(decoded.user_id, id);
        assert_eq!(decoded.challenge, Field::from(10u64));
        assert_eq!(decoded.gist_root, Field::from(500u64));
    }
}
