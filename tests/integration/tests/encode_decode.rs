//! Integration test: prover inputs from the encoder, prover outputs through
//! the decoder.

use serde_json::Value;
use veritas_circuits::{
    AuthInputs, AuthV2Inputs, CircuitError, ProofMaterial, PubSignals, UserAuthProof,
};
use veritas_core::{
    CircuitId, CircuitParams, Claim, Field, GistProof, MerkleProof, MtpWithState, Signature,
    TreeState,
};
use veritas_integration_tests::*;

fn tree(state: u64) -> TreeState {
    TreeState {
        state: Field::from(state),
        claims_root: Field::from(state + 1),
        revocation_root: Field::from(state + 2),
        root_of_roots: Field::from(state + 3),
    }
}

fn encoded(circuit: CircuitId, material: &ProofMaterial) -> Value {
    let bytes = veritas_circuits::encode(circuit, material).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn auth_v2_material(siblings: usize) -> ProofMaterial {
    ProofMaterial::AuthV2(AuthV2Inputs {
        genesis_id: user_id(),
        profile_nonce: Field::zero(),
        auth: UserAuthProof {
            auth_claim: Claim::empty(),
            inc_mtp: MerkleProof::inclusion(vec![Field::from(5u64); siblings]),
            non_rev_mtp: MerkleProof::non_inclusion(vec![], None),
            tree_state: tree(500),
            gist_proof: GistProof {
                root: Field::from(900u64),
                proof: MerkleProof::inclusion(vec![Field::from(9u64)]),
            },
            signature: Signature::zero(),
        },
        challenge: Field::from(9u64),
    })
}

#[test]
fn test_auth_single_leaf_tree() {
    let material = ProofMaterial::Auth(AuthInputs {
        id: user_id(),
        auth_claim: Claim::empty(),
        inc_proof: MtpWithState {
            proof: MerkleProof::inclusion(vec![]),
            tree_state: tree(500),
        },
        non_rev_proof: MtpWithState {
            proof: MerkleProof::non_inclusion(vec![], None),
            tree_state: tree(500),
        },
        signature: Signature::zero(),
        challenge: Field::from(1u64),
    });
    let json = encoded(CircuitId::Auth, &material);
    assert_eq!(json["userAuthClaimNonRevMtpNoAux"], "1");
    assert_eq!(json["challenge"], "1");
    assert_eq!(json["userState"], "500");
    assert_eq!(json["userAuthClaimMtp"].as_array().unwrap().len(), 40);
}

#[test]
fn test_auth_v2_padding() {
    let json = encoded(CircuitId::AuthV2, &auth_v2_material(3));
    let inc = json["authClaimIncMtp"].as_array().unwrap();
    assert_eq!(inc.len(), 40);
    assert!(inc[..3].iter().all(|v| v == "5"));
    assert!(inc[3..].iter().all(|v| v == "0"));
    assert_eq!(json["gistMtp"].as_array().unwrap().len(), 64);
    assert_eq!(json["gistRoot"], "900");
}

#[test]
fn test_auth_v3_preset_depths() {
    let json = encoded(CircuitId::AuthV3_8_32, &auth_v2_material(3));
    assert_eq!(json["authClaimIncMtp"].as_array().unwrap().len(), 8);
    assert_eq!(json["gistMtp"].as_array().unwrap().len(), 32);

    // Deeper than the preset allows.
    assert!(veritas_circuits::encode(CircuitId::AuthV3_8_32, &auth_v2_material(9)).is_err());
}

#[test]
fn test_material_must_match_circuit() {
    assert!(matches!(
        veritas_circuits::encode(CircuitId::AtomicQueryV3, &auth_v2_material(1)),
        Err(CircuitError::MaterialMismatch { .. })
    ));
}

#[test]
fn test_decode_bytes() {
    let bytes = serde_json::to_vec(&v3_wire(&v3_signals())).unwrap();
    let decoded =
        veritas_circuits::decode(CircuitId::AtomicQueryV3, &CircuitParams::new(), &bytes).unwrap();
    assert_eq!(decoded, PubSignals::AtomicQueryV3(v3_signals()));

    let decoded = veritas_circuits::decode(
        CircuitId::AtomicQueryMtpV2,
        &CircuitParams::new(),
        &serde_json::to_vec(&mtp_v2_wire(&mtp_v2_signals())).unwrap(),
    )
    .unwrap();
    let json = serde_json::to_value(&decoded).unwrap();
    assert_eq!(json["userID"], user_id().to_base58());
    assert_eq!(json["claimPathKey"], "17");
}
