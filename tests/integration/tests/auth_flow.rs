//! Integration test: identity-ownership proofs through the verifier.
//!
//! Covers decoding, state freshness and ownership for `auth`, `authV2` and
//! the `authV3-8-32` preset, with an in-memory state contract.

use std::sync::Arc;

use chrono::Duration;
use veritas_circuits::PubSignals;
use veritas_core::id::GENESIS_LEN;
use veritas_core::{CircuitId, CircuitParams, Field, Id};
use veritas_integration_tests::*;
use veritas_query::VerifyOpts;
use veritas_verifier::{MemoryStateContract, VerifierError, VerifyRequest};

fn auth_wire(state: u64, user: Id) -> Vec<String> {
    vec!["1".into(), state.to_string(), user.to_field().to_string()]
}

fn auth_opts(delay: Duration) -> VerifyOpts {
    VerifyOpts::auth().with_state_transition_delay(delay).at(now())
}

// =========================================================================
// auth (v1): the user state is proven directly
// =========================================================================

#[test]
fn test_auth_signals_decode_in_order() {
    let wire = auth_wire(500, user_id());
    let decoded =
        veritas_circuits::decode_signals(CircuitId::Auth, &CircuitParams::new(), &wire).unwrap();
    match decoded {
        PubSignals::Auth(s) => {
            assert_eq!(s.challenge, Field::from(1u64));
            assert_eq!(s.user_state, Field::from(500u64));
            assert_eq!(s.user_id, user_id());
        }
        other => panic!("unexpected signals {:?}", other),
    }
}

#[tokio::test]
async fn test_auth_latest_state_verifies() {
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_state(user_id(), Field::from(500u64), minutes_ago(30));
    let verifier = verifier(contract);

    let sender = did(user_id());
    let challenge = Field::from(1u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    let decoded = verifier
        .verify("auth", &auth_wire(500, user_id()), &request)
        .await
        .expect("latest state should verify");
    assert!(matches!(decoded, PubSignals::Auth(_)));
}

#[tokio::test]
async fn test_auth_stale_state_window() {
    // State 500 was superseded ten minutes ago.
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_state(user_id(), Field::from(500u64), minutes_ago(60));
    contract.publish_state(user_id(), Field::from(501u64), minutes_ago(10));
    let verifier = verifier(contract);

    let sender = did(user_id());
    let challenge = Field::from(1u64);
    let wire = auth_wire(500, user_id());

    let strict = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &strict).with_challenge(&challenge);
    assert!(matches!(
        verifier.verify("auth", &wire, &request).await,
        Err(VerifierError::StaleState { kind: "user", .. })
    ));

    let lenient = auth_opts(Duration::minutes(15));
    let request = VerifyRequest::new(&sender, &lenient).with_challenge(&challenge);
    assert!(verifier.verify("auth", &wire, &request).await.is_ok());
}

#[tokio::test]
async fn test_auth_genesis_state_verifies() {
    let state = Field::from(777u64);
    let user = Id::genesis_from_state([0x01, 0x13], &state);
    let verifier = verifier(Arc::new(MemoryStateContract::new()));

    let sender = did(user);
    let challenge = Field::from(1u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    let wire = vec!["1".into(), state.to_string(), user.to_field().to_string()];
    assert!(verifier.verify("auth", &wire, &request).await.is_ok());
}

// =========================================================================
// Ownership
// =========================================================================

#[tokio::test]
async fn test_ownership_mismatch_names_both_ids() {
    let other = Id::new([0x01, 0x13], [0x44; GENESIS_LEN]);
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_state(other, Field::from(500u64), minutes_ago(30));
    let verifier = verifier(contract);

    let sender = did(user_id());
    let challenge = Field::from(1u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    let err = verifier
        .verify("auth", &auth_wire(500, other), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, VerifierError::OwnershipMismatch { axis: "userID", .. }));
    let message = err.to_string();
    assert!(message.contains(&user_id().to_string()));
    assert!(message.contains(&other.to_string()));
}

#[tokio::test]
async fn test_challenge_mismatch() {
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_state(user_id(), Field::from(500u64), minutes_ago(30));
    let verifier = verifier(contract);

    let sender = did(user_id());
    let challenge = Field::from(2u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    assert!(matches!(
        verifier.verify("auth", &auth_wire(500, user_id()), &request).await,
        Err(VerifierError::OwnershipMismatch { axis: "challenge", .. })
    ));
}

// =========================================================================
// authV2 and presets: the global root
// =========================================================================

fn gist_wire(root: u64) -> Vec<String> {
    vec![user_id().to_field().to_string(), "9".into(), root.to_string()]
}

#[tokio::test]
async fn test_auth_v3_preset_against_global_root() {
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_root(Field::from(900u64), None, minutes_ago(30));
    let verifier = verifier(contract);

    let sender = did(user_id());
    let challenge = Field::from(9u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    let decoded = verifier
        .verify("authV3-8-32", &gist_wire(900), &request)
        .await
        .unwrap();
    assert!(matches!(decoded, PubSignals::AuthV2(ref s) if s.challenge == challenge));

    assert!(matches!(
        verifier.verify("authV2", &gist_wire(901), &request).await,
        Err(VerifierError::UnknownState(_))
    ));
}

#[tokio::test]
async fn test_version_suffix_ignored() {
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_root(Field::from(900u64), None, minutes_ago(30));
    let verifier = verifier(contract);

    let sender = did(user_id());
    let challenge = Field::from(9u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    assert!(verifier.verify("authV2-beta.1", &gist_wire(900), &request).await.is_ok());
}

#[tokio::test]
async fn test_unconfigured_network() {
    let mainnet_user = Id::new([0x01, 0x11], [0x11; GENESIS_LEN]);
    let verifier = verifier(Arc::new(MemoryStateContract::new()));

    let sender = did(mainnet_user);
    let challenge = Field::from(9u64);
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts).with_challenge(&challenge);

    let wire = vec![mainnet_user.to_field().to_string(), "9".into(), "900".into()];
    assert!(matches!(
        verifier.verify("authV2", &wire, &request).await,
        Err(VerifierError::UnsupportedNetwork(_))
    ));
}

#[tokio::test]
async fn test_contract_verified_circuits_rejected() {
    let verifier = verifier(Arc::new(MemoryStateContract::new()));
    let sender = did(user_id());
    let opts = auth_opts(Duration::minutes(5));
    let request = VerifyRequest::new(&sender, &opts);

    for id in ["stateTransition", "credentialAtomicQueryV3OnChain"] {
        assert!(matches!(
            verifier.verify(id, &[], &request).await,
            Err(VerifierError::UnsupportedCircuit(_))
        ));
    }
}
