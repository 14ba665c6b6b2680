//! Integration test: credential query proofs through the verifier.
//!
//! A verifier's declarative query, the prover's public signals and the
//! issuer's on-chain states, checked together.

use chrono::Duration;
use serde_json::json;
use veritas_circuits::{CircuitError, PubSignals};
use veritas_core::{CoreError, Field, Operator};
use veritas_integration_tests::*;
use veritas_query::{MismatchKind, QueryError, VerifyOpts};
use veritas_verifier::{MemoryStateContract, VerifierError, VerifyRequest};

fn opts() -> VerifyOpts {
    VerifyOpts::default().at(now())
}

fn age_query() -> veritas_query::ProofQuery {
    query("KYCAgeCredential", json!({"birthday": {"$lt": 20000101}}))
}

// =========================================================================
// credentialAtomicQueryV3
// =========================================================================

#[tokio::test]
async fn test_v3_proof_verifies_and_returns_signals() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let q = age_query();
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);

    let decoded = verifier
        .verify("credentialAtomicQueryV3-beta.1", &v3_wire(&v3_signals()), &request)
        .await
        .expect("proof should verify");
    assert_eq!(decoded, PubSignals::AtomicQueryV3(v3_signals()));
}

#[tokio::test]
async fn test_unknown_issuer_state() {
    let verifier = verifier(std::sync::Arc::new(MemoryStateContract::new()));
    let sender = did(user_id());
    let q = age_query();
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);

    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &v3_wire(&v3_signals()), &request).await,
        Err(VerifierError::UnknownState(_))
    ));
}

#[tokio::test]
async fn test_stale_revocation_state_unless_waived() {
    // The revocation state 310 was superseded 90 minutes ago; the default
    // window is one hour.
    let contract = issuer_contract();
    contract.publish_state(issuer_id(), Field::from(320u64), minutes_ago(90));
    let verifier = verifier(contract);
    let sender = did(user_id());
    let opts = opts();
    let wire = v3_wire(&v3_signals());

    let q = age_query();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);
    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &wire, &request).await,
        Err(VerifierError::StaleState { kind: "issuer non-revocation", .. })
    ));

    let mut waived = age_query();
    waived.skip_claim_revocation_check = true;
    let request = VerifyRequest::new(&sender, &opts).with_query(&waived);
    assert!(verifier.verify("credentialAtomicQueryV3", &wire, &request).await.is_ok());
}

#[tokio::test]
async fn test_proof_too_old() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let q = age_query();
    let late = VerifyOpts::default().at(now() + Duration::days(2));
    let request = VerifyRequest::new(&sender, &late).with_query(&q);

    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &v3_wire(&v3_signals()), &request).await,
        Err(VerifierError::Query(QueryError::StaleProof { .. }))
    ));
}

#[tokio::test]
async fn test_query_required() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts);

    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &v3_wire(&v3_signals()), &request).await,
        Err(VerifierError::MissingInput("query"))
    ));
}

#[tokio::test]
async fn test_nullifier_session() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());

    let mut q = age_query();
    q.nullifier_session_id = Some(Field::from(99u64));
    let mut signals = v3_signals();
    signals.nullifier = Field::from(12345u64);
    signals.verifier_id = Some(verifier_id());
    signals.nullifier_session_id = Field::from(99u64);
    let wire = v3_wire(&signals);

    let opts = opts().with_verifier_id(verifier_id());
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);
    assert!(verifier.verify("credentialAtomicQueryV3", &wire, &request).await.is_ok());

    let unconfigured = self::opts();
    let request = VerifyRequest::new(&sender, &unconfigured).with_query(&q);
    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &wire, &request).await,
        Err(VerifierError::Query(QueryError::Nullifier(_)))
    ));
}

#[tokio::test]
async fn test_wrong_holder() {
    let verifier = verifier(issuer_contract());
    let sender = did(verifier_id());
    let q = age_query();
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);

    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &v3_wire(&v3_signals()), &request).await,
        Err(VerifierError::OwnershipMismatch { axis: "userID", .. })
    ));
}

// =========================================================================
// credentialAtomicQueryMTPV2 over a merklized credential
// =========================================================================

#[tokio::test]
async fn test_mtp_v2_merklized_membership() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let q = query(
        "KYCCountryOfResidenceCredential",
        json!({"countryCode": {"$in": [840, 120]}}),
    );
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);

    let decoded = verifier
        .verify("credentialAtomicQueryMTPV2", &mtp_v2_wire(&mtp_v2_signals()), &request)
        .await
        .unwrap();
    assert_eq!(decoded, PubSignals::AtomicQueryMtpV2(mtp_v2_signals()));

    let mut other_path = mtp_v2_signals();
    other_path.claim_path_key = Field::from(19u64);
    assert!(matches!(
        verifier
            .verify("credentialAtomicQueryMTPV2", &mtp_v2_wire(&other_path), &request)
            .await,
        Err(VerifierError::Query(QueryError::QueryMismatch { kind: MismatchKind::Path, .. }))
    ));
}

#[tokio::test]
async fn test_unsupported_operator_beats_everything() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let q = query(
        "KYCCountryOfResidenceCredential",
        json!({"countryCode": {"$between": [100, 900]}}),
    );
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);

    // Schema, revocation flag and timestamp are all wrong as well.
    let mut signals = mtp_v2_signals();
    signals.claim_schema = Field::from(1u64);
    signals.is_revocation_checked = false;
    signals.timestamp = 1;
    assert!(matches!(
        verifier
            .verify("credentialAtomicQueryMTPV2", &mtp_v2_wire(&signals), &request)
            .await,
        Err(VerifierError::Query(QueryError::Core(CoreError::UnsupportedOperator(_))))
    ));
}

#[tokio::test]
async fn test_signal_count_checked() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let q = query(
        "KYCCountryOfResidenceCredential",
        json!({"countryCode": {"$in": [840, 120]}}),
    );
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);
    let wire = mtp_v2_wire(&mtp_v2_signals());
    assert_eq!(wire.len(), 77);

    let mut short = wire.clone();
    short.pop();
    let mut long = wire;
    long.push("0".into());
    for bad in [short, long] {
        let actual = bad.len();
        match verifier.verify("credentialAtomicQueryMTPV2", &bad, &request).await {
            Err(VerifierError::Circuit(CircuitError::InvalidLength { expected, actual: got })) => {
                assert_eq!(expected, 77);
                assert_eq!(got, actual);
            }
            other => panic!("expected a length error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_selective_disclosure() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let q = query("KYCCountryOfResidenceCredential", json!({"countryCode": {}}));
    let opts = opts();

    let mut signals = mtp_v2_signals();
    signals.operator = Operator::Eq;
    signals.value = values(&[840]);
    let wire = mtp_v2_wire(&signals);

    let document = json!({"credentialSubject": {"countryCode": 840}});
    let request = VerifyRequest::new(&sender, &opts)
        .with_query(&q)
        .with_disclosure(&document);
    assert!(verifier.verify("credentialAtomicQueryMTPV2", &wire, &request).await.is_ok());

    let wrong = json!({"credentialSubject": {"countryCode": 120}});
    let request = VerifyRequest::new(&sender, &opts)
        .with_query(&q)
        .with_disclosure(&wrong);
    assert!(matches!(
        verifier.verify("credentialAtomicQueryMTPV2", &wire, &request).await,
        Err(VerifierError::Query(QueryError::QueryMismatch { kind: MismatchKind::Value, .. }))
    ));

    let request = VerifyRequest::new(&sender, &opts).with_query(&q);
    assert!(matches!(
        verifier.verify("credentialAtomicQueryMTPV2", &wire, &request).await,
        Err(VerifierError::Query(QueryError::MissingDisclosure))
    ));
}

#[tokio::test]
async fn test_circuit_overrides_value_array_size() {
    let verifier = verifier(issuer_contract()).with_params(
        veritas_core::CircuitId::AtomicQueryMtpV2,
        veritas_core::CircuitParams::new().with_value_array_size(8),
    );
    let sender = did(user_id());
    let q = query(
        "KYCCountryOfResidenceCredential",
        json!({"countryCode": {"$in": [840, 120]}}),
    );
    let opts = opts();
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);

    let mut signals = mtp_v2_signals();
    signals.value.truncate(8);
    let wire = mtp_v2_wire(&signals);
    assert_eq!(wire.len(), 21);
    assert!(verifier.verify("credentialAtomicQueryMTPV2", &wire, &request).await.is_ok());
}
