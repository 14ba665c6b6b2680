//! Integration test: a V3 proof and a linked multi-query proof over the
//! same claim, tied together by their link id.

use serde_json::json;
use veritas_core::{Blake3Hasher, CircuitId, Field};
use veritas_integration_tests::*;
use veritas_query::{extract, query_hash, ProofQuery, QueryError, VerifyOpts};
use veritas_verifier::{VerifierError, VerifyRequest};

const LINK_ID: u64 = 5;

fn linked_query() -> ProofQuery {
    let mut q = query(
        "KYCAgeCredential",
        json!({"birthday": {"$lt": 20000101}, "documentType": {"$in": [1, 2]}}),
    );
    q.group_id = Some(1);
    q
}

/// Signals of a `linkedMultiQuery10` proof committing to `query`.
async fn linked_wire(q: &ProofQuery) -> Vec<String> {
    let resolved = extract(CircuitId::LinkedMultiQuery10, q, &schema_registry())
        .await
        .unwrap();
    let mut hashes: Vec<Field> = resolved
        .queries
        .iter()
        .map(|m| query_hash(&resolved.schema, m, &Blake3Hasher, 64).unwrap())
        .collect();
    hashes.resize(10, Field::zero());

    let mut wire = vec![LINK_ID.to_string(), "0".to_string()];
    wire.extend(strings(vec![Field::zero(); 10]));
    wire.extend(strings(hashes));
    wire
}

#[tokio::test]
async fn test_v3_and_linked_proof_share_a_link() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let opts = VerifyOpts::default().at(now());

    // The V3 proof covers one predicate of the group.
    let mut v3_query = query("KYCAgeCredential", json!({"birthday": {"$lt": 20000101}}));
    v3_query.group_id = Some(1);
    let mut v3 = v3_signals();
    v3.link_id = Field::from(LINK_ID);
    let request = VerifyRequest::new(&sender, &opts).with_query(&v3_query);
    verifier
        .verify("credentialAtomicQueryV3", &v3_wire(&v3), &request)
        .await
        .expect("linked V3 proof should verify");

    let lq = linked_query();
    let wire = linked_wire(&lq).await;
    assert_eq!(wire.len(), 22);
    let request = VerifyRequest::new(&sender, &opts).with_query(&lq);
    let decoded = verifier
        .verify("linkedMultiQuery10", &wire, &request)
        .await
        .expect("linked proof should verify");
    match decoded {
        veritas_circuits::PubSignals::LinkedMultiQuery(s) => {
            assert_eq!(s.link_id, Field::from(LINK_ID));
        }
        other => panic!("unexpected signals {:?}", other),
    }
}

#[tokio::test]
async fn test_linked_proof_for_other_predicates_fails() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let opts = VerifyOpts::default().at(now());

    let wire = linked_wire(&linked_query()).await;
    let mut other = query(
        "KYCAgeCredential",
        json!({"birthday": {"$gt": 20000101}, "documentType": {"$in": [1, 2]}}),
    );
    other.group_id = Some(1);
    let request = VerifyRequest::new(&sender, &opts).with_query(&other);
    assert!(matches!(
        verifier.verify("linkedMultiQuery10", &wire, &request).await,
        Err(VerifierError::Query(QueryError::QueryMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_link_without_group_rejected() {
    let verifier = verifier(issuer_contract());
    let sender = did(user_id());
    let opts = VerifyOpts::default().at(now());

    let q = query("KYCAgeCredential", json!({"birthday": {"$lt": 20000101}}));
    let mut v3 = v3_signals();
    v3.link_id = Field::from(LINK_ID);
    let request = VerifyRequest::new(&sender, &opts).with_query(&q);
    assert!(matches!(
        verifier.verify("credentialAtomicQueryV3", &v3_wire(&v3), &request).await,
        Err(VerifierError::Query(QueryError::Link(_)))
    ));
}
