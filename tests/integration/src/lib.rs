//! Shared fixtures for the cross-crate scenarios: ids, an in-memory state
//! contract, a schema registry and the wire form of public signals.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use veritas_circuits::{AtomicQueryMtpV2PubSignals, AtomicQueryV3PubSignals};
use veritas_core::id::GENESIS_LEN;
use veritas_core::operator::xsd;
use veritas_core::{Blake3Hasher, Did, Field, Id, Operator, ProofType};
use veritas_query::{FieldLocation, ProofQuery, SchemaField, SchemaRegistry, SchemaType};
use veritas_verifier::{
    ContractStateResolver, MemoryStateContract, Registry, Resolvers, Services, Verifier,
};

pub const CONTEXT: &str = "https://example.com/kyc-v3.json-ld";

/// When every scenario's proof was generated.
pub const PROOF_TIME: u64 = 1_700_000_000;

/// The verifier's clock: one minute after the proof.
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(PROOF_TIME as i64 + 60, 0).unwrap_or_default()
}

/// Seconds since the epoch, `minutes` before [`now`].
pub fn minutes_ago(minutes: i64) -> u64 {
    (now().timestamp() - minutes * 60) as u64
}

pub fn user_id() -> Id {
    Id::new([0x01, 0x13], [0x11; GENESIS_LEN])
}

pub fn issuer_id() -> Id {
    Id::new([0x01, 0x13], [0x22; GENESIS_LEN])
}

pub fn verifier_id() -> Id {
    Id::new([0x01, 0x13], [0x33; GENESIS_LEN])
}

pub fn did(id: Id) -> Did {
    Did::from_id(id).unwrap_or_else(|e| panic!("fixture id has no DID: {}", e))
}

/// Two KYC credential types: a flat one and a merklized one.
pub fn schema_registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    let field = |datatype: &str, location| SchemaField {
        datatype: datatype.into(),
        location,
    };
    registry.register(
        CONTEXT,
        "KYCAgeCredential",
        SchemaType {
            schema_hash: Field::from(180u64),
            merklized: false,
            subject_path_key: Field::zero(),
        },
        vec![
            ("birthday".into(), field(xsd::INTEGER, FieldLocation::Slot(2))),
            ("documentType".into(), field(xsd::INTEGER, FieldLocation::Slot(3))),
        ],
    );
    registry.register(
        CONTEXT,
        "KYCCountryOfResidenceCredential",
        SchemaType {
            schema_hash: Field::from(181u64),
            merklized: true,
            subject_path_key: Field::from(4242u64),
        },
        vec![
            ("countryCode".into(), field(xsd::INTEGER, FieldLocation::Path(Field::from(17u64)))),
            ("name".into(), field(xsd::STRING, FieldLocation::Path(Field::from(19u64)))),
        ],
    );
    registry
}

pub fn query(credential_type: &str, subject: serde_json::Value) -> ProofQuery {
    ProofQuery {
        context: CONTEXT.into(),
        credential_type: credential_type.into(),
        credential_subject: subject.as_object().cloned(),
        ..Default::default()
    }
}

/// A verifier over one in-memory `polygon:amoy` state contract.
pub fn verifier(contract: Arc<MemoryStateContract>) -> Verifier {
    let services = Services {
        resolvers: Resolvers::new()
            .with("polygon:amoy", Arc::new(ContractStateResolver::new(contract))),
        schemas: Arc::new(schema_registry()),
        hasher: Arc::new(Blake3Hasher),
    };
    Verifier::new(Registry::with_defaults(), services)
}

/// Values padded to the default array size.
pub fn values(head: &[u64]) -> Vec<Field> {
    let mut v: Vec<Field> = head.iter().map(|x| Field::from(*x)).collect();
    v.resize(64, Field::zero());
    v
}

/// Wire form of a signal list.
pub fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    values.into_iter().map(|v| v.to_string()).collect()
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn operator(op: Operator) -> String {
    op.code().to_string()
}

/// `birthday < 20000101` proven with `credentialAtomicQueryV3`.
pub fn v3_signals() -> AtomicQueryV3PubSignals {
    AtomicQueryV3PubSignals {
        user_id: user_id(),
        merklized: false,
        issuer_state: Field::from(300u64),
        link_id: Field::zero(),
        nullifier: Field::zero(),
        operator_output: Field::zero(),
        proof_type: ProofType::Signature,
        request_id: Field::from(23u64),
        issuer_id: issuer_id(),
        is_revocation_checked: true,
        issuer_claim_non_rev_state: Field::from(310u64),
        timestamp: PROOF_TIME,
        claim_schema: Field::from(180u64),
        claim_path_key: Field::zero(),
        slot_index: 2,
        operator: Operator::Lt,
        value: values(&[20000101]),
        verifier_id: None,
        nullifier_session_id: Field::zero(),
    }
}

/// The prover's output array for `s`, in circuit order.
pub fn v3_wire(s: &AtomicQueryV3PubSignals) -> Vec<String> {
    let mut out = vec![
        s.user_id.to_field().to_string(),
        flag(s.merklized),
        s.issuer_state.to_string(),
        s.link_id.to_string(),
        s.nullifier.to_string(),
        s.operator_output.to_string(),
        s.proof_type.code().to_string(),
        s.request_id.to_string(),
        s.issuer_id.to_field().to_string(),
        flag(s.is_revocation_checked),
        s.issuer_claim_non_rev_state.to_string(),
        s.timestamp.to_string(),
        s.claim_schema.to_string(),
        s.claim_path_key.to_string(),
        s.slot_index.to_string(),
        operator(s.operator),
    ];
    out.extend(strings(&s.value));
    out.push(
        s.verifier_id
            .map(|id| id.to_field().to_string())
            .unwrap_or_else(|| "0".into()),
    );
    out.push(s.nullifier_session_id.to_string());
    out
}

/// `countryCode in [840, 120]` over a merklized credential, proven with
/// `credentialAtomicQueryMTPV2`.
pub fn mtp_v2_signals() -> AtomicQueryMtpV2PubSignals {
    AtomicQueryMtpV2PubSignals {
        merklized: true,
        user_id: user_id(),
        request_id: Field::from(24u64),
        issuer_id: issuer_id(),
        issuer_claim_iden_state: Field::from(300u64),
        is_revocation_checked: true,
        issuer_claim_non_rev_state: Field::from(310u64),
        timestamp: PROOF_TIME,
        claim_schema: Field::from(181u64),
        claim_path_not_exists: false,
        claim_path_key: Field::from(17u64),
        slot_index: 0,
        operator: Operator::In,
        value: values(&[840, 120]),
    }
}

pub fn mtp_v2_wire(s: &AtomicQueryMtpV2PubSignals) -> Vec<String> {
    let mut out = vec![
        flag(s.merklized),
        s.user_id.to_field().to_string(),
        s.request_id.to_string(),
        s.issuer_id.to_field().to_string(),
        s.issuer_claim_iden_state.to_string(),
        flag(s.is_revocation_checked),
        s.issuer_claim_non_rev_state.to_string(),
        s.timestamp.to_string(),
        s.claim_schema.to_string(),
        flag(s.claim_path_not_exists),
        s.claim_path_key.to_string(),
        s.slot_index.to_string(),
        operator(s.operator),
    ];
    out.extend(strings(&s.value));
    out
}

/// A contract where the issuer's current state is 300, published with
/// its revocation tree as state 310 afterwards.
pub fn issuer_contract() -> Arc<MemoryStateContract> {
    let contract = Arc::new(MemoryStateContract::new());
    contract.publish_state(issuer_id(), Field::from(300u64), minutes_ago(120));
    contract.publish_state(issuer_id(), Field::from(310u64), minutes_ago(90));
    contract
}
