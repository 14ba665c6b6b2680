//! Checks decoded public signals against the query they answer.

use chrono::DateTime;
use serde_json::Value;
use veritas_circuits::{
    AtomicQueryMtpV2PubSignals, AtomicQuerySigV2PubSignals, AtomicQueryV3PubSignals,
    LinkedMultiQueryPubSignals,
};
use veritas_core::{CircuitId, CircuitParams, Field, FieldHasher, Id, Operator, ProofType};

use crate::error::{MismatchKind, QueryError};
use crate::metadata::{extract, QueryMetadata, ResolvedQuery};
use crate::opts::VerifyOpts;
use crate::request::ProofQuery;
use crate::schema::{SchemaProcessor, SchemaType};

/// Frame size of the sponge hash over a query's value array.
const VALUE_HASH_FRAME: usize = 6;

/// The claim-related public outputs shared by the atomic query circuits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutputs {
    pub issuer_id: Id,
    pub schema_hash: Field,
    pub slot_index: u64,
    pub operator: Operator,
    pub value: Vec<Field>,
    pub timestamp: u64,
    pub merklized: bool,
    pub claim_path_key: Field,
    /// Not published by every circuit.
    pub claim_path_not_exists: Option<bool>,
    pub is_revocation_checked: bool,
    pub proof_type: ProofType,
    pub operator_output: Option<Field>,
    pub link_id: Option<Field>,
    pub nullifier: Option<Field>,
    pub verifier_id: Option<Id>,
    pub nullifier_session_id: Option<Field>,
}

impl From<&AtomicQueryMtpV2PubSignals> for ClaimOutputs {
    fn from(s: &AtomicQueryMtpV2PubSignals) -> Self {
        Self {
            issuer_id: s.issuer_id,
            schema_hash: s.claim_schema.clone(),
            slot_index: s.slot_index,
            operator: s.operator,
            value: s.value.clone(),
            timestamp: s.timestamp,
            merklized: s.merklized,
            claim_path_key: s.claim_path_key.clone(),
            claim_path_not_exists: Some(s.claim_path_not_exists),
            is_revocation_checked: s.is_revocation_checked,
            proof_type: ProofType::Inclusion,
            operator_output: None,
            link_id: None,
            nullifier: None,
            verifier_id: None,
            nullifier_session_id: None,
        }
    }
}

impl From<&AtomicQuerySigV2PubSignals> for ClaimOutputs {
    fn from(s: &AtomicQuerySigV2PubSignals) -> Self {
        Self {
            issuer_id: s.issuer_id,
            schema_hash: s.claim_schema.clone(),
            slot_index: s.slot_index,
            operator: s.operator,
            value: s.value.clone(),
            timestamp: s.timestamp,
            merklized: s.merklized,
            claim_path_key: s.claim_path_key.clone(),
            claim_path_not_exists: Some(s.claim_path_not_exists),
            is_revocation_checked: s.is_revocation_checked,
            proof_type: ProofType::Signature,
            operator_output: None,
            link_id: None,
            nullifier: None,
            verifier_id: None,
            nullifier_session_id: None,
        }
    }
}

impl From<&AtomicQueryV3PubSignals> for ClaimOutputs {
    fn from(s: &AtomicQueryV3PubSignals) -> Self {
        Self {
            issuer_id: s.issuer_id,
            schema_hash: s.claim_schema.clone(),
            slot_index: s.slot_index,
            operator: s.operator,
            value: s.value.clone(),
            timestamp: s.timestamp,
            merklized: s.merklized,
            claim_path_key: s.claim_path_key.clone(),
            claim_path_not_exists: None,
            is_revocation_checked: s.is_revocation_checked,
            proof_type: s.proof_type,
            operator_output: Some(s.operator_output.clone()),
            link_id: Some(s.link_id.clone()),
            nullifier: Some(s.nullifier.clone()),
            verifier_id: s.verifier_id,
            nullifier_session_id: Some(s.nullifier_session_id.clone()),
        }
    }
}

fn non_zero(value: &Option<Field>) -> Option<&Field> {
    value.as_ref().filter(|v| !v.is_zero())
}

/// Verify an atomic query proof's outputs against `query`.
///
/// The circuit's operator table is enforced first; after that the checks
/// run in a fixed order and stop at the first failure.
pub async fn verify_query(
    circuit: CircuitId,
    outputs: &ClaimOutputs,
    query: &ProofQuery,
    processor: &dyn SchemaProcessor,
    disclosure: Option<&Value>,
    opts: &VerifyOpts,
) -> Result<ResolvedQuery, QueryError> {
    let resolved = extract(circuit, query, processor).await?;
    let meta = resolved.single()?;

    if !query.allows_issuer(&outputs.issuer_id)? {
        return Err(QueryError::IssuerNotAllowed(outputs.issuer_id.to_string()));
    }
    if resolved.schema.schema_hash != outputs.schema_hash {
        return Err(QueryError::SchemaMismatch {
            expected: resolved.schema.schema_hash.clone(),
            actual: outputs.schema_hash.clone(),
        });
    }
    if !query.skip_claim_revocation_check && !outputs.is_revocation_checked {
        return Err(QueryError::RevocationRequired);
    }
    tracing::debug!(circuit = %circuit, issuer = %outputs.issuer_id, "issuer, schema and revocation checks passed");

    match meta.operator {
        Operator::Noop => check_noop(outputs)?,
        Operator::Sd => check_disclosure(outputs, query, meta, processor, disclosure).await?,
        _ => check_values(outputs, meta)?,
    }
    check_addressing(outputs, meta)?;
    check_freshness(outputs.timestamp, opts)?;
    check_extensions(outputs, query, opts)?;

    tracing::debug!(circuit = %circuit, operator = %meta.operator, "query checks passed");
    Ok(resolved)
}

fn check_noop(outputs: &ClaimOutputs) -> Result<(), QueryError> {
    if outputs.operator != Operator::Noop {
        return Err(QueryError::mismatch(
            MismatchKind::Operator,
            format!("expected {}, proof has {}", Operator::Noop, outputs.operator),
        ));
    }
    ensure_zero(&outputs.value, 0)
}

async fn check_disclosure(
    outputs: &ClaimOutputs,
    query: &ProofQuery,
    meta: &QueryMetadata,
    processor: &dyn SchemaProcessor,
    disclosure: Option<&Value>,
) -> Result<(), QueryError> {
    let (signaled, rest_from) = match outputs.operator {
        Operator::Eq => (outputs.value.first().cloned(), 1),
        Operator::Sd => (outputs.operator_output.clone(), 0),
        other => {
            return Err(QueryError::mismatch(
                MismatchKind::Operator,
                format!("selective disclosure proven with {}", other),
            ))
        }
    };
    ensure_zero(&outputs.value, rest_from)?;

    let document = disclosure.ok_or(QueryError::MissingDisclosure)?;
    let field = meta
        .field_name
        .as_deref()
        .ok_or_else(|| QueryError::InvalidQuery("disclosure without a field".into()))?;
    let disclosed = processor
        .disclosed_value(document, &query.context, &query.credential_type, field)
        .await?;
    match signaled {
        Some(value) if value == disclosed => Ok(()),
        Some(value) => Err(QueryError::mismatch(
            MismatchKind::Value,
            format!("disclosed {} but proof has {}", disclosed, value),
        )),
        None => Err(QueryError::mismatch(
            MismatchKind::Value,
            "proof carries no disclosed value",
        )),
    }
}

fn check_values(outputs: &ClaimOutputs, meta: &QueryMetadata) -> Result<(), QueryError> {
    if outputs.operator != meta.operator {
        return Err(QueryError::mismatch(
            MismatchKind::Operator,
            format!("expected {}, proof has {}", meta.operator, outputs.operator),
        ));
    }
    if meta.values.len() > outputs.value.len() {
        return Err(QueryError::mismatch(
            MismatchKind::Value,
            format!(
                "{} values requested, proof carries {}",
                meta.values.len(),
                outputs.value.len()
            ),
        ));
    }
    for (i, (expected, actual)) in meta.values.iter().zip(&outputs.value).enumerate() {
        if expected != actual {
            return Err(QueryError::mismatch(
                MismatchKind::Value,
                format!("value[{}]: expected {}, proof has {}", i, expected, actual),
            ));
        }
    }
    // slots past the requested values carry no expectation, only zero fits
    ensure_zero(&outputs.value, meta.values.len())
}

fn ensure_zero(values: &[Field], from: usize) -> Result<(), QueryError> {
    match values.iter().enumerate().skip(from).find(|(_, v)| !v.is_zero()) {
        Some((i, v)) => Err(QueryError::mismatch(
            MismatchKind::Value,
            format!("value[{}] should be 0, proof has {}", i, v),
        )),
        None => Ok(()),
    }
}

fn expects_value(meta: &QueryMetadata) -> bool {
    match meta.operator {
        Operator::Noop => false,
        Operator::Exists => meta.values.first().map_or(false, |v| !v.is_zero()),
        _ => true,
    }
}

fn check_addressing(outputs: &ClaimOutputs, meta: &QueryMetadata) -> Result<(), QueryError> {
    if meta.merklized != outputs.merklized {
        return Err(QueryError::mismatch(
            MismatchKind::Path,
            format!(
                "query is over a {} credential",
                if meta.merklized { "merklized" } else { "flat" }
            ),
        ));
    }
    if meta.merklized {
        if meta.claim_path_key != outputs.claim_path_key {
            return Err(QueryError::mismatch(
                MismatchKind::Path,
                format!(
                    "expected key {}, proof has {}",
                    meta.claim_path_key, outputs.claim_path_key
                ),
            ));
        }
        if expects_value(meta) && outputs.claim_path_not_exists == Some(true) {
            return Err(QueryError::mismatch(
                MismatchKind::Path,
                "proof shows the path does not exist",
            ));
        }
    } else if meta.field_name.is_some() && outputs.slot_index != meta.slot_index as u64 {
        return Err(QueryError::mismatch(
            MismatchKind::Slot,
            format!(
                "expected slot {}, proof has {}",
                meta.slot_index, outputs.slot_index
            ),
        ));
    }
    Ok(())
}

/// Reject a proof generated longer ago than the accepted delay.
pub fn check_freshness(timestamp: u64, opts: &VerifyOpts) -> Result<(), QueryError> {
    let generated = i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| QueryError::InvalidQuery(format!("timestamp {} out of range", timestamp)))?;
    let age = opts.current_time() - generated;
    if age > opts.accepted_proof_generation_delay {
        return Err(QueryError::StaleProof {
            age_ms: age.num_milliseconds(),
            max_ms: opts.accepted_proof_generation_delay.num_milliseconds(),
        });
    }
    Ok(())
}

fn check_extensions(
    outputs: &ClaimOutputs,
    query: &ProofQuery,
    opts: &VerifyOpts,
) -> Result<(), QueryError> {
    if let Some(requested) = query.proof_type {
        if requested != outputs.proof_type {
            return Err(QueryError::ProofTypeMismatch {
                expected: requested,
                actual: outputs.proof_type,
            });
        }
    }

    match query.nullifier_session() {
        Some(session) => {
            if non_zero(&outputs.nullifier).is_none() {
                return Err(QueryError::Nullifier("requested but missing".into()));
            }
            let verifier_id = opts
                .verifier_id
                .ok_or_else(|| QueryError::Nullifier("verifier id not configured".into()))?;
            if outputs.verifier_id != Some(verifier_id) {
                return Err(QueryError::Nullifier(format!(
                    "proof is bound to verifier {:?}, expected {}",
                    outputs.verifier_id, verifier_id
                )));
            }
            if outputs.nullifier_session_id.as_ref() != Some(session) {
                return Err(QueryError::Nullifier(format!(
                    "session mismatch: expected {}",
                    session
                )));
            }
        }
        None => {
            if non_zero(&outputs.nullifier).is_some() {
                return Err(QueryError::Nullifier("present but not requested".into()));
            }
        }
    }

    match (query.group(), non_zero(&outputs.link_id)) {
        (Some(group), None) => Err(QueryError::Link(format!(
            "group {} requires a link id",
            group
        ))),
        (None, Some(link)) => Err(QueryError::Link(format!("unrequested link id {}", link))),
        _ => Ok(()),
    }
}

/// Recompute the commitment a linked multi-query proof publishes for one
/// predicate.
pub fn query_hash(
    schema: &SchemaType,
    meta: &QueryMetadata,
    hasher: &dyn FieldHasher,
    value_array_size: usize,
) -> Result<Field, QueryError> {
    if meta.values.len() > value_array_size {
        return Err(QueryError::InvalidQuery(format!(
            "{} values exceed the array size {}",
            meta.values.len(),
            value_array_size
        )));
    }
    let mut values = meta.values.clone();
    values.resize(value_array_size, Field::zero());
    let value_hash = hasher.sponge_hash(&values, VALUE_HASH_FRAME)?;
    Ok(hasher.hash(&[
        schema.schema_hash.clone(),
        Field::from(meta.slot_index as u64),
        Field::from(u64::from(meta.operator.code())),
        meta.claim_path_key.clone(),
        Field::from(meta.merklized),
        value_hash,
    ])?)
}

/// Verify a `linkedMultiQuery10` proof against every predicate of `query`.
///
/// Slots are positional: slot `i` must commit to the `i`-th predicate in
/// field-name order (then operator order within a field), because
/// `operatorOutput` is read by the same index.
pub async fn verify_linked_query(
    outputs: &LinkedMultiQueryPubSignals,
    query: &ProofQuery,
    processor: &dyn SchemaProcessor,
    hasher: &dyn FieldHasher,
    params: &CircuitParams,
    disclosure: Option<&Value>,
) -> Result<ResolvedQuery, QueryError> {
    let resolved = extract(CircuitId::LinkedMultiQuery10, query, processor).await?;

    if let Some(first) = resolved.queries.first() {
        if first.merklized != outputs.merklized {
            return Err(QueryError::mismatch(
                MismatchKind::Path,
                "merklized flag differs from the schema",
            ));
        }
    }

    let expected = resolved
        .queries
        .iter()
        .map(|meta| query_hash(&resolved.schema, meta, hasher, params.value_array_size()))
        .collect::<Result<Vec<_>, _>>()?;
    let actual: Vec<&Field> = outputs
        .circuit_query_hash
        .iter()
        .filter(|h| !h.is_zero())
        .collect();
    if actual.len() != expected.len() {
        return Err(QueryError::mismatch(
            MismatchKind::Value,
            format!(
                "{} predicates requested, proof commits to {}",
                expected.len(),
                actual.len()
            ),
        ));
    }
    for (i, ((want, got), meta)) in expected.iter().zip(actual).zip(&resolved.queries).enumerate() {
        if want != got {
            let field = meta.field_name.as_deref().unwrap_or_default();
            let detail = if expected.contains(got) {
                format!(
                    "slot {} commits to another predicate; expected {} {} (slots follow field-name order)",
                    i, field, meta.operator
                )
            } else {
                format!("slot {} does not commit to {} {}", i, field, meta.operator)
            };
            return Err(QueryError::mismatch(MismatchKind::Value, detail));
        }
    }

    for (i, meta) in resolved.queries.iter().enumerate() {
        if meta.operator != Operator::Sd {
            continue;
        }
        let document = disclosure.ok_or(QueryError::MissingDisclosure)?;
        let field = meta.field_name.as_deref().unwrap_or_default();
        let disclosed = processor
            .disclosed_value(document, &query.context, &query.credential_type, field)
            .await?;
        if outputs.operator_output.get(i) != Some(&disclosed) {
            return Err(QueryError::mismatch(
                MismatchKind::Value,
                format!("disclosed value of slot {} differs", i),
            ));
        }
    }

    tracing::debug!(predicates = resolved.queries.len(), "linked query checks passed");
    Ok(resolved)
}
