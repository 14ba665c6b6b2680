//! `linkedMultiQuery10`: up to ten predicates over one claim, tied to a V3
//! proof through the link id.

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams, Claim, CoreError, Field, Hash, Operator};

use crate::common::{prepare_values, to_json, ClaimPath, Query, SignalReader};
use crate::error::CircuitError;

/// Number of predicate slots.
pub const LINKED_MULTI_QUERY_LENGTH: usize = 10;

/// Proof material for `linkedMultiQuery10`.
#[derive(Debug, Clone)]
pub struct LinkedMultiQueryInputs {
    pub link_nonce: Field,
    pub claim: Claim,
    /// One entry per slot; `None` and missing trailing entries are disabled.
    pub queries: Vec<Option<Query>>,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct LinkedMultiQueryCircuitInputs {
    link_nonce: Field,
    issuer_claim: Claim,
    claim_schema: Field,
    claim_path_not_exists: Vec<Field>,
    claim_path_mtp: Vec<Vec<Hash>>,
    claim_path_mtp_no_aux: Vec<Field>,
    claim_path_mtp_aux_hi: Vec<Hash>,
    claim_path_mtp_aux_hv: Vec<Hash>,
    claim_path_key: Vec<Field>,
    claim_path_value: Vec<Field>,
    slot_index: Vec<Field>,
    operator: Vec<Field>,
    value: Vec<Vec<Field>>,
}

impl LinkedMultiQueryInputs {
    fn validate(&self) -> Result<(), CircuitError> {
        if self.queries.len() > LINKED_MULTI_QUERY_LENGTH {
            return Err(CoreError::QueryLimit {
                circuit: CircuitId::LinkedMultiQuery10.to_string(),
                max: LINKED_MULTI_QUERY_LENGTH,
                actual: self.queries.len(),
            }
            .into());
        }
        for query in self.queries.iter().flatten() {
            query.validate(CircuitId::LinkedMultiQuery10)?;
        }
        Ok(())
    }

    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        self.validate()?;

        let mut inputs = LinkedMultiQueryCircuitInputs {
            link_nonce: self.link_nonce.clone(),
            issuer_claim: self.claim.clone(),
            claim_schema: self.claim.schema_hash(),
            ..Default::default()
        };
        for i in 0..LINKED_MULTI_QUERY_LENGTH {
            let query = self.queries.get(i).and_then(Option::as_ref);
            let (path, operator, slot_index, values) = match query {
                Some(q) => (
                    ClaimPath::new(q, params)?,
                    q.operator,
                    q.slot_index,
                    q.values.as_slice(),
                ),
                None => (ClaimPath::disabled(params), Operator::Noop, 0, &[][..]),
            };
            inputs.claim_path_not_exists.push(Field::from(path.not_exists));
            inputs.claim_path_mtp.push(path.mtp);
            inputs.claim_path_mtp_no_aux.push(Field::from(path.aux.no_aux));
            inputs.claim_path_mtp_aux_hi.push(path.aux.key);
            inputs.claim_path_mtp_aux_hv.push(path.aux.value);
            inputs.claim_path_key.push(path.key);
            inputs.claim_path_value.push(path.value);
            inputs.slot_index.push(Field::from(slot_index as u64));
            inputs.operator.push(Field::from(u64::from(operator.code())));
            inputs
                .value
                .push(prepare_values(values, params.value_array_size())?);
        }
        to_json(&inputs)
    }
}

/// Public output of `linkedMultiQuery10`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedMultiQueryPubSignals {
    #[serde(rename = "linkID")]
    pub link_id: Field,
    pub merklized: bool,
    pub operator_output: Vec<Field>,
    pub circuit_query_hash: Vec<Field>,
}

impl LinkedMultiQueryPubSignals {
    pub const SIGNAL_COUNT: usize = 2 + 2 * LINKED_MULTI_QUERY_LENGTH;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            link_id: r.field("linkID")?,
            merklized: r.flag("merklized")?,
            operator_output: r.fields("operatorOutput", LINKED_MULTI_QUERY_LENGTH)?,
            circuit_query_hash: r.fields("circuitQueryHash", LINKED_MULTI_QUERY_LENGTH)?,
        })
    }
}
