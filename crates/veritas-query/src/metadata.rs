//! Resolves a declarative query into the parameters a circuit works with.

use serde_json::Value;
use veritas_core::{CircuitId, CoreError, Field, Operator};

use crate::error::QueryError;
use crate::request::{Predicate, ProofQuery};
use crate::schema::{FieldLocation, SchemaProcessor, SchemaType};

/// One resolved predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMetadata {
    /// `None` for a NOOP query over the credential subject.
    pub field_name: Option<String>,
    pub datatype: Option<String>,
    pub operator: Operator,
    pub values: Vec<Field>,
    pub merklized: bool,
    /// Meaningful for flat credentials only.
    pub slot_index: usize,
    /// Meaningful for merklized credentials only.
    pub claim_path_key: Field,
}

/// A query resolved against its schema.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub schema: SchemaType,
    pub queries: Vec<QueryMetadata>,
}

impl ResolvedQuery {
    /// The single predicate of an atomic query.
    pub fn single(&self) -> Result<&QueryMetadata, QueryError> {
        match self.queries.as_slice() {
            [only] => Ok(only),
            other => Err(QueryError::InvalidQuery(format!(
                "expected one predicate, got {}",
                other.len()
            ))),
        }
    }
}

/// Resolve `query` for `circuit`.
///
/// The operator table and predicate count are checked before the schema is
/// consulted.
pub async fn extract(
    circuit: CircuitId,
    query: &ProofQuery,
    processor: &dyn SchemaProcessor,
) -> Result<ResolvedQuery, QueryError> {
    let predicates = query.predicates()?;
    let operators: Vec<Operator> = if predicates.is_empty() {
        vec![Operator::Noop]
    } else {
        predicates
            .iter()
            .map(|p| p.operator.unwrap_or(Operator::Sd))
            .collect()
    };
    circuit.validate_request(&operators)?;

    let schema = processor
        .resolve_type(&query.context, &query.credential_type)
        .await?;

    if predicates.is_empty() {
        tracing::debug!(circuit = %circuit, "query has no predicate, proving credential existence");
        let claim_path_key = if schema.merklized {
            schema.subject_path_key.clone()
        } else {
            Field::zero()
        };
        let noop = QueryMetadata {
            field_name: None,
            datatype: None,
            operator: Operator::Noop,
            values: Vec::new(),
            merklized: schema.merklized,
            slot_index: 0,
            claim_path_key,
        };
        return Ok(ResolvedQuery {
            schema,
            queries: vec![noop],
        });
    }

    let mut queries = Vec::with_capacity(predicates.len());
    for predicate in &predicates {
        queries.push(resolve_predicate(query, predicate, processor).await?);
    }
    Ok(ResolvedQuery { schema, queries })
}

async fn resolve_predicate(
    query: &ProofQuery,
    predicate: &Predicate,
    processor: &dyn SchemaProcessor,
) -> Result<QueryMetadata, QueryError> {
    let field = processor
        .resolve_field(&query.context, &query.credential_type, &predicate.field)
        .await?;
    let operator = predicate.operator.unwrap_or(Operator::Sd);

    if operator == Operator::Noop {
        return Err(QueryError::InvalidQuery(format!(
            "field {} is named without an operator",
            predicate.field
        )));
    }
    if !operator.supports_datatype(&field.datatype) {
        return Err(CoreError::UnsupportedOperator(format!(
            "{} is not applicable to {} ({})",
            operator, predicate.field, field.datatype
        ))
        .into());
    }

    let values = match (&predicate.operator, &predicate.operand) {
        (None, _) => Vec::new(),
        (Some(_), None) => Vec::new(),
        (Some(op), Some(operand)) => operand_values(*op, &field.datatype, operand, processor)?,
    };
    operator.validate_values(values.len())?;

    let (merklized, slot_index, claim_path_key) = match field.location {
        FieldLocation::Slot(slot) => (false, slot, Field::zero()),
        FieldLocation::Path(key) => (true, 0, key),
    };
    Ok(QueryMetadata {
        field_name: Some(predicate.field.clone()),
        datatype: Some(field.datatype),
        operator,
        values,
        merklized,
        slot_index,
        claim_path_key,
    })
}

fn operand_values(
    operator: Operator,
    datatype: &str,
    operand: &Value,
    processor: &dyn SchemaProcessor,
) -> Result<Vec<Field>, QueryError> {
    let invalid = |reason: &str| {
        QueryError::InvalidQuery(format!("{} operand {}: {}", operator, operand, reason))
    };
    match operator {
        Operator::Noop | Operator::Sd => Err(invalid("takes no operand")),
        Operator::Exists => operand
            .as_bool()
            .map(|b| vec![Field::from(b)])
            .ok_or_else(|| invalid("must be a boolean")),
        Operator::In | Operator::Nin | Operator::Between | Operator::NonBetween => {
            let items = operand.as_array().ok_or_else(|| invalid("must be an array"))?;
            items
                .iter()
                .map(|item| processor.hash_value(datatype, item))
                .collect()
        }
        _ => {
            if operand.is_array() {
                return Err(invalid("must be a single value"));
            }
            Ok(vec![processor.hash_value(datatype, operand)?])
        }
    }
}
