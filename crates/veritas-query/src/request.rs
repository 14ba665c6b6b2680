//! The declarative query a verifier sends with a proof request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use veritas_core::{Did, Field, Id, Operator, ProofType};

use crate::error::QueryError;

/// Wildcard entry of `allowedIssuers`.
pub const ANY_ISSUER: &str = "*";

/// A proof request query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofQuery {
    /// JSON-LD context of the credential schema.
    pub context: String,
    /// Credential type inside that context.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Absent means any issuer; an empty list admits none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_issuers: Option<Vec<String>>,
    /// `{ field: { "$op": operand } }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<Map<String, Value>>,
    #[serde(default)]
    pub skip_claim_revocation_check: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_type: Option<ProofType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullifier_session_id: Option<Field>,
}

/// One field predicate of a query. `operator` is `None` for a selective
/// disclosure request (`{ "field": {} }`).
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Option<Operator>,
    pub operand: Option<Value>,
}

impl ProofQuery {
    pub fn from_json(bytes: &[u8]) -> Result<Self, QueryError> {
        serde_json::from_slice(bytes).map_err(|e| QueryError::InvalidQuery(e.to_string()))
    }

    /// Whether `issuer` passes the allow-list. A missing list or `*` allows all.
    pub fn allows_issuer(&self, issuer: &Id) -> Result<bool, QueryError> {
        let Some(allowed_issuers) = &self.allowed_issuers else {
            return Ok(true);
        };
        if allowed_issuers.iter().any(|i| i == ANY_ISSUER) {
            return Ok(true);
        }
        for allowed in allowed_issuers {
            if Did::parse(allowed)?.id() == *issuer {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Requested nullifier session, treating an explicit zero as absent.
    pub fn nullifier_session(&self) -> Option<&Field> {
        self.nullifier_session_id.as_ref().filter(|id| !id.is_zero())
    }

    pub fn group(&self) -> Option<u64> {
        self.group_id.filter(|id| *id != 0)
    }

    /// Flatten `credentialSubject` into predicates, ordered by field name.
    ///
    /// An empty or missing subject yields no predicates (a NOOP query).
    pub fn predicates(&self) -> Result<Vec<Predicate>, QueryError> {
        let Some(subject) = &self.credential_subject else {
            return Ok(Vec::new());
        };

        let mut predicates = Vec::new();
        for (field, ops) in subject {
            let ops = ops.as_object().ok_or_else(|| {
                QueryError::InvalidQuery(format!("predicate for {} must be an object", field))
            })?;
            if ops.is_empty() {
                predicates.push(Predicate {
                    field: field.clone(),
                    operator: None,
                    operand: None,
                });
                continue;
            }
            for (name, operand) in ops {
                predicates.push(Predicate {
                    field: field.clone(),
                    operator: Some(Operator::from_name(name)?),
                    operand: Some(operand.clone()),
                });
            }
        }
        Ok(predicates)
    }
}
