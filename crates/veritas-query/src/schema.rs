//! Schema processing: resolving credential types and fields to the values a
//! circuit commits to.

use async_trait::async_trait;
use chrono::DateTime;
use dashmap::DashMap;
use num_bigint::BigUint;
use serde_json::Value;
use veritas_core::field::modulus;
use veritas_core::operator::xsd;
use veritas_core::{Blake3Hasher, Field, FieldHasher};

use crate::error::QueryError;

/// Bytes packed into one field element when hashing strings.
const STRING_CHUNK: usize = 31;

/// Where a field lives inside a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLocation {
    /// Flat schema: one of the eight claim slots.
    Slot(usize),
    /// Merklized credential: the content path key of the field.
    Path(Field),
}

/// A resolved credential type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaType {
    pub schema_hash: Field,
    pub merklized: bool,
    /// Path key of the bare `credentialSubject` node, used by NOOP queries
    /// over merklized credentials.
    pub subject_path_key: Field,
}

/// A resolved credential field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// XSD datatype IRI.
    pub datatype: String,
    pub location: FieldLocation,
}

/// Resolves schemas and hashes values the way the issuer merklized them.
#[async_trait]
pub trait SchemaProcessor: Send + Sync {
    async fn resolve_type(
        &self,
        context: &str,
        credential_type: &str,
    ) -> Result<SchemaType, QueryError>;

    async fn resolve_field(
        &self,
        context: &str,
        credential_type: &str,
        field: &str,
    ) -> Result<SchemaField, QueryError>;

    /// Convert a query operand to the field element the circuit compares.
    fn hash_value(&self, datatype: &str, value: &Value) -> Result<Field, QueryError>;

    /// Value of `field` in a presented credential document, as committed in
    /// the claim.
    async fn disclosed_value(
        &self,
        document: &Value,
        context: &str,
        credential_type: &str,
        field: &str,
    ) -> Result<Field, QueryError>;
}

#[derive(Debug, Clone)]
struct RegisteredSchema {
    schema: SchemaType,
    fields: Vec<(String, SchemaField)>,
}

/// In-memory schema processor for schemas known ahead of time.
///
/// Values are encoded directly for integers, booleans and date-times;
/// strings are hashed with BLAKE3 in 31-byte chunks.
pub struct SchemaRegistry {
    schemas: DashMap<(String, String), RegisteredSchema>,
    hasher: Blake3Hasher,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: DashMap::new(),
            hasher: Blake3Hasher,
        }
    }

    /// Register a credential type with its fields.
    pub fn register(
        &self,
        context: &str,
        credential_type: &str,
        schema: SchemaType,
        fields: Vec<(String, SchemaField)>,
    ) {
        tracing::debug!(context, credential_type, fields = fields.len(), "registered schema");
        self.schemas.insert(
            (context.to_string(), credential_type.to_string()),
            RegisteredSchema { schema, fields },
        );
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn lookup(&self, context: &str, credential_type: &str) -> Result<RegisteredSchema, QueryError> {
        self.schemas
            .get(&(context.to_string(), credential_type.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| QueryError::Loader(format!("unknown type {} in {}", credential_type, context)))
    }

    fn hash_string(&self, s: &str) -> Result<Field, QueryError> {
        let mut chunks = Vec::new();
        for chunk in s.as_bytes().chunks(STRING_CHUNK) {
            chunks.push(Field::from_bytes_le(chunk)?);
        }
        if chunks.is_empty() {
            chunks.push(Field::zero());
        }
        Ok(self.hasher.hash(&chunks)?)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_value(datatype: &str, value: &Value) -> QueryError {
    QueryError::InvalidQuery(format!("{} is not a valid {} value", value, datatype))
}

/// Encode a signed integer; negatives wrap around the field modulus.
fn signed_field(v: i64) -> Result<Field, QueryError> {
    if v >= 0 {
        return Ok(Field::from(v as u64));
    }
    let magnitude = BigUint::from(v.unsigned_abs());
    Ok(Field::new(modulus() - magnitude)?)
}

fn integer_value(datatype: &str, value: &Value) -> Result<Field, QueryError> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(Field::from(u))
            } else if let Some(i) = n.as_i64() {
                signed_field(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => signed_field(f as i64),
                    _ => Err(invalid_value(datatype, value)),
                }
            }
        }
        Value::String(s) => match s.parse::<i64>() {
            Ok(i) => signed_field(i),
            Err(_) => Ok(Field::from_dec_str(s)?),
        },
        _ => Err(invalid_value(datatype, value)),
    }
}

#[async_trait]
impl SchemaProcessor for SchemaRegistry {
    async fn resolve_type(
        &self,
        context: &str,
        credential_type: &str,
    ) -> Result<SchemaType, QueryError> {
        Ok(self.lookup(context, credential_type)?.schema)
    }

    async fn resolve_field(
        &self,
        context: &str,
        credential_type: &str,
        field: &str,
    ) -> Result<SchemaField, QueryError> {
        self.lookup(context, credential_type)?
            .fields
            .into_iter()
            .find(|(name, _)| name == field)
            .map(|(_, f)| f)
            .ok_or_else(|| QueryError::Loader(format!("field {} not in {}", field, credential_type)))
    }

    fn hash_value(&self, datatype: &str, value: &Value) -> Result<Field, QueryError> {
        match datatype {
            xsd::BOOLEAN => value
                .as_bool()
                .map(Field::from)
                .ok_or_else(|| invalid_value(datatype, value)),
            xsd::STRING => value
                .as_str()
                .ok_or_else(|| invalid_value(datatype, value))
                .and_then(|s| self.hash_string(s)),
            xsd::DATE_TIME => {
                let s = value.as_str().ok_or_else(|| invalid_value(datatype, value))?;
                let ts = DateTime::parse_from_rfc3339(s).map_err(|_| invalid_value(datatype, value))?;
                signed_field(ts.timestamp())
            }
            xsd::INTEGER
            | xsd::NON_NEGATIVE_INTEGER
            | xsd::NON_POSITIVE_INTEGER
            | xsd::NEGATIVE_INTEGER
            | xsd::POSITIVE_INTEGER
            | xsd::DOUBLE
            | xsd::DECIMAL => integer_value(datatype, value),
            other => Err(QueryError::InvalidQuery(format!("unsupported datatype {}", other))),
        }
    }

    async fn disclosed_value(
        &self,
        document: &Value,
        context: &str,
        credential_type: &str,
        field: &str,
    ) -> Result<Field, QueryError> {
        let schema_field = self.resolve_field(context, credential_type, field).await?;
        let value = document
            .get("credentialSubject")
            .and_then(|subject| subject.get(field))
            .ok_or_else(|| QueryError::Loader(format!("credential does not disclose {}", field)))?;
        self.hash_value(&schema_field.datatype, value)
    }
}
