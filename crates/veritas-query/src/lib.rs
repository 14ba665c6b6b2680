//! Veritas Query — turns a verifier's declarative query into circuit
//! parameters and checks a proof's public signals against it.

pub mod check;
pub mod error;
pub mod metadata;
pub mod opts;
pub mod request;
pub mod schema;

pub use check::{check_freshness, query_hash, verify_linked_query, verify_query, ClaimOutputs};
pub use error::{MismatchKind, QueryError};
pub use metadata::{extract, QueryMetadata, ResolvedQuery};
pub use opts::VerifyOpts;
pub use request::{Predicate, ProofQuery};
pub use schema::{FieldLocation, SchemaField, SchemaProcessor, SchemaRegistry, SchemaType};
