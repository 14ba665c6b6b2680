//! Veritas Core — field elements, identities, claims, merkle proofs, operators
//! and circuit parameters shared by the Veritas proof codec and verifier.

pub mod claim;
pub mod config;
pub mod did;
pub mod error;
pub mod field;
pub mod hashing;
pub mod id;
pub mod merkle;
pub mod operator;
pub mod types;

pub use claim::{Claim, Signature};
pub use config::CircuitParams;
pub use did::Did;
pub use error::CoreError;
pub use field::{flag, Field, Hash};
pub use hashing::{Blake3Hasher, FieldHasher};
pub use id::Id;
pub use merkle::{
    node_aux_value, prepare_siblings, prepare_siblings_str, GistProof, MerkleProof, MtpWithState,
    NodeAux, NodeAuxValue, TreeState,
};
pub use operator::{compare, Operator};
pub use types::{CircuitId, ProofType};
