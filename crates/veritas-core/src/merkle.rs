use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::{flag, Hash};

/// The leaf a sparse-merkle non-membership proof ran into instead of the
/// requested key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAux {
    pub key: Hash,
    pub value: Hash,
}

/// A sparse-merkle membership or non-membership proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub existence: bool,
    /// Siblings from the root down, without trailing zero hashes.
    pub siblings: Vec<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_aux: Option<NodeAux>,
}

impl MerkleProof {
    pub fn inclusion(siblings: Vec<Hash>) -> Self {
        Self {
            existence: true,
            siblings,
            node_aux: None,
        }
    }

    pub fn non_inclusion(siblings: Vec<Hash>, node_aux: Option<NodeAux>) -> Self {
        Self {
            existence: false,
            siblings,
            node_aux,
        }
    }

    /// Proof of absence in an empty tree: no siblings and no aux leaf.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Siblings padded to `depth`.
    pub fn padded_siblings(&self, depth: usize) -> Result<Vec<String>, CoreError> {
        prepare_siblings_str(&self.siblings, depth)
    }

    pub fn aux(&self) -> NodeAuxValue {
        node_aux_value(self)
    }
}

/// The `(auxKey, auxValue, noAux)` triple a circuit takes for a
/// non-membership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAuxValue {
    pub key: Hash,
    pub value: Hash,
    pub no_aux: bool,
}

impl NodeAuxValue {
    /// `noAux` in its wire form.
    pub fn no_aux_flag(&self) -> String {
        flag(self.no_aux)
    }
}

/// Compute the node-auxiliary triple for a proof.
///
/// `no_aux` is set exactly when the proof shows absence and found no other
/// leaf on the path.
pub fn node_aux_value(proof: &MerkleProof) -> NodeAuxValue {
    if proof.existence {
        return NodeAuxValue {
            key: Hash::zero(),
            value: Hash::zero(),
            no_aux: false,
        };
    }
    match &proof.node_aux {
        Some(aux) => NodeAuxValue {
            key: aux.key.clone(),
            value: aux.value.clone(),
            no_aux: false,
        },
        None => NodeAuxValue {
            key: Hash::zero(),
            value: Hash::zero(),
            no_aux: true,
        },
    }
}

/// Right-pad `siblings` with zero hashes up to `depth` entries.
pub fn prepare_siblings(siblings: &[Hash], depth: usize) -> Result<Vec<Hash>, CoreError> {
    if siblings.len() > depth {
        return Err(CoreError::InvalidLength {
            expected: depth,
            actual: siblings.len(),
        });
    }
    let mut padded = Vec::with_capacity(depth);
    padded.extend_from_slice(siblings);
    padded.resize(depth, Hash::zero());
    Ok(padded)
}

/// [`prepare_siblings`] in wire form.
pub fn prepare_siblings_str(siblings: &[Hash], depth: usize) -> Result<Vec<String>, CoreError> {
    Ok(prepare_siblings(siblings, depth)?
        .iter()
        .map(ToString::to_string)
        .collect())
}

/// Snapshot of an identity's three trees and the state hash over them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeState {
    pub state: Hash,
    pub claims_root: Hash,
    pub revocation_root: Hash,
    pub root_of_roots: Hash,
}

impl TreeState {
    /// All-zero placeholder for a branch a circuit does not use.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// A merkle proof together with the tree state it was taken against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MtpWithState {
    pub proof: MerkleProof,
    pub tree_state: TreeState,
}

/// Inclusion or non-inclusion proof of an identity state in the global
/// identity-state tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GistProof {
    pub root: Hash,
    pub proof: MerkleProof,
}
