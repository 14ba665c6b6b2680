//! Proof material shared by several circuits and the input fragments built
//! from it.

use serde::Serialize;
use veritas_core::{
    CircuitId, CircuitParams, Claim, Field, GistProof, Hash, Id, MerkleProof, MtpWithState,
    NodeAuxValue, Operator, ProofType, Signature, TreeState,
};

use crate::error::CircuitError;

/// Proof that a credential value sits at a content path of a merklized
/// credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueProof {
    pub path: Field,
    pub value: Field,
    pub mtp: MerkleProof,
}

/// One predicate as the circuit sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub operator: Operator,
    pub values: Vec<Field>,
    /// Claim slot the predicate reads on a flat credential.
    pub slot_index: usize,
    /// Content-path proof on a merklized credential.
    pub value_proof: Option<ValueProof>,
}

impl Query {
    /// Reject an operator the circuit does not support or a value count the
    /// operator cannot take.
    pub fn validate(&self, circuit: CircuitId) -> Result<(), CircuitError> {
        circuit.validate_request(&[self.operator])?;
        self.operator.validate_values(self.values.len())?;
        Ok(())
    }
}

/// A claim proven by inclusion in the issuer's claims tree.
#[derive(Debug, Clone)]
pub struct ClaimWithMtp {
    pub issuer_id: Id,
    pub claim: Claim,
    pub inc_proof: MtpWithState,
    pub non_rev_proof: Option<MtpWithState>,
}

/// The issuer's signature over a claim plus the proofs that the signing key
/// belongs to the issuer.
#[derive(Debug, Clone)]
pub struct BjjSignatureProof {
    pub signature: Signature,
    pub issuer_auth_claim: Claim,
    pub issuer_auth_inc_proof: MtpWithState,
    pub issuer_auth_non_rev_proof: MtpWithState,
}

/// A claim proven by the issuer's signature.
#[derive(Debug, Clone)]
pub struct ClaimWithSig {
    pub issuer_id: Id,
    pub claim: Claim,
    pub signature_proof: BjjSignatureProof,
    pub non_rev_proof: Option<MtpWithState>,
}

/// A claim that may carry either kind of issuance proof.
#[derive(Debug, Clone)]
pub struct ClaimWithSigAndMtp {
    pub issuer_id: Id,
    pub claim: Claim,
    pub signature_proof: Option<BjjSignatureProof>,
    pub inc_proof: Option<MtpWithState>,
    pub non_rev_proof: Option<MtpWithState>,
}

/// Proof that the requester controls an identity: its auth claim is in its
/// claims tree, not revoked, its state is in the global tree, and it signed
/// the challenge.
#[derive(Debug, Clone)]
pub struct UserAuthProof {
    pub auth_claim: Claim,
    pub inc_mtp: MerkleProof,
    pub non_rev_mtp: MerkleProof,
    pub tree_state: TreeState,
    pub gist_proof: GistProof,
    pub signature: Signature,
}

/// Pad a comparison-value list to `size` with zeros.
pub fn prepare_values(values: &[Field], size: usize) -> Result<Vec<Field>, CircuitError> {
    if values.len() > size {
        return Err(CircuitError::ValueArraySize {
            max: size,
            actual: values.len(),
        });
    }
    let mut padded = values.to_vec();
    padded.resize(size, Field::zero());
    Ok(padded)
}

/// Fail unless a public-signal array has `fixed + value_array_size` entries.
pub fn check_signal_count(
    actual: usize,
    fixed: usize,
    value_array_size: usize,
) -> Result<(), CircuitError> {
    let expected = fixed + value_array_size;
    if actual != expected {
        return Err(CircuitError::InvalidLength { expected, actual });
    }
    Ok(())
}

/// Parse the prover's public output: a JSON array of decimal strings.
pub fn parse_signals(bytes: &[u8]) -> Result<Vec<String>, CircuitError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub(crate) fn padded(proof: &MerkleProof, depth: usize) -> Result<Vec<Hash>, CircuitError> {
    Ok(veritas_core::prepare_siblings(&proof.siblings, depth)?)
}

pub(crate) fn zero_siblings(depth: usize) -> Vec<Hash> {
    vec![Hash::zero(); depth]
}

/// Positional reader over decoded public signals.
pub(crate) struct SignalReader<'a> {
    signals: &'a [String],
    pos: usize,
}

impl<'a> SignalReader<'a> {
    pub(crate) fn new(signals: &'a [String], expected: usize) -> Result<Self, CircuitError> {
        if signals.len() != expected {
            return Err(CircuitError::InvalidLength {
                expected,
                actual: signals.len(),
            });
        }
        Ok(Self { signals, pos: 0 })
    }

    fn raw(&mut self, name: &'static str) -> Result<&'a str, CircuitError> {
        let value = self
            .signals
            .get(self.pos)
            .ok_or_else(|| CircuitError::InvalidSignal {
                name,
                reason: "signal array exhausted".into(),
            })?;
        self.pos += 1;
        Ok(value)
    }

    pub(crate) fn field(&mut self, name: &'static str) -> Result<Field, CircuitError> {
        let raw = self.raw(name)?;
        Field::from_dec_str(raw).map_err(|e| invalid(name, e))
    }

    pub(crate) fn fields(&mut self, name: &'static str, n: usize) -> Result<Vec<Field>, CircuitError> {
        (0..n).map(|_| self.field(name)).collect()
    }

    pub(crate) fn id(&mut self, name: &'static str) -> Result<Id, CircuitError> {
        let value = self.field(name)?;
        Id::from_field(&value).map_err(|e| invalid(name, e))
    }

    /// An id that the circuit outputs as zero when not set.
    pub(crate) fn optional_id(&mut self, name: &'static str) -> Result<Option<Id>, CircuitError> {
        let value = self.field(name)?;
        if value.is_zero() {
            return Ok(None);
        }
        Id::from_field(&value).map(Some).map_err(|e| invalid(name, e))
    }

    pub(crate) fn u64(&mut self, name: &'static str) -> Result<u64, CircuitError> {
        let value = self.field(name)?;
        value.to_u64().ok_or_else(|| CircuitError::InvalidSignal {
            name,
            reason: format!("{} does not fit in 64 bits", value),
        })
    }

    pub(crate) fn flag(&mut self, name: &'static str) -> Result<bool, CircuitError> {
        match self.u64(name)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CircuitError::InvalidSignal {
                name,
                reason: format!("expected 0 or 1, got {}", other),
            }),
        }
    }

    pub(crate) fn operator(&mut self, name: &'static str) -> Result<Operator, CircuitError> {
        let code = self.u64(name)?;
        Operator::from_code(code).map_err(|e| invalid(name, e))
    }

    pub(crate) fn proof_type(&mut self, name: &'static str) -> Result<ProofType, CircuitError> {
        let code = self.u64(name)?;
        ProofType::from_code(code).map_err(|e| invalid(name, e))
    }
}

fn invalid(name: &'static str, e: impl std::fmt::Display) -> CircuitError {
    CircuitError::InvalidSignal {
        name,
        reason: e.to_string(),
    }
}

/// `issuerClaimNonRev*` inputs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssuerNonRevFields {
    issuer_claim_non_rev_claims_tree_root: Hash,
    issuer_claim_non_rev_rev_tree_root: Hash,
    issuer_claim_non_rev_roots_tree_root: Hash,
    issuer_claim_non_rev_state: Hash,
    issuer_claim_non_rev_mtp: Vec<Hash>,
    issuer_claim_non_rev_mtp_aux_hi: Hash,
    issuer_claim_non_rev_mtp_aux_hv: Hash,
    issuer_claim_non_rev_mtp_no_aux: Field,
}

impl IssuerNonRevFields {
    pub(crate) fn new(non_rev: &MtpWithState, params: &CircuitParams) -> Result<Self, CircuitError> {
        Self::from_parts(&non_rev.proof, &non_rev.tree_state, params)
    }

    pub(crate) fn from_parts(
        proof: &MerkleProof,
        tree_state: &TreeState,
        params: &CircuitParams,
    ) -> Result<Self, CircuitError> {
        let aux = proof.aux();
        Ok(Self {
            issuer_claim_non_rev_claims_tree_root: tree_state.claims_root.clone(),
            issuer_claim_non_rev_rev_tree_root: tree_state.revocation_root.clone(),
            issuer_claim_non_rev_roots_tree_root: tree_state.root_of_roots.clone(),
            issuer_claim_non_rev_state: tree_state.state.clone(),
            issuer_claim_non_rev_mtp: padded(proof, params.mt_level())?,
            issuer_claim_non_rev_mtp_aux_hi: aux.key,
            issuer_claim_non_rev_mtp_aux_hv: aux.value,
            issuer_claim_non_rev_mtp_no_aux: Field::from(aux.no_aux),
        })
    }
}

/// `issuerClaimMtp` and the issuer tree roots it was taken against.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssuerMtpFields {
    issuer_claim_mtp: Vec<Hash>,
    issuer_claim_claims_tree_root: Hash,
    issuer_claim_rev_tree_root: Hash,
    issuer_claim_roots_tree_root: Hash,
    issuer_claim_iden_state: Hash,
}

impl IssuerMtpFields {
    pub(crate) fn new(inc: &MtpWithState, params: &CircuitParams) -> Result<Self, CircuitError> {
        Ok(Self {
            issuer_claim_mtp: padded(&inc.proof, params.mt_level())?,
            issuer_claim_claims_tree_root: inc.tree_state.claims_root.clone(),
            issuer_claim_rev_tree_root: inc.tree_state.revocation_root.clone(),
            issuer_claim_roots_tree_root: inc.tree_state.root_of_roots.clone(),
            issuer_claim_iden_state: inc.tree_state.state.clone(),
        })
    }

    pub(crate) fn zeroed(params: &CircuitParams) -> Self {
        Self {
            issuer_claim_mtp: zero_siblings(params.mt_level()),
            issuer_claim_claims_tree_root: Hash::zero(),
            issuer_claim_rev_tree_root: Hash::zero(),
            issuer_claim_roots_tree_root: Hash::zero(),
            issuer_claim_iden_state: Hash::zero(),
        }
    }
}

/// Issuer signature inputs and the issuer auth-claim proofs behind them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssuerSigFields {
    issuer_claim_signature_r8x: Field,
    issuer_claim_signature_r8y: Field,
    issuer_claim_signature_s: Field,
    issuer_auth_claim: Claim,
    issuer_auth_claim_mtp: Vec<Hash>,
    issuer_auth_claim_non_rev_mtp: Vec<Hash>,
    issuer_auth_claim_non_rev_mtp_aux_hi: Hash,
    issuer_auth_claim_non_rev_mtp_aux_hv: Hash,
    issuer_auth_claim_non_rev_mtp_no_aux: Field,
    issuer_auth_claims_tree_root: Hash,
    issuer_auth_rev_tree_root: Hash,
    issuer_auth_roots_tree_root: Hash,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_auth_state: Option<Hash>,
}

impl IssuerSigFields {
    pub(crate) fn new(proof: &BjjSignatureProof, params: &CircuitParams) -> Result<Self, CircuitError> {
        let inc = &proof.issuer_auth_inc_proof;
        let non_rev = &proof.issuer_auth_non_rev_proof;
        let aux = non_rev.proof.aux();
        Ok(Self {
            issuer_claim_signature_r8x: proof.signature.r8x.clone(),
            issuer_claim_signature_r8y: proof.signature.r8y.clone(),
            issuer_claim_signature_s: proof.signature.s.clone(),
            issuer_auth_claim: proof.issuer_auth_claim.clone(),
            issuer_auth_claim_mtp: padded(&inc.proof, params.mt_level())?,
            issuer_auth_claim_non_rev_mtp: padded(&non_rev.proof, params.mt_level())?,
            issuer_auth_claim_non_rev_mtp_aux_hi: aux.key,
            issuer_auth_claim_non_rev_mtp_aux_hv: aux.value,
            issuer_auth_claim_non_rev_mtp_no_aux: Field::from(aux.no_aux),
            issuer_auth_claims_tree_root: inc.tree_state.claims_root.clone(),
            issuer_auth_rev_tree_root: inc.tree_state.revocation_root.clone(),
            issuer_auth_roots_tree_root: inc.tree_state.root_of_roots.clone(),
            issuer_auth_state: None,
        })
    }

    /// Also emit `issuerAuthState`, which only the V3 circuits take.
    pub(crate) fn with_auth_state(mut self, state: Hash) -> Self {
        self.issuer_auth_state = Some(state);
        self
    }

    pub(crate) fn zeroed(params: &CircuitParams) -> Self {
        Self {
            issuer_claim_signature_r8x: Field::zero(),
            issuer_claim_signature_r8y: Field::zero(),
            issuer_claim_signature_s: Field::zero(),
            issuer_auth_claim: Claim::empty(),
            issuer_auth_claim_mtp: zero_siblings(params.mt_level()),
            issuer_auth_claim_non_rev_mtp: zero_siblings(params.mt_level()),
            issuer_auth_claim_non_rev_mtp_aux_hi: Hash::zero(),
            issuer_auth_claim_non_rev_mtp_aux_hv: Hash::zero(),
            issuer_auth_claim_non_rev_mtp_no_aux: Field::zero(),
            issuer_auth_claims_tree_root: Hash::zero(),
            issuer_auth_rev_tree_root: Hash::zero(),
            issuer_auth_roots_tree_root: Hash::zero(),
            issuer_auth_state: Some(Hash::zero()),
        }
    }
}

/// The requester's identity-ownership sub-proof as on-chain circuits take it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserAuthFields {
    auth_claim: Claim,
    auth_claim_inc_mtp: Vec<Hash>,
    auth_claim_non_rev_mtp: Vec<Hash>,
    auth_claim_non_rev_mtp_aux_hi: Hash,
    auth_claim_non_rev_mtp_aux_hv: Hash,
    auth_claim_non_rev_mtp_no_aux: Field,
    challenge: Field,
    challenge_signature_r8x: Field,
    challenge_signature_r8y: Field,
    challenge_signature_s: Field,
    user_claims_tree_root: Hash,
    user_rev_tree_root: Hash,
    user_roots_tree_root: Hash,
    user_state: Hash,
    gist_root: Hash,
    gist_mtp: Vec<Hash>,
    gist_mtp_aux_hi: Hash,
    gist_mtp_aux_hv: Hash,
    gist_mtp_no_aux: Field,
}

impl UserAuthFields {
    pub(crate) fn new(
        auth: &UserAuthProof,
        challenge: &Field,
        params: &CircuitParams,
    ) -> Result<Self, CircuitError> {
        let non_rev_aux = auth.non_rev_mtp.aux();
        let gist_aux = auth.gist_proof.proof.aux();
        Ok(Self {
            auth_claim: auth.auth_claim.clone(),
            auth_claim_inc_mtp: padded(&auth.inc_mtp, params.mt_level())?,
            auth_claim_non_rev_mtp: padded(&auth.non_rev_mtp, params.mt_level())?,
            auth_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            auth_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            auth_claim_non_rev_mtp_no_aux: Field::from(non_rev_aux.no_aux),
            challenge: challenge.clone(),
            challenge_signature_r8x: auth.signature.r8x.clone(),
            challenge_signature_r8y: auth.signature.r8y.clone(),
            challenge_signature_s: auth.signature.s.clone(),
            user_claims_tree_root: auth.tree_state.claims_root.clone(),
            user_rev_tree_root: auth.tree_state.revocation_root.clone(),
            user_roots_tree_root: auth.tree_state.root_of_roots.clone(),
            user_state: auth.tree_state.state.clone(),
            gist_root: auth.gist_proof.root.clone(),
            gist_mtp: padded(&auth.gist_proof.proof, params.mt_level_on_chain())?,
            gist_mtp_aux_hi: gist_aux.key,
            gist_mtp_aux_hv: gist_aux.value,
            gist_mtp_no_aux: Field::from(gist_aux.no_aux),
        })
    }

    /// Placeholder when ownership was established out of band. Only the
    /// challenge is kept.
    pub(crate) fn zeroed(challenge: &Field, params: &CircuitParams) -> Self {
        Self {
            auth_claim: Claim::empty(),
            auth_claim_inc_mtp: zero_siblings(params.mt_level()),
            auth_claim_non_rev_mtp: zero_siblings(params.mt_level()),
            auth_claim_non_rev_mtp_aux_hi: Hash::zero(),
            auth_claim_non_rev_mtp_aux_hv: Hash::zero(),
            auth_claim_non_rev_mtp_no_aux: Field::zero(),
            challenge: challenge.clone(),
            challenge_signature_r8x: Field::zero(),
            challenge_signature_r8y: Field::zero(),
            challenge_signature_s: Field::zero(),
            user_claims_tree_root: Hash::zero(),
            user_rev_tree_root: Hash::zero(),
            user_roots_tree_root: Hash::zero(),
            user_state: Hash::zero(),
            gist_root: Hash::zero(),
            gist_mtp: zero_siblings(params.mt_level_on_chain()),
            gist_mtp_aux_hi: Hash::zero(),
            gist_mtp_aux_hv: Hash::zero(),
            gist_mtp_no_aux: Field::zero(),
        }
    }
}

/// The requester and issuer identification every query circuit takes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestFields {
    #[serde(rename = "requestID")]
    request_id: Field,
    #[serde(rename = "userGenesisID")]
    user_genesis_id: Field,
    profile_nonce: Field,
    claim_subject_profile_nonce: Field,
    #[serde(rename = "issuerID")]
    issuer_id: Field,
    issuer_claim: Claim,
    is_revocation_checked: Field,
}

/// Requester-side parameters shared by every query circuit's material.
#[derive(Debug, Clone)]
pub struct Requester {
    pub request_id: Field,
    /// The requester's genesis id.
    pub id: Id,
    pub profile_nonce: Field,
    pub claim_subject_profile_nonce: Field,
}

impl RequestFields {
    pub(crate) fn new(
        requester: &Requester,
        issuer_id: &Id,
        claim: &Claim,
        skip_revocation_check: bool,
    ) -> Self {
        Self {
            request_id: requester.request_id.clone(),
            user_genesis_id: requester.id.to_field(),
            profile_nonce: requester.profile_nonce.clone(),
            claim_subject_profile_nonce: requester.claim_subject_profile_nonce.clone(),
            issuer_id: issuer_id.to_field(),
            issuer_claim: claim.clone(),
            is_revocation_checked: Field::from(!skip_revocation_check),
        }
    }
}

/// Content-path proof inputs for one predicate.
pub(crate) struct ClaimPath {
    pub(crate) not_exists: bool,
    pub(crate) mtp: Vec<Hash>,
    pub(crate) aux: NodeAuxValue,
    pub(crate) key: Field,
    pub(crate) value: Field,
}

impl ClaimPath {
    /// A query without a value proof addresses a flat credential: empty path,
    /// absent value.
    pub(crate) fn new(query: &Query, params: &CircuitParams) -> Result<Self, CircuitError> {
        let empty = ValueProof {
            path: Field::zero(),
            value: Field::zero(),
            mtp: MerkleProof::empty(),
        };
        let proof = query.value_proof.as_ref().unwrap_or(&empty);
        Ok(Self {
            not_exists: !proof.mtp.existence,
            mtp: padded(&proof.mtp, params.mt_level_claim())?,
            aux: proof.mtp.aux(),
            key: proof.path.clone(),
            value: proof.value.clone(),
        })
    }

    /// The all-zero slot of a disabled linked query.
    pub(crate) fn disabled(params: &CircuitParams) -> Self {
        Self {
            not_exists: false,
            mtp: zero_siblings(params.mt_level_claim()),
            aux: NodeAuxValue {
                key: Hash::zero(),
                value: Hash::zero(),
                no_aux: false,
            },
            key: Field::zero(),
            value: Field::zero(),
        }
    }
}

/// The predicate inputs of a single-query circuit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryFields {
    claim_schema: Field,
    #[serde(skip_serializing_if = "Option::is_none")]
    claim_path_not_exists: Option<Field>,
    claim_path_mtp: Vec<Hash>,
    claim_path_mtp_no_aux: Field,
    claim_path_mtp_aux_hi: Hash,
    claim_path_mtp_aux_hv: Hash,
    claim_path_key: Field,
    claim_path_value: Field,
    operator: Field,
    slot_index: Field,
    timestamp: Field,
    value: Vec<Field>,
}

impl QueryFields {
    pub(crate) fn new(
        query: &Query,
        claim: &Claim,
        timestamp: u64,
        params: &CircuitParams,
    ) -> Result<Self, CircuitError> {
        let path = ClaimPath::new(query, params)?;
        Ok(Self {
            claim_schema: claim.schema_hash(),
            claim_path_not_exists: Some(Field::from(path.not_exists)),
            claim_path_mtp: path.mtp,
            claim_path_mtp_no_aux: Field::from(path.aux.no_aux),
            claim_path_mtp_aux_hi: path.aux.key,
            claim_path_mtp_aux_hv: path.aux.value,
            claim_path_key: path.key,
            claim_path_value: path.value,
            operator: Field::from(u64::from(query.operator.code())),
            slot_index: Field::from(query.slot_index as u64),
            timestamp: Field::from(timestamp),
            value: prepare_values(&query.values, params.value_array_size())?,
        })
    }

    /// Drop `claimPathNotExists`, which the V3 circuits do not take.
    pub(crate) fn without_not_exists(mut self) -> Self {
        self.claim_path_not_exists = None;
        self
    }
}

pub(crate) fn to_json<T: Serialize>(inputs: &T) -> Result<Vec<u8>, CircuitError> {
    Ok(serde_json::to_vec(inputs)?)
}
