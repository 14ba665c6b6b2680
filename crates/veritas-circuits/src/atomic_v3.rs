//! `credentialAtomicQueryV3`: one circuit for signed and published claims,
//! selected by proof type, with link and nullifier outputs.

use serde::Serialize;
use veritas_core::{
    CircuitId, CircuitParams, Field, Hash, Id, MerkleProof, Operator, ProofType, TreeState,
};

use crate::common::{
    check_signal_count, to_json, ClaimWithSigAndMtp, IssuerMtpFields, IssuerNonRevFields,
    IssuerSigFields, Query, QueryFields, RequestFields, Requester, SignalReader,
};
use crate::error::CircuitError;

/// Proof material for `credentialAtomicQueryV3`.
#[derive(Debug, Clone)]
pub struct AtomicQueryV3Inputs {
    pub requester: Requester,
    pub claim: ClaimWithSigAndMtp,
    pub skip_claim_revocation_check: bool,
    pub query: Query,
    /// Unix seconds.
    pub current_timestamp: u64,
    pub proof_type: ProofType,
    /// Zero disables linking.
    pub link_nonce: Field,
    pub verifier_id: Option<Id>,
    /// Zero disables the nullifier.
    pub nullifier_session_id: Field,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AtomicQueryV3CircuitInputs {
    #[serde(flatten)]
    request: RequestFields,
    #[serde(flatten)]
    issuer_mtp: IssuerMtpFields,
    #[serde(flatten)]
    non_rev: IssuerNonRevFields,
    #[serde(flatten)]
    sig: IssuerSigFields,
    #[serde(flatten)]
    query: QueryFields,
    proof_type: Field,
    link_nonce: Field,
    #[serde(rename = "verifierID")]
    verifier_id: Field,
    #[serde(rename = "nullifierSessionID")]
    nullifier_session_id: Field,
}

impl AtomicQueryV3Inputs {
    pub(crate) fn circuit_inputs(
        &self,
        circuit: CircuitId,
        params: &CircuitParams,
    ) -> Result<AtomicQueryV3CircuitInputs, CircuitError> {
        self.query.validate(circuit)?;

        // The unused branch is zero-filled. Its tree state also stands in for
        // the non-revocation roots when the revocation check is waived.
        let (issuer_mtp, sig, fallback_state): (_, _, &TreeState) = match self.proof_type {
            ProofType::Signature => {
                let proof = self
                    .claim
                    .signature_proof
                    .as_ref()
                    .ok_or(CircuitError::MissingProof("claim signature proof"))?;
                if !proof.issuer_auth_inc_proof.proof.existence {
                    return Err(CircuitError::MissingProof("issuer auth claim inclusion proof"));
                }
                let auth_state = proof.issuer_auth_inc_proof.tree_state.state.clone();
                (
                    IssuerMtpFields::zeroed(params),
                    IssuerSigFields::new(proof, params)?.with_auth_state(auth_state),
                    &proof.issuer_auth_inc_proof.tree_state,
                )
            }
            ProofType::Inclusion => {
                let inc = self
                    .claim
                    .inc_proof
                    .as_ref()
                    .ok_or(CircuitError::MissingProof("claim inclusion proof"))?;
                if !inc.proof.existence {
                    return Err(CircuitError::MissingProof("claim inclusion proof"));
                }
                (
                    IssuerMtpFields::new(inc, params)?,
                    IssuerSigFields::zeroed(params),
                    &inc.tree_state,
                )
            }
        };

        let non_rev = match (&self.claim.non_rev_proof, self.skip_claim_revocation_check) {
            (Some(proof), _) => IssuerNonRevFields::new(proof, params)?,
            (None, true) => {
                IssuerNonRevFields::from_parts(&MerkleProof::empty(), fallback_state, params)?
            }
            (None, false) => return Err(CircuitError::MissingProof("claim non-revocation proof")),
        };

        Ok(AtomicQueryV3CircuitInputs {
            request: RequestFields::new(
                &self.requester,
                &self.claim.issuer_id,
                &self.claim.claim,
                self.skip_claim_revocation_check,
            ),
            issuer_mtp,
            non_rev,
            sig,
            query: QueryFields::new(&self.query, &self.claim.claim, self.current_timestamp, params)?
                .without_not_exists(),
            proof_type: Field::from(self.proof_type.code()),
            link_nonce: self.link_nonce.clone(),
            verifier_id: self
                .verifier_id
                .as_ref()
                .map(Id::to_field)
                .unwrap_or_default(),
            nullifier_session_id: self.nullifier_session_id.clone(),
        })
    }

    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        to_json(&self.circuit_inputs(CircuitId::AtomicQueryV3, params)?)
    }
}

/// Public output of `credentialAtomicQueryV3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryV3PubSignals {
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub merklized: bool,
    pub issuer_state: Hash,
    #[serde(rename = "linkID")]
    pub link_id: Field,
    pub nullifier: Field,
    pub operator_output: Field,
    pub proof_type: ProofType,
    #[serde(rename = "requestID")]
    pub request_id: Field,
    #[serde(rename = "issuerID")]
    pub issuer_id: Id,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
    pub claim_schema: Field,
    pub claim_path_key: Field,
    pub slot_index: u64,
    pub operator: Operator,
    pub value: Vec<Field>,
    #[serde(rename = "verifierID")]
    pub verifier_id: Option<Id>,
    #[serde(rename = "nullifierSessionID")]
    pub nullifier_session_id: Field,
}

impl AtomicQueryV3PubSignals {
    pub const FIXED_SIGNALS: usize = 18;

    pub fn decode(signals: &[String], params: &CircuitParams) -> Result<Self, CircuitError> {
        let n = params.value_array_size();
        check_signal_count(signals.len(), Self::FIXED_SIGNALS, n)?;
        let mut r = SignalReader::new(signals, Self::FIXED_SIGNALS + n)?;
        Ok(Self {
            user_id: r.id("userID")?,
            merklized: r.flag("merklized")?,
            issuer_state: r.field("issuerState")?,
            link_id: r.field("linkID")?,
            nullifier: r.field("nullifier")?,
            operator_output: r.field("operatorOutput")?,
            proof_type: r.proof_type("proofType")?,
            request_id: r.field("requestID")?,
            issuer_id: r.id("issuerID")?,
            is_revocation_checked: r.flag("isRevocationChecked")?,
            issuer_claim_non_rev_state: r.field("issuerClaimNonRevState")?,
            timestamp: r.u64("timestamp")?,
            claim_schema: r.field("claimSchema")?,
            claim_path_key: r.field("claimPathKey")?,
            slot_index: r.u64("slotIndex")?,
            operator: r.operator("operator")?,
            value: r.fields("value", n)?,
            verifier_id: r.optional_id("verifierID")?,
            nullifier_session_id: r.field("nullifierSessionID")?,
        })
    }
}
