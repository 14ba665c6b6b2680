//! `credentialAtomicQuerySigV2`: one predicate over a claim the issuer signed.

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams, Field, Hash, Id, Operator};

use crate::atomic_mtp_v2::required_non_rev;
use crate::common::{
    check_signal_count, to_json, ClaimWithSig, IssuerNonRevFields, IssuerSigFields, Query,
    QueryFields, RequestFields, Requester, SignalReader,
};
use crate::error::CircuitError;

/// Proof material for `credentialAtomicQuerySigV2`.
#[derive(Debug, Clone)]
pub struct AtomicQuerySigV2Inputs {
    pub requester: Requester,
    pub claim: ClaimWithSig,
    pub skip_claim_revocation_check: bool,
    pub query: Query,
    /// Unix seconds.
    pub current_timestamp: u64,
}

#[derive(Serialize)]
pub(crate) struct AtomicQuerySigV2CircuitInputs {
    #[serde(flatten)]
    pub(crate) request: RequestFields,
    #[serde(flatten)]
    pub(crate) non_rev: IssuerNonRevFields,
    #[serde(flatten)]
    pub(crate) sig: IssuerSigFields,
    #[serde(flatten)]
    pub(crate) query: QueryFields,
}

impl AtomicQuerySigV2Inputs {
    pub(crate) fn circuit_inputs(
        &self,
        circuit: CircuitId,
        params: &CircuitParams,
    ) -> Result<AtomicQuerySigV2CircuitInputs, CircuitError> {
        self.query.validate(circuit)?;
        let signature_proof = &self.claim.signature_proof;
        if !signature_proof.issuer_auth_inc_proof.proof.existence {
            return Err(CircuitError::MissingProof("issuer auth claim inclusion proof"));
        }
        let non_rev = required_non_rev(&self.claim.non_rev_proof)?;
        Ok(AtomicQuerySigV2CircuitInputs {
            request: RequestFields::new(
                &self.requester,
                &self.claim.issuer_id,
                &self.claim.claim,
                self.skip_claim_revocation_check,
            ),
            non_rev: IssuerNonRevFields::new(non_rev, params)?,
            sig: IssuerSigFields::new(signature_proof, params)?,
            query: QueryFields::new(&self.query, &self.claim.claim, self.current_timestamp, params)?,
        })
    }

    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        to_json(&self.circuit_inputs(CircuitId::AtomicQuerySigV2, params)?)
    }
}

/// Public output of `credentialAtomicQuerySigV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQuerySigV2PubSignals {
    pub merklized: bool,
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub issuer_auth_state: Hash,
    #[serde(rename = "requestID")]
    pub request_id: Field,
    #[serde(rename = "issuerID")]
    pub issuer_id: Id,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
    pub claim_schema: Field,
    pub claim_path_not_exists: bool,
    pub claim_path_key: Field,
    pub slot_index: u64,
    pub operator: Operator,
    pub value: Vec<Field>,
}

impl AtomicQuerySigV2PubSignals {
    pub const FIXED_SIGNALS: usize = 13;

    pub fn decode(signals: &[String], params: &CircuitParams) -> Result<Self, CircuitError> {
        let n = params.value_array_size();
        check_signal_count(signals.len(), Self::FIXED_SIGNALS, n)?;
        let mut r = SignalReader::new(signals, Self::FIXED_SIGNALS + n)?;
        Ok(Self {
            merklized: r.flag("merklized")?,
            user_id: r.id("userID")?,
            issuer_auth_state: r.field("issuerAuthState")?,
            request_id: r.field("requestID")?,
            issuer_id: r.id("issuerID")?,
            is_revocation_checked: r.flag("isRevocationChecked")?,
            issuer_claim_non_rev_state: r.field("issuerClaimNonRevState")?,
            timestamp: r.u64("timestamp")?,
            claim_schema: r.field("claimSchema")?,
            claim_path_not_exists: r.flag("claimPathNotExists")?,
            claim_path_key: r.field("claimPathKey")?,
            slot_index: r.u64("slotIndex")?,
            operator: r.operator("operator")?,
            value: r.fields("value", n)?,
        })
    }
}
