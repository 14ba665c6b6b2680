//! `credentialAtomicQueryMTPV2`: one predicate over a claim the issuer
//! published in its claims tree.

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams, Field, Hash, Id, MtpWithState, Operator};

use crate::common::{
    check_signal_count, to_json, ClaimWithMtp, IssuerMtpFields, IssuerNonRevFields, Query,
    QueryFields, RequestFields, Requester, SignalReader,
};
use crate::error::CircuitError;

/// Proof material for `credentialAtomicQueryMTPV2`.
#[derive(Debug, Clone)]
pub struct AtomicQueryMtpV2Inputs {
    pub requester: Requester,
    pub claim: ClaimWithMtp,
    pub skip_claim_revocation_check: bool,
    pub query: Query,
    /// Unix seconds.
    pub current_timestamp: u64,
}

#[derive(Serialize)]
pub(crate) struct AtomicQueryMtpV2CircuitInputs {
    #[serde(flatten)]
    pub(crate) request: RequestFields,
    #[serde(flatten)]
    pub(crate) issuer_mtp: IssuerMtpFields,
    #[serde(flatten)]
    pub(crate) non_rev: IssuerNonRevFields,
    #[serde(flatten)]
    pub(crate) query: QueryFields,
}

pub(crate) fn required_non_rev(proof: &Option<MtpWithState>) -> Result<&MtpWithState, CircuitError> {
    proof
        .as_ref()
        .ok_or(CircuitError::MissingProof("claim non-revocation proof"))
}

impl AtomicQueryMtpV2Inputs {
    pub(crate) fn circuit_inputs(
        &self,
        circuit: CircuitId,
        params: &CircuitParams,
    ) -> Result<AtomicQueryMtpV2CircuitInputs, CircuitError> {
        self.query.validate(circuit)?;
        if !self.claim.inc_proof.proof.existence {
            return Err(CircuitError::MissingProof("claim inclusion proof"));
        }
        let non_rev = required_non_rev(&self.claim.non_rev_proof)?;
        Ok(AtomicQueryMtpV2CircuitInputs {
            request: RequestFields::new(
                &self.requester,
                &self.claim.issuer_id,
                &self.claim.claim,
                self.skip_claim_revocation_check,
            ),
            issuer_mtp: IssuerMtpFields::new(&self.claim.inc_proof, params)?,
            non_rev: IssuerNonRevFields::new(non_rev, params)?,
            query: QueryFields::new(&self.query, &self.claim.claim, self.current_timestamp, params)?,
        })
    }

    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        to_json(&self.circuit_inputs(CircuitId::AtomicQueryMtpV2, params)?)
    }
}

/// Public output of `credentialAtomicQueryMTPV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryMtpV2PubSignals {
    pub merklized: bool,
    #[serde(rename = "userID")]
    pub user_id: Id,
    #[serde(rename = "requestID")]
    pub request_id: Field,
    #[serde(rename = "issuerID")]
    pub issuer_id: Id,
    pub issuer_claim_iden_state: Hash,
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

impl AtomicQueryMtpV2PubSignals {
    pub const FIXED_SIGNALS: usize = 13;

    pub fn decode(signals: &[String], params: &CircuitParams) -> Result<Self, CircuitError> {
        let n = params.value_array_size();
        check_signal_count(signals.len(), Self::FIXED_SIGNALS, n)?;
        let mut r = SignalReader::new(signals, Self::FIXED_SIGNALS + n)?;
        Ok(Self {
            merklized: r.flag("merklized")?,
            user_id: r.id("userID")?,
            request_id: r.field("requestID")?,
            issuer_id: r.id("issuerID")?,
            issuer_claim_iden_state: r.field("issuerClaimIdenState")?,
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
