//! `credentialAtomicQueryMTPV2OnChain`: the MTP query bundled with the
//! requester's ownership proof so a contract can check both at once.

use serde::Serialize;
use veritas_core::{CircuitId, CircuitParams, Field, Hash, Id};

use crate::atomic_mtp_v2::AtomicQueryMtpV2Inputs;
use crate::common::{to_json, SignalReader, UserAuthFields, UserAuthProof};
use crate::error::CircuitError;

/// Proof material for `credentialAtomicQueryMTPV2OnChain`.
#[derive(Debug, Clone)]
pub struct AtomicQueryMtpV2OnChainInputs {
    pub atomic: AtomicQueryMtpV2Inputs,
    pub auth: UserAuthProof,
    pub challenge: Field,
}

/// A query circuit's inputs followed by the ownership sub-proof.
#[derive(Serialize)]
pub(crate) struct OnChainCircuitInputs<T: Serialize> {
    #[serde(flatten)]
    pub(crate) atomic: T,
    #[serde(flatten)]
    pub(crate) auth: UserAuthFields,
}

impl AtomicQueryMtpV2OnChainInputs {
    pub fn marshal(&self, params: &CircuitParams) -> Result<Vec<u8>, CircuitError> {
        if !self.auth.inc_mtp.existence {
            return Err(CircuitError::MissingProof("auth claim inclusion proof"));
        }
        let inputs = OnChainCircuitInputs {
            atomic: self
                .atomic
                .circuit_inputs(CircuitId::AtomicQueryMtpV2OnChain, params)?,
            auth: UserAuthFields::new(&self.auth, &self.challenge, params)?,
        };
        to_json(&inputs)
    }
}

/// Public output of `credentialAtomicQueryMTPV2OnChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQueryMtpV2OnChainPubSignals {
    pub merklized: bool,
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub circuit_query_hash: Field,
    #[serde(rename = "requestID")]
    pub request_id: Field,
    pub challenge: Field,
    pub gist_root: Hash,
    #[serde(rename = "issuerID")]
    pub issuer_id: Id,
    pub issuer_claim_iden_state: Hash,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
}

impl AtomicQueryMtpV2OnChainPubSignals {
    pub const SIGNAL_COUNT: usize = 11;

    pub fn decode(signals: &[String]) -> Result<Self, CircuitError> {
        let mut r = SignalReader::new(signals, Self::SIGNAL_COUNT)?;
        Ok(Self {
            merklized: r.flag("merklized")?,
            user_id: r.id("userID")?,
            circuit_query_hash: r.field("circuitQueryHash")?,
            request_id: r.field("requestID")?,
            challenge: r.field("challenge")?,
            gist_root: r.field("gistRoot")?,
            issuer_id: r.id("issuerID")?,
            issuer_claim_iden_state: r.field("issuerClaimIdenState")?,
            is_revocation_checked: r.flag("isRevocationChecked")?,
            issuer_claim_non_rev_state: r.field("issuerClaimNonRevState")?,
            timestamp: r.u64("timestamp")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use veritas_core::Operator;

    fn material() -> AtomicQueryMtpV2OnChainInputs {
        AtomicQueryMtpV2OnChainInputs {
            atomic: fixtures::mtp_v2_inputs(),
            auth: fixtures::user_auth(),
            challenge: Field::from(12345u64),
        }
    }

    #[test]
    fn test_marshal_includes_auth_sub_proof() {
        let bytes = material().marshal(&CircuitParams::new()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["challenge"], "12345");
        assert_eq!(json["userState"], "500");
        assert_eq!(json["gistRoot"], "900");
        assert_eq!(json["gistMtp"].as_array().unwrap().len(), 64);
        assert_eq!(json["authClaimNonRevMtpNoAux"], "1");
        assert_eq!(json["issuerClaimIdenState"], "300");
        assert_eq!(json.as_object().unwrap().len(), 32 + 19);
    }

    #[test]
    fn test_noop_not_allowed_on_chain() {
        let mut m = material();
        m.atomic.query.operator = Operator::Noop;
        m.atomic.query.values.clear();
        assert!(m.marshal(&CircuitParams::new()).is_err());
    }

    #[test]
    fn test_decode() {
        let user = fixtures::user_id();
        let issuer = fixtures::issuer_id();
        let signals = fixtures::strings([
            "0".to_string(),
            user.to_field().to_string(),
            "777".into(),
            "23".into(),
            "12345".into(),
            "900".into(),
            issuer.to_field().to_string(),
            "300".into(),
            "1".into(),
            "300".into(),
            "1642074362".into(),
        ]);
        let decoded = AtomicQueryMtpV2OnChainPubSignals::decode(&signals).unwrap();
        assert_eq!(decoded.circuit_query_hash, Field::from(777u64));
        assert_eq!(decoded.challenge, Field::from(12345u64));
        assert_eq!(decoded.gist_root, Field::from(900u64));
        assert_eq!(decoded.issuer_id, issuer);
        assert_eq!(decoded.timestamp, 1642074362);

        assert!(AtomicQueryMtpV2OnChainPubSignals::decode(&signals[..10]).is_err());
    }
}
