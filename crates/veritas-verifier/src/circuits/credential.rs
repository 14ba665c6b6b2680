//! Credential query circuits: a predicate over an issuer-attested claim.

use async_trait::async_trait;
use veritas_circuits::PubSignals;
use veritas_core::{CircuitId, CircuitParams, Hash, Id};
use veritas_query::ClaimOutputs;

use super::{unexpected_signals, ProofVerifier, Services, VerifyRequest};
use crate::error::VerifierError;
use crate::ownership::verify_sender;

/// Verifies `credentialAtomicQueryMTPV2`, `credentialAtomicQuerySigV2` and
/// `credentialAtomicQueryV3`.
pub struct CredentialQueryVerifier {
    circuit: CircuitId,
}

/// The parts of a credential proof every step needs.
struct Decoded<'s> {
    outputs: ClaimOutputs,
    user_id: &'s Id,
    /// State the claim (or the key that signed it) was issued under.
    issuer_state: &'s Hash,
    non_rev_state: &'s Hash,
}

impl CredentialQueryVerifier {
    pub fn new(circuit: CircuitId) -> Result<Self, VerifierError> {
        match circuit {
            CircuitId::AtomicQueryMtpV2 | CircuitId::AtomicQuerySigV2 | CircuitId::AtomicQueryV3 => {
                Ok(Self { circuit })
            }
            other => Err(VerifierError::UnsupportedCircuit(other.to_string())),
        }
    }

    fn decoded<'s>(&self, signals: &'s PubSignals) -> Result<Decoded<'s>, VerifierError> {
        let decoded = match (self.circuit, signals) {
            (CircuitId::AtomicQueryMtpV2, PubSignals::AtomicQueryMtpV2(s)) => Decoded {
                outputs: ClaimOutputs::from(s),
                user_id: &s.user_id,
                issuer_state: &s.issuer_claim_iden_state,
                non_rev_state: &s.issuer_claim_non_rev_state,
            },
            (CircuitId::AtomicQuerySigV2, PubSignals::AtomicQuerySigV2(s)) => Decoded {
                outputs: ClaimOutputs::from(s),
                user_id: &s.user_id,
                issuer_state: &s.issuer_auth_state,
                non_rev_state: &s.issuer_claim_non_rev_state,
            },
            (CircuitId::AtomicQueryV3, PubSignals::AtomicQueryV3(s)) => Decoded {
                outputs: ClaimOutputs::from(s),
                user_id: &s.user_id,
                issuer_state: &s.issuer_state,
                non_rev_state: &s.issuer_claim_non_rev_state,
            },
            _ => return Err(unexpected_signals(self.circuit)),
        };
        Ok(decoded)
    }
}

#[async_trait]
impl ProofVerifier for CredentialQueryVerifier {
    fn circuit(&self) -> CircuitId {
        self.circuit
    }

    async fn verify_query(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
        _params: &CircuitParams,
    ) -> Result<(), VerifierError> {
        let decoded = self.decoded(signals)?;
        let query = request.query()?;
        veritas_query::verify_query(
            self.circuit,
            &decoded.outputs,
            query,
            services.schemas.as_ref(),
            request.disclosure,
            request.opts,
        )
        .await?;
        Ok(())
    }

    async fn verify_states(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
    ) -> Result<(), VerifierError> {
        let decoded = self.decoded(signals)?;
        let issuer = &decoded.outputs.issuer_id;
        let checker = request.state_checker(services);

        checker.issuer_state(issuer, decoded.issuer_state).await?;

        let skip_revocation = request
            .query
            .map(|q| q.skip_claim_revocation_check)
            .unwrap_or(false);
        if skip_revocation {
            tracing::debug!(issuer = %issuer, "revocation state check waived");
            return Ok(());
        }
        checker.issuer_non_rev_state(issuer, decoded.non_rev_state).await
    }

    fn verify_id_ownership(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
    ) -> Result<(), VerifierError> {
        let decoded = self.decoded(signals)?;
        verify_sender(request.sender, decoded.user_id)
    }
}
