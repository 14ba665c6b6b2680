//! Authentication circuits: ownership of an identity, no credential.

use async_trait::async_trait;
use veritas_circuits::{AuthPubSignals, AuthV2PubSignals, PubSignals};
use veritas_core::{CircuitId, CircuitParams};

use super::{unexpected_signals, ProofVerifier, Services, VerifyRequest};
use crate::error::VerifierError;
use crate::ownership::{verify_challenge, verify_sender};

/// `auth`: proves the user state directly.
pub struct AuthVerifier;

impl AuthVerifier {
    fn signals<'s>(&self, signals: &'s PubSignals) -> Result<&'s AuthPubSignals, VerifierError> {
        match signals {
            PubSignals::Auth(s) => Ok(s),
            _ => Err(unexpected_signals(CircuitId::Auth)),
        }
    }
}

#[async_trait]
impl ProofVerifier for AuthVerifier {
    fn circuit(&self) -> CircuitId {
        CircuitId::Auth
    }

    async fn verify_query(
        &self,
        _signals: &PubSignals,
        _request: &VerifyRequest<'_>,
        _services: &Services,
        _params: &CircuitParams,
    ) -> Result<(), VerifierError> {
        Ok(())
    }

    async fn verify_states(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
    ) -> Result<(), VerifierError> {
        let s = self.signals(signals)?;
        request
            .state_checker(services)
            .user_state(&s.user_id, &s.user_state)
            .await
    }

    fn verify_id_ownership(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
    ) -> Result<(), VerifierError> {
        let s = self.signals(signals)?;
        verify_sender(request.sender, &s.user_id)?;
        verify_challenge(request.challenge()?, &s.challenge)
    }
}

/// `authV2` and its successors: ownership proven against the global root.
pub struct AuthV2Verifier {
    circuit: CircuitId,
}

impl AuthV2Verifier {
    pub fn new(circuit: CircuitId) -> Result<Self, VerifierError> {
        match circuit {
            CircuitId::AuthV2 | CircuitId::AuthV3 | CircuitId::AuthV3_8_32 => Ok(Self { circuit }),
            other => Err(VerifierError::UnsupportedCircuit(other.to_string())),
        }
    }

    fn signals<'s>(&self, signals: &'s PubSignals) -> Result<&'s AuthV2PubSignals, VerifierError> {
        match signals {
            PubSignals::AuthV2(s) => Ok(s),
            _ => Err(unexpected_signals(self.circuit)),
        }
    }
}

#[async_trait]
impl ProofVerifier for AuthV2Verifier {
    fn circuit(&self) -> CircuitId {
        self.circuit
    }

    async fn verify_query(
        &self,
        _signals: &PubSignals,
        _request: &VerifyRequest<'_>,
        _services: &Services,
        _params: &CircuitParams,
    ) -> Result<(), VerifierError> {
        Ok(())
    }

    async fn verify_states(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
    ) -> Result<(), VerifierError> {
        let s = self.signals(signals)?;
        request
            .state_checker(services)
            .gist_root(&s.user_id, &s.gist_root)
            .await
    }

    fn verify_id_ownership(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
    ) -> Result<(), VerifierError> {
        let s = self.signals(signals)?;
        verify_sender(request.sender, &s.user_id)?;
        verify_challenge(request.challenge()?, &s.challenge)
    }
}
