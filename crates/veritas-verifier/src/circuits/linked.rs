//! `linkedMultiQuery10`. The proof publishes no identity or state; it is
//! bound to a V3 proof through its link id.

use async_trait::async_trait;
use veritas_circuits::PubSignals;
use veritas_core::{CircuitId, CircuitParams};

use super::{unexpected_signals, ProofVerifier, Services, VerifyRequest};
use crate::error::VerifierError;

pub struct LinkedQueryVerifier;

#[async_trait]
impl ProofVerifier for LinkedQueryVerifier {
    fn circuit(&self) -> CircuitId {
        CircuitId::LinkedMultiQuery10
    }

    async fn verify_query(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
        params: &CircuitParams,
    ) -> Result<(), VerifierError> {
        let PubSignals::LinkedMultiQuery(s) = signals else {
            return Err(unexpected_signals(self.circuit()));
        };
        let params = self.circuit().default_params().merged(params);
        veritas_query::verify_linked_query(
            s,
            request.query()?,
            services.schemas.as_ref(),
            services.hasher.as_ref(),
            &params,
            request.disclosure,
        )
        .await?;
        Ok(())
    }

    async fn verify_states(
        &self,
        _signals: &PubSignals,
        _request: &VerifyRequest<'_>,
        _services: &Services,
    ) -> Result<(), VerifierError> {
        Ok(())
    }

    fn verify_id_ownership(
        &self,
        _signals: &PubSignals,
        _request: &VerifyRequest<'_>,
    ) -> Result<(), VerifierError> {
        Ok(())
    }
}
