//! Circuit registry and the verification pipeline.

use std::collections::HashMap;

use veritas_circuits::PubSignals;
use veritas_core::{CircuitId, CircuitParams};

use crate::circuits::{
    AuthV2Verifier, AuthVerifier, CredentialQueryVerifier, LinkedQueryVerifier, ProofVerifier,
    Services, VerifyRequest,
};
use crate::error::VerifierError;

/// Maps circuit ids to their verifier.
#[derive(Default)]
pub struct Registry {
    verifiers: HashMap<CircuitId, Box<dyn ProofVerifier>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every circuit with a verification pipeline. On-chain variants and
    /// `stateTransition` are verified by contracts, not here.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AuthVerifier));
        for circuit in [CircuitId::AuthV2, CircuitId::AuthV3, CircuitId::AuthV3_8_32] {
            if let Ok(verifier) = AuthV2Verifier::new(circuit) {
                registry.register(Box::new(verifier));
            }
        }
        for circuit in [
            CircuitId::AtomicQueryMtpV2,
            CircuitId::AtomicQuerySigV2,
            CircuitId::AtomicQueryV3,
        ] {
            if let Ok(verifier) = CredentialQueryVerifier::new(circuit) {
                registry.register(Box::new(verifier));
            }
        }
        registry.register(Box::new(LinkedQueryVerifier));
        registry
    }

    /// Register a verifier, replacing any previous one for its circuit.
    pub fn register(&mut self, verifier: Box<dyn ProofVerifier>) {
        self.verifiers.insert(verifier.circuit(), verifier);
    }

    pub fn get(&self, circuit: CircuitId) -> Result<&dyn ProofVerifier, VerifierError> {
        self.verifiers
            .get(&circuit)
            .map(|v| v.as_ref())
            .ok_or_else(|| VerifierError::UnsupportedCircuit(circuit.to_string()))
    }

    /// Registered circuits, in catalogue order.
    pub fn circuits(&self) -> Vec<CircuitId> {
        let mut circuits: Vec<CircuitId> = self.verifiers.keys().copied().collect();
        circuits.sort();
        circuits
    }
}

/// Runs decode, query, state and ownership checks for one proof.
pub struct Verifier {
    registry: Registry,
    services: Services,
    params: HashMap<CircuitId, CircuitParams>,
}

impl Verifier {
    pub fn new(registry: Registry, services: Services) -> Self {
        Self {
            registry,
            services,
            params: HashMap::new(),
        }
    }

    /// Override the parameters `circuit` was built with.
    pub fn with_params(mut self, circuit: CircuitId, params: CircuitParams) -> Self {
        self.params.insert(circuit, params);
        self
    }

    /// Effective parameters: circuit defaults merged with any override.
    pub fn params(&self, circuit: CircuitId) -> CircuitParams {
        match self.params.get(&circuit) {
            Some(overrides) => circuit.default_params().merged(overrides),
            None => circuit.default_params(),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Verify a proof's public signals. The circuit id may carry a version
    /// suffix. Returns the decoded signals once every check has passed.
    pub async fn verify(
        &self,
        circuit_id: &str,
        signals: &[String],
        request: &VerifyRequest<'_>,
    ) -> Result<PubSignals, VerifierError> {
        let circuit = CircuitId::parse(circuit_id)
            .map_err(|_| VerifierError::UnsupportedCircuit(circuit_id.to_string()))?;
        let verifier = self.registry.get(circuit)?;
        let params = self.params(circuit);

        let decoded = verifier.decode(signals, &params)?;
        tracing::debug!(circuit = %circuit, "public signals decoded");

        verifier
            .verify_query(&decoded, request, &self.services, &params)
            .await?;
        tracing::debug!(circuit = %circuit, "query verified");

        verifier.verify_states(&decoded, request, &self.services).await?;
        tracing::debug!(circuit = %circuit, "states verified");

        verifier.verify_id_ownership(&decoded, request)?;
        tracing::info!(circuit = %circuit, sender = %request.sender, "proof verified");

        Ok(decoded)
    }

    /// [`Verifier::verify`] over the raw JSON signal array.
    pub async fn verify_bytes(
        &self,
        circuit_id: &str,
        bytes: &[u8],
        request: &VerifyRequest<'_>,
    ) -> Result<PubSignals, VerifierError> {
        let signals = veritas_circuits::parse_signals(bytes)?;
        self.verify(circuit_id, &signals, request).await
    }
}
