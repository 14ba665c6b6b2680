//! Per-circuit verification steps.

pub mod auth;
pub mod credential;
pub mod linked;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use veritas_circuits::PubSignals;
use veritas_core::{CircuitId, CircuitParams, Did, Field, FieldHasher};
use veritas_query::{ProofQuery, SchemaProcessor, VerifyOpts};

use crate::error::VerifierError;
use crate::resolver::Resolvers;
use crate::state::StateChecker;

pub use auth::{AuthV2Verifier, AuthVerifier};
pub use credential::CredentialQueryVerifier;
pub use linked::LinkedQueryVerifier;

/// External collaborators shared by every verification.
#[derive(Clone)]
pub struct Services {
    pub resolvers: Resolvers,
    pub schemas: Arc<dyn SchemaProcessor>,
    pub hasher: Arc<dyn FieldHasher>,
}

/// What the verifier expects of one proof.
pub struct VerifyRequest<'a> {
    /// DID of the party that sent the proof.
    pub sender: &'a Did,
    /// Challenge the verifier issued, for authentication proofs.
    pub challenge: Option<&'a Field>,
    pub query: Option<&'a ProofQuery>,
    /// Presented credential, for selective disclosure.
    pub disclosure: Option<&'a Value>,
    pub opts: &'a VerifyOpts,
}

impl<'a> VerifyRequest<'a> {
    pub fn new(sender: &'a Did, opts: &'a VerifyOpts) -> Self {
        Self {
            sender,
            challenge: None,
            query: None,
            disclosure: None,
            opts,
        }
    }

    pub fn with_challenge(mut self, challenge: &'a Field) -> Self {
        self.challenge = Some(challenge);
        self
    }

    pub fn with_query(mut self, query: &'a ProofQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_disclosure(mut self, document: &'a Value) -> Self {
        self.disclosure = Some(document);
        self
    }

    pub(crate) fn query(&self) -> Result<&'a ProofQuery, VerifierError> {
        self.query.ok_or(VerifierError::MissingInput("query"))
    }

    pub(crate) fn challenge(&self) -> Result<&'a Field, VerifierError> {
        self.challenge.ok_or(VerifierError::MissingInput("challenge"))
    }

    pub(crate) fn state_checker<'s>(&self, services: &'s Services) -> StateChecker<'s> {
        StateChecker::new(
            &services.resolvers,
            self.opts.accepted_state_transition_delay,
            self.opts.current_time(),
        )
    }
}

/// The four verification steps of one circuit.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    fn circuit(&self) -> CircuitId;

    fn decode(&self, signals: &[String], params: &CircuitParams) -> Result<PubSignals, VerifierError> {
        Ok(veritas_circuits::decode_signals(self.circuit(), params, signals)?)
    }

    async fn verify_query(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
        params: &CircuitParams,
    ) -> Result<(), VerifierError>;

    async fn verify_states(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
        services: &Services,
    ) -> Result<(), VerifierError>;

    fn verify_id_ownership(
        &self,
        signals: &PubSignals,
        request: &VerifyRequest<'_>,
    ) -> Result<(), VerifierError>;
}

pub(crate) fn unexpected_signals(circuit: CircuitId) -> VerifierError {
    VerifierError::UnsupportedCircuit(format!("signals do not belong to {}", circuit))
}
