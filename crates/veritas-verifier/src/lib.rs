//! Veritas Verifier — checks a zero-knowledge proof's public signals against
//! a verifier's query, the on-chain identity states and the sender's identity.

pub mod circuits;
pub mod config;
pub mod error;
pub mod ownership;
pub mod registry;
pub mod resolver;
pub mod state;

pub use circuits::{ProofVerifier, Services, VerifyRequest};
pub use config::{LoggingConfig, ResolverConfig, VerificationConfig, VerifierConfig};
pub use error::VerifierError;
pub use registry::{Registry, Verifier};
pub use resolver::{
    ContractStateResolver, MemoryStateContract, ResolvedState, Resolvers, RootInfo, StateContract,
    StateInfo, StateResolver,
};
pub use state::{check_transition, StateChecker};
